//! The identifier octets of an encoded value.
//!
//! This is a private module. Its public items are re-exported by the crate
//! root.

use std::{fmt, io};
use crate::error::{DecodeError, ErrorKind};
use crate::frame::SliceSource;


//------------ Class ---------------------------------------------------------

/// The class of a tag.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    /// The types defined by X.680 itself.
    Universal,

    /// Types whose meaning is specific to an application.
    Application,

    /// Types whose meaning depends on where they appear.
    Context,

    /// Types whose meaning is agreed upon between two parties.
    Private,
}

impl Class {
    /// Returns the class encoded in the first identifier octet.
    pub(crate) const fn from_first_octet(octet: u8) -> Self {
        match octet >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::Context,
            _ => Class::Private,
        }
    }

    /// Returns the class as the two top bits of an identifier octet.
    pub(crate) const fn to_bits(self) -> u8 {
        match self {
            Class::Universal => 0x00,
            Class::Application => 0x40,
            Class::Context => 0x80,
            Class::Private => 0xC0,
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// In ASN.1, tags are used to identify the type of a value. Tags consist of
/// one of four classes, represented by the [`Class`] enum, and a number
/// within this class.
///
/// In BER encoding, the tag becomes part of the identifier octets by
/// combining it with a bit indicating whether a value is primitive or
/// constructed. This flag is not part of the tag itself; [`Element`] keeps
/// it separately.
///
/// # Limitations
///
/// We only support tag numbers that fit into a `u32`. This should be more
/// than enough in practice.
///
/// [`Element`]: crate::Element
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag {
    /// The class of the tag.
    class: Class,

    /// The number of the tag within its class.
    number: u32,
}

impl Tag {
    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Tag { class, number }
    }

    /// Creates a new tag in the context-specific class.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.number
    }
}

/// # Constants for universal tags.
///
/// See clause 8.4 of ITU Recommendation X.690.
///
impl Tag {
    /// The tag marking the end-of-contents in an indefinite length value.
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, 0);

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::new(Class::Universal, 2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Self::new(Class::Universal, 3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::new(Class::Universal, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::new(Class::Universal, 6);

    /// The tag for the ObjectDescriptor type, UNIVERSAL 7.
    pub const OBJECT_DESCRIPTOR: Self = Self::new(Class::Universal, 7);

    /// The tag for the EXTERNAL and Instance-of types, UNIVERSAL 8.
    pub const EXTERNAL: Self = Self::new(Class::Universal, 8);

    /// The tag for the REAL type, UNIVERSAL 9.
    pub const REAL: Self = Self::new(Class::Universal, 9);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Self::new(Class::Universal, 10);

    /// The tag for the EMBEDDED PDV type, UNIVERSAL 11.
    pub const EMBEDDED_PDV: Self = Self::new(Class::Universal, 11);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// The tag for the RELATIVE-OID type, UNIVERSAL 13.
    pub const RELATIVE_OID: Self = Self::new(Class::Universal, 13);

    /// The tag for the TIME type, UNIVERSAL 14.
    pub const TIME: Self = Self::new(Class::Universal, 14);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Self::new(Class::Universal, 17);

    /// The tag for the NumericString type, UNIVERSAL 18.
    pub const NUMERIC_STRING: Self = Self::new(Class::Universal, 18);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Self::new(Class::Universal, 19);

    /// The tag for the TeletexString type, UNIVERSAL 20.
    pub const TELETEX_STRING: Self = Self::new(Class::Universal, 20);

    /// The tag for the VideotexString type, UNIVERSAL 21.
    pub const VIDEOTEX_STRING: Self = Self::new(Class::Universal, 21);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Self::new(Class::Universal, 22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Self::new(Class::Universal, 23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Self::new(Class::Universal, 24);

    /// The tag for the GraphicString type, UNIVERSAL 25.
    pub const GRAPHIC_STRING: Self = Self::new(Class::Universal, 25);

    /// The tag for the VisibleString type, UNIVERSAL 26.
    pub const VISIBLE_STRING: Self = Self::new(Class::Universal, 26);

    /// The tag for the GeneralString type, UNIVERSAL 27.
    pub const GENERAL_STRING: Self = Self::new(Class::Universal, 27);

    /// The tag for the UniversalString type, UNIVERSAL 28.
    pub const UNIVERSAL_STRING: Self = Self::new(Class::Universal, 28);

    /// The tag for the CHARACTER STRING type, UNIVERSAL 29.
    pub const CHARACTER_STRING: Self = Self::new(Class::Universal, 29);

    /// The tag for the BMPString type, UNIVERSAL 30.
    pub const BMP_STRING: Self = Self::new(Class::Universal, 30);

    /// The tag for the DATE type, UNIVERSAL 31.
    pub const DATE: Self = Self::new(Class::Universal, 31);

    /// The tag for the TIME-OF-DAY type, UNIVERSAL 32.
    pub const TIME_OF_DAY: Self = Self::new(Class::Universal, 32);

    /// The tag for the DATE-TIME type, UNIVERSAL 33.
    pub const DATE_TIME: Self = Self::new(Class::Universal, 33);

    /// The tag for the DURATION type, UNIVERSAL 34.
    pub const DURATION: Self = Self::new(Class::Universal, 34);

    /// The tag for the OID-IRI type, UNIVERSAL 35.
    pub const OID_IRI: Self = Self::new(Class::Universal, 35);

    /// The tag for the RELATIVE-OID-IRI type, UNIVERSAL 36.
    pub const RELATIVE_OID_IRI: Self = Self::new(Class::Universal, 36);
}

/// # Decoding and Encoding
///
impl Tag {
    /// Takes a tag from the beginning of a source.
    ///
    /// Upon success, returns both the tag and whether the value is
    /// constructed.
    pub(crate) fn take_from(
        source: &mut SliceSource,
    ) -> Result<(Self, bool), DecodeError> {
        let start = source.pos();
        let first = source.take_u8()?;
        let class = Class::from_first_octet(first);
        let constructed = first & 0x20 != 0;
        if first & 0x1F != 0x1F {
            return Ok((Tag::new(class, u32::from(first & 0x1F)), constructed))
        }

        // High tag number form: base 128, big-endian, bit 8 of each octet
        // except the last set to 1. The first subsequent octet must not be
        // 0x80 as that would be a non-minimal encoding.
        let mut number = 0u32;
        let mut first_octet = true;
        loop {
            let octet = source.take_u8()?;
            if first_octet && octet == 0x80 {
                return Err(DecodeError::new(
                    ErrorKind::TagPadding,
                    "leading padding octet in tag number",
                    start,
                ))
            }
            first_octet = false;
            if number > u32::MAX >> 7 {
                return Err(DecodeError::new(
                    ErrorKind::TagOverflow, "tag number too large", start,
                ))
            }
            number = (number << 7) | u32::from(octet & 0x7F);
            if octet & 0x80 == 0 {
                break
            }
        }
        if number < 0x1F {
            // Low tag numbers have to use the short form.
            return Err(DecodeError::new(
                ErrorKind::TagPadding,
                "long tag form for a low tag number", start,
            ))
        }
        Ok((Tag::new(class, number), constructed))
    }

    /// Returns the number of octets of the encoded form of the tag.
    pub fn encoded_len(self) -> usize {
        if self.number < 0x1F { 1 }
        else if self.number < 0x80 { 2 }
        else if self.number < 0x4000 { 3 }
        else if self.number < 0x20_0000 { 4 }
        else if self.number < 0x1000_0000 { 5 }
        else { 6 }
    }

    /// Encodes the tag into a target.
    ///
    /// If `constructed` is `true`, the encoded tag will signal a value in
    /// constructed encoding and primitive encoding otherwise.
    pub fn write_encoded<W: io::Write>(
        self, constructed: bool, target: &mut W,
    ) -> Result<(), io::Error> {
        let mut first = self.class.to_bits();
        if constructed {
            first |= 0x20
        }
        if self.number < 0x1F {
            return target.write_all(&[first | self.number as u8])
        }
        target.write_all(&[first | 0x1F])?;
        let mut shift = (31 - self.number.leading_zeros()) / 7 * 7;
        while shift > 0 {
            target.write_all(
                &[0x80 | ((self.number >> shift) & 0x7F) as u8]
            )?;
            shift -= 7;
        }
        target.write_all(&[(self.number & 0x7F) as u8])
    }
}


//--- Display and Debug

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::OBJECT_DESCRIPTOR => write!(f, "ObjectDescriptor"),
            Tag::EXTERNAL => write!(f, "EXTERNAL"),
            Tag::REAL => write!(f, "REAL"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::EMBEDDED_PDV => write!(f, "EMBEDDED PDV"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::RELATIVE_OID => write!(f, "RELATIVE-OID"),
            Tag::TIME => write!(f, "TIME"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::NUMERIC_STRING => write!(f, "NumericString"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::TELETEX_STRING => write!(f, "TeletexString"),
            Tag::VIDEOTEX_STRING => write!(f, "VideotexString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            Tag::GRAPHIC_STRING => write!(f, "GraphicString"),
            Tag::VISIBLE_STRING => write!(f, "VisibleString"),
            Tag::GENERAL_STRING => write!(f, "GeneralString"),
            Tag::UNIVERSAL_STRING => write!(f, "UniversalString"),
            Tag::CHARACTER_STRING => write!(f, "CHARACTER STRING"),
            Tag::BMP_STRING => write!(f, "BMPString"),
            Tag::DATE => write!(f, "DATE"),
            Tag::TIME_OF_DAY => write!(f, "TIME-OF-DAY"),
            Tag::DATE_TIME => write!(f, "DATE-TIME"),
            Tag::DURATION => write!(f, "DURATION"),
            Tag::OID_IRI => write!(f, "OID-IRI"),
            Tag::RELATIVE_OID_IRI => write!(f, "RELATIVE-OID-IRI"),
            tag => {
                match tag.class() {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number())
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const CLASSES: &[Class] = &[
        Class::Universal, Class::Application, Class::Context, Class::Private
    ];

    fn encoded(tag: Tag, constructed: bool) -> Vec<u8> {
        let mut vec = Vec::new();
        tag.write_encoded(constructed, &mut vec).unwrap();
        assert_eq!(vec.len(), tag.encoded_len());
        vec
    }

    fn decoded(data: &[u8]) -> Result<(Tag, bool), DecodeError> {
        let mut source = SliceSource::new(data);
        let res = Tag::take_from(&mut source)?;
        assert_eq!(source.pos(), data.len());
        Ok(res)
    }

    #[test]
    fn short_form_round_trip() {
        for &class in CLASSES {
            for number in [0u32, 1, 17, 30] {
                let tag = Tag::new(class, number);
                for constructed in [false, true] {
                    let data = encoded(tag, constructed);
                    assert_eq!(data.len(), 1);
                    assert_eq!(decoded(&data).unwrap(), (tag, constructed));
                }
            }
        }
    }

    #[test]
    fn long_form_round_trip() {
        for &class in CLASSES {
            for number in [
                31u32, 127, 128, 0x3FFF, 0x4000, 0x1F_FFFF, 0x20_0000,
                u32::MAX,
            ] {
                let tag = Tag::new(class, number);
                let data = encoded(tag, false);
                assert_eq!(decoded(&data).unwrap(), (tag, false));
                assert_eq!(decoded(&data).unwrap().0.number(), number);
            }
        }
    }

    #[test]
    fn long_form_errors() {
        // Continuation starting with 0x80 is padding.
        assert_eq!(
            decoded(&[0x1F, 0x80, 0x01]).unwrap_err().kind(),
            ErrorKind::TagPadding
        );
        // Number above u32::MAX.
        assert_eq!(
            decoded(&[0x1F, 0x90, 0x80, 0x80, 0x80, 0x80, 0x00])
                .unwrap_err().kind(),
            ErrorKind::TagOverflow
        );
        // Truncated continuation.
        assert_eq!(
            decoded(&[0x1F, 0x81]).unwrap_err().kind(),
            ErrorKind::Truncation
        );
        assert_eq!(
            decoded(&[]).unwrap_err().kind(),
            ErrorKind::Truncation
        );
        // Long form for a number the short form can hold.
        assert_eq!(
            decoded(&[0x1F, 0x1E]).unwrap_err().kind(),
            ErrorKind::TagPadding
        );
    }

    #[test]
    fn display() {
        assert_eq!(Tag::BOOLEAN.to_string(), "BOOLEAN");
        assert_eq!(Tag::ctx(3).to_string(), "[3]");
        assert_eq!(
            Tag::new(Class::Application, 40).to_string(),
            "[APPLICATION 40]"
        );
    }
}
