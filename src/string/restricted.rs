//! Restricted character string types.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{char, cmp, error, fmt, hash, str};
use std::borrow::Cow;
use std::marker::PhantomData;
use bytes::Bytes;
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};
use crate::tag::Tag;


//------------ CharSet -------------------------------------------------------

/// The character set of a restricted character string type.
///
/// The trait only includes associated functions and can thus be implemented
/// for marker types. Its main purpose is to take an iterator over `u8`s and
/// produce `char`s or errors. This happens in [`next_char`][Self::next_char].
///
/// The trait is primarily used to define the character set of the
/// [`RestrictedString`] type.
pub trait CharSet {
    /// The natural tag of the related restricted character string type.
    const TAG: Tag;

    /// Returns the next character from an octet sequence.
    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError>;

    /// Converts a `str` into an octet sequence.
    ///
    /// If the string can be encoded in this character set and its own octet
    /// sequence is identical to the encoded sequence, its octet sequence is
    /// returned as `Ok(Cow::Borrowed(_))`. If the octet sequence differs,
    /// the encoded sequence is created and returned as `Ok(Cow::Owned(_))`.
    /// If the string cannot be encoded in this character set, an error is
    /// returned.
    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError>;

    /// Checks whether a sequence of octets is a valid string.
    fn check<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<(), CharSetError> {
        while Self::next_char(iter)?.is_some() { }
        Ok(())
    }
}


//------------ RestrictedString ----------------------------------------------

/// A generic restricted character string.
///
/// Restricted character strings essentially are a sequence of characters
/// from a specific character set mapped into a sequence of octets. In BER,
/// they are encoded just like an octet string with a different tag, so
/// this type is a wrapper around the reassembled octets that makes sure
/// the sequence is correctly encoded for the given character set.
///
/// New values are created from a `String` or `str` via
/// [`from_string`][Self::from_string] and the `FromStr` impl, or from raw
/// octets via [`new`][Self::new]. A value converts back into a string by
/// way of its `Display` impl, with [`chars`][Self::chars] providing an
/// iterator over the decoded characters.
#[derive(Clone, Debug)]
pub struct RestrictedString<L: CharSet> {
    /// The octets of the string.
    octets: Bytes,

    /// Marker for our character set.
    marker: PhantomData<L>,
}

impl<L: CharSet> RestrictedString<L> {
    /// Creates a new character string without any checks.
    fn new_unchecked(octets: Bytes) -> Self {
        RestrictedString {
            octets,
            marker: PhantomData,
        }
    }

    /// Creates a new character string from its octets.
    ///
    /// If the octets contain sequences that are not valid for the
    /// character set, an error is returned.
    pub fn new(octets: Bytes) -> Result<Self, CharSetError> {
        L::check(&mut octets.as_ref().iter().copied())?;
        Ok(Self::new_unchecked(octets))
    }

    /// Creates a new character string from a `String`.
    ///
    /// If the string's own representation is identical to its encoding in
    /// the character set, the string's buffer is reused without copying.
    pub fn from_string(s: String) -> Result<Self, CharSetError> {
        let octets = match L::from_str(s.as_ref())? {
            Cow::Borrowed(_) => s.into_bytes().into(),
            Cow::Owned(owned) => owned.into(),
        };
        Ok(Self::new_unchecked(octets))
    }

    /// Returns an iterator over the characters in the string.
    pub fn chars(&self) -> RestrictedStringChars<L> {
        RestrictedStringChars {
            octets: self.octets.as_ref().iter().copied(),
            marker: PhantomData,
        }
    }

    /// Returns the octets of the string.
    ///
    /// These are not necessarily a valid Rust string.
    pub fn as_slice(&self) -> &[u8] {
        self.octets.as_ref()
    }

    /// Returns the number of octets in the string.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether the string is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Converts the string into its underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.octets
    }
}


//--- FromStr

impl<L: CharSet> str::FromStr for RestrictedString<L> {
    type Err = CharSetError;

    fn from_str(s: &str) -> Result<Self, CharSetError> {
        Ok(Self::new_unchecked(L::from_str(s)?.into_owned().into()))
    }
}


//--- AsRef

impl<L: CharSet> AsRef<[u8]> for RestrictedString<L> {
    fn as_ref(&self) -> &[u8] {
        self.octets.as_ref()
    }
}


//--- PartialEq and Eq, PartialOrd and Ord
//
// We only supply PartialEq<Self> because two identical octet sequences in
// different character sets can mean different things.

impl<L: CharSet> PartialEq for RestrictedString<L> {
    fn eq(&self, other: &Self) -> bool {
        self.octets.eq(&other.octets)
    }
}

impl<L: CharSet> Eq for RestrictedString<L> { }

impl<L: CharSet> PartialOrd for RestrictedString<L> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<L: CharSet> Ord for RestrictedString<L> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.octets.cmp(&other.octets)
    }
}


//--- Hash

impl<L: CharSet> hash::Hash for RestrictedString<L> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.octets.hash(state)
    }
}


//--- Display

impl<L: CharSet> fmt::Display for RestrictedString<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.chars().try_for_each(|ch| fmt::Display::fmt(&ch, f))
    }
}


//------------ RestrictedStringChars -----------------------------------------

/// An iterator over the characters in a restricted character string.
///
/// You can obtain a value of this type via a restricted string's
/// [`chars`][RestrictedString::chars] method.
#[derive(Clone, Debug)]
pub struct RestrictedStringChars<'a, L: CharSet> {
    /// The underlying octet iterator.
    octets: std::iter::Copied<std::slice::Iter<'a, u8>>,

    /// Our character set.
    marker: PhantomData<L>,
}

impl<'a, L: CharSet> Iterator for RestrictedStringChars<'a, L> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        // The content was validated when the string was created.
        L::next_char(&mut self.octets).unwrap_or(None)
    }
}


//============ Concrete Restricted String Types ==============================

//------------ Utf8String ----------------------------------------------------

/// A restricted character string containing UTF-8 encoded characters.
///
/// This character string allows all Unicode code points. It represents
/// them as a sequence of octets according to the UTF-8 encoding defined in
/// [RFC 3629].
///
/// [RFC 3629]: https://tools.ietf.org/html/rfc3629
pub type Utf8String = RestrictedString<Utf8CharSet>;

/// The character set for the UTF8String ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct Utf8CharSet;

impl CharSet for Utf8CharSet {
    const TAG: Tag = Tag::UTF8_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        let Some(first) = iter.next() else {
            return Ok(None)
        };
        // The number of continuation octets and the permitted range of the
        // first continuation octet per RFC 3629 section 4. The ranges keep
        // out overlong forms, surrogates, and code points past 0x10FFFF.
        let (count, mut code, second_range) = match first {
            0x00..=0x7F => return Ok(Some(char::from(first))),
            0xC2..=0xDF => (1, u32::from(first & 0x1F), 0x80..=0xBF),
            0xE0 => (2, 0, 0xA0..=0xBF),
            0xE1..=0xEC => (2, u32::from(first & 0x0F), 0x80..=0xBF),
            0xED => (2, 0x0D, 0x80..=0x9F),
            0xEE..=0xEF => (2, u32::from(first & 0x0F), 0x80..=0xBF),
            0xF0 => (3, 0, 0x90..=0xBF),
            0xF1..=0xF3 => (3, u32::from(first & 0x07), 0x80..=0xBF),
            0xF4 => (3, 0x04, 0x80..=0x8F),
            _ => return Err(CharSetError),
        };
        let mut range = second_range;
        for _ in 0..count {
            let Some(octet) = iter.next() else {
                return Err(CharSetError)
            };
            if !range.contains(&octet) {
                return Err(CharSetError)
            }
            code = (code << 6) | u32::from(octet & 0x3F);
            range = 0x80..=0xBF;
        }
        char::from_u32(code).map(Some).ok_or(CharSetError)
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        Ok(Cow::Borrowed(s.as_bytes()))
    }
}


//------------ NumericString -------------------------------------------------

/// A restricted character string containing only digits and spaces.
///
/// This character string allows only the decimal digits `0` to `9` and the
/// space character. It encodes them with their ASCII value.
pub type NumericString = RestrictedString<NumericCharSet>;

/// The character set for the NumericString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct NumericCharSet;

impl CharSet for NumericCharSet {
    const TAG: Tag = Tag::NUMERIC_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        match iter.next() {
            Some(ch) if ch == b' ' || ch.is_ascii_digit() => {
                Ok(Some(char::from(ch)))
            }
            Some(_) => Err(CharSetError),
            None => Ok(None)
        }
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        Self::check(&mut s.bytes())?;
        Ok(Cow::Borrowed(s.as_bytes()))
    }
}


//------------ PrintableString -----------------------------------------------

/// A restricted character string allowing a subset of ASCII characters.
///
/// This character string allows the following characters from the ASCII
/// character set and encodes them with their ASCII value:
///
/// * the letters `A` to `Z` and `a` to `z`,
/// * the digits `0` to `9`,
/// * the space character,
/// * the symbols `'`, `(`, `)`, `+`, `,`, `-`, `.`, `/`, `:`, `=`,
///   and `?`.
pub type PrintableString = RestrictedString<PrintableCharSet>;

/// The character set for the PrintableString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct PrintableCharSet;

impl CharSet for PrintableCharSet {
    const TAG: Tag = Tag::PRINTABLE_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        match iter.next() {
            Some(x) if x.is_ascii_alphanumeric() || // A-Z a-z 0-9
                       x == b' ' || x == b'\'' || x == b'(' || x == b')' ||
                       x == b'+' || x == b',' || x == b'-' || x == b'.' ||
                       x == b'/' || x == b':' || x == b'=' || x == b'?' => {
                Ok(Some(char::from(x)))
            }
            Some(_) => Err(CharSetError),
            None => Ok(None)
        }
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        Self::check(&mut s.bytes())?;
        Ok(Cow::Borrowed(s.as_bytes()))
    }
}


//------------ Ia5String -----------------------------------------------------

/// A restricted character string containing ASCII characters.
///
/// This character string allows all ASCII characters, i.e., octets with
/// values 0 to 0x7F, and encodes them with their ASCII value. The type's
/// name derives from IA5, or International Alphabet No. 5, which is the
/// ITU name for ASCII.
pub type Ia5String = RestrictedString<Ia5CharSet>;

/// The character set for the IA5String ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct Ia5CharSet;

impl CharSet for Ia5CharSet {
    const TAG: Tag = Tag::IA5_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        match iter.next() {
            Some(ch) if ch.is_ascii() => Ok(Some(char::from(ch))),
            Some(_) => Err(CharSetError),
            None => Ok(None)
        }
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        Self::check(&mut s.bytes())?;
        Ok(Cow::Borrowed(s.as_bytes()))
    }
}


//------------ GeneralString -------------------------------------------------

/// A restricted character string for the GeneralString ASN.1 type.
///
/// We treat this type as equivalent to [`Ia5String`]: all octets up to
/// 0x7F are allowed.
pub type GeneralString = RestrictedString<GeneralCharSet>;

/// The character set for the GeneralString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct GeneralCharSet;

impl CharSet for GeneralCharSet {
    const TAG: Tag = Tag::GENERAL_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        Ia5CharSet::next_char(iter)
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        Self::check(&mut s.bytes())?;
        Ok(Cow::Borrowed(s.as_bytes()))
    }
}


//------------ VisibleString -------------------------------------------------

/// A restricted character string containing visible ASCII characters.
///
/// Only the printable ASCII characters 0x20 to 0x7E are allowed.
pub type VisibleString = RestrictedString<VisibleCharSet>;

/// The character set for the VisibleString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct VisibleCharSet;

impl CharSet for VisibleCharSet {
    const TAG: Tag = Tag::VISIBLE_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        match iter.next() {
            Some(ch) if (0x20..=0x7E).contains(&ch) => {
                Ok(Some(char::from(ch)))
            }
            Some(_) => Err(CharSetError),
            None => Ok(None)
        }
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        Self::check(&mut s.bytes())?;
        Ok(Cow::Borrowed(s.as_bytes()))
    }
}


//------------ GraphicString -------------------------------------------------

/// A restricted character string for the deprecated GraphicString type.
///
/// The permitted characters are the same as for [`VisibleString`].
pub type GraphicString = RestrictedString<GraphicCharSet>;

/// The character set for the GraphicString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct GraphicCharSet;

impl CharSet for GraphicCharSet {
    const TAG: Tag = Tag::GRAPHIC_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        VisibleCharSet::next_char(iter)
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        Self::check(&mut s.bytes())?;
        Ok(Cow::Borrowed(s.as_bytes()))
    }
}


//------------ TeletexString -------------------------------------------------

/// A string of the TeletexString ASN.1 type, also known as T61String.
///
/// The type nominally uses the T.61 character repertoire but is treated as
/// transparent octets in practice, with each octet mapping to the Latin-1
/// character of its value.
pub type TeletexString = RestrictedString<TeletexCharSet>;

/// The character set for the TeletexString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct TeletexCharSet;

impl CharSet for TeletexCharSet {
    const TAG: Tag = Tag::TELETEX_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        Ok(iter.next().map(char::from))
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        latin1_from_str(s)
    }
}


//------------ VideotexString ------------------------------------------------

/// A string of the VideotexString ASN.1 type.
///
/// Treated as transparent octets just like [`TeletexString`].
pub type VideotexString = RestrictedString<VideotexCharSet>;

/// The character set for the VideotexString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct VideotexCharSet;

impl CharSet for VideotexCharSet {
    const TAG: Tag = Tag::VIDEOTEX_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        Ok(iter.next().map(char::from))
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        latin1_from_str(s)
    }
}

/// Converts a string into octets mapping chars to their Latin-1 value.
fn latin1_from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
    if s.is_ascii() {
        return Ok(Cow::Borrowed(s.as_bytes()))
    }
    let mut res = Vec::with_capacity(s.len());
    for ch in s.chars() {
        let code = u32::from(ch);
        if code > 0xFF {
            return Err(CharSetError)
        }
        res.push(code as u8);
    }
    Ok(Cow::Owned(res))
}


//------------ UniversalString -----------------------------------------------

/// A restricted character string of UTF-32 encoded characters.
///
/// Each character takes four octets in big-endian order. The length of the
/// octets is consequently a multiple of four.
pub type UniversalString = RestrictedString<UniversalCharSet>;

/// The character set for the UniversalString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct UniversalCharSet;

impl CharSet for UniversalCharSet {
    const TAG: Tag = Tag::UNIVERSAL_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        let Some(first) = iter.next() else {
            return Ok(None)
        };
        let mut code = u32::from(first);
        for _ in 0..3 {
            let Some(octet) = iter.next() else {
                return Err(CharSetError)
            };
            code = (code << 8) | u32::from(octet);
        }
        char::from_u32(code).map(Some).ok_or(CharSetError)
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        let mut res = Vec::with_capacity(s.len() * 4);
        for ch in s.chars() {
            res.extend_from_slice(&u32::from(ch).to_be_bytes());
        }
        Ok(Cow::Owned(res))
    }
}


//------------ BmpString -----------------------------------------------------

/// A restricted character string of UCS-2 encoded characters.
///
/// Each character of the Basic Multilingual Plane takes two octets in
/// big-endian order. Surrogate code units are not allowed, so characters
/// outside the BMP cannot be represented.
pub type BmpString = RestrictedString<BmpCharSet>;

/// The character set for the BMPString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct BmpCharSet;

impl CharSet for BmpCharSet {
    const TAG: Tag = Tag::BMP_STRING;

    fn next_char<I: Iterator<Item = u8>>(
        iter: &mut I
    ) -> Result<Option<char>, CharSetError> {
        let Some(first) = iter.next() else {
            return Ok(None)
        };
        let Some(second) = iter.next() else {
            return Err(CharSetError)
        };
        let code = (u32::from(first) << 8) | u32::from(second);
        if (0xD800..=0xDFFF).contains(&code) {
            return Err(CharSetError)
        }
        char::from_u32(code).map(Some).ok_or(CharSetError)
    }

    fn from_str(s: &str) -> Result<Cow<[u8]>, CharSetError> {
        let mut res = Vec::with_capacity(s.len() * 2);
        for ch in s.chars() {
            let code = u32::from(ch);
            if code > 0xFFFF {
                return Err(CharSetError)
            }
            res.extend_from_slice(&(code as u16).to_be_bytes());
        }
        Ok(Cow::Owned(res))
    }
}


//------------ CharSetError --------------------------------------------------

/// An illegal value was encountered during character set conversion.
#[derive(Clone, Copy, Debug)]
pub struct CharSetError;

impl fmt::Display for CharSetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("illegal octets for character set")
    }
}

impl error::Error for CharSetError { }


//============ Element Accessors =============================================

/// # Restricted Character Strings
///
impl Element {
    /// Returns the value of a restricted character string element.
    ///
    /// The character set is chosen via the type argument:
    ///
    /// ```
    /// use x690::Mode;
    /// use x690::string::Utf8CharSet;
    ///
    /// let (elem, _) = Mode::Der.decode_one(b"\x0C\x02hi").unwrap();
    /// let s = elem.to_restricted_string::<Utf8CharSet>().unwrap();
    /// assert_eq!(s.to_string(), "hi");
    /// ```
    ///
    /// The segmentation rules are the same as for
    /// [`to_octet_string`][Self::to_octet_string].
    pub fn to_restricted_string<L: CharSet>(
        &self
    ) -> Result<RestrictedString<L>, DecodeError> {
        let octets = self.string_content(Tag::OCTET_STRING)?;
        RestrictedString::new(octets).map_err(|_| {
            DecodeError::new(
                ErrorKind::ValueCharacters,
                "forbidden character in restricted string", 0,
            )
        })
    }

    /// Sets the element to a restricted character string value.
    pub fn set_restricted_string<L: CharSet>(
        &mut self, value: &RestrictedString<L>,
    ) {
        self.set_string_content(Tag::OCTET_STRING, value.as_slice())
    }

    /// Returns the value of a UTF8String element.
    pub fn to_utf8_string(&self) -> Result<Utf8String, DecodeError> {
        self.to_restricted_string()
    }

    /// Sets the element to a UTF8String value.
    pub fn set_utf8_string(&mut self, value: &Utf8String) {
        self.set_restricted_string(value)
    }

    /// Returns the value of a PrintableString element.
    pub fn to_printable_string(
        &self
    ) -> Result<PrintableString, DecodeError> {
        self.to_restricted_string()
    }

    /// Sets the element to a PrintableString value.
    pub fn set_printable_string(&mut self, value: &PrintableString) {
        self.set_restricted_string(value)
    }

    /// Returns the value of an IA5String element.
    pub fn to_ia5_string(&self) -> Result<Ia5String, DecodeError> {
        self.to_restricted_string()
    }

    /// Sets the element to an IA5String value.
    pub fn set_ia5_string(&mut self, value: &Ia5String) {
        self.set_restricted_string(value)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use crate::mode::Mode;
    use super::*;

    #[test]
    fn utf8_validation() {
        assert!(Utf8String::new(Bytes::from_static(b"h\xC3\xA9!")).is_ok());
        // Bare continuation octet.
        assert!(Utf8String::new(Bytes::from_static(b"\xA0")).is_err());
        // Overlong two-octet form of '/'.
        assert!(
            Utf8String::new(Bytes::from_static(b"\xC0\xAF")).is_err()
        );
        // Encoded surrogate.
        assert!(
            Utf8String::new(Bytes::from_static(b"\xED\xA0\x80")).is_err()
        );
        // Past 0x10FFFF.
        assert!(
            Utf8String::new(
                Bytes::from_static(b"\xF4\x90\x80\x80")
            ).is_err()
        );
        // Truncated sequence.
        assert!(Utf8String::new(Bytes::from_static(b"\xC3")).is_err());

        let s = Utf8String::from_string("héllo".into()).unwrap();
        assert_eq!(s.to_string(), "héllo");
        assert_eq!(s.chars().count(), 5);
    }

    #[test]
    fn charset_policies() {
        assert!(NumericString::from_str("123 456").is_ok());
        assert!(NumericString::from_str("123-456").is_err());

        assert!(PrintableString::from_str("This is okay").is_ok());
        assert!(PrintableString::from_str("This is wrong!").is_err());

        assert!(Ia5String::from_str("all of\tascii\x7f").is_ok());
        assert!(Ia5String::from_str("nö").is_err());

        assert!(VisibleString::from_str("no control").is_ok());
        assert!(VisibleString::from_str("tab\tis out").is_err());
        assert!(GraphicString::from_str("same range").is_ok());

        assert!(TeletexString::from_str("währung").is_ok());
        assert!(TeletexString::from_str("€").is_err());
    }

    #[test]
    fn decode_with_charset() {
        let (elem, _) = Mode::Der.decode_one(b"\x12\x03123").unwrap();
        assert_eq!(
            elem.to_restricted_string::<NumericCharSet>()
                .unwrap().to_string(),
            "123"
        );
        let (elem, _) = Mode::Der.decode_one(b"\x12\x03abc").unwrap();
        assert_eq!(
            elem.to_restricted_string::<NumericCharSet>()
                .unwrap_err().kind(),
            ErrorKind::ValueCharacters
        );
    }

    #[test]
    fn bmp_round_trip() {
        let s = BmpString::from_str("Grüße").unwrap();
        assert_eq!(s.len(), 10);
        let mut elem = crate::Element::new(Mode::Der, Tag::BMP_STRING);
        elem.set_restricted_string(&s);
        let (decoded, _) = Mode::Der.decode_one(
            elem.to_bytes().as_ref()
        ).unwrap();
        let back: BmpString = decoded.to_restricted_string().unwrap();
        assert_eq!(back.to_string(), "Grüße");

        // Outside the BMP.
        assert!(BmpString::from_str("🦀").is_err());
        // Odd length.
        let (elem, _) = Mode::Der.decode_one(b"\x1E\x03\x00a\x00").unwrap();
        assert_eq!(
            elem.to_restricted_string::<BmpCharSet>().unwrap_err().kind(),
            ErrorKind::ValueCharacters
        );
    }

    #[test]
    fn universal_round_trip() {
        let s = UniversalString::from_str("a🦀").unwrap();
        assert_eq!(s.len(), 8);
        assert_eq!(
            s.as_slice(),
            b"\x00\x00\x00a\x00\x01\xF9\x80"
        );
        assert_eq!(s.to_string(), "a🦀");

        // Length not divisible by four.
        assert!(
            UniversalString::new(
                Bytes::from_static(b"\x00\x00\x00")
            ).is_err()
        );
    }

    #[test]
    fn ber_segmented_string() {
        // Constructed UTF8String out of two octet string segments.
        let data = b"\x2C\x0A\x04\x03foo\x04\x03bar";
        let (elem, _) = Mode::Ber.decode_one(data).unwrap();
        assert_eq!(
            elem.to_utf8_string().unwrap().to_string(), "foobar"
        );
    }
}
