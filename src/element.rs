//! The TLV element model.
//!
//! This is a private module. Its public items are re-exported by the crate
//! root.

use std::{fmt, io};
use bytes::Bytes;
use crate::error::{DecodeError, ErrorKind};
use crate::frame::{self, Header, SliceSource, DEFAULT_DEPTH_LIMIT};
use crate::length::Length;
use crate::mode::Mode;
use crate::tag::{Class, Tag};


//------------ Element -------------------------------------------------------

/// A single encoded value: tag, construction, and content octets.
///
/// An element is one node of the TLV structure of encoded data. It knows
/// its [`Tag`], whether it uses the primitive or constructed encoding, and
/// owns its content octets. It also remembers the [`Mode`] it belongs to,
/// so that all typed accessors can enforce the canonical-form rules of that
/// mode without having to be told again.
///
/// Elements are value-like. They are created either empty via
/// [`new`][Self::new] and [`new_constructed`][Self::new_constructed] or by
/// decoding input via [`Mode::decode_one`]. The typed setters replace the
/// content octets wholesale with the canonical encoding of the given value;
/// the typed getters parse the content octets, validating construction,
/// length bounds, and mode-dependent canonical form. Content set from a
/// caller-provided buffer is always copied.
///
/// The content octets are the V of TLV only. The identifier and length
/// octets are produced on demand by [`write_encoded`][Self::write_encoded]
/// and [`to_bytes`][Self::to_bytes]. In CER mode, constructed elements
/// serialize with the indefinite length form and a trailing end-of-contents
/// marker; in BER and DER mode with the definite form.
#[derive(Clone, Eq, PartialEq)]
pub struct Element {
    /// The tag of the element.
    tag: Tag,

    /// Whether the element uses the constructed encoding.
    constructed: bool,

    /// The content octets.
    value: Bytes,

    /// The encoding rules the element belongs to.
    mode: Mode,
}

/// # Creation and Basic Access
///
impl Element {
    /// Creates a new empty primitive element.
    pub fn new(mode: Mode, tag: Tag) -> Self {
        Element {
            tag,
            constructed: false,
            value: Bytes::new(),
            mode,
        }
    }

    /// Creates a new empty constructed element.
    pub fn new_constructed(mode: Mode, tag: Tag) -> Self {
        Element {
            tag,
            constructed: true,
            value: Bytes::new(),
            mode,
        }
    }

    /// Returns the tag of the element.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the class of the element's tag.
    pub fn class(&self) -> Class {
        self.tag.class()
    }

    /// Returns the number of the element's tag.
    pub fn number(&self) -> u32 {
        self.tag.number()
    }

    /// Changes the tag of the element.
    ///
    /// The content octets are left untouched. This is how implicitly tagged
    /// values are produced.
    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    /// Returns whether the element uses the constructed encoding.
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Returns the mode the element belongs to.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the content octets.
    ///
    /// The returned value shares the element's buffer; since both are
    /// immutable, this is equivalent to a copy.
    pub fn value(&self) -> Bytes {
        self.value.clone()
    }

    /// Returns the number of content octets.
    pub fn value_len(&self) -> usize {
        self.value.len()
    }

    /// Replaces the content octets, copying the slice.
    ///
    /// No validation is performed; for typed content, prefer the typed
    /// setters.
    pub fn set_value(&mut self, value: &[u8]) {
        self.value = Bytes::copy_from_slice(value);
    }

    /// Returns the content octets as a slice.
    pub(crate) fn value_slice(&self) -> &[u8] {
        self.value.as_ref()
    }

    /// Replaces the content with primitive content octets.
    pub(crate) fn set_primitive(&mut self, value: Bytes) {
        self.constructed = false;
        self.value = value;
    }

    /// Replaces the content with constructed content octets.
    pub(crate) fn set_constructed(&mut self, value: Bytes) {
        self.constructed = true;
        self.value = value;
    }

    /// Checks that the element uses the primitive encoding.
    pub(crate) fn check_primitive(&self) -> Result<(), DecodeError> {
        if self.constructed {
            Err(DecodeError::new(
                ErrorKind::ConstructionWrong, "expected primitive encoding", 0,
            ))
        }
        else {
            Ok(())
        }
    }
}

/// # Decoding
///
impl Element {
    /// Decodes the first value from the beginning of `data`.
    pub(crate) fn decode_one(
        mode: Mode, data: &[u8], depth_limit: usize,
    ) -> Result<(Self, usize), DecodeError> {
        let mut source = SliceSource::new(data);
        let res = Self::take_from(&mut source, mode, depth_limit)?;
        Ok((res, source.pos()))
    }

    /// Takes one complete value from the source.
    fn take_from(
        source: &mut SliceSource, mode: Mode, depth_limit: usize,
    ) -> Result<Self, DecodeError> {
        let start = source.pos();
        let header = Header::take_from(source, mode)?;
        if header.tag == Tag::END_OF_CONTENTS {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid, "unexpected end-of-contents", start,
            ))
        }
        let value = match header.length {
            Length::Definite(len) => {
                Bytes::copy_from_slice(source.take_slice(len)?)
            }
            Length::Indefinite => {
                let len = frame::indefinite_content_len(
                    source.peek_remaining(), source.pos(), mode, depth_limit,
                )?;
                let value = Bytes::copy_from_slice(source.take_slice(len)?);
                // Consume the value's own end-of-contents marker.
                source.take_slice(2)?;
                value
            }
        };
        Ok(Element {
            tag: header.tag,
            constructed: header.constructed,
            value,
            mode,
        })
    }

    /// Decodes the sub-elements of a constructed element.
    ///
    /// Returns an error if the element is primitive or if its content is
    /// not a sequence of complete encoded values.
    pub fn children(&self) -> Result<Vec<Element>, DecodeError> {
        self.children_with_limit(DEFAULT_DEPTH_LIMIT)
    }

    /// Decodes the sub-elements with an explicit nesting depth limit.
    pub fn children_with_limit(
        &self, depth_limit: usize,
    ) -> Result<Vec<Element>, DecodeError> {
        if !self.constructed {
            return Err(DecodeError::new(
                ErrorKind::ConstructionWrong,
                "primitive element has no sub-elements", 0,
            ))
        }
        let mut source = SliceSource::new(self.value.as_ref());
        let mut res = Vec::new();
        while source.remaining() > 0 {
            res.push(Element::take_from(&mut source, self.mode, depth_limit)?);
        }
        Ok(res)
    }
}

/// # Encoding
///
impl Element {
    /// Returns the number of octets of the complete encoding.
    pub fn encoded_len(&self) -> usize {
        frame::total_encoded_len(
            self.tag, self.constructed, self.mode, self.value.len(),
        )
    }

    /// Writes the complete encoding to `target`.
    pub fn write_encoded<W: io::Write>(
        &self, target: &mut W,
    ) -> Result<(), io::Error> {
        if self.constructed && self.mode == Mode::Cer {
            frame::write_header(target, self.tag, true, Length::Indefinite)?;
            target.write_all(self.value.as_ref())?;
            frame::write_end_of_contents(target)
        }
        else {
            frame::write_header(
                target, self.tag, self.constructed,
                Length::Definite(self.value.len()),
            )?;
            target.write_all(self.value.as_ref())
        }
    }

    /// Appends the complete encoding to the end of `target`.
    pub fn append_encoded(&self, target: &mut Vec<u8>) {
        // Writing into a Vec is infallible.
        let _ = self.write_encoded(target);
    }

    /// Returns the complete encoding as a fresh bytes value.
    pub fn to_bytes(&self) -> Bytes {
        let mut vec = Vec::with_capacity(self.encoded_len());
        self.append_encoded(&mut vec);
        vec.into()
    }
}

/// # SEQUENCE, SET, and the OF Types
///
impl Element {
    /// Replaces the content with the concatenated encodings of `children`.
    ///
    /// Marks the element as constructed. This is the encoder for SEQUENCE,
    /// SEQUENCE OF, and SET values; decoding goes through
    /// [`children`][Self::children].
    pub fn set_children(&mut self, children: &[Element]) {
        let mut value = Vec::new();
        for child in children {
            child.append_encoded(&mut value);
        }
        self.set_constructed(value.into());
    }

    /// Replaces the content with the encodings of the elements of a SET OF.
    ///
    /// Under CER and DER, the encodings are sorted into ascending order as
    /// octet strings as required by X.690. BER places no order requirement
    /// and keeps the given order.
    pub fn set_set_of(&mut self, children: &[Element]) {
        let mut encodings: Vec<Vec<u8>> = children.iter().map(|child| {
            let mut vec = Vec::with_capacity(child.encoded_len());
            child.append_encoded(&mut vec);
            vec
        }).collect();
        if self.mode.is_restricted() {
            encodings.sort();
        }
        let mut value = Vec::new();
        for encoding in encodings {
            value.extend_from_slice(&encoding);
        }
        self.set_constructed(value.into());
    }
}

/// # BOOLEAN and NULL
///
impl Element {
    /// Returns the value of a BOOLEAN element.
    ///
    /// In BER mode, any non-zero content octet is true. CER and DER accept
    /// only 0x00 and 0xFF.
    pub fn to_bool(&self) -> Result<bool, DecodeError> {
        self.check_primitive()?;
        if self.value.len() != 1 {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "BOOLEAN content must be a single octet", 0,
            ))
        }
        match self.value[0] {
            0x00 => Ok(false),
            0xFF => Ok(true),
            _ if self.mode.is_restricted() => {
                Err(DecodeError::new(
                    ErrorKind::ValueInvalid,
                    "BOOLEAN content must be 0x00 or 0xFF", 0,
                ))
            }
            _ => Ok(true),
        }
    }

    /// Sets the element to a BOOLEAN value.
    pub fn set_bool(&mut self, value: bool) {
        self.set_primitive(Bytes::from_static(
            if value { b"\xFF" } else { b"\x00" }
        ));
    }

    /// Checks that the element is a valid NULL value.
    pub fn to_null(&self) -> Result<(), DecodeError> {
        self.check_primitive()?;
        if !self.value.is_empty() {
            return Err(DecodeError::new(
                ErrorKind::ValueSize, "NULL content must be empty", 0,
            ))
        }
        Ok(())
    }

    /// Sets the element to the NULL value.
    pub fn set_null(&mut self) {
        self.set_primitive(Bytes::new());
    }
}


//--- Debug

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("constructed", &self.constructed)
            .field("mode", &self.mode)
            .field("value_len", &self.value.len())
            .finish()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_boolean() {
        for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
            let (elem, read) = mode.decode_one(b"\x01\x01\xFF").unwrap();
            assert_eq!(read, 3);
            assert_eq!(elem.tag(), Tag::BOOLEAN);
            assert!(elem.to_bool().unwrap());

            let (elem, _) = mode.decode_one(b"\x01\x01\x00").unwrap();
            assert!(!elem.to_bool().unwrap());
        }

        // Any non-zero octet is true in BER only.
        let (elem, _) = Mode::Ber.decode_one(b"\x01\x01\x01").unwrap();
        assert!(elem.to_bool().unwrap());
        for mode in [Mode::Cer, Mode::Der] {
            let (elem, _) = mode.decode_one(b"\x01\x01\x01").unwrap();
            assert_eq!(
                elem.to_bool().unwrap_err().kind(), ErrorKind::ValueInvalid
            );
        }

        let (elem, _) = Mode::Ber.decode_one(b"\x01\x02\x00\x00").unwrap();
        assert_eq!(elem.to_bool().unwrap_err().kind(), ErrorKind::ValueSize);
    }

    #[test]
    fn encode_boolean() {
        let mut elem = Element::new(Mode::Der, Tag::BOOLEAN);
        elem.set_bool(true);
        assert_eq!(elem.to_bytes().as_ref(), b"\x01\x01\xFF");
        elem.set_bool(false);
        assert_eq!(elem.to_bytes().as_ref(), b"\x01\x01\x00");
    }

    #[test]
    fn decode_null() {
        let (elem, _) = Mode::Der.decode_one(b"\x05\x00").unwrap();
        elem.to_null().unwrap();
        let (elem, _) = Mode::Ber.decode_one(b"\x05\x01\x00").unwrap();
        assert_eq!(elem.to_null().unwrap_err().kind(), ErrorKind::ValueSize);

        let mut elem = Element::new(Mode::Der, Tag::NULL);
        elem.set_null();
        assert_eq!(elem.to_bytes().as_ref(), b"\x05\x00");
    }

    #[test]
    fn long_length_form_boundary() {
        // Definite long form for a length the short form can hold.
        let data = b"\x04\x81\x05hello";
        let (elem, read) = Mode::Ber.decode_one(data).unwrap();
        assert_eq!(read, data.len());
        assert_eq!(elem.value().as_ref(), b"hello");
        for mode in [Mode::Cer, Mode::Der] {
            assert_eq!(
                mode.decode_one(data).unwrap_err().kind(),
                ErrorKind::LengthNonMinimal
            );
        }
    }

    #[test]
    fn decode_indefinite() {
        let data = b"\x30\x80\x01\x01\xFF\x00\x00";
        for mode in [Mode::Ber, Mode::Cer] {
            let (elem, read) = mode.decode_one(data).unwrap();
            assert_eq!(read, data.len());
            assert!(elem.is_constructed());
            let children = elem.children().unwrap();
            assert_eq!(children.len(), 1);
            assert!(children[0].to_bool().unwrap());
        }
        assert_eq!(
            Mode::Der.decode_one(data).unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
    }

    #[test]
    fn decode_definite_constructed() {
        let data = b"\x30\x03\x01\x01\xFF";
        for mode in [Mode::Ber, Mode::Der] {
            let (elem, _) = mode.decode_one(data).unwrap();
            assert_eq!(elem.children().unwrap().len(), 1);
        }
        assert_eq!(
            Mode::Cer.decode_one(data).unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
    }

    #[test]
    fn decode_rejects_bare_end_of_contents() {
        assert_eq!(
            Mode::Ber.decode_one(b"\x00\x00").unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
    }

    #[test]
    fn children_round_trip() {
        let mut flag = Element::new(Mode::Der, Tag::BOOLEAN);
        flag.set_bool(true);
        let mut count = Element::new(Mode::Der, Tag::INTEGER);
        count.set_i64(27);
        let mut seq = Element::new_constructed(Mode::Der, Tag::SEQUENCE);
        seq.set_children(&[flag, count]);
        assert_eq!(
            seq.to_bytes().as_ref(),
            b"\x30\x06\x01\x01\xFF\x02\x01\x1B"
        );

        let (decoded, _) = Mode::Der.decode_one(
            seq.to_bytes().as_ref()
        ).unwrap();
        let children = decoded.children().unwrap();
        assert_eq!(children.len(), 2);
        assert!(children[0].to_bool().unwrap());
        assert_eq!(children[1].to_i64().unwrap(), 27);
    }

    #[test]
    fn cer_constructed_uses_indefinite_form() {
        let mut flag = Element::new(Mode::Cer, Tag::BOOLEAN);
        flag.set_bool(false);
        let mut seq = Element::new_constructed(Mode::Cer, Tag::SEQUENCE);
        seq.set_children(&[flag]);
        assert_eq!(
            seq.to_bytes().as_ref(),
            b"\x30\x80\x01\x01\x00\x00\x00"
        );
        assert_eq!(seq.encoded_len(), 7);
    }

    #[test]
    fn set_of_ordering() {
        let mut small = Element::new(Mode::Der, Tag::INTEGER);
        small.set_i64(3);
        let mut large = Element::new(Mode::Der, Tag::INTEGER);
        large.set_i64(-128);

        let mut set = Element::new_constructed(Mode::Der, Tag::SET);
        set.set_set_of(&[large.clone(), small.clone()]);
        // 0x03 sorts before 0x80.
        assert_eq!(
            set.to_bytes().as_ref(), b"\x31\x06\x02\x01\x03\x02\x01\x80"
        );

        let mut large = large;
        let mut small = small;
        large.mode = Mode::Ber;
        small.mode = Mode::Ber;
        let mut set = Element::new_constructed(Mode::Ber, Tag::SET);
        set.set_set_of(&[large, small]);
        // BER keeps the given order.
        assert_eq!(
            set.to_bytes().as_ref(), b"\x31\x06\x02\x01\x80\x02\x01\x03"
        );
    }

    #[test]
    fn recursion_limit() {
        let mut data = Vec::new();
        for _ in 0..20 {
            data.extend_from_slice(b"\x30\x80");
        }
        for _ in 0..20 {
            data.extend_from_slice(b"\x00\x00");
        }
        assert_eq!(
            Mode::Ber.decode_one(&data).unwrap_err().kind(),
            ErrorKind::RecursionLimit
        );
        assert!(Mode::Ber.decode_one_with_limit(&data, 32).is_ok());
    }

    #[test]
    fn three_byte_fuzz_invariant() {
        // Exhaustively decode all three-octet inputs; failures must come
        // out as errors, never panics.
        for first in 0..=u8::MAX {
            for second in 0..=u8::MAX {
                for third in [0u8, 1, 0x7F, 0x80, 0xFF] {
                    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
                        let _ = mode.decode_one(&[first, second, third]);
                    }
                }
            }
        }
    }
}
