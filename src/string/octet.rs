//! OCTET STRING values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent. Besides the [`OctetString`] type, it holds the machinery for
//! reassembling and chunking segmented strings that the other string types
//! build on as well.

use bytes::Bytes;
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};
use crate::frame::DEFAULT_DEPTH_LIMIT;
use crate::mode::Mode;
use crate::tag::Tag;


/// The largest number of content octets a string segment may have in CER.
pub(crate) const SEGMENT_LEN: usize = 1000;


//------------ OctetString ---------------------------------------------------

/// An OCTET STRING value.
///
/// An octet string is a plain sequence of octets. The type is a thin
/// wrapper around a [`Bytes`] value holding the reassembled octets; any
/// segmentation of the wire form has already been resolved when a value of
/// this type is handed out.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OctetString(Bytes);

impl OctetString {
    /// Creates an octet string from a bytes value.
    pub fn new(bytes: Bytes) -> Self {
        OctetString(bytes)
    }

    /// Returns the octets as a slice.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the number of octets in the string.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the string into its underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for OctetString {
    fn from(bytes: Bytes) -> Self {
        OctetString(bytes)
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(bytes: Vec<u8>) -> Self {
        OctetString(bytes.into())
    }
}

impl<'a> From<&'a [u8]> for OctetString {
    fn from(bytes: &'a [u8]) -> Self {
        OctetString(Bytes::copy_from_slice(bytes))
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//============ Element Accessors =============================================

/// # OCTET STRING
///
impl Element {
    /// Returns the value of an OCTET STRING element.
    ///
    /// In BER, the string may be primitive or constructed of any nesting
    /// of segments. In CER, a primitive string must not exceed 1000 octets
    /// and a constructed string must consist of primitive segments of
    /// exactly 1000 octets except for the final one. In DER, only the
    /// primitive form is acceptable.
    pub fn to_octet_string(&self) -> Result<OctetString, DecodeError> {
        self.string_content(Tag::OCTET_STRING).map(OctetString)
    }

    /// Sets the element to an OCTET STRING value.
    ///
    /// In CER mode, values longer than 1000 octets become a constructed
    /// sequence of primitive segments; everything else becomes a primitive
    /// value.
    pub fn set_octet_string(&mut self, value: &[u8]) {
        self.set_string_content(Tag::OCTET_STRING, value)
    }
}

/// # Shared String Machinery
///
impl Element {
    /// Returns the reassembled octets of a possibly segmented string.
    ///
    /// `segment_tag` is the tag segments carry in the constructed form;
    /// segments carrying the element's own tag are accepted as well.
    pub(crate) fn string_content(
        &self, segment_tag: Tag,
    ) -> Result<Bytes, DecodeError> {
        if !self.is_constructed() {
            if self.mode() == Mode::Cer && self.value_len() > SEGMENT_LEN {
                return Err(DecodeError::new(
                    ErrorKind::ValueInvalid,
                    "overlong primitive string in CER mode", 0,
                ))
            }
            return Ok(self.value())
        }
        match self.mode() {
            Mode::Der => {
                Err(DecodeError::new(
                    ErrorKind::ConstructionWrong,
                    "constructed string in DER mode", 0,
                ))
            }
            Mode::Cer => self.cer_string_content(segment_tag),
            Mode::Ber => {
                let mut target = Vec::new();
                self.collect_string_segments(
                    segment_tag, &mut target, DEFAULT_DEPTH_LIMIT,
                )?;
                Ok(target.into())
            }
        }
    }

    /// Reassembles BER string segments, recursing into constructed ones.
    fn collect_string_segments(
        &self, segment_tag: Tag, target: &mut Vec<u8>, depth: usize,
    ) -> Result<(), DecodeError> {
        if depth == 0 {
            return Err(DecodeError::new(
                ErrorKind::RecursionLimit, "string nesting too deep", 0,
            ))
        }
        for child in self.children()? {
            if child.tag() != segment_tag && child.tag() != self.tag() {
                return Err(DecodeError::new(
                    ErrorKind::TagNumber, "unexpected string segment tag", 0,
                ))
            }
            if child.is_constructed() {
                child.collect_string_segments(
                    segment_tag, target, depth - 1,
                )?;
            }
            else {
                target.extend_from_slice(child.value_slice());
            }
        }
        Ok(())
    }

    /// Reassembles a constructed string under the CER segment rules.
    fn cer_string_content(
        &self, segment_tag: Tag,
    ) -> Result<Bytes, DecodeError> {
        let children = self.children()?;
        let last = children.len().checked_sub(1);
        let mut target = Vec::new();
        for (idx, child) in children.iter().enumerate() {
            if child.tag() != segment_tag && child.tag() != self.tag() {
                return Err(DecodeError::new(
                    ErrorKind::TagNumber, "unexpected string segment tag", 0,
                ))
            }
            if child.is_constructed() {
                return Err(DecodeError::new(
                    ErrorKind::ConstructionWrong,
                    "constructed string segment in CER mode", 0,
                ))
            }
            let len = child.value_len();
            if Some(idx) == last {
                if len == 0 || len > SEGMENT_LEN {
                    return Err(DecodeError::new(
                        ErrorKind::ValueSize,
                        "final segment must hold 1 to 1000 octets", 0,
                    ))
                }
            }
            else if len != SEGMENT_LEN {
                return Err(DecodeError::new(
                    ErrorKind::ValueSize,
                    "intermediate segment must hold 1000 octets", 0,
                ))
            }
            target.extend_from_slice(child.value_slice());
        }
        if target.len() <= SEGMENT_LEN {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "constructed string not above segment size in CER mode", 0,
            ))
        }
        Ok(target.into())
    }

    /// Replaces the content with a string value in the canonical form.
    pub(crate) fn set_string_content(
        &mut self, segment_tag: Tag, value: &[u8],
    ) {
        if self.mode() == Mode::Cer && value.len() > SEGMENT_LEN {
            let mut content = Vec::new();
            let mut slice = value;
            while !slice.is_empty() {
                let (head, tail) = slice.split_at(
                    slice.len().min(SEGMENT_LEN)
                );
                let mut segment = Element::new(Mode::Cer, segment_tag);
                segment.set_primitive(Bytes::copy_from_slice(head));
                segment.append_encoded(&mut content);
                slice = tail;
            }
            self.set_constructed(content.into());
        }
        else {
            self.set_primitive(Bytes::copy_from_slice(value));
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn primitive_round_trip() {
        for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
            let mut elem = Element::new(mode, Tag::OCTET_STRING);
            elem.set_octet_string(b"hello");
            assert_eq!(elem.to_bytes().as_ref(), b"\x04\x05hello");
            let (decoded, _) = mode.decode_one(
                elem.to_bytes().as_ref()
            ).unwrap();
            assert_eq!(
                decoded.to_octet_string().unwrap().as_slice(), b"hello"
            );
        }
    }

    #[test]
    fn ber_constructed_reassembly() {
        // Two primitive segments and a nested constructed one.
        let data = b"\x24\x10\
            \x04\x03foo\
            \x24\x05\x04\x03bar\
            \x04\x02!!";
        let (elem, _) = Mode::Ber.decode_one(data).unwrap();
        assert_eq!(
            elem.to_octet_string().unwrap().as_slice(), b"foobar!!"
        );
        assert_eq!(
            Mode::Der.decode_one(data).unwrap().0
                .to_octet_string().unwrap_err().kind(),
            ErrorKind::ConstructionWrong
        );
    }

    #[test]
    fn ber_rejects_foreign_segment_tag() {
        let data = b"\x24\x05\x05\x03foo";
        let (elem, _) = Mode::Ber.decode_one(data).unwrap();
        assert_eq!(
            elem.to_octet_string().unwrap_err().kind(),
            ErrorKind::TagNumber
        );
    }

    #[test]
    fn der_encoding_of_1500_octets() {
        let payload = vec![0xA5u8; 1500];
        let mut elem = Element::new(Mode::Der, Tag::OCTET_STRING);
        elem.set_octet_string(&payload);
        let encoded = elem.to_bytes();
        assert_eq!(&encoded.as_ref()[..4], b"\x04\x82\x05\xDC");
        assert_eq!(encoded.len(), 1504);
    }

    #[test]
    fn cer_chunking_of_1500_octets() {
        let payload: Vec<u8> = (0..1500u32).map(|i| i as u8).collect();
        let mut elem = Element::new(Mode::Cer, Tag::OCTET_STRING);
        elem.set_octet_string(&payload);
        assert!(elem.is_constructed());

        let children = elem.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].value_len(), 1000);
        assert_eq!(children[1].value_len(), 500);
        assert_eq!(children[0].tag(), Tag::OCTET_STRING);

        // Indefinite form: tag, 0x80, segments, end-of-contents.
        let encoded = elem.to_bytes();
        assert_eq!(&encoded.as_ref()[..2], b"\x24\x80");
        assert_eq!(&encoded.as_ref()[encoded.len() - 2..], b"\x00\x00");

        let (decoded, read) = Mode::Cer.decode_one(
            encoded.as_ref()
        ).unwrap();
        assert_eq!(read, encoded.len());
        assert_eq!(
            decoded.to_octet_string().unwrap().as_slice(), payload
        );
    }

    #[test]
    fn cer_limits() {
        // A primitive string above the segment size.
        let mut long = Element::new(Mode::Ber, Tag::OCTET_STRING);
        long.set_octet_string(&[0u8; 1001]);
        let data = long.to_bytes();
        let (elem, _) = Mode::Cer.decode_one(data.as_ref()).unwrap();
        assert_eq!(
            elem.to_octet_string().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );

        // A constructed string with a short intermediate segment.
        let mut content = Vec::new();
        let mut segment = Element::new(Mode::Cer, Tag::OCTET_STRING);
        segment.set_primitive(Bytes::copy_from_slice(&[0u8; 999]));
        segment.append_encoded(&mut content);
        let mut segment = Element::new(Mode::Cer, Tag::OCTET_STRING);
        segment.set_primitive(Bytes::copy_from_slice(&[0u8; 500]));
        segment.append_encoded(&mut content);
        let mut elem = Element::new_constructed(
            Mode::Cer, Tag::OCTET_STRING
        );
        elem.set_constructed(content.into());
        assert_eq!(
            elem.to_octet_string().unwrap_err().kind(),
            ErrorKind::ValueSize
        );
    }
}
