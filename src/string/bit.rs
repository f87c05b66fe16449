//! BIT STRING values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{error, fmt};
use bytes::Bytes;
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};
use crate::frame::DEFAULT_DEPTH_LIMIT;
use crate::mode::Mode;
use crate::tag::Tag;
use super::octet::SEGMENT_LEN;


//------------ BitString -----------------------------------------------------

/// A BIT STRING value.
///
/// Bit strings are a sequence of bits. Unlike
/// [`OctetString`][super::OctetString]s, they do not need to contain a
/// multiple of eight bits.
///
/// The bits are kept in a sequence of octets with the first bit in the
/// most significant bit of the first octet, plus the number of unused bits
/// in the final octet. Methods prefixed with `bit` operate on individual
/// bits, those prefixed with `octet` access entire octets and ignore that
/// some bits of the final octet may be unused.
///
/// # BER Encoding
///
/// In the primitive form, the first content octet gives the number of
/// unused bits and the following octets the bits themselves. In the
/// constructed form, the content is a series of bit string segments of
/// which only the final one may have unused bits. With CER, the primitive
/// form must be chosen for up to 1000 content octets and the constructed
/// form with full segments beyond; with DER, only the primitive form is
/// allowed. Under both, the unused bits themselves must be zero.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitString {
    /// The number of unused bits in the last octet.
    unused: u8,

    /// The octets holding the bits.
    bits: Bytes,
}

impl BitString {
    /// Creates a new bit string.
    ///
    /// `unused` must be at most 7 and must be 0 if `bits` is empty.
    pub fn new(unused: u8, bits: Bytes) -> Result<Self, BitStringError> {
        if unused > 7 || (unused > 0 && bits.is_empty()) {
            return Err(BitStringError)
        }
        Ok(BitString { unused, bits })
    }

    /// Returns the value of the bit at the given index.
    ///
    /// Bits count from the most significant bit of the first octet. Bits
    /// past the end of the string are reported as false.
    pub fn bit(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false
        }
        let mask = 0x80u8 >> (bit & 7);
        self.bits[bit >> 3] & mask != 0
    }

    /// Returns the number of bits in the bit string.
    pub fn bit_len(&self) -> usize {
        (self.bits.len() << 3) - self.unused as usize
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the number of octets holding the bits.
    pub fn octet_len(&self) -> usize {
        self.bits.len()
    }

    /// Returns a slice of the octets holding the bits.
    pub fn octet_slice(&self) -> &[u8] {
        self.bits.as_ref()
    }

    /// Returns a bytes value of the octets holding the bits.
    pub fn octet_bytes(&self) -> Bytes {
        self.bits.clone()
    }
}


//------------ BitStringError ------------------------------------------------

/// The parts do not form a valid bit string.
#[derive(Clone, Copy, Debug)]
pub struct BitStringError;

impl fmt::Display for BitStringError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid bit string composition")
    }
}

impl error::Error for BitStringError { }


//============ Element Accessors =============================================

/// # BIT STRING
///
impl Element {
    /// Returns the value of a BIT STRING element.
    pub fn to_bit_string(&self) -> Result<BitString, DecodeError> {
        if !self.is_constructed() {
            return self.primitive_bit_string()
        }
        match self.mode() {
            Mode::Der => {
                Err(DecodeError::new(
                    ErrorKind::ConstructionWrong,
                    "constructed bit string in DER mode", 0,
                ))
            }
            Mode::Cer => self.cer_bit_string(),
            Mode::Ber => {
                let mut bits = Vec::new();
                let mut unused = 0;
                self.collect_bit_segments(
                    &mut bits, &mut unused, DEFAULT_DEPTH_LIMIT,
                )?;
                Ok(BitString { unused, bits: bits.into() })
            }
        }
    }

    /// Sets the element to a BIT STRING value.
    ///
    /// In CER mode, values longer than 1000 content octets become a
    /// constructed sequence of primitive segments with the unused bits
    /// kept on the final one.
    pub fn set_bit_string(&mut self, value: &BitString) {
        if self.mode() == Mode::Cer
            && value.bits.len() + 1 > SEGMENT_LEN
        {
            let mut content = Vec::new();
            let mut slice = value.bits.as_ref();
            while slice.len() >= SEGMENT_LEN {
                let (head, tail) = slice.split_at(SEGMENT_LEN - 1);
                let mut octets = Vec::with_capacity(SEGMENT_LEN);
                octets.push(0);
                octets.extend_from_slice(head);
                let mut segment = Element::new(Mode::Cer, Tag::BIT_STRING);
                segment.set_primitive(octets.into());
                segment.append_encoded(&mut content);
                slice = tail;
            }
            let mut octets = Vec::with_capacity(slice.len() + 1);
            octets.push(value.unused);
            octets.extend_from_slice(slice);
            let mut segment = Element::new(Mode::Cer, Tag::BIT_STRING);
            segment.set_primitive(octets.into());
            segment.append_encoded(&mut content);
            self.set_constructed(content.into());
        }
        else {
            let mut octets = Vec::with_capacity(value.bits.len() + 1);
            octets.push(value.unused);
            octets.extend_from_slice(value.bits.as_ref());
            self.set_primitive(octets.into());
        }
    }

    /// Parses primitive bit string content.
    fn primitive_bit_string(&self) -> Result<BitString, DecodeError> {
        let slice = self.value_slice();
        let Some((&unused, bits)) = slice.split_first() else {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "BIT STRING content must not be empty", 0,
            ))
        };
        if unused > 7 {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid, "more than seven unused bits", 0,
            ))
        }
        if unused > 0 && bits.is_empty() {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "unused bits in an empty bit string", 0,
            ))
        }
        if self.mode() == Mode::Cer && slice.len() > SEGMENT_LEN {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "overlong primitive bit string in CER mode", 0,
            ))
        }
        if self.mode().is_restricted() && unused > 0 {
            let last = bits[bits.len() - 1];
            if last & ((1u8 << unused) - 1) != 0 {
                return Err(DecodeError::new(
                    ErrorKind::ValuePadding, "unused bits are not zero", 0,
                ))
            }
        }
        Ok(BitString {
            unused,
            bits: Bytes::copy_from_slice(bits),
        })
    }

    /// Reassembles BER bit string segments.
    fn collect_bit_segments(
        &self, target: &mut Vec<u8>, unused: &mut u8, depth: usize,
    ) -> Result<(), DecodeError> {
        if depth == 0 {
            return Err(DecodeError::new(
                ErrorKind::RecursionLimit, "bit string nesting too deep", 0,
            ))
        }
        for child in self.children()? {
            if child.tag() != Tag::BIT_STRING && child.tag() != self.tag() {
                return Err(DecodeError::new(
                    ErrorKind::TagNumber,
                    "unexpected bit string segment tag", 0,
                ))
            }
            if *unused != 0 {
                // Only the final segment may leave bits unused.
                return Err(DecodeError::new(
                    ErrorKind::ValueInvalid,
                    "bit string segment after incomplete segment", 0,
                ))
            }
            if child.is_constructed() {
                child.collect_bit_segments(target, unused, depth - 1)?;
            }
            else {
                let segment = child.primitive_bit_string()?;
                *unused = segment.unused;
                target.extend_from_slice(segment.bits.as_ref());
            }
        }
        Ok(())
    }

    /// Reassembles a constructed bit string under the CER segment rules.
    fn cer_bit_string(&self) -> Result<BitString, DecodeError> {
        let children = self.children()?;
        let last = children.len().checked_sub(1);
        let mut bits = Vec::new();
        let mut unused = 0;
        for (idx, child) in children.iter().enumerate() {
            if child.tag() != Tag::BIT_STRING {
                return Err(DecodeError::new(
                    ErrorKind::TagNumber,
                    "unexpected bit string segment tag", 0,
                ))
            }
            if child.is_constructed() {
                return Err(DecodeError::new(
                    ErrorKind::ConstructionWrong,
                    "constructed bit string segment in CER mode", 0,
                ))
            }
            let segment = child.primitive_bit_string()?;
            if Some(idx) == last {
                unused = segment.unused;
            }
            else {
                if segment.unused != 0 {
                    return Err(DecodeError::new(
                        ErrorKind::ValueInvalid,
                        "unused bits in an intermediate segment", 0,
                    ))
                }
                if segment.bits.len() + 1 != SEGMENT_LEN {
                    return Err(DecodeError::new(
                        ErrorKind::ValueSize,
                        "intermediate segment must hold 1000 octets", 0,
                    ))
                }
            }
            bits.extend_from_slice(segment.bits.as_ref());
        }
        if bits.len() + 1 <= SEGMENT_LEN {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "constructed bit string not above segment size in CER mode",
                0,
            ))
        }
        Ok(BitString { unused, bits: bits.into() })
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nine_bit_vector() {
        let data = b"\x03\x03\x07\xF0\x80";
        for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
            let (elem, _) = mode.decode_one(data).unwrap();
            let bits = elem.to_bit_string().unwrap();
            assert_eq!(bits.unused(), 7);
            assert_eq!(bits.bit_len(), 9);
            let vector: Vec<bool> = (0..bits.bit_len()).map(|idx| {
                bits.bit(idx)
            }).collect();
            assert_eq!(
                vector,
                [true, true, true, true, false, false, false, false, true]
            );
            assert!(!bits.bit(9));
        }
    }

    #[test]
    fn nonzero_padding_bits() {
        // Unused bits 0b10_0000 are not all zero.
        let data = b"\x03\x02\x07\xC0";
        let (elem, _) = Mode::Ber.decode_one(data).unwrap();
        let bits = elem.to_bit_string().unwrap();
        assert_eq!(bits.bit_len(), 1);
        assert!(bits.bit(0));
        for mode in [Mode::Cer, Mode::Der] {
            let (elem, _) = mode.decode_one(data).unwrap();
            assert_eq!(
                elem.to_bit_string().unwrap_err().kind(),
                ErrorKind::ValuePadding
            );
        }
    }

    #[test]
    fn invalid_primitive_content() {
        let (elem, _) = Mode::Ber.decode_one(b"\x03\x00").unwrap();
        assert_eq!(
            elem.to_bit_string().unwrap_err().kind(), ErrorKind::ValueSize
        );
        let (elem, _) = Mode::Ber.decode_one(b"\x03\x01\x08").unwrap();
        assert_eq!(
            elem.to_bit_string().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
        let (elem, _) = Mode::Ber.decode_one(b"\x03\x01\x03").unwrap();
        assert_eq!(
            elem.to_bit_string().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
    }

    #[test]
    fn encode_primitive() {
        let bits = BitString::new(
            7, Bytes::from_static(b"\xF0\x80")
        ).unwrap();
        let mut elem = Element::new(Mode::Der, Tag::BIT_STRING);
        elem.set_bit_string(&bits);
        assert_eq!(elem.to_bytes().as_ref(), b"\x03\x03\x07\xF0\x80");
        assert_eq!(elem.to_bit_string().unwrap(), bits);
    }

    #[test]
    fn ber_constructed_reassembly() {
        let data = b"\x23\x08\x03\x02\x00\xAA\x03\x02\x04\xB0";
        let (elem, _) = Mode::Ber.decode_one(data).unwrap();
        let bits = elem.to_bit_string().unwrap();
        assert_eq!(bits.unused(), 4);
        assert_eq!(bits.octet_slice(), b"\xAA\xB0");
        assert_eq!(bits.bit_len(), 12);

        // A segment after one with unused bits is an error.
        let data = b"\x23\x08\x03\x02\x04\xB0\x03\x02\x00\xAA";
        let (elem, _) = Mode::Ber.decode_one(data).unwrap();
        assert_eq!(
            elem.to_bit_string().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
    }

    #[test]
    fn cer_chunking() {
        let payload = vec![0x5Au8; 1500];
        let bits = BitString::new(3, payload.clone().into()).unwrap();
        let mut elem = Element::new(Mode::Cer, Tag::BIT_STRING);
        elem.set_bit_string(&bits);
        assert!(elem.is_constructed());

        let children = elem.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].value_len(), 1000);
        assert_eq!(children[0].value_slice()[0], 0);
        assert_eq!(children[1].value_len(), 502);
        assert_eq!(children[1].value_slice()[0], 3);

        let decoded = elem.to_bit_string().unwrap();
        assert_eq!(decoded.unused(), 3);
        assert_eq!(decoded.octet_slice(), payload);

        // The complete encoding survives a wire round trip.
        let encoded = elem.to_bytes();
        let (reparsed, _) = Mode::Cer.decode_one(encoded.as_ref()).unwrap();
        assert_eq!(reparsed.to_bit_string().unwrap(), decoded);
    }

    #[test]
    fn bit_string_type() {
        assert!(BitString::new(8, Bytes::new()).is_err());
        assert!(BitString::new(1, Bytes::new()).is_err());
        let empty = BitString::new(0, Bytes::new()).unwrap();
        assert_eq!(empty.bit_len(), 0);
        assert!(!empty.bit(0));
    }
}
