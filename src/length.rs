//! The length octets.
//!
//! This is a private module. The [`Length`] defined herein is re-exported
//! by the crate root.

use std::io;
use crate::error::{DecodeError, ErrorKind};
use crate::frame::SliceSource;
use crate::mode::Mode;


//------------ Length --------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length value can either be definite, meaning it provides the actual
/// number of content octets in the value, or indefinite, in which case the
/// content is delimited by a special end-of-contents marker.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the remaining bits of this first octet provide the definite length
/// directly. Thus, if the first octet is less than 128, it provides the
/// definite length already.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length. If they specify that there are zero more octets, i.e., the
/// value of the first octet is 128, the length is indefinite. Otherwise,
/// those following octets give the big-endian encoding of the definite
/// length of the content octets. The first octet value 255 is reserved.
///
/// Under both CER and DER rules, a definite length must be encoded in the
/// minimum number of octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Length {
    /// A length value in definite form providing the actual length.
    Definite(usize),

    /// A length value in indefinite form.
    Indefinite,
}

impl Length {
    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        match self {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None,
        }
    }

    /// Parses a length from a source, applying the mode's rules.
    pub(crate) fn take_from(
        source: &mut SliceSource, mode: Mode,
    ) -> Result<Self, DecodeError> {
        let start = source.pos();
        let first = source.take_u8()?;
        if first & 0x80 == 0 {
            return Ok(Length::Definite(first as usize))
        }
        if first == 0x80 {
            return Ok(Length::Indefinite)
        }
        if first == 0xFF {
            return Err(DecodeError::new(
                ErrorKind::LengthUndefined, "reserved length octet 0xFF",
                start,
            ))
        }

        let count = (first & 0x7F) as usize;
        let octets = source.take_slice(count)?;
        if mode.is_restricted() {
            // Both a leading zero octet and a two-octet form below 0x80
            // have a shorter encoding.
            if octets[0] == 0 {
                return Err(DecodeError::new(
                    ErrorKind::LengthNonMinimal,
                    "leading zero in length octets", start,
                ))
            }
            if count == 1 && octets[0] < 0x80 {
                return Err(DecodeError::new(
                    ErrorKind::LengthNonMinimal,
                    "long length form where short form suffices", start,
                ))
            }
        }
        let mut res = 0usize;
        for &octet in octets {
            if res > usize::MAX >> 8 {
                return Err(DecodeError::new(
                    ErrorKind::LengthOverflow,
                    "length exceeds addressable range", start,
                ))
            }
            res = (res << 8) | octet as usize;
        }
        Ok(Length::Definite(res))
    }

    /// Returns the length of the encoded representation of the value.
    pub fn encoded_len(self) -> usize {
        match self {
            Length::Definite(len) => {
                if len < 0x80 { 1 }
                else { 1 + significant_octets(len) }
            }
            Length::Indefinite => 1,
        }
    }

    /// Appends the encoded length to the end of `target`.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        match self {
            Length::Definite(len) => {
                if len < 0x80 {
                    target.push(len as u8)
                }
                else {
                    let count = significant_octets(len);
                    target.push(0x80 | count as u8);
                    let octets = len.to_be_bytes();
                    target.extend_from_slice(&octets[octets.len() - count..]);
                }
            }
            Length::Indefinite => target.push(0x80),
        }
    }

    /// Writes the encoded length to the given writer.
    pub fn write_encoded<W: io::Write>(
        self, target: &mut W,
    ) -> Result<(), io::Error> {
        match self {
            Length::Definite(len) => {
                if len < 0x80 {
                    target.write_all(&[len as u8])
                }
                else {
                    let count = significant_octets(len);
                    target.write_all(&[0x80 | count as u8])?;
                    let octets = len.to_be_bytes();
                    target.write_all(&octets[octets.len() - count..])
                }
            }
            Length::Indefinite => target.write_all(&[0x80]),
        }
    }
}


/// Returns the number of octets in the big-endian form of `len`.
fn significant_octets(len: usize) -> usize {
    ((usize::BITS - len.leading_zeros()) as usize).div_ceil(8)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn take_from(data: &[u8], mode: Mode) -> Result<Length, DecodeError> {
        let mut source = SliceSource::new(data);
        let res = Length::take_from(&mut source, mode)?;
        assert_eq!(source.pos(), data.len(), "trailing data");
        Ok(res)
    }

    #[test]
    fn ber_take_from() {
        let take = |data: &[u8]| {
            take_from(data, Mode::Ber).map(Length::definite)
        };
        assert_eq!(take(b"\x00").unwrap(), Some(0));
        assert_eq!(take(b"\x12").unwrap(), Some(0x12));
        assert_eq!(take(b"\x7f").unwrap(), Some(0x7f));
        assert_eq!(take(b"\x80").unwrap(), None);
        assert_eq!(take(b"\x81\x00").unwrap(), Some(0));
        assert_eq!(take(b"\x81\x05").unwrap(), Some(5));
        assert_eq!(take(b"\x81\xF0").unwrap(), Some(0xF0));
        assert_eq!(take(b"\x82\x00\x00").unwrap(), Some(0));
        assert_eq!(take(b"\x82\xF0\x0E").unwrap(), Some(0xF00E));
        assert_eq!(take(b"\x82\x00\x0E").unwrap(), Some(0x0E));
        assert_eq!(
            take(b"\xFF").unwrap_err().kind(), ErrorKind::LengthUndefined
        );
        assert_eq!(
            take(b"\x82\x01").unwrap_err().kind(), ErrorKind::Truncation
        );
        assert_eq!(
            take_from(
                b"\x89\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF", Mode::Ber
            ).unwrap_err().kind(),
            ErrorKind::LengthOverflow
        );
    }

    #[test]
    fn der_take_from() {
        let take = |data: &[u8]| {
            take_from(data, Mode::Der).map(Length::definite)
        };
        assert_eq!(take(b"\x00").unwrap(), Some(0));
        assert_eq!(take(b"\x7f").unwrap(), Some(0x7f));
        assert_eq!(take(b"\x80").unwrap(), None);
        assert_eq!(
            take(b"\x81\x00").unwrap_err().kind(),
            ErrorKind::LengthNonMinimal
        );
        assert_eq!(
            take(b"\x81\x05").unwrap_err().kind(),
            ErrorKind::LengthNonMinimal
        );
        assert_eq!(
            take(b"\x81\x7f").unwrap_err().kind(),
            ErrorKind::LengthNonMinimal
        );
        assert_eq!(take(b"\x81\x80").unwrap(), Some(0x80));
        assert_eq!(take(b"\x81\xF0").unwrap(), Some(0xF0));
        assert_eq!(
            take(b"\x82\x00\x0E").unwrap_err().kind(),
            ErrorKind::LengthNonMinimal
        );
        assert_eq!(take(b"\x82\xF0\x0E").unwrap(), Some(0xF00E));
        assert_eq!(
            take(b"\xFF").unwrap_err().kind(), ErrorKind::LengthUndefined
        );
    }

    #[test]
    fn encode() {
        fn step(length: Length, expected: &[u8]) {
            let mut vec = Vec::new();
            length.append_encoded(&mut vec);
            assert_eq!(vec, expected, "append failed for {length:?}");
            assert_eq!(vec.len(), length.encoded_len());

            let mut vec = Vec::new();
            length.write_encoded(&mut vec).unwrap();
            assert_eq!(vec, expected, "write failed for {length:?}");
        }

        step(Length::Indefinite, b"\x80");
        step(Length::Definite(0), b"\x00");
        step(Length::Definite(0x12), b"\x12");
        step(Length::Definite(0x7f), b"\x7f");
        step(Length::Definite(0x80), b"\x81\x80");
        step(Length::Definite(0x5DC), b"\x82\x05\xDC");
        step(Length::Definite(0xdead), b"\x82\xde\xad");
        step(Length::Definite(0x01_0000), b"\x83\x01\x00\x00");
    }
}
