//! Reading and writing the TLV framing.
//!
//! This is a private module providing the machinery shared by all decoding
//! and encoding paths: a cursor over the raw input, parsing of the combined
//! identifier and length octets, scanning for the end of indefinite length
//! content, and the header writers.

use std::io;
use smallvec::SmallVec;
use crate::error::{DecodeError, ErrorKind};
use crate::length::Length;
use crate::mode::Mode;
use crate::tag::Tag;


/// The default limit on the nesting depth of indefinite length values.
///
/// Scanning for the end of an indefinite length value needs to track every
/// nested indefinite length value it passes through. The number of such
/// values that may be open at the same time is bounded to keep adversarial
/// input from exhausting resources. Decoding fails with
/// [`ErrorKind::RecursionLimit`] when the bound is hit.
pub const DEFAULT_DEPTH_LIMIT: usize = 16;


//------------ SliceSource ---------------------------------------------------

/// A cursor over the raw input octets.
///
/// The source keeps track of the read position in the overall input so that
/// errors can report where exactly things went wrong.
pub(crate) struct SliceSource<'a> {
    /// The data that has not been read yet.
    data: &'a [u8],

    /// The current read position in the overall input.
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a new source starting at position zero.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_pos(data, 0)
    }

    /// Creates a new source with the given explicit start position.
    pub fn with_pos(data: &'a [u8], pos: usize) -> Self {
        SliceSource { data, pos }
    }

    /// Returns the current read position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of octets left to read.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Returns the octets left to read without consuming them.
    pub fn peek_remaining(&self) -> &'a [u8] {
        self.data
    }

    /// Takes a single octet from the source.
    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        match self.data.split_first() {
            Some((&first, tail)) => {
                self.data = tail;
                self.pos += 1;
                Ok(first)
            }
            None => Err(self.truncated())
        }
    }

    /// Takes the given number of octets from the source.
    pub fn take_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        match self.data.split_at_checked(len) {
            Some((head, tail)) => {
                self.data = tail;
                self.pos += len;
                Ok(head)
            }
            None => Err(self.truncated())
        }
    }

    /// Returns a truncation error at the current position.
    fn truncated(&self) -> DecodeError {
        DecodeError::new(
            ErrorKind::Truncation, "unexpected end of input", self.pos,
        )
    }
}


//------------ Header --------------------------------------------------------

/// The identifier and length octets of an encoded value.
pub(crate) struct Header {
    /// The tag of the value.
    pub tag: Tag,

    /// Whether the value uses the constructed encoding.
    pub constructed: bool,

    /// The length of the content octets.
    pub length: Length,
}

impl Header {
    /// Takes the header of the next value from the source.
    ///
    /// Applies the mode's rules on the permitted length forms, which depend
    /// on whether the value is primitive or constructed.
    pub fn take_from(
        source: &mut SliceSource, mode: Mode,
    ) -> Result<Self, DecodeError> {
        let start = source.pos();
        let (tag, constructed) = Tag::take_from(source)?;
        let length = Length::take_from(source, mode)?;
        match length {
            Length::Indefinite => {
                if !constructed {
                    return Err(DecodeError::new(
                        ErrorKind::ConstructionWrong,
                        "indefinite length on a primitive value", start,
                    ))
                }
                if !mode.allows_indefinite() {
                    return Err(DecodeError::new(
                        ErrorKind::ValueInvalid,
                        "indefinite length form in DER mode", start,
                    ))
                }
            }
            Length::Definite(_) => {
                if constructed && !mode.allows_definite_constructed()
                    && tag != Tag::END_OF_CONTENTS
                {
                    return Err(DecodeError::new(
                        ErrorKind::ValueInvalid,
                        "definite length constructed value in CER mode",
                        start,
                    ))
                }
            }
        }
        Ok(Header { tag, constructed, length })
    }
}


//------------ Scanning indefinite content -----------------------------------

/// Determines the length of indefinite form content.
///
/// `data` must begin directly after the header of an indefinite length
/// value and `base` must be that position in the overall input. Returns the
/// number of octets up to, but not including, the value's own
/// end-of-contents marker.
///
/// The scan walks nested values with an explicit stack so that arbitrarily
/// deep input cannot exhaust the call stack; the stack is bounded by
/// `depth_limit` open indefinite length values.
pub(crate) fn indefinite_content_len(
    data: &[u8], base: usize, mode: Mode, depth_limit: usize,
) -> Result<usize, DecodeError> {
    let mut source = SliceSource::with_pos(data, base);
    let mut open: SmallVec<[usize; 8]> = SmallVec::new();
    open.push(base);
    loop {
        let start = source.pos();
        let header = Header::take_from(&mut source, mode)?;
        if header.tag == Tag::END_OF_CONTENTS {
            if header.constructed {
                return Err(DecodeError::new(
                    ErrorKind::ConstructionWrong,
                    "constructed end-of-contents", start,
                ))
            }
            if header.length.definite() != Some(0) {
                return Err(DecodeError::new(
                    ErrorKind::ValueSize,
                    "end-of-contents with content", start,
                ))
            }
            open.pop();
            if open.is_empty() {
                return Ok(start - base)
            }
            continue
        }
        match header.length {
            Length::Definite(len) => {
                source.take_slice(len)?;
            }
            Length::Indefinite => {
                if open.len() >= depth_limit {
                    return Err(DecodeError::new(
                        ErrorKind::RecursionLimit,
                        "nesting exceeds depth limit", start,
                    ))
                }
                open.push(start);
            }
        }
    }
}


//------------ Writing headers -----------------------------------------------

/// Writes the identifier and length octets of a value.
pub(crate) fn write_header<W: io::Write>(
    target: &mut W, tag: Tag, constructed: bool, length: Length,
) -> Result<(), io::Error> {
    tag.write_encoded(constructed, target)?;
    length.write_encoded(target)
}

/// Writes an end-of-contents marker.
pub(crate) fn write_end_of_contents<W: io::Write>(
    target: &mut W,
) -> Result<(), io::Error> {
    target.write_all(&[0, 0])
}

/// Returns the length of the complete encoding of a value.
///
/// Constructed values encode with the indefinite form in CER mode and the
/// definite form otherwise.
pub(crate) fn total_encoded_len(
    tag: Tag, constructed: bool, mode: Mode, content_len: usize,
) -> usize {
    if constructed && mode == Mode::Cer {
        tag.encoded_len() + Length::Indefinite.encoded_len()
            + content_len + 2
    }
    else {
        tag.encoded_len() + Length::Definite(content_len).encoded_len()
            + content_len
    }
}


//============ Tests =========================================================
