//! Error handling.
//!
//! This is a private module. Its public content is being re-exported by the
//! crate root.

use std::{error, fmt};


//------------ ErrorKind -----------------------------------------------------

/// The category of a decoding failure.
///
/// Every failure to decode data falls into exactly one of these categories.
/// The kind allows callers to react to specific failures programmatically
/// while the full [`DecodeError`] additionally carries the input position
/// and a human-readable message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The input ended before the field could be read.
    Truncation,

    /// A long-form tag number starts with a padding octet.
    TagPadding,

    /// The tag number exceeds the supported range.
    TagOverflow,

    /// The length exceeds the addressable range.
    LengthOverflow,

    /// The length octets use the reserved first octet 0xFF.
    LengthUndefined,

    /// The length octets are longer than necessary.
    ///
    /// This is only an error under CER and DER rules.
    LengthNonMinimal,

    /// A primitive-only type was found constructed or vice versa.
    ConstructionWrong,

    /// The content length is outside the permitted range for the type.
    ValueSize,

    /// The content octets violate an invariant of the type.
    ValueInvalid,

    /// The content octets contain a non-minimal encoding.
    ValuePadding,

    /// The decoded value exceeds the range of the target type.
    ValueOverflow,

    /// A restricted character string contains a forbidden code unit.
    ValueCharacters,

    /// A component carries an unexpected tag class.
    TagClass,

    /// A component carries an unexpected tag number.
    TagNumber,

    /// Nesting exceeds the configured depth limit.
    RecursionLimit,
}

impl ErrorKind {
    /// Returns the canonical name of the error kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Truncation => "truncation",
            ErrorKind::TagPadding => "tag-padding",
            ErrorKind::TagOverflow => "tag-overflow",
            ErrorKind::LengthOverflow => "length-overflow",
            ErrorKind::LengthUndefined => "length-undefined",
            ErrorKind::LengthNonMinimal => "length-non-minimal",
            ErrorKind::ConstructionWrong => "construction-wrong",
            ErrorKind::ValueSize => "value-size",
            ErrorKind::ValueInvalid => "value-invalid",
            ErrorKind::ValuePadding => "value-padding",
            ErrorKind::ValueOverflow => "value-overflow",
            ErrorKind::ValueCharacters => "value-characters",
            ErrorKind::TagClass => "tag-class",
            ErrorKind::TagNumber => "tag-number",
            ErrorKind::RecursionLimit => "recursion-limit",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ Pos -----------------------------------------------------------

/// A byte offset into the decoded input.
///
/// For errors produced while framing values, the offset is relative to the
/// beginning of the overall input. For errors produced by the typed
/// accessors of an already decoded element, it is relative to the start of
/// that element's content octets.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pos(usize);

impl Pos {
    /// Returns the offset as a `usize`.
    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for Pos {
    fn from(pos: usize) -> Self {
        Pos(pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//------------ ErrorMessage --------------------------------------------------

/// An error message for use with [`DecodeError`].
///
/// This type is an intermediary that makes it possible to pass all kinds of
/// types as the error message without explicit conversion. Most messages are
/// static strings which are kept without allocation; everything else is
/// boxed.
pub struct ErrorMessage {
    /// The actual yet hidden message.
    inner: MessageKind,
}

/// The actual error message as a hidden enum.
enum MessageKind {
    /// The error message is a static str.
    Static(&'static str),

    /// The error message is a boxed trait object.
    Boxed(Box<dyn fmt::Display + Send + Sync + 'static>),
}

impl ErrorMessage {
    /// Creates an error message from a static str.
    pub fn from_static(msg: &'static str) -> Self {
        ErrorMessage {
            inner: MessageKind::Static(msg)
        }
    }

    /// Creates an error message from a boxed trait object.
    pub fn from_boxed(
        msg: Box<dyn fmt::Display + Send + Sync + 'static>
    ) -> Self {
        ErrorMessage {
            inner: MessageKind::Boxed(msg)
        }
    }
}

impl From<&'static str> for ErrorMessage {
    fn from(msg: &'static str) -> Self {
        Self::from_static(msg)
    }
}

impl From<String> for ErrorMessage {
    fn from(msg: String) -> Self {
        Self::from_boxed(Box::new(msg))
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            MessageKind::Static(msg) => f.write_str(msg),
            MessageKind::Boxed(ref msg) => msg.fmt(f),
        }
    }
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// The error combines the [`ErrorKind`] describing what went wrong, the
/// position in the input at which it went wrong, and a message with
/// additional detail.
pub struct DecodeError {
    /// The category of the error.
    kind: ErrorKind,

    /// The position in the input.
    pos: Pos,

    /// Additional detail.
    msg: ErrorMessage,
}

impl DecodeError {
    /// Creates a new decode error.
    pub fn new(
        kind: ErrorKind,
        msg: impl Into<ErrorMessage>,
        pos: usize,
    ) -> Self {
        DecodeError {
            kind,
            pos: Pos(pos),
            msg: msg.into(),
        }
    }

    /// Returns the category of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the position in the input at which the error occurred.
    pub fn pos(&self) -> Pos {
        self.pos
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DecodeError")
            .field("kind", &self.kind)
            .field("pos", &self.pos)
            .field("msg", &format_args!("{}", self.msg))
            .finish()
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at offset {}: {}", self.kind, self.pos, self.msg)
    }
}

impl error::Error for DecodeError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        let err = DecodeError::new(
            ErrorKind::ValuePadding, "padded INTEGER content", 12
        );
        assert_eq!(
            err.to_string(),
            "value-padding at offset 12: padded INTEGER content"
        );
        assert_eq!(err.kind(), ErrorKind::ValuePadding);
        assert_eq!(err.pos().to_usize(), 12);
    }
}
