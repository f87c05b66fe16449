//! The encoding mode.

use crate::element::Element;
use crate::error::DecodeError;
use crate::frame::DEFAULT_DEPTH_LIMIT;


//------------ Mode ----------------------------------------------------------

/// The encoding rules in effect for a value.
///
/// X.690 defines one family of encodings with three members of decreasing
/// permissiveness. An [`Element`] remembers the mode it was decoded in or is
/// to be encoded in, so that all its typed accessors can apply the matching
/// rules. The mode is fixed at the decoding entry point via
/// [`decode_one`][Self::decode_one].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Mode {
    /// Basic Encoding Rules.
    ///
    /// These are the most flexible rules, allowing alternative encodings for
    /// some types as well as indefinite length values.
    #[default]
    Ber,

    /// Canonical Encoding Rules.
    ///
    /// These rules always employ indefinite length encoding for constructed
    /// values and the shortest possible form for primitive values. There
    /// are additional restrictions for certain types.
    Cer,

    /// Distinguished Encoding Rules.
    ///
    /// These rules always employ definite length values and require the
    /// shortest possible encoding. Additional rules apply to some types.
    Der,
}

impl Mode {
    /// Returns whether the mode is CER or DER.
    ///
    /// Both modes share most of the canonical-form requirements, such as
    /// minimal lengths and minimal integers.
    pub fn is_restricted(self) -> bool {
        !matches!(self, Mode::Ber)
    }

    /// Returns whether constructed values may use the definite length form.
    pub fn allows_definite_constructed(self) -> bool {
        !matches!(self, Mode::Cer)
    }

    /// Returns whether values may use the indefinite length form.
    pub fn allows_indefinite(self) -> bool {
        !matches!(self, Mode::Der)
    }

    /// Returns whether string types may use the constructed form at all.
    pub fn allows_constructed_strings(self) -> bool {
        !matches!(self, Mode::Der)
    }
}

/// # Decoding
///
impl Mode {
    /// Decodes the first value from the beginning of `data`.
    ///
    /// Returns the decoded element and the number of octets it occupied in
    /// `data`. Remaining octets are left untouched, so a sequence of
    /// top-level values can be processed by repeatedly slicing off the
    /// consumed portion.
    ///
    /// Nesting of indefinite length values is bounded by
    /// [`DEFAULT_DEPTH_LIMIT`]; use
    /// [`decode_one_with_limit`][Self::decode_one_with_limit] for a
    /// different bound.
    pub fn decode_one(
        self, data: &[u8],
    ) -> Result<(Element, usize), DecodeError> {
        Element::decode_one(self, data, DEFAULT_DEPTH_LIMIT)
    }

    /// Decodes the first value with an explicit nesting depth limit.
    pub fn decode_one_with_limit(
        self, data: &[u8], depth_limit: usize,
    ) -> Result<(Element, usize), DecodeError> {
        Element::decode_one(self, data, depth_limit)
    }
}
