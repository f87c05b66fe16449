//! Handling of data in Basic Encoding Rules.
//!
//! This crate allows decoding and encoding of data encoded in ASN.1's
//! _Basic Encoding Rules_ as defined in ITU recommendation X.690 as well as
//! their stricter companions _Canonical Encoding Rules_ and _Distinguished
//! Encoding Rules._
//!
//! Encoded data is modelled as a tree of [`Element`]s, each holding the
//! tag, the primitive-or-constructed flag, and the content octets of one
//! encoded value. The encoding rules in effect are chosen once, at the
//! decoding entry point [`Mode::decode_one`] or when creating an element,
//! and every typed accessor of the element applies the canonical-form
//! requirements of that [`Mode`].
//!
//! Typed access to the content is provided for every universal type
//! through getter and setter pairs on `Element`, with the supporting
//! domain types living in their own modules: variable length integers in
//! [`int`], object identifiers in [`oid`], the octet, bit, and restricted
//! character strings in [`string`], and the context-switching types
//! EXTERNAL, EMBEDDED PDV, and CHARACTER STRING in [`pdv`].
//!
//! All decoding is defensive: malformed input of any kind is reported
//! through [`DecodeError`] carrying an [`ErrorKind`] and the input
//! position, never through a panic, and nesting of indefinite length
//! values is bounded by a configurable depth limit.

//--- Re-exports

pub use self::element::Element;
pub use self::error::{DecodeError, ErrorKind, Pos};
pub use self::frame::DEFAULT_DEPTH_LIMIT;
pub use self::int::{Integer, Unsigned};
pub use self::mode::Mode;
pub use self::oid::{Oid, RelativeOid};
pub use self::string::{
    BitString, Ia5String, NumericString, OctetString, PrintableString,
    Utf8String,
};
pub use self::tag::{Class, Tag};
pub use self::time::TimeRangeError;


//--- Public modules

pub mod int;
pub mod oid;
pub mod pdv;
pub mod string;


//--- Private modules

mod element;
mod error;
mod frame;
mod length;
mod mode;
mod real;
mod tag;
mod time;
