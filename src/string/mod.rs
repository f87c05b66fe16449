//! The string types of ASN.1.
//!
//! ASN.1 has a number of types for holding a sequence of some sort of
//! items: [`OctetString`] for plain octets, [`BitString`] for bits, and a
//! set of restricted character string types for strings over various
//! character sets, all represented by [`RestrictedString`] with a marker
//! type for their [`CharSet`].
//!
//! All of them share the segmented wire form: in BER, a string may be
//! encoded either as a primitive value holding the items directly or as a
//! constructed value concatenating the items of a series of segments. CER
//! requires the primitive form up to 1000 content octets and the
//! constructed form with 1000 octet segments above it, DER always requires
//! the primitive form.

pub use self::bit::{BitString, BitStringError};
pub use self::octet::OctetString;
pub use self::restricted::{
    BmpCharSet, BmpString, CharSet, CharSetError, GeneralCharSet,
    GeneralString, GraphicCharSet, GraphicString, Ia5CharSet, Ia5String,
    NumericCharSet, NumericString, PrintableCharSet, PrintableString,
    RestrictedString, TeletexCharSet, TeletexString, UniversalCharSet,
    UniversalString, Utf8CharSet, Utf8String, VideotexCharSet,
    VideotexString, VisibleCharSet, VisibleString,
};

mod bit;
mod octet;
mod restricted;
