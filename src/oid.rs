//! ASN.1 object identifiers.
//!
//! This module contains the [`Oid`] and [`RelativeOid`] types that
//! implement object identifiers, a construct used by ASN.1 to uniquely
//! identify all sorts of things. Both types are also re-exported at the
//! top level.

use std::{error, fmt};
use bytes::Bytes;
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// Object identifiers are globally unique, hierarchical values that are
/// used to identify objects or their type. When written, they are presented
/// as a sequence of integers separated by dots such as `1.3.6.1.5.5.7.1`.
///
/// Values of this type keep the identifier in its encoded form, i.e., the
/// content octets of its BER encoding. The first two components are folded
/// into the first subidentifier as 40 times the first component plus the
/// second; every subidentifier is stored base 128, big-endian, with the
/// most significant bit of every octet except the last one set.
///
/// The most common use of object identifiers is to compare them to
/// predefined values, so known identifiers are best defined as constants
/// via [`from_static`][Self::from_static].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Oid(Bytes);

impl Oid {
    /// Creates an object identifier from its encoded content octets.
    ///
    /// The slice must contain correctly encoded subidentifiers that each
    /// fit into a `u32`; this is intended for defining constants and is
    /// not checked.
    pub const fn from_static(slice: &'static [u8]) -> Self {
        Oid(Bytes::from_static(slice))
    }

    /// Creates an object identifier from its components.
    ///
    /// There must be at least two components, the first must be 0, 1, or 2,
    /// and if the first is 0 or 1, the second must be below 40.
    pub fn from_components(components: &[u32]) -> Result<Self, OidError> {
        let (first, second) = match components {
            [first, second, ..] => (*first, *second),
            _ => return Err(OidError),
        };
        if first > 2 || (first < 2 && second >= 40) {
            return Err(OidError)
        }
        let mut res = Vec::new();
        push_subidentifier(
            &mut res, u64::from(first) * 40 + u64::from(second)
        );
        for &component in &components[2..] {
            push_subidentifier(&mut res, u64::from(component));
        }
        Ok(Oid(res.into()))
    }

    /// Returns an iterator over the components.
    pub fn components(&self) -> Components {
        Components {
            subs: Subidentifiers(self.0.as_ref()),
            position: Position::First,
        }
    }

    /// Returns the encoded content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl AsRef<[u8]> for Oid {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut components = self.components();
        if let Some(first) = components.next() {
            write!(f, "{}", first)?;
            for component in components {
                write!(f, ".{}", component)?;
            }
        }
        Ok(())
    }
}


//------------ RelativeOid ---------------------------------------------------

/// A relative object identifier.
///
/// Relative object identifiers name a path below some object identifier
/// agreed upon through other means. They are encoded like object
/// identifiers but without the folding of the first two components.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RelativeOid(Bytes);

impl RelativeOid {
    /// Creates a relative object identifier from its content octets.
    ///
    /// The slice must contain correctly encoded subidentifiers that each
    /// fit into a `u32`; this is intended for defining constants and is
    /// not checked.
    pub const fn from_static(slice: &'static [u8]) -> Self {
        RelativeOid(Bytes::from_static(slice))
    }

    /// Creates a relative object identifier from its components.
    pub fn from_components(components: &[u32]) -> Self {
        let mut res = Vec::new();
        for &component in components {
            push_subidentifier(&mut res, u64::from(component));
        }
        RelativeOid(res.into())
    }

    /// Returns an iterator over the components.
    pub fn components(&self) -> Subidentifiers {
        Subidentifiers(self.0.as_ref())
    }

    /// Returns the encoded content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl AsRef<[u8]> for RelativeOid {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Display for RelativeOid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut components = self.components();
        if let Some(first) = components.next() {
            write!(f, "{}", first)?;
            for component in components {
                write!(f, ".{}", component)?;
            }
        }
        Ok(())
    }
}


//------------ Subidentifiers ------------------------------------------------

/// An iterator over the subidentifiers of an encoded object identifier.
#[derive(Clone, Debug)]
pub struct Subidentifiers<'a>(&'a [u8]);

impl<'a> Iterator for Subidentifiers<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let mut res = 0u32;
        loop {
            let (&first, tail) = self.0.split_first()?;
            self.0 = tail;
            res = (res << 7) | u32::from(first & 0x7F);
            if first & 0x80 == 0 {
                return Some(res)
            }
        }
    }
}


//------------ Components ----------------------------------------------------

/// An iterator over the components of an object identifier.
///
/// The iterator unfolds the first subidentifier into the first two
/// components.
#[derive(Clone, Debug)]
pub struct Components<'a> {
    /// The underlying subidentifier iterator.
    subs: Subidentifiers<'a>,

    /// Where in the identifier we currently are.
    position: Position,
}

/// The position of the next component in the object identifier.
#[derive(Clone, Copy, Debug)]
enum Position {
    /// The first component, derived from the first subidentifier.
    First,

    /// The second component, already derived and stored.
    Second(u32),

    /// Any later component, identical to its subidentifier.
    Tail,
}

impl<'a> Iterator for Components<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self.position {
            Position::First => {
                let sub = self.subs.next()?;
                let (first, second) = if sub < 40 {
                    (0, sub)
                }
                else if sub < 80 {
                    (1, sub - 40)
                }
                else {
                    (2, sub - 80)
                };
                self.position = Position::Second(second);
                Some(first)
            }
            Position::Second(second) => {
                self.position = Position::Tail;
                Some(second)
            }
            Position::Tail => self.subs.next(),
        }
    }
}


//------------ OidError ------------------------------------------------------

/// The components do not form a valid object identifier.
#[derive(Clone, Copy, Debug)]
pub struct OidError;

impl fmt::Display for OidError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid object identifier components")
    }
}

impl error::Error for OidError { }


//============ Element Accessors =============================================

/// # OBJECT IDENTIFIER and RELATIVE-OID
///
impl Element {
    /// Returns the value of an OBJECT IDENTIFIER element.
    pub fn to_oid(&self) -> Result<Oid, DecodeError> {
        self.check_primitive()?;
        if self.value_len() == 0 {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "OBJECT IDENTIFIER content must not be empty", 0,
            ))
        }
        check_subidentifiers(self.value_slice())?;
        Ok(Oid(self.value()))
    }

    /// Sets the element to an OBJECT IDENTIFIER value.
    pub fn set_oid(&mut self, oid: &Oid) {
        self.set_primitive(oid.0.clone());
    }

    /// Returns the value of a RELATIVE-OID element.
    pub fn to_relative_oid(&self) -> Result<RelativeOid, DecodeError> {
        self.check_primitive()?;
        check_subidentifiers(self.value_slice())?;
        Ok(RelativeOid(self.value()))
    }

    /// Sets the element to a RELATIVE-OID value.
    pub fn set_relative_oid(&mut self, oid: &RelativeOid) {
        self.set_primitive(oid.0.clone());
    }
}

/// Checks a sequence of base 128 subidentifiers.
///
/// Rejects a subidentifier starting with a padding octet, a subidentifier
/// that is not terminated before the content ends, and a subidentifier too
/// large for a `u32`.
fn check_subidentifiers(slice: &[u8]) -> Result<(), DecodeError> {
    let mut pos = 0;
    while pos < slice.len() {
        if slice[pos] == 0x80 {
            return Err(DecodeError::new(
                ErrorKind::ValuePadding,
                "leading padding octet in subidentifier", pos,
            ))
        }
        let start = pos;
        loop {
            let Some(&octet) = slice.get(pos) else {
                return Err(DecodeError::new(
                    ErrorKind::Truncation, "unterminated subidentifier",
                    start,
                ))
            };
            pos += 1;
            if octet & 0x80 == 0 {
                break
            }
        }
        let len = pos - start;
        if len > 5 || (len == 5 && slice[start] & 0x7F > 0x0F) {
            return Err(DecodeError::new(
                ErrorKind::ValueOverflow, "subidentifier too large", start,
            ))
        }
    }
    Ok(())
}

/// Appends the encoded form of a single subidentifier.
fn push_subidentifier(target: &mut Vec<u8>, value: u64) {
    let mut shift = 0;
    while value >> shift > 0x7F {
        shift += 7;
    }
    while shift > 0 {
        target.push(0x80 | ((value >> shift) & 0x7F) as u8);
        shift -= 7;
    }
    target.push((value & 0x7F) as u8);
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::mode::Mode;
    use crate::tag::Tag;
    use super::*;

    #[test]
    fn decode_oid() {
        let (elem, _) = Mode::Der.decode_one(
            b"\x06\x04\x2B\x06\x04\x01"
        ).unwrap();
        let oid = elem.to_oid().unwrap();
        assert_eq!(
            oid.components().collect::<Vec<_>>(),
            [1, 3, 6, 4, 1]
        );
        assert_eq!(oid.to_string(), "1.3.6.4.1");
        assert_eq!(oid, Oid::from_components(&[1, 3, 6, 4, 1]).unwrap());
    }

    #[test]
    fn reject_padded_subidentifier() {
        let (elem, _) = Mode::Der.decode_one(
            b"\x06\x05\x2B\x06\x04\x80\x01"
        ).unwrap();
        assert_eq!(
            elem.to_oid().unwrap_err().kind(), ErrorKind::ValuePadding
        );
    }

    #[test]
    fn reject_unterminated_subidentifier() {
        let (elem, _) = Mode::Der.decode_one(b"\x06\x02\x2B\x86").unwrap();
        assert_eq!(
            elem.to_oid().unwrap_err().kind(), ErrorKind::Truncation
        );
    }

    #[test]
    fn reject_oversized_subidentifier() {
        let (elem, _) = Mode::Der.decode_one(
            b"\x06\x07\x2B\x90\x80\x80\x80\x80\x00"
        ).unwrap();
        assert_eq!(
            elem.to_oid().unwrap_err().kind(), ErrorKind::ValueOverflow
        );
    }

    #[test]
    fn reject_empty_oid() {
        let (elem, _) = Mode::Der.decode_one(b"\x06\x00").unwrap();
        assert_eq!(elem.to_oid().unwrap_err().kind(), ErrorKind::ValueSize);
    }

    #[test]
    fn from_components() {
        assert_eq!(
            Oid::from_components(&[1, 3, 6, 1, 5, 5, 7, 1])
                .unwrap().as_slice(),
            b"\x2B\x06\x01\x05\x05\x07\x01"
        );
        assert_eq!(
            Oid::from_components(&[2, 999, 3]).unwrap().as_slice(),
            b"\x88\x37\x03"
        );
        assert!(Oid::from_components(&[1]).is_err());
        assert!(Oid::from_components(&[3, 1]).is_err());
        assert!(Oid::from_components(&[1, 40]).is_err());
        assert!(Oid::from_components(&[2, 40]).is_ok());
    }

    #[test]
    fn multi_octet_components() {
        let oid = Oid::from_components(&[1, 2, 840, 113549]).unwrap();
        assert_eq!(oid.as_slice(), b"\x2A\x86\x48\x86\xF7\x0D");
        assert_eq!(oid.to_string(), "1.2.840.113549");

        let mut elem = Element::new(Mode::Der, Tag::OID);
        elem.set_oid(&oid);
        let (decoded, _) = Mode::Der.decode_one(
            elem.to_bytes().as_ref()
        ).unwrap();
        assert_eq!(decoded.to_oid().unwrap(), oid);
    }

    #[test]
    fn relative_oid() {
        let roid = RelativeOid::from_components(&[8571, 3, 2]);
        assert_eq!(roid.as_slice(), b"\xC2\x7B\x03\x02");
        assert_eq!(roid.to_string(), "8571.3.2");

        let mut elem = Element::new(Mode::Der, Tag::RELATIVE_OID);
        elem.set_relative_oid(&roid);
        assert_eq!(elem.to_bytes().as_ref(), b"\x0D\x04\xC2\x7B\x03\x02");
        let (decoded, _) = Mode::Der.decode_one(
            elem.to_bytes().as_ref()
        ).unwrap();
        assert_eq!(decoded.to_relative_oid().unwrap(), roid);
    }
}
