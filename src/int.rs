//! INTEGER and ENUMERATED values.
//!
//! In BER, an INTEGER is encoded as a primitive value whose content octets
//! provide a variable length, big-endian, two's complement representation
//! of the integer. The most significant bit of the first octet serves as
//! the sign bit. ENUMERATED values use the same representation.
//!
//! Since the length of the representation is unbounded, this module
//! provides the types [`Integer`] and [`Unsigned`] that keep a value of
//! arbitrary size as its content octets. Accessors for the built-in integer
//! types are provided on [`Element`] directly.

use std::{error, fmt};
use bytes::Bytes;
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};


//------------ Integer -------------------------------------------------------

/// An INTEGER value of arbitrary size.
///
/// The value is kept as the minimal two's complement content octets, i.e.,
/// the first nine bits are never all equal. Keeping the minimal form means
/// equal values always have equal octets, so comparison is simply octet
/// comparison.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Creates an integer from its content octets.
    ///
    /// The octets must be the minimal two's complement form: at least one
    /// octet, no leading 0x00 octet before a clear bit 7, no leading 0xFF
    /// octet before a set bit 7.
    pub fn from_slice(slice: &[u8]) -> Result<Self, IntegerError> {
        match (slice.first(), slice.get(1)) {
            (None, _) => Err(IntegerError),
            (Some(0), Some(second)) if second & 0x80 == 0 => {
                Err(IntegerError)
            }
            (Some(0xFF), Some(second)) if second & 0x80 != 0 => {
                Err(IntegerError)
            }
            _ => Ok(Integer(Bytes::copy_from_slice(slice))),
        }
    }

    /// Creates an integer from a built-in signed integer.
    pub fn from_i128(value: i128) -> Self {
        let octets = value.to_be_bytes();
        let mut start = 0;
        while start < octets.len() - 1 {
            let (first, second) = (octets[start], octets[start + 1]);
            if (first == 0 && second & 0x80 == 0)
                || (first == 0xFF && second & 0x80 != 0)
            {
                start += 1;
            }
            else {
                break
            }
        }
        Integer(Bytes::copy_from_slice(&octets[start..]))
    }

    /// Returns the value as an `i128` if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if self.0.len() > 16 {
            return None
        }
        let mut res: i128 = if self.0[0] & 0x80 != 0 { -1 } else { 0 };
        for &octet in self.0.iter() {
            res = (res << 8) | i128::from(octet);
        }
        Some(res)
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns whether the value is negative.
    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Returns whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.as_ref() == [0]
    }

    /// Returns the number of bits needed to represent the value.
    ///
    /// This is the length of the two's complement form without the
    /// sign-extension, i.e., the position of the highest bit that differs
    /// from the sign bit, plus one for the sign bit itself. For zero, it
    /// is one.
    pub fn bit_len(&self) -> usize {
        let sign_octet: u8 = if self.is_negative() { 0xFF } else { 0 };
        let first = self.0[0] ^ sign_octet;
        let leading = if first == 0 { 8 } else { first.leading_zeros() as usize };
        self.0.len() * 8 - leading + 1
    }
}

impl From<i128> for Integer {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}


//------------ Unsigned ------------------------------------------------------

/// An INTEGER value restricted to be non-negative.
///
/// This equals an integer defined as `INTEGER (0..MAX)` in ASN.1. Like
/// [`Integer`], the value is kept as the minimal two's complement content
/// octets; since the value cannot be negative, the most significant bit of
/// the first octet is always clear.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Unsigned(Bytes);

impl Unsigned {
    /// Creates a value from the big-endian octets of an unsigned integer.
    ///
    /// Superfluous leading zero octets are removed and, if the remaining
    /// first octet has its most significant bit set, a zero octet is
    /// inserted so the most significant bit of the result reflects the
    /// non-negative sign. An empty slice becomes zero.
    pub fn from_be_slice(mut slice: &[u8]) -> Self {
        while slice.len() > 1 && slice[0] == 0 {
            slice = &slice[1..];
        }
        match slice.first() {
            None => Unsigned(Bytes::from_static(b"\x00")),
            Some(&first) if first & 0x80 != 0 => {
                let mut octets = Vec::with_capacity(slice.len() + 1);
                octets.push(0);
                octets.extend_from_slice(slice);
                Unsigned(octets.into())
            }
            Some(_) => Unsigned(Bytes::copy_from_slice(slice)),
        }
    }

    /// Creates a value from a built-in unsigned integer.
    pub fn from_u128(value: u128) -> Self {
        Self::from_be_slice(&value.to_be_bytes())
    }

    /// Returns the value as a `u128` if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        let slice = if self.0[0] == 0 { &self.0[1..] } else { &self.0[..] };
        if slice.len() > 16 {
            return None
        }
        let mut res = 0u128;
        for &octet in slice {
            res = (res << 8) | u128::from(octet);
        }
        Some(res)
    }

    /// Returns the content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Converts the value into the equivalent [`Integer`].
    pub fn into_integer(self) -> Integer {
        Integer(self.0)
    }
}

impl From<u128> for Unsigned {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}


//------------ IntegerError --------------------------------------------------

/// The octets do not form a minimally encoded integer.
#[derive(Clone, Copy, Debug)]
pub struct IntegerError;

impl fmt::Display for IntegerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid integer content octets")
    }
}

impl error::Error for IntegerError { }


//============ Element Accessors =============================================

macro_rules! signed_accessors {
    ( $( ( $to:ident, $set:ident, $type:ident ), )* ) => {
        $(
            /// Returns the value of an INTEGER element.
            ///
            /// Fails with a value-overflow error if the value does not fit
            /// into the target type.
            pub fn $to(&self) -> Result<$type, DecodeError> {
                let mut slice = self.integer_content()?;
                // In BER mode the encoding need not be minimal.
                while slice.len() > 1
                    && ((slice[0] == 0 && slice[1] & 0x80 == 0)
                        || (slice[0] == 0xFF && slice[1] & 0x80 != 0))
                {
                    slice = &slice[1..];
                }
                if slice.len() > ($type::BITS / 8) as usize {
                    return Err(DecodeError::new(
                        ErrorKind::ValueOverflow,
                        concat!(
                            "INTEGER value does not fit into ",
                            stringify!($type),
                        ),
                        0,
                    ))
                }
                let mut res: i128 = if slice[0] & 0x80 != 0 { -1 } else { 0 };
                for &octet in slice {
                    res = (res << 8) | i128::from(octet);
                }
                Ok(res as $type)
            }

            /// Sets the element to an INTEGER value.
            pub fn $set(&mut self, value: $type) {
                self.set_integer(&Integer::from_i128(i128::from(value)));
            }
        )*
    }
}

macro_rules! unsigned_accessors {
    ( $( ( $to:ident, $set:ident, $type:ident ), )* ) => {
        $(
            /// Returns the value of a non-negative INTEGER element.
            ///
            /// Fails with a value-overflow error if the value is negative
            /// or does not fit into the target type.
            pub fn $to(&self) -> Result<$type, DecodeError> {
                let mut slice = self.integer_content()?;
                while slice.len() > 1 && slice[0] == 0 {
                    slice = &slice[1..];
                }
                if slice[0] & 0x80 != 0 {
                    return Err(DecodeError::new(
                        ErrorKind::ValueOverflow,
                        "negative INTEGER value for unsigned target", 0,
                    ))
                }
                if slice.len() > ($type::BITS / 8) as usize {
                    return Err(DecodeError::new(
                        ErrorKind::ValueOverflow,
                        concat!(
                            "INTEGER value does not fit into ",
                            stringify!($type),
                        ),
                        0,
                    ))
                }
                let mut res = 0u128;
                for &octet in slice {
                    res = (res << 8) | u128::from(octet);
                }
                Ok(res as $type)
            }

            /// Sets the element to a non-negative INTEGER value.
            pub fn $set(&mut self, value: $type) {
                self.set_integer(
                    &Unsigned::from_u128(u128::from(value)).into_integer()
                );
            }
        )*
    }
}

/// # INTEGER and ENUMERATED
///
impl Element {
    /// Returns the value of an INTEGER element of any size.
    pub fn to_integer(&self) -> Result<Integer, DecodeError> {
        let slice = self.integer_content()?;
        Ok(Integer(Bytes::copy_from_slice(slice)))
    }

    /// Returns the value of a non-negative INTEGER element of any size.
    pub fn to_unsigned(&self) -> Result<Unsigned, DecodeError> {
        let slice = self.integer_content()?;
        if slice[0] & 0x80 != 0 {
            return Err(DecodeError::new(
                ErrorKind::ValueOverflow,
                "negative INTEGER value for unsigned target", 0,
            ))
        }
        Ok(Unsigned(Bytes::copy_from_slice(slice)))
    }

    /// Sets the element to an INTEGER value.
    pub fn set_integer(&mut self, value: &Integer) {
        self.set_primitive(value.0.clone());
    }

    /// Sets the element to a non-negative INTEGER value.
    pub fn set_unsigned(&mut self, value: &Unsigned) {
        self.set_primitive(value.0.clone());
    }

    /// Returns the value of an ENUMERATED element.
    ///
    /// ENUMERATED shares the INTEGER representation.
    pub fn to_enumerated(&self) -> Result<Integer, DecodeError> {
        self.to_integer()
    }

    /// Sets the element to an ENUMERATED value.
    pub fn set_enumerated(&mut self, value: &Integer) {
        self.set_integer(value)
    }

    signed_accessors!(
        (to_i8, set_i8, i8),
        (to_i16, set_i16, i16),
        (to_i32, set_i32, i32),
        (to_i64, set_i64, i64),
        (to_i128, set_i128, i128),
    );

    unsigned_accessors!(
        (to_u8, set_u8, u8),
        (to_u16, set_u16, u16),
        (to_u32, set_u32, u32),
        (to_u64, set_u64, u64),
        (to_u128, set_u128, u128),
    );

    /// Checks INTEGER framing and returns the content octets.
    ///
    /// Ensures there is at least one octet and, under CER and DER, that
    /// the first nine bits are not all equal, i.e., that the encoding is
    /// minimal.
    fn integer_content(&self) -> Result<&[u8], DecodeError> {
        self.check_primitive()?;
        let slice = self.value_slice();
        if slice.is_empty() {
            return Err(DecodeError::new(
                ErrorKind::ValueSize, "INTEGER content must not be empty", 0,
            ))
        }
        if self.mode().is_restricted() {
            match (slice.first(), slice.get(1)) {
                (Some(0), Some(second)) if second & 0x80 == 0 => {
                    return Err(DecodeError::new(
                        ErrorKind::ValuePadding, "padded INTEGER content", 0,
                    ))
                }
                (Some(0xFF), Some(second)) if second & 0x80 != 0 => {
                    return Err(DecodeError::new(
                        ErrorKind::ValuePadding, "padded INTEGER content", 0,
                    ))
                }
                _ => { }
            }
        }
        Ok(slice)
    }
}


//============ Tests =========================================================
