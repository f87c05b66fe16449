//! REAL values.
//!
//! X.690 gives the REAL type three disjoint content forms selected by the
//! top bits of the first content octet: a binary form carrying sign, base,
//! scale factor, exponent, and mantissa; a character form carrying one of
//! the ISO 6093 decimal representations; and a form for the special values
//! infinity, NaN, and minus zero. Empty content encodes plus zero.
//!
//! Values decode to and encode from `f64`. The encoder always uses the
//! base 2 binary form with the mantissa shifted until odd, which is the
//! canonical form under CER and DER.

use std::str;
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};
use crate::int::Integer;
use crate::mode::Mode;


/// # REAL
///
impl Element {
    /// Returns the value of a REAL element as an `f64`.
    pub fn to_real(&self) -> Result<f64, DecodeError> {
        self.check_primitive()?;
        let slice = self.value_slice();
        let Some((&first, tail)) = slice.split_first() else {
            return Ok(0.)
        };
        if first & 0x80 != 0 {
            decode_binary(first, tail, self.mode())
        }
        else if first & 0x40 != 0 {
            decode_special(first, tail)
        }
        else {
            decode_decimal(first, tail, self.mode())
        }
    }

    /// Sets the element to a REAL value.
    ///
    /// Zero becomes empty content, negative zero, the infinities, and NaN
    /// become their special value form, and everything else the base 2
    /// binary form with an odd mantissa and a minimal exponent.
    pub fn set_real(&mut self, value: f64) {
        self.set_primitive(encode_real(value).into());
    }
}


//------------ Decoding ------------------------------------------------------

/// Decodes the special value form.
fn decode_special(first: u8, tail: &[u8]) -> Result<f64, DecodeError> {
    if !tail.is_empty() {
        return Err(DecodeError::new(
            ErrorKind::ValueSize,
            "trailing octets after special REAL value", 1,
        ))
    }
    match first {
        0x40 => Ok(f64::INFINITY),
        0x41 => Ok(f64::NEG_INFINITY),
        0x42 => Ok(f64::NAN),
        0x43 => Ok(-0.),
        _ => {
            Err(DecodeError::new(
                ErrorKind::ValueInvalid, "unknown special REAL value", 0,
            ))
        }
    }
}

/// Decodes the binary form.
fn decode_binary(
    first: u8, tail: &[u8], mode: Mode,
) -> Result<f64, DecodeError> {
    let base = match (first >> 4) & 0x03 {
        0 => 2u32,
        1 => 8,
        2 => 16,
        _ => {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid, "reserved REAL base", 0,
            ))
        }
    };
    if mode.is_restricted() && base != 2 {
        return Err(DecodeError::new(
            ErrorKind::ValueInvalid, "REAL base other than 2 in CER/DER", 0,
        ))
    }
    let scale = (first >> 2) & 0x03;
    if mode.is_restricted() && scale != 0 {
        return Err(DecodeError::new(
            ErrorKind::ValueInvalid, "nonzero REAL scale factor in CER/DER",
            0,
        ))
    }

    let (exp_len, tail) = match first & 0x03 {
        0 => (1usize, tail),
        1 => (2, tail),
        2 => (3, tail),
        _ => {
            // Long form: the next octet carries the exponent length.
            let Some((&len, tail)) = tail.split_first() else {
                return Err(truncated())
            };
            if len == 0 {
                return Err(DecodeError::new(
                    ErrorKind::ValueSize, "empty REAL exponent", 1,
                ))
            }
            (len as usize, tail)
        }
    };
    let Some((exp_octets, mantissa)) = tail.split_at_checked(exp_len) else {
        return Err(truncated())
    };

    if mode.is_restricted() && exp_octets.len() > 1 {
        let second_high = exp_octets[1] & 0x80 != 0;
        if (exp_octets[0] == 0 && !second_high)
            || (exp_octets[0] == 0xFF && second_high)
        {
            return Err(DecodeError::new(
                ErrorKind::ValuePadding, "padded REAL exponent", 1,
            ))
        }
    }
    if exp_octets.len() > 8 {
        return Err(DecodeError::new(
            ErrorKind::ValueOverflow, "REAL exponent too large", 1,
        ))
    }
    let mut exponent: i64 = if exp_octets[0] & 0x80 != 0 { -1 } else { 0 };
    for &octet in exp_octets {
        exponent = (exponent << 8) | i64::from(octet);
    }

    let mut value = 0f64;
    for &octet in mantissa {
        value = value * 256. + f64::from(octet);
    }
    if mode.is_restricted() && value != 0. {
        // The canonical mantissa is odd.
        if mantissa.last().is_some_and(|last| last & 0x01 == 0) {
            return Err(DecodeError::new(
                ErrorKind::ValuePadding,
                "REAL mantissa with trailing zero bits", 0,
            ))
        }
    }

    // All three bases are powers of two, so the whole of scale factor and
    // exponent reduces to one base 2 exponent.
    let shift = match base {
        2 => 1,
        8 => 3,
        _ => 4,
    };
    let exp2 = (exponent.saturating_mul(shift) + i64::from(scale))
        .clamp(-0x1_0000, 0x1_0000) as i32;
    let mut res = mul_pow2(value, exp2);
    if first & 0x40 != 0 {
        res = -res;
    }
    Ok(res)
}

/// Multiplies a value by a power of two.
///
/// The power is applied in chunks that stay representable on their own, so
/// an extreme exponent cannot blow up an intermediate result while the
/// final one would still be fine.
fn mul_pow2(value: f64, exp: i32) -> f64 {
    let mut res = value;
    let mut exp = exp;
    while exp > 0 {
        let step = exp.min(1000);
        res *= 2f64.powi(step);
        exp -= step;
    }
    while exp < 0 {
        let step = (-exp).min(1000);
        res /= 2f64.powi(step);
        exp += step;
    }
    res
}

/// Decodes the ISO 6093 character form.
fn decode_decimal(
    first: u8, tail: &[u8], mode: Mode,
) -> Result<f64, DecodeError> {
    let form = first & 0x3F;
    if !matches!(form, 0x01 | 0x02 | 0x03) {
        return Err(DecodeError::new(
            ErrorKind::ValueInvalid, "unknown decimal REAL form", 0,
        ))
    }
    if mode.is_restricted() && form != 0x03 {
        return Err(DecodeError::new(
            ErrorKind::ValueInvalid, "decimal REAL form other than NR3", 0,
        ))
    }
    let Ok(text) = str::from_utf8(tail) else {
        return Err(bad_decimal())
    };
    if !text.is_ascii() {
        return Err(bad_decimal())
    }
    if mode.is_restricted() {
        check_canonical_nr3(text)?;
    }
    parse_decimal(text, form)
}

/// Parses an ISO 6093 number of the given form.
fn parse_decimal(text: &str, form: u8) -> Result<f64, DecodeError> {
    let octets = text.as_bytes();
    let mut pos = 0;
    while octets.get(pos) == Some(&b' ') {
        pos += 1;
    }
    let mut negative = false;
    match octets.get(pos) {
        Some(b'+') => pos += 1,
        Some(b'-') => {
            negative = true;
            pos += 1;
        }
        _ => { }
    }

    let mut digits = String::new();
    while let Some(&octet) = octets.get(pos) {
        if !octet.is_ascii_digit() {
            break
        }
        digits.push(char::from(octet));
        pos += 1;
    }

    let mut frac_len = 0i32;
    if matches!(octets.get(pos), Some(b'.') | Some(b',')) {
        // NR1 is an integer form.
        if form == 0x01 {
            return Err(bad_decimal())
        }
        pos += 1;
        while let Some(&octet) = octets.get(pos) {
            if !octet.is_ascii_digit() {
                break
            }
            digits.push(char::from(octet));
            frac_len += 1;
            pos += 1;
        }
    }
    else if form != 0x01 {
        // NR2 and NR3 require the decimal mark.
        return Err(bad_decimal())
    }

    let mut exponent = 0i32;
    if matches!(octets.get(pos), Some(b'E') | Some(b'e')) {
        if form != 0x03 {
            return Err(bad_decimal())
        }
        pos += 1;
        let mut exp_negative = false;
        match octets.get(pos) {
            Some(b'+') => pos += 1,
            Some(b'-') => {
                exp_negative = true;
                pos += 1;
            }
            _ => { }
        }
        let exp_start = pos;
        while let Some(&octet) = octets.get(pos) {
            if !octet.is_ascii_digit() {
                break
            }
            exponent = exponent
                .saturating_mul(10)
                .saturating_add(i32::from(octet - b'0'));
            pos += 1;
        }
        if pos == exp_start {
            return Err(bad_decimal())
        }
        if exp_negative {
            exponent = -exponent;
        }
    }
    else if form == 0x03 {
        return Err(bad_decimal())
    }

    if pos != octets.len() || digits.is_empty() {
        return Err(bad_decimal())
    }
    let Ok(mantissa) = digits.parse::<f64>() else {
        return Err(bad_decimal())
    };
    let mut res = mantissa * 10f64.powi(exponent.saturating_sub(frac_len));
    if negative {
        res = -res;
    }
    Ok(res)
}

/// Checks that NR3 text is in the canonical form required by CER and DER.
///
/// The canonical form has no white space, no leading zeros on the mantissa
/// or exponent, an empty fraction with the decimal mark directly followed
/// by the exponent mark, and a plus sign only for the exponent `+0`.
fn check_canonical_nr3(text: &str) -> Result<(), DecodeError> {
    fn err() -> DecodeError {
        DecodeError::new(
            ErrorKind::ValueInvalid, "non-canonical NR3 REAL", 0,
        )
    }

    let octets = text.as_bytes();
    let mut pos = 0;
    if octets.get(pos) == Some(&b'-') {
        pos += 1;
    }
    let mantissa_start = pos;
    while octets.get(pos).is_some_and(|octet| octet.is_ascii_digit()) {
        pos += 1;
    }
    if pos == mantissa_start {
        return Err(err())
    }
    if octets[mantissa_start] == b'0' && pos - mantissa_start > 1 {
        return Err(err())
    }
    if octets.get(pos) != Some(&b'.') {
        return Err(err())
    }
    pos += 1;
    if octets.get(pos) != Some(&b'E') {
        return Err(err())
    }
    pos += 1;
    match octets.get(pos) {
        Some(&b'+') => {
            // A plus sign is only allowed on a zero exponent.
            pos += 1;
            if octets.get(pos) != Some(&b'0') {
                return Err(err())
            }
            pos += 1;
        }
        Some(&b'-') => {
            pos += 1;
            let start = pos;
            while octets.get(pos).is_some_and(|octet| octet.is_ascii_digit()) {
                pos += 1;
            }
            if pos == start || octets[start] == b'0' {
                return Err(err())
            }
        }
        _ => {
            let start = pos;
            while octets.get(pos).is_some_and(|octet| octet.is_ascii_digit()) {
                pos += 1;
            }
            if pos == start || octets[start] == b'0' {
                return Err(err())
            }
        }
    }
    if pos != octets.len() {
        return Err(err())
    }
    Ok(())
}

fn truncated() -> DecodeError {
    DecodeError::new(ErrorKind::Truncation, "REAL content too short", 0)
}

fn bad_decimal() -> DecodeError {
    DecodeError::new(ErrorKind::ValueInvalid, "malformed decimal REAL", 0)
}


//------------ Encoding ------------------------------------------------------

/// Encodes a REAL value into its content octets.
fn encode_real(value: f64) -> Vec<u8> {
    if value == 0. {
        if value.is_sign_negative() {
            return vec![0x43]
        }
        return Vec::new()
    }
    if value.is_nan() {
        return vec![0x42]
    }
    if value.is_infinite() {
        return vec![if value > 0. { 0x40 } else { 0x41 }]
    }

    // Decompose into an odd mantissa and a base 2 exponent.
    let bits = value.to_bits();
    let negative = bits >> 63 != 0;
    let biased = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & 0x000F_FFFF_FFFF_FFFF;
    let (mut mantissa, mut exponent) = if biased == 0 {
        (fraction, -1074)
    }
    else {
        (fraction | (1 << 52), biased - 1075)
    };
    while mantissa & 1 == 0 {
        mantissa >>= 1;
        exponent += 1;
    }

    let exp = Integer::from_i128(i128::from(exponent));
    let exp_octets = exp.as_slice();
    let mut first = 0x80u8;
    if negative {
        first |= 0x40;
    }
    let mut res = Vec::new();
    match exp_octets.len() {
        1 => res.push(first),
        2 => res.push(first | 0x01),
        3 => res.push(first | 0x02),
        len => {
            res.push(first | 0x03);
            res.push(len as u8);
        }
    }
    res.extend_from_slice(exp_octets);

    let octets = mantissa.to_be_bytes();
    let start = octets.iter().position(|&octet| octet != 0).unwrap_or(7);
    res.extend_from_slice(&octets[start..]);
    res
}


//============ Tests =========================================================
