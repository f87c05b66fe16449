//! UTCTime and GeneralizedTime values.
//!
//! This is a private module; [`TimeRangeError`] is re-exported by the
//! crate root.
//!
//! Both time types are character strings on the wire, but their format is
//! constrained enough to parse them directly into
//! [`chrono::DateTime<Utc>`][chrono::DateTime] values. Only the formats
//! ending in `Z` are accepted: `YYMMDDhhmmssZ` for UTCTime and
//! `YYYYMMDDhhmmssZ` with optional fractional seconds for GeneralizedTime.
//! Fractional seconds are kept to nanosecond precision; further digits
//! are validated and truncated.

use std::{error, fmt};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};


/// # UTCTime and GeneralizedTime
///
impl Element {
    /// Returns the value of a UTCTime element.
    ///
    /// Only the complete `YYMMDDhhmmssZ` form is accepted. The two-digit
    /// years 00 to 49 map into 2000 to 2049 and 50 to 99 into 1950 to
    /// 1999.
    pub fn to_utc_time(&self) -> Result<DateTime<Utc>, DecodeError> {
        self.check_primitive()?;
        let slice = self.value_slice();
        if slice.len() != 13 {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "UTCTime must hold exactly 13 octets", 0,
            ))
        }
        if slice[12] != b'Z' {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid, "UTCTime must end in Z", 12,
            ))
        }
        let year = two_digits(slice, 0)?;
        let year = if year < 50 { 2000 + year } else { 1900 + year };
        build_datetime(
            year as i32,
            two_digits(slice, 2)?,
            two_digits(slice, 4)?,
            two_digits(slice, 6)?,
            two_digits(slice, 8)?,
            two_digits(slice, 10)?,
            0,
        )
    }

    /// Sets the element to a UTCTime value.
    ///
    /// Returns an error if the year falls outside the window 1950 to 2049
    /// that the two-digit year can express.
    pub fn set_utc_time(
        &mut self, value: DateTime<Utc>,
    ) -> Result<(), TimeRangeError> {
        let year = value.year();
        if !(1950..=2049).contains(&year) {
            return Err(TimeRangeError)
        }
        let text = format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            year % 100, value.month(), value.day(),
            value.hour(), value.minute(), value.second(),
        );
        self.set_primitive(text.into_bytes().into());
        Ok(())
    }

    /// Returns the value of a GeneralizedTime element.
    ///
    /// The format is `YYYYMMDDhhmmssZ`, optionally with a decimal point at
    /// position 14 followed by at least one fraction digit before the
    /// final `Z`. A comma separator, an empty fraction, and trailing zeros
    /// in the fraction are rejected. Fraction digits past nanosecond
    /// precision are validated and then dropped.
    pub fn to_generalized_time(
        &self
    ) -> Result<DateTime<Utc>, DecodeError> {
        self.check_primitive()?;
        let slice = self.value_slice();
        if slice.len() < 15 {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "GeneralizedTime must hold at least 15 octets", 0,
            ))
        }
        if slice.len() == 16 {
            // A fraction needs both the decimal point and a digit.
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "GeneralizedTime with an empty fraction", 14,
            ))
        }
        if slice[slice.len() - 1] != b'Z' {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "GeneralizedTime must end in Z", slice.len() - 1,
            ))
        }

        let mut nanos = 0u32;
        if slice.len() > 15 {
            if slice[14] == b',' {
                return Err(DecodeError::new(
                    ErrorKind::ValueInvalid,
                    "comma as fraction separator", 14,
                ))
            }
            if slice[14] != b'.' {
                return Err(DecodeError::new(
                    ErrorKind::ValueInvalid,
                    "expected fraction after seconds", 14,
                ))
            }
            let fraction = &slice[15..slice.len() - 1];
            if fraction.last() == Some(&b'0') {
                return Err(DecodeError::new(
                    ErrorKind::ValuePadding,
                    "trailing zero in fraction", slice.len() - 2,
                ))
            }
            let mut digits = 0u32;
            for &octet in fraction {
                if !octet.is_ascii_digit() {
                    return Err(DecodeError::new(
                        ErrorKind::ValueInvalid, "non-digit in fraction",
                        14,
                    ))
                }
                if digits < 9 {
                    nanos = nanos * 10 + u32::from(octet - b'0');
                    digits += 1;
                }
            }
            while digits < 9 {
                nanos *= 10;
                digits += 1;
            }
        }

        let year = two_digits(slice, 0)? * 100 + two_digits(slice, 2)?;
        build_datetime(
            year as i32,
            two_digits(slice, 4)?,
            two_digits(slice, 6)?,
            two_digits(slice, 8)?,
            two_digits(slice, 10)?,
            two_digits(slice, 12)?,
            nanos,
        )
    }

    /// Sets the element to a GeneralizedTime value.
    ///
    /// Returns an error if the year cannot be expressed in four digits.
    pub fn set_generalized_time(
        &mut self, value: DateTime<Utc>,
    ) -> Result<(), TimeRangeError> {
        let year = value.year();
        if !(0..=9999).contains(&year) {
            return Err(TimeRangeError)
        }
        let mut text = format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            year, value.month(), value.day(),
            value.hour(), value.minute(), value.second(),
        );
        // Values above one second signal a leap second in chrono.
        let nanos = value.nanosecond() % 1_000_000_000;
        if nanos != 0 {
            let mut fraction = format!("{:09}", nanos);
            while fraction.ends_with('0') {
                fraction.pop();
            }
            text.push('.');
            text.push_str(&fraction);
        }
        text.push('Z');
        self.set_primitive(text.into_bytes().into());
        Ok(())
    }
}


/// Reads two decimal digits at the given position.
fn two_digits(slice: &[u8], pos: usize) -> Result<u32, DecodeError> {
    let (Some(&first), Some(&second)) = (
        slice.get(pos), slice.get(pos + 1)
    ) else {
        return Err(DecodeError::new(
            ErrorKind::Truncation, "time value too short", pos,
        ))
    };
    if !first.is_ascii_digit() || !second.is_ascii_digit() {
        return Err(DecodeError::new(
            ErrorKind::ValueInvalid, "non-digit in time value", pos,
        ))
    }
    Ok(u32::from(first - b'0') * 10 + u32::from(second - b'0'))
}

/// Builds a UTC date-time, rejecting impossible calendar values.
fn build_datetime(
    year: i32, month: u32, day: u32,
    hour: u32, minute: u32, second: u32, nanos: u32,
) -> Result<DateTime<Utc>, DecodeError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_nano_opt(hour, minute, second, nanos))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            DecodeError::new(
                ErrorKind::ValueInvalid, "impossible calendar time", 0,
            )
        })
}


//------------ TimeRangeError ------------------------------------------------

/// The date-time cannot be expressed in the element's time type.
#[derive(Clone, Copy, Debug)]
pub struct TimeRangeError;

impl fmt::Display for TimeRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("date-time outside the representable range")
    }
}

impl error::Error for TimeRangeError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::mode::Mode;
    use crate::tag::Tag;
    use super::*;

    fn utc(
        year: i32, month: u32, day: u32, hour: u32, minute: u32,
        second: u32,
    ) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
            .unwrap()
    }

    #[test]
    fn utc_time_round_trip() {
        let data = b"\x17\x0D170831134500Z";
        let (elem, _) = Mode::Der.decode_one(data).unwrap();
        let value = elem.to_utc_time().unwrap();
        assert_eq!(value, utc(2017, 8, 31, 13, 45, 0));

        let mut re = Element::new(Mode::Der, Tag::UTC_TIME);
        re.set_utc_time(value).unwrap();
        assert_eq!(re.to_bytes().as_ref(), data);
    }

    #[test]
    fn utc_time_year_window() {
        let (elem, _) = Mode::Der.decode_one(
            b"\x17\x0D650831134500Z"
        ).unwrap();
        assert_eq!(elem.to_utc_time().unwrap().year(), 1965);
        let (elem, _) = Mode::Der.decode_one(
            b"\x17\x0D490831134500Z"
        ).unwrap();
        assert_eq!(elem.to_utc_time().unwrap().year(), 2049);

        let mut elem = Element::new(Mode::Der, Tag::UTC_TIME);
        assert!(elem.set_utc_time(utc(1900, 1, 1, 0, 0, 0)).is_err());
        assert!(elem.set_utc_time(utc(2050, 1, 1, 0, 0, 0)).is_err());
    }

    #[test]
    fn utc_time_malformed() {
        // Missing seconds.
        let (elem, _) = Mode::Der.decode_one(
            b"\x17\x0B1708311345Z"
        ).unwrap();
        assert_eq!(
            elem.to_utc_time().unwrap_err().kind(), ErrorKind::ValueSize
        );
        // Missing Z.
        let (elem, _) = Mode::Der.decode_one(
            b"\x17\x0D1708311345000"
        ).unwrap();
        assert_eq!(
            elem.to_utc_time().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
        // Impossible date.
        let (elem, _) = Mode::Der.decode_one(
            b"\x17\x0D170231134500Z"
        ).unwrap();
        assert_eq!(
            elem.to_utc_time().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
    }

    #[test]
    fn generalized_time_round_trip() {
        let data = b"\x18\x0F20170831134500Z";
        let (elem, _) = Mode::Der.decode_one(data).unwrap();
        let value = elem.to_generalized_time().unwrap();
        assert_eq!(value, utc(2017, 8, 31, 13, 45, 0));

        let mut re = Element::new(Mode::Der, Tag::GENERALIZED_TIME);
        re.set_generalized_time(value).unwrap();
        assert_eq!(re.to_bytes().as_ref(), data);
    }

    #[test]
    fn generalized_time_fractions() {
        let (elem, _) = Mode::Der.decode_one(
            b"\x18\x1220170831134500.25Z"
        ).unwrap();
        let value = elem.to_generalized_time().unwrap();
        assert_eq!(value.nanosecond(), 250_000_000);

        let mut re = Element::new(Mode::Der, Tag::GENERALIZED_TIME);
        re.set_generalized_time(value).unwrap();
        assert_eq!(re.to_bytes().as_ref(), b"\x18\x1220170831134500.25Z");

        // Digits past nanoseconds are validated but dropped.
        let (elem, _) = Mode::Der.decode_one(
            b"\x18\x1A20170831134500.1234567891Z"
        ).unwrap();
        assert_eq!(
            elem.to_generalized_time().unwrap().nanosecond(), 123_456_789
        );
    }

    #[test]
    fn generalized_time_malformed() {
        // A sixteen octet value cannot carry a fraction.
        let (elem, _) = Mode::Der.decode_one(
            b"\x18\x1020170831134500.Z"
        ).unwrap();
        assert_eq!(
            elem.to_generalized_time().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
        // Comma separator.
        let (elem, _) = Mode::Der.decode_one(
            b"\x18\x1220170831134500,25Z"
        ).unwrap();
        assert_eq!(
            elem.to_generalized_time().unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
        // Trailing zero in the fraction.
        let (elem, _) = Mode::Der.decode_one(
            b"\x18\x1220170831134500.20Z"
        ).unwrap();
        assert_eq!(
            elem.to_generalized_time().unwrap_err().kind(),
            ErrorKind::ValuePadding
        );
        // Too short.
        let (elem, _) = Mode::Der.decode_one(
            b"\x18\x0D201708311345Z"
        ).unwrap();
        assert_eq!(
            elem.to_generalized_time().unwrap_err().kind(),
            ErrorKind::ValueSize
        );
    }
}
