// SPDX-License-Identifier: Apache-2.0

//! Decimal parsing for integer bodies and byte-string length headers.
//!
//! Stricter than `str::parse`: a `+` is never accepted, integer bodies may only carry a
//! leading `-`, and length headers carry no sign at all. Leading zeros are tolerated.
//! All parsers are `const fn` and never panic.

use crate::Integer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitsError {
    Empty,
    /// A lone `-`.
    SignOnly,
    InvalidDigit,
    Overflow,
}

/// Defines `$name(&[u8]) -> Result<$ty, DigitsError>` for a signed integer type.
macro_rules! signed_from_ascii {
    ($name:ident, $ty:ty) => {
        #[allow(dead_code)]
        pub const fn $name(src: &[u8]) -> Result<$ty, DigitsError> {
            let (negative, digits) = match src {
                [] => return Err(DigitsError::Empty),
                [b'-'] => return Err(DigitsError::SignOnly),
                [b'-', rest @ ..] => (true, rest),
                _ => (false, src),
            };
            let mut value: $ty = 0;
            let mut index = 0;
            while index < digits.len() {
                let byte = digits[index];
                if !byte.is_ascii_digit() {
                    return Err(DigitsError::InvalidDigit);
                }
                let digit = (byte - b'0') as $ty;
                let shifted = match value.checked_mul(10) {
                    Some(shifted) => shifted,
                    None => return Err(DigitsError::Overflow),
                };
                // Accumulate toward the sign so that MIN is reachable.
                let next = if negative {
                    shifted.checked_sub(digit)
                } else {
                    shifted.checked_add(digit)
                };
                value = match next {
                    Some(next) => next,
                    None => return Err(DigitsError::Overflow),
                };
                index += 1;
            }
            Ok(value)
        }
    };
}

signed_from_ascii!(from_ascii_i32, i32);
signed_from_ascii!(from_ascii_i64, i64);

/// Parses the digits of a byte-string length header. `-3` is an
/// [`InvalidDigit`](DigitsError::InvalidDigit).
pub const fn from_ascii_usize(src: &[u8]) -> Result<usize, DigitsError> {
    if src.is_empty() {
        return Err(DigitsError::Empty);
    }
    let mut value: usize = 0;
    let mut index = 0;
    while index < src.len() {
        let byte = src[index];
        if !byte.is_ascii_digit() {
            return Err(DigitsError::InvalidDigit);
        }
        value = match value.checked_mul(10) {
            Some(shifted) => match shifted.checked_add((byte - b'0') as usize) {
                Some(next) => next,
                None => return Err(DigitsError::Overflow),
            },
            None => return Err(DigitsError::Overflow),
        };
        index += 1;
    }
    Ok(value)
}

/// Parses the body of an `i...e` token into the configured [`Integer`] width.
pub fn parse_integer(src: &[u8]) -> Result<Integer, DigitsError> {
    #[cfg(feature = "int64")]
    {
        from_ascii_i64(src)
    }
    #[cfg(all(feature = "int32", not(feature = "int64")))]
    {
        from_ascii_i32(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_bodies() {
        assert_eq!(from_ascii_i64(b"0"), Ok(0));
        assert_eq!(from_ascii_i64(b"123456"), Ok(123456));
        assert_eq!(from_ascii_i64(b"-123456"), Ok(-123456));
        assert_eq!(from_ascii_i32(b"-25"), Ok(-25));
    }

    #[test]
    fn test_leading_zeros_and_negative_zero() {
        assert_eq!(from_ascii_i64(b"007"), Ok(7));
        assert_eq!(from_ascii_i64(b"-0"), Ok(0));
        assert_eq!(from_ascii_usize(b"0011"), Ok(11));
    }

    #[test]
    fn test_extremes() {
        assert_eq!(from_ascii_i64(b"9223372036854775807"), Ok(i64::MAX));
        assert_eq!(from_ascii_i64(b"-9223372036854775808"), Ok(i64::MIN));
        assert_eq!(from_ascii_i64(b"9223372036854775808"), Err(DigitsError::Overflow));
        assert_eq!(from_ascii_i64(b"-9223372036854775809"), Err(DigitsError::Overflow));

        assert_eq!(from_ascii_i32(b"-2147483648"), Ok(i32::MIN));
        assert_eq!(from_ascii_i32(b"2147483648"), Err(DigitsError::Overflow));
    }

    #[test]
    fn test_rejected_shapes() {
        assert_eq!(from_ascii_i64(b""), Err(DigitsError::Empty));
        assert_eq!(from_ascii_i64(b"-"), Err(DigitsError::SignOnly));
        assert_eq!(from_ascii_i64(b"+1"), Err(DigitsError::InvalidDigit));
        assert_eq!(from_ascii_i64(b"1-2"), Err(DigitsError::InvalidDigit));
        assert_eq!(from_ascii_i64(b"--1"), Err(DigitsError::InvalidDigit));
        assert_eq!(from_ascii_i64(b"12 "), Err(DigitsError::InvalidDigit));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(from_ascii_usize(b"0"), Ok(0));
        assert_eq!(from_ascii_usize(b"1048576"), Ok(1 << 20));
        assert_eq!(from_ascii_usize(b""), Err(DigitsError::Empty));
        assert_eq!(from_ascii_usize(b"-3"), Err(DigitsError::InvalidDigit));
        assert_eq!(from_ascii_usize(b"+3"), Err(DigitsError::InvalidDigit));
        assert_eq!(
            from_ascii_usize(b"99999999999999999999999"),
            Err(DigitsError::Overflow)
        );
    }
}
