//! Content checksums.
//!
//! A [`Checksum`] is the CRC32C of the little-endian bytes of a sequence of elements.
//! It stands in for array content that is not stored alongside the metadata,
//! such as a data payload or a long sequence of coordinate points.

use std::str::FromStr;

use derive_more::{Display, From};
use thiserror::Error;

/// A CRC32C content checksum, displayed as `0x%08x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[display("0x{_0:08x}")]
pub struct Checksum(u32);

/// A checksum that could not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid checksum `{0}`, expected a hexadecimal value such as 0x1a2b3c4d")]
pub struct ChecksumParseError(pub String);

impl Checksum {
    /// Create a checksum from its value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The checksum of `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(crc32c::crc32c(bytes))
    }

    /// The checksum value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl FromStr for Checksum {
    type Err = ChecksumParseError;

    /// Parses `0x1a2b3c4d`, and the signed form `-0x1a2b3c4d` written by some producers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ChecksumParseError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .ok_or_else(error)?;
        let magnitude = u64::from_str_radix(digits, 16).map_err(|_| error())?;
        if negative {
            let value = i64::try_from(magnitude)
                .ok()
                .and_then(|magnitude| i32::try_from(-magnitude).ok())
                .ok_or_else(error)?;
            Ok(Self(u32::from_ne_bytes(value.to_ne_bytes())))
        } else {
            u32::try_from(magnitude).map(Self).map_err(|_| error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_display() {
        assert_eq!(Checksum::new(0x1a).to_string(), "0x0000001a");
        assert_eq!(Checksum::new(u32::MAX).to_string(), "0xffffffff");
    }

    #[test]
    fn checksum_parse() {
        assert_eq!("0x0000001a".parse(), Ok(Checksum::new(0x1a)));
        assert_eq!("0xdeadbeef".parse(), Ok(Checksum::new(0xdead_beef)));
        assert_eq!("-0x1".parse(), Ok(Checksum::new(u32::MAX)));
        assert_eq!("-0x80000000".parse(), Ok(Checksum::new(0x8000_0000)));
        assert!("-0x80000001".parse::<Checksum>().is_err());
        assert!("0x100000000".parse::<Checksum>().is_err());
        assert!("1234".parse::<Checksum>().is_err());
        assert!("0xzz".parse::<Checksum>().is_err());
    }

    #[test]
    fn checksum_from_bytes() {
        // CRC-32C check value
        assert_eq!(Checksum::from_bytes(b"123456789").value(), 0xe306_9283);
        assert_eq!(Checksum::from_bytes(&[]).value(), 0);
    }
}
