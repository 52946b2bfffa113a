//! Overcommit ratio parsing and fixed-point capacity inflation.
//!
//! A ratio is configured as a decimal fraction of nominal capacity (`"0.05"`
//! allows 5% more load than the node nominally holds) and stored as whole
//! percent so every later comparison is integer arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Overcommit ratio in whole percent of nominal capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OvercommitRatio(u32);

impl OvercommitRatio {
    /// No overcommit: effective capacity equals nominal capacity.
    pub const NONE: Self = Self(0);

    /// Build a ratio directly from a percentage (`5` means 5%).
    pub const fn from_percent(percent: u32) -> Self {
        Self(percent)
    }

    /// Parse a decimal fraction such as `"0.05"`.
    ///
    /// The value is stored as `round(value * 100)`. Surrounding whitespace is
    /// ignored.
    pub fn parse(opts: &str) -> Result<Self, ConfigError> {
        let trimmed = opts.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ConfigError::InvalidFormat(opts.to_string()))?;

        if !value.is_finite() {
            return Err(ConfigError::InvalidFormat(opts.to_string()));
        }
        if value < 0.0 {
            return Err(ConfigError::OutOfRange(format!("{trimmed} is negative")));
        }

        let scaled = (value * 100.0).round();
        if scaled > f64::from(u32::MAX) {
            return Err(ConfigError::OutOfRange(format!("{trimmed} is too large")));
        }

        Ok(Self(scaled as u32))
    }

    /// The stored ratio in whole percent.
    pub const fn percent(self) -> u32 {
        self.0
    }

    /// Effective capacity: `capacity + capacity * ratio / 100`.
    ///
    /// Uses truncating division and saturates at `u64::MAX`.
    pub fn inflate(self, capacity: u64) -> u64 {
        let nominal = u128::from(capacity);
        let extra = nominal * u128::from(self.0) / 100;
        u64::try_from(nominal + extra).unwrap_or(u64::MAX)
    }
}

impl FromStr for OvercommitRatio {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OvercommitRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_fraction() {
        assert_eq!(OvercommitRatio::parse("0.05").unwrap().percent(), 5);
        assert_eq!(OvercommitRatio::parse("0.5").unwrap().percent(), 50);
        assert_eq!(OvercommitRatio::parse("0").unwrap(), OvercommitRatio::NONE);
        assert_eq!(OvercommitRatio::parse("1.25").unwrap().percent(), 125);
    }

    #[test]
    fn rounds_instead_of_truncating() {
        // 0.29 * 100.0 == 28.999999999999996 in binary floating point.
        assert_eq!(OvercommitRatio::parse("0.29").unwrap().percent(), 29);
        assert_eq!(OvercommitRatio::parse("0.057").unwrap().percent(), 6);
    }

    #[test]
    fn ignores_surrounding_whitespace() {
        assert_eq!(OvercommitRatio::parse("  0.1\n").unwrap().percent(), 10);
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "abc", "0.05x", "5%", "NaN", "inf"] {
            assert_eq!(
                OvercommitRatio::parse(input),
                Err(ConfigError::InvalidFormat(input.to_string())),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn rejects_negative_and_huge() {
        assert!(matches!(
            OvercommitRatio::parse("-0.5"),
            Err(ConfigError::OutOfRange(_))
        ));
        assert!(matches!(
            OvercommitRatio::parse("1e12"),
            Err(ConfigError::OutOfRange(_))
        ));
    }

    #[test]
    fn inflate_applies_ratio_with_truncation() {
        let ratio = OvercommitRatio::from_percent(5);
        assert_eq!(ratio.inflate(1000), 1050);
        assert_eq!(ratio.inflate(99), 103); // 99 * 5 / 100 = 4
        assert_eq!(ratio.inflate(0), 0);
        assert_eq!(OvercommitRatio::NONE.inflate(1234), 1234);
    }

    #[test]
    fn inflate_saturates() {
        let ratio = OvercommitRatio::from_percent(50);
        assert_eq!(ratio.inflate(u64::MAX), u64::MAX);
    }

    #[test]
    fn from_str_and_display() {
        let ratio: OvercommitRatio = "0.05".parse().unwrap();
        assert_eq!(ratio.to_string(), "0.05");
        assert_eq!(OvercommitRatio::from_percent(150).to_string(), "1.50");
    }
}
