// crates/trodl-staking/src/token.rs
//
// TRO token amounts.
//
// The smallest unit of TRO is the wei. 1 TRO = 10^18 wei. Principal and
// reward (xTRO) share this denomination, and all ledger arithmetic is done in
// integer wei. Decimal strings are parsed exactly; no floating point is
// involved anywhere in the value path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use trodl_core::{Amount, StakingError};

/// Number of decimal places in a whole TRO.
pub const TRO_DECIMALS: u32 = 18;

/// Number of wei in one TRO. 1 TRO = 10^18 wei.
pub const WEI_PER_TRO: u128 = 1_000_000_000_000_000_000;

/// A TRO amount.
///
/// Wraps an amount in wei (the smallest denomination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tro {
    /// Amount in wei (1 TRO = 10^18 wei).
    pub wei: Amount,
}

impl Tro {
    /// Create an amount from whole TRO.
    ///
    /// # Example
    /// ```
    /// use trodl_staking::token::Tro;
    /// assert_eq!(Tro::from_tro(3).wei, 3_000_000_000_000_000_000);
    /// ```
    pub fn from_tro(whole: u64) -> Self {
        Self {
            wei: whole as u128 * WEI_PER_TRO,
        }
    }

    /// Create an amount from a wei value.
    pub fn from_wei(wei: Amount) -> Self {
        Self { wei }
    }

    /// Parse a decimal TRO string such as `"49.5"` or `"100"`.
    ///
    /// # Errors
    /// Returns `StakingError::Config` for malformed input, more than
    /// `TRO_DECIMALS` fractional digits, or values that overflow `u128` wei.
    pub fn parse(input: &str) -> Result<Self, StakingError> {
        let s = input.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
            return Err(StakingError::Config(format!("invalid TRO amount {:?}", input)));
        }
        if frac.len() > TRO_DECIMALS as usize {
            return Err(StakingError::Config(format!(
                "TRO amount {:?} has more than {} decimal places",
                input, TRO_DECIMALS
            )));
        }

        let whole_wei = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .ok()
                .and_then(|w| w.checked_mul(WEI_PER_TRO))
                .ok_or(StakingError::Overflow("TRO amount"))?
        };
        let frac_wei = if frac.is_empty() {
            0
        } else {
            let digits: u128 = frac
                .parse()
                .map_err(|_| StakingError::Config(format!("invalid TRO amount {:?}", input)))?;
            digits * 10u128.pow(TRO_DECIMALS - frac.len() as u32)
        };

        whole_wei
            .checked_add(frac_wei)
            .map(Self::from_wei)
            .ok_or(StakingError::Overflow("TRO amount"))
    }

    /// Returns zero TRO.
    pub fn zero() -> Self {
        Self { wei: 0 }
    }
}

impl FromStr for Tro {
    type Err = StakingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Tro {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei.saturating_add(rhs.wei),
        }
    }
}

impl Sub for Tro {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei.saturating_sub(rhs.wei),
        }
    }
}

impl fmt::Display for Tro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.wei / WEI_PER_TRO;
        let frac = self.wei % WEI_PER_TRO;
        if frac == 0 {
            write!(f, "{} TRO", whole)
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} TRO", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_per_tro() {
        assert_eq!(WEI_PER_TRO, 10u128.pow(TRO_DECIMALS));
    }

    #[test]
    fn test_parse_whole_and_fraction() {
        assert_eq!(Tro::parse("100").unwrap(), Tro::from_tro(100));
        assert_eq!(Tro::parse("49.5").unwrap().wei, 49_500_000_000_000_000_000);
        assert_eq!(Tro::parse("0.000000000000000001").unwrap().wei, 1);
        assert_eq!(Tro::parse(".5").unwrap().wei, WEI_PER_TRO / 2);
        assert_eq!(Tro::parse("7.").unwrap(), Tro::from_tro(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Tro::parse("").is_err());
        assert!(Tro::parse(".").is_err());
        assert!(Tro::parse("-1").is_err());
        assert!(Tro::parse("1.2.3").is_err());
        assert!(Tro::parse("1e18").is_err());
        assert!(Tro::parse("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_parse_overflow() {
        let err = Tro::parse("999999999999999999999999999999").unwrap_err();
        assert_eq!(err.kind(), "Overflow");
    }

    #[test]
    fn test_from_str() {
        let amount: Tro = "2.25".parse().unwrap();
        assert_eq!(amount.wei, 2_250_000_000_000_000_000);
    }

    #[test]
    fn test_add_sub() {
        let a = Tro::from_tro(3);
        let b = Tro::parse("1.5").unwrap();
        assert_eq!((a + b).wei, 4_500_000_000_000_000_000);
        assert_eq!((a - b).wei, 1_500_000_000_000_000_000);
        assert_eq!((b - a).wei, 0); // saturating subtraction
    }

    #[test]
    fn test_display() {
        assert_eq!(Tro::from_tro(42).to_string(), "42 TRO");
        assert_eq!(Tro::parse("50.5").unwrap().to_string(), "50.5 TRO");
        assert_eq!(Tro::zero().to_string(), "0 TRO");
        assert_eq!(Tro::from_wei(1).to_string(), "0.000000000000000001 TRO");
    }
}
