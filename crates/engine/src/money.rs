use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

use crate::EngineError;

/// Largest magnitude, in minor units, any fixed-point value may carry.
///
/// Leaves room for summing millions of bounded values in an `i64`.
pub const MAX_MINOR: i64 = 1_000_000_000_000_000;

/// Declares a signed fixed-point decimal stored as an integer number of
/// minor units (`10^SCALE` minor units per whole unit).
macro_rules! fixed_point {
    ($(#[$meta:meta])* $name:ident, $scale:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const ZERO: $name = $name(0);
            /// Number of fractional digits.
            pub const SCALE: u32 = $scale;

            /// Creates a new value from integer minor units.
            #[must_use]
            pub const fn new(minor: i64) -> Self {
                Self(minor)
            }

            /// Creates a value from a whole number of units.
            #[must_use]
            pub const fn whole(units: i64) -> Self {
                Self(units * 10i64.pow($scale))
            }

            /// Returns the raw value in minor units.
            #[must_use]
            pub const fn minor(self) -> i64 {
                self.0
            }

            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }

            #[must_use]
            pub const fn is_negative(self) -> bool {
                self.0 < 0
            }

            /// Checked multiplication by an integer factor (e.g. a project
            /// quantity).
            #[must_use]
            pub fn checked_times(self, factor: i64) -> Option<Self> {
                self.0
                    .checked_mul(factor)
                    .filter(|v| v.unsigned_abs() <= MAX_MINOR.unsigned_abs())
                    .map(Self)
            }

            /// Rejects negative or out-of-range values with a labeled
            /// validation error.
            pub fn non_negative(self, field: &str) -> Result<Self, EngineError> {
                if self.is_negative() {
                    return Err(EngineError::InvalidInput(format!(
                        "{field} must not be negative"
                    )));
                }
                if self.0 > MAX_MINOR {
                    return Err(EngineError::InvalidInput(format!("{field} too large")));
                }
                Ok(self)
            }

            /// Parses `value`, reporting failures against `field`.
            pub fn parse_field(value: &str, field: &str) -> Result<Self, EngineError> {
                value.parse::<Self>().map_err(|err| match err {
                    EngineError::InvalidInput(reason) => EngineError::InvalidInput(format!(
                        "{field} must be a number ({reason})"
                    )),
                    other => other,
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let sign = if self.0 < 0 { "-" } else { "" };
                let abs = self.0.unsigned_abs();
                let base = 10u64.pow($scale);
                let units = abs / base;
                let frac = abs % base;
                write!(f, "{sign}{units}.{frac:0width$}", width = $scale as usize)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Add for $name {
            type Output = $name;

            fn add(self, rhs: $name) -> Self::Output {
                $name(self.0.saturating_add(rhs.0))
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: $name) {
                self.0 = self.0.saturating_add(rhs.0);
            }
        }

        impl Sub for $name {
            type Output = $name;

            fn sub(self, rhs: $name) -> Self::Output {
                $name(self.0.saturating_sub(rhs.0))
            }
        }

        impl Neg for $name {
            type Output = $name;

            fn neg(self) -> Self::Output {
                $name(self.0.saturating_neg())
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::ZERO, |acc, value| acc + value)
            }
        }

        impl FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed(s, $scale, $label).map($name)
            }
        }
    };
}

fixed_point!(
    /// Signed money amount represented as integer **cents**.
    ///
    /// Use this type for all monetary values (prices, fees, costs) to avoid
    /// floating-point drift. The currency lives next to the amount (shop,
    /// project, or sale), never inside it.
    ///
    /// ```rust
    /// use engine::Money;
    ///
    /// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
    /// assert_eq!("10,5".parse::<Money>().unwrap().to_string(), "10.50");
    /// assert!("12.345".parse::<Money>().is_err());
    /// ```
    Money,
    2,
    "amount"
);

fixed_point!(
    /// Material and consumable quantities, three fractional digits.
    Quantity,
    3,
    "quantity"
);

fixed_point!(
    /// Labor hours, two fractional digits.
    Hours,
    2,
    "hours"
);

fixed_point!(
    /// Percentages such as the default markup, two fractional digits.
    Percent,
    2,
    "percentage"
);

/// Parses a decimal string into minor units with `scale` fractional digits.
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
/// Rejects empty strings, stray characters, more than `scale` fractional
/// digits and magnitudes above [`MAX_MINOR`].
fn parse_fixed(s: &str, scale: u32, label: &str) -> Result<i64, EngineError> {
    let empty = || EngineError::InvalidInput(format!("empty {label}"));
    let invalid = || EngineError::InvalidInput(format!("invalid {label}"));
    let overflow = || EngineError::InvalidInput(format!("{label} too large"));

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let units_str = parts.next().ok_or_else(invalid)?;
    let frac_str = parts.next();

    if parts.next().is_some() {
        return Err(invalid());
    }

    if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let units: i64 = units_str.parse().map_err(|_| overflow())?;

    let frac: i64 = match frac_str {
        None | Some("") => 0,
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            if frac.len() > scale as usize {
                return Err(EngineError::InvalidInput(format!(
                    "{label} has too many decimals (max {scale})"
                )));
            }
            let padding = 10i64.pow(scale - frac.len() as u32);
            frac.parse::<i64>().map_err(|_| invalid())? * padding
        }
    };

    let total = units
        .checked_mul(10i64.pow(scale))
        .and_then(|v| v.checked_add(frac))
        .filter(|v| *v <= MAX_MINOR)
        .ok_or_else(overflow)?;

    Ok(if negative { -total } else { total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_fraction() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(20000).to_string(), "200.00");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
        assert_eq!(Quantity::new(1500).to_string(), "1.500");
        assert_eq!(Quantity::new(7).to_string(), "0.007");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
        assert_eq!("2.5".parse::<Quantity>().unwrap().minor(), 2500);
        assert_eq!("0.125".parse::<Quantity>().unwrap().minor(), 125);
    }

    #[test]
    fn parse_rejects_garbage_and_extra_decimals() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("0.0001".parse::<Quantity>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("".parse::<Hours>().is_err());
        assert!("-".parse::<Percent>().is_err());
    }

    #[test]
    fn parse_field_names_the_field() {
        let err = Money::parse_field("lots", "expected_price").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput("expected_price must be a number (invalid amount)".to_string())
        );
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        assert!("50000000000000000".parse::<Money>().is_err());
        assert!("-50000000000000000".parse::<Money>().is_err());
        assert_eq!(
            "10000000000000.00".parse::<Money>().unwrap().minor(),
            MAX_MINOR
        );
        assert_eq!(
            Money::new(MAX_MINOR + 1).non_negative("price").unwrap_err(),
            EngineError::InvalidInput("price too large".to_string())
        );
        assert_eq!(Money::new(MAX_MINOR).checked_times(2), None);
    }

    #[test]
    fn sums_saturate_instead_of_overflowing() {
        let total: Money = [Money::new(i64::MAX), Money::new(i64::MAX)].into_iter().sum();
        assert_eq!(total, Money::new(i64::MAX));
        assert_eq!(Money::new(i64::MIN) - Money::new(1), Money::new(i64::MIN));
    }

    #[test]
    fn times_and_sum() {
        assert_eq!(Money::whole(100).checked_times(2), Some(Money::new(20000)));
        let total: Money = [Money::new(10000), Money::new(5000)].into_iter().sum();
        assert_eq!(total.to_string(), "150.00");
        assert!(Money::new(-1).non_negative("price").is_err());
    }
}
