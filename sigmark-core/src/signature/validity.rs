//! Signature validity periods.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SigmarkError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A month counts as 30 days.
const DAYS_PER_MONTH: i64 = 30;

/// How long a signature stays valid after it is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Validity {
    millis: i64,
}

impl Validity {
    /// Default validity: 7 days.
    pub const DEFAULT: Self = Self {
        millis: 7 * MILLIS_PER_DAY,
    };

    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::from_millis(hours.saturating_mul(60 * 60 * 1000))
    }

    pub fn from_days(days: i64) -> Self {
        Self::from_millis(days.saturating_mul(MILLIS_PER_DAY))
    }

    pub fn from_months(months: i64) -> Self {
        Self::from_days(months.saturating_mul(DAYS_PER_MONTH))
    }

    /// Resolve request-style options. Months win over days; missing or
    /// non-positive values fall back to [`Validity::DEFAULT`].
    pub fn resolve(days: Option<i64>, months: Option<i64>) -> Self {
        match (months, days) {
            (Some(m), _) if m > 0 => Self::from_months(m),
            (_, Some(d)) if d > 0 => Self::from_days(d),
            _ => Self::DEFAULT,
        }
    }

    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    /// Expiry timestamp for a signature issued at `now_millis`.
    pub fn expiry_from(&self, now_millis: i64) -> i64 {
        now_millis.saturating_add(self.millis)
    }
}

impl Default for Validity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Validity {
    type Err = SigmarkError;

    /// Parse a millisecond count, as used by `SIGNATURE_VALIDITY_MS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let millis = s
            .trim()
            .parse::<i64>()
            .map_err(|e| SigmarkError::ConfigError(format!("invalid validity {s:?}: {e}")))?;
        if millis <= 0 {
            return Err(SigmarkError::ConfigError(format!(
                "validity must be positive, got {millis}"
            )));
        }
        Ok(Self::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_week() {
        assert_eq!(Validity::default().as_millis(), 604_800_000);
    }

    #[test]
    fn test_months_take_precedence() {
        assert_eq!(Validity::resolve(Some(1), Some(2)), Validity::from_days(60));
        assert_eq!(Validity::resolve(Some(3), None), Validity::from_days(3));
        assert_eq!(Validity::resolve(Some(3), Some(0)), Validity::from_days(3));
    }

    #[test]
    fn test_non_positive_falls_back_to_default() {
        assert_eq!(Validity::resolve(None, None), Validity::DEFAULT);
        assert_eq!(Validity::resolve(Some(-4), Some(-1)), Validity::DEFAULT);
    }

    #[test]
    fn test_expiry_saturates() {
        assert_eq!(Validity::from_days(1).expiry_from(i64::MAX - 5), i64::MAX);
        assert_eq!(Validity::from_hours(1).expiry_from(0), 3_600_000);
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!("86400000".parse::<Validity>().unwrap(), Validity::from_days(1));
        assert!("0".parse::<Validity>().is_err());
        assert!("a week".parse::<Validity>().is_err());
    }
}
