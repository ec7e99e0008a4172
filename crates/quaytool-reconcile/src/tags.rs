//! Tag expiration and restore decisions.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{ReconcileError, Result};

/// Expiration write derived from a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationChange {
    /// Expire at this Unix timestamp.
    Set(i64),
    /// Remove any expiration.
    Clear,
    /// Write nothing.
    Keep,
}

impl ExpirationChange {
    /// Derives the change for `days` from now.
    ///
    /// Zero days clears the expiration, a positive count sets it to
    /// `now + days` (truncated to whole seconds), a negative count writes
    /// nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use quaytool_reconcile::ExpirationChange;
    ///
    /// let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    /// assert_eq!(ExpirationChange::from_days(0, now).unwrap(), ExpirationChange::Clear);
    /// assert_eq!(
    ///     ExpirationChange::from_days(1, now).unwrap(),
    ///     ExpirationChange::Set(1_700_086_400)
    /// );
    /// ```
    pub fn from_days(days: i64, now: DateTime<Utc>) -> Result<Self> {
        match days {
            0 => Ok(Self::Clear),
            d if d < 0 => Ok(Self::Keep),
            d => TimeDelta::try_days(d)
                .and_then(|delta| now.checked_add_signed(delta))
                .map(|at| Self::Set(at.timestamp()))
                .ok_or_else(|| {
                    ReconcileError::precondition(
                        "expire-tag",
                        format!("an expiration within range, got {d} days"),
                    )
                }),
        }
    }
}

/// What to do with a tag found in a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    /// Apply an expiration change.
    Expire(ExpirationChange),
    /// Point the tag back at its current manifest digest.
    Restore,
}

impl TagAction {
    pub(crate) const fn action(self) -> crate::outcome::Action {
        match self {
            Self::Expire(_) => crate::outcome::Action::ExpireTag,
            Self::Restore => crate::outcome::Action::RestoreTag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap()
    }

    #[test]
    fn test_zero_days_clears() {
        assert_eq!(
            ExpirationChange::from_days(0, now()).unwrap(),
            ExpirationChange::Clear
        );
    }

    #[test]
    fn test_positive_days_truncate_to_seconds() {
        assert_eq!(
            ExpirationChange::from_days(5, now()).unwrap(),
            ExpirationChange::Set(1_700_000_000 + 5 * 86_400)
        );
    }

    #[test]
    fn test_negative_days_keep() {
        assert_eq!(
            ExpirationChange::from_days(-1, now()).unwrap(),
            ExpirationChange::Keep
        );
    }

    #[test]
    fn test_out_of_range_days() {
        let err = ExpirationChange::from_days(i64::MAX, now()).unwrap_err();
        assert!(!err.is_fatal());
    }
}
