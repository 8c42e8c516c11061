//! Time-bounded value wrapper

use chrono::{DateTime, Utc};

/// A value that is valid until `expires_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiring<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> Expiring<T> {
    /// Wrap `value`, valid until `expires_at`
    pub fn new(value: T, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// The value if still valid at `now`
    pub fn get(&self, now: DateTime<Utc>) -> Option<&T> {
        self.is_fresh(now).then_some(&self.value)
    }

    /// Whether the value is still valid at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Expiry time
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Unwrap regardless of freshness
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_expiring_value() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let cached = Expiring::new(42, now + Duration::seconds(60));

        assert_eq!(cached.get(now), Some(&42));
        assert_eq!(cached.get(now + Duration::seconds(59)), Some(&42));
        assert_eq!(cached.get(now + Duration::seconds(60)), None);
        assert_eq!(cached.expires_at(), now + Duration::seconds(60));
        assert_eq!(cached.into_inner(), 42);
    }
}
