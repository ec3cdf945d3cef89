/// Token Payload
///
/// The claims carried by every token: who the caller is and until when the
/// token is valid.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use uuid::Uuid;

/// Claims recovered from (or sealed into) a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Unique identifier of this token (`jti`)
    pub token_id: Uuid,
    /// Authenticated principal
    pub subject_email: String,
    /// Canonical numeric identity
    pub user_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// Create a payload valid for `duration` from now
    ///
    /// `duration` may be negative, which yields an already expired payload.
    /// Timestamps are truncated to whole seconds, the precision they have on
    /// the wire.
    pub fn new(subject_email: impl Into<String>, user_id: i64, duration: Duration) -> Self {
        let issued_at = Utc::now().trunc_subsecs(0);
        let expires_at = issued_at.checked_add_signed(duration).unwrap_or(
            if duration < Duration::zero() {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            },
        );

        Self {
            token_id: Uuid::new_v4(),
            subject_email: subject_email.into(),
            user_id,
            issued_at,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Strict comparison: a token expiring exactly at `now` is still valid
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Whether `issued_at` lies further than `max_skew` in the future
    ///
    /// A tolerance reaching past the representable range accepts any `iat`.
    pub fn is_issued_after(&self, now: DateTime<Utc>, max_skew: Duration) -> bool {
        now.checked_add_signed(max_skew)
            .map_or(false, |limit| self.issued_at > limit)
    }

    /// Remaining lifetime, zero once expired
    pub fn valid_for(&self) -> Duration {
        let remaining = self.expires_at - Utc::now();
        if remaining < Duration::zero() {
            Duration::zero()
        } else {
            remaining
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_creation() {
        let payload = Payload::new("a@x.com", 42, Duration::seconds(60));

        assert_eq!(payload.subject_email, "a@x.com");
        assert_eq!(payload.user_id, 42);
        assert_eq!(payload.expires_at - payload.issued_at, Duration::seconds(60));
        assert!(!payload.is_expired());
        assert!(payload.valid_for() > Duration::zero());
    }

    #[test]
    fn test_negative_duration_is_expired() {
        let payload = Payload::new("a@x.com", 42, Duration::seconds(-60));

        assert!(payload.is_expired());
        assert_eq!(payload.valid_for(), Duration::zero());
    }

    #[test]
    fn test_expiry_is_strict() {
        let payload = Payload::new("a@x.com", 42, Duration::seconds(10));

        assert!(!payload.is_expired_at(payload.expires_at));
        assert!(payload.is_expired_at(payload.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_timestamps_have_whole_seconds() {
        let payload = Payload::new("a@x.com", 1, Duration::minutes(5));

        assert_eq!(payload.issued_at.timestamp_subsec_nanos(), 0);
        assert_eq!(payload.expires_at.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_huge_duration_saturates() {
        let payload = Payload::new("a@x.com", 1, Duration::MAX);
        assert_eq!(payload.expires_at, DateTime::<Utc>::MAX_UTC);

        let payload = Payload::new("a@x.com", 1, Duration::MIN);
        assert_eq!(payload.expires_at, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_token_ids_are_unique() {
        let first = Payload::new("a@x.com", 1, Duration::seconds(60));
        let second = Payload::new("a@x.com", 1, Duration::seconds(60));

        assert_ne!(first.token_id, second.token_id);
    }

    #[test]
    fn test_issued_in_future_detection() {
        let payload = Payload::new("a@x.com", 1, Duration::seconds(60));
        let now = Utc::now();

        assert!(!payload.is_issued_after(now, Duration::seconds(30)));
        assert!(payload.is_issued_after(now - Duration::minutes(5), Duration::seconds(30)));
    }

    #[test]
    fn test_issued_in_future_with_unbounded_skew() {
        let payload = Payload::new("a@x.com", 1, Duration::seconds(60));

        assert!(!payload.is_issued_after(Utc::now(), Duration::MAX));
        assert!(!payload.is_issued_after(Utc::now(), Duration::seconds(9_000_000_000_000_000)));
    }
}
