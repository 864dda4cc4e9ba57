//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session entity for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (token)
    pub id: String,
    /// Associated user ID
    pub user_id: i64,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Start a new session for a user with a random token
    ///
    /// A lifetime that runs past the representable range saturates to the
    /// latest (or earliest) timestamp.
    pub fn start(user_id: i64, lifetime: Duration) -> Self {
        let now = Utc::now();
        let saturated = if lifetime < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        let expires_at = now.checked_add_signed(lifetime).unwrap_or(saturated);
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at,
            created_at: now,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_session() {
        let a = Session::start(1, Duration::days(7));
        let b = Session::start(1, Duration::days(7));

        assert_eq!(a.user_id, 1);
        assert_ne!(a.id, b.id);
        assert!(!a.is_expired());
        assert!(a.expires_at > a.created_at);
    }

    #[test]
    fn test_session_expiration_check() {
        let expired = Session::start(1, Duration::hours(-1));
        let valid = Session::start(1, Duration::hours(1));

        assert!(expired.is_expired());
        assert!(!valid.is_expired());
    }

    #[test]
    fn test_start_session_saturates_huge_lifetime() {
        let forever = Session::start(1, Duration::MAX);
        assert_eq!(forever.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!forever.is_expired());

        let long_gone = Session::start(1, Duration::MIN);
        assert_eq!(long_gone.expires_at, DateTime::<Utc>::MIN_UTC);
        assert!(long_gone.is_expired());
    }
}
