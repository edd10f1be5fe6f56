use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Name of the cookie holding the bearer token.
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Lifetime of a stored token: one day.
pub const COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24;

pub const COOKIE_PATH: &str = "/";

/// A stored `auth_token` cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: i64,
    pub expires_at: DateTime<Utc>,
}

impl CookieRecord {
    /// Builds the record for `value` set at `now` with the given max-age.
    pub fn new(value: &str, max_age: Duration, now: DateTime<Utc>) -> Self {
        Self {
            name: AUTH_COOKIE_NAME.to_string(),
            value: value.to_string(),
            path: COOKIE_PATH.to_string(),
            max_age: max_age.num_seconds(),
            expires_at: now + max_age,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
