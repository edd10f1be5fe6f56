use std::sync::{Mutex, PoisonError};

use chrono::{Duration, Utc};
use secrecy::SecretString;

use super::{CookieRecord, TokenStore, COOKIE_MAX_AGE_SECS};

/// In-process token store. Nothing survives a restart.
pub struct MemoryCookieStore {
    cookie: Mutex<Option<CookieRecord>>,
    max_age: Duration,
}

impl MemoryCookieStore {
    /// Create an empty store with the standard one day max-age.
    pub fn new() -> Self {
        Self::with_max_age(Duration::seconds(COOKIE_MAX_AGE_SECS))
    }

    /// Create an empty store with a custom max-age.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            cookie: Mutex::new(None),
            max_age,
        }
    }
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for MemoryCookieStore {
    fn set(&self, token: &str) {
        let record = CookieRecord::new(token, self.max_age, Utc::now());
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
    }

    fn get(&self) -> Option<SecretString> {
        let mut cookie = self.cookie.lock().unwrap_or_else(PoisonError::into_inner);
        if cookie.as_ref().is_some_and(|c| c.is_expired_at(Utc::now())) {
            *cookie = None;
        }
        cookie
            .as_ref()
            .map(|c| SecretString::from(c.value.clone()))
    }

    fn clear(&self) {
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_get_empty_store() {
        let store = MemoryCookieStore::new();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_set_then_get_returns_last_value() {
        let store = MemoryCookieStore::new();
        store.set("first.token.value");
        store.set("second.token.value");

        assert_eq!(store.get().unwrap().expose_secret(), "second.token.value");
    }

    #[test]
    fn test_get_after_clear() {
        let store = MemoryCookieStore::new();
        store.set("abc.def.ghi");
        store.clear();

        assert!(store.get().is_none());
    }

    #[test]
    fn test_empty_token_stored_verbatim() {
        let store = MemoryCookieStore::new();
        store.set("");

        assert_eq!(store.get().unwrap().expose_secret(), "");
    }

    #[test]
    fn test_expired_token_is_absent() {
        let store = MemoryCookieStore::with_max_age(Duration::seconds(-1));
        store.set("abc.def.ghi");

        assert!(store.get().is_none());
    }
}
