use serde::Serialize;

use crate::decoder::Identity;

/// Who is signed in, as far as this process knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "identity", rename_all = "snake_case")]
pub enum SessionState {
    /// No refresh attempt has completed yet.
    Loading,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let identity = Identity {
            id: 1,
            email: "a@b.com".to_string(),
            name: None,
        };

        assert!(SessionState::Loading.is_loading());
        assert_eq!(SessionState::Loading.identity(), None);
        assert_eq!(SessionState::Anonymous.identity(), None);
        assert_eq!(
            SessionState::Authenticated(identity.clone()).identity(),
            Some(&identity)
        );
    }

    #[test]
    fn test_serialized_shape() {
        let state = SessionState::Authenticated(Identity {
            id: 1,
            email: "a@b.com".to_string(),
            name: Some("A".to_string()),
        });

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"status": "authenticated", "identity": {"id": 1, "email": "a@b.com", "name": "A"}})
        );
        assert_eq!(
            serde_json::to_value(SessionState::Anonymous).unwrap(),
            json!({"status": "anonymous"})
        );
    }
}
