//! Profile fetch and save against the backend.
//!
//! Independent of the session controller: every call carries the bearer token
//! explicitly. Saving does not touch any local profile copy; callers refresh the
//! session for identity fields and re-fetch for the rest.

use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{fetch_error, Error, RequestFailureKind};
use crate::http::read_body;
use crate::token::{preview, TokenStore};

/// Profile record as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// School of origin.
    #[serde(default)]
    pub asal_sekolah: Option<String>,
    /// Any other backend-supplied fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The mutable profile fields. Nothing else is ever sent on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub asal_sekolah: String,
}

impl From<&Profile> for ProfileUpdate {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone().unwrap_or_default(),
            asal_sekolah: profile.asal_sekolah.clone().unwrap_or_default(),
        }
    }
}

pub const AUTHENTICATION_MISSING_MESSAGE: &str =
    "Authentication error. Please log in again or provide a token manually.";

/// Result of a save. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The fields the server echoed back.
    Saved { fields: Map<String, Value> },
    Failed {
        message: String,
        details: Option<Value>,
    },
}

impl SaveOutcome {
    /// Outcome when no token is available to authenticate the save.
    pub fn authentication_missing() -> Self {
        SaveOutcome::Failed {
            message: AUTHENTICATION_MISSING_MESSAGE.to_string(),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }

    /// The `{success, ...}` record shape.
    pub fn to_json(&self) -> Value {
        match self {
            SaveOutcome::Saved { fields } => {
                let mut record = fields.clone();
                record.insert("success".to_string(), Value::Bool(true));
                Value::Object(record)
            }
            SaveOutcome::Failed { message, details } => {
                let mut record = Map::new();
                record.insert("success".to_string(), Value::Bool(false));
                record.insert("message".to_string(), Value::String(message.clone()));
                if let Some(details) = details {
                    record.insert("details".to_string(), details.clone());
                }
                Value::Object(record)
            }
        }
    }

    fn from_failure(kind: RequestFailureKind) -> Self {
        match kind {
            RequestFailureKind::ServerError { status, body } => SaveOutcome::Failed {
                message: format!("Server error: {status}"),
                details: Some(serde_json::from_str(&body).unwrap_or(Value::String(body))),
            },
            RequestFailureKind::NoResponse => SaveOutcome::Failed {
                message: "No response from server. The server might be unavailable.".to_string(),
                details: None,
            },
            RequestFailureKind::RequestSetup(message) => SaveOutcome::Failed {
                message: format!("Request error: {message}"),
                details: None,
            },
        }
    }
}

/// Picks the token for a save: the stored one, else a non-empty manual entry.
pub fn resolve_token(store: &dyn TokenStore, manual: Option<&str>) -> Option<SecretString> {
    store
        .get()
        .filter(|token| !token.expose_secret().is_empty())
        .or_else(|| {
            manual
                .filter(|token| !token.is_empty())
                .map(|token| SecretString::from(token.to_string()))
        })
}

/// Client for the backend's profile endpoints.
#[derive(Clone)]
pub struct ProfileSync {
    api_base_url: String,
    client: reqwest::Client,
}

impl ProfileSync {
    pub fn new(api_base_url: &str, client: reqwest::Client) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// GET the profile of the user owning `token`.
    pub async fn fetch(&self, token: &SecretString) -> Result<Profile, Error> {
        let request = self
            .client
            .get(format!("{}/auth/me", self.api_base_url))
            .bearer_auth(token.expose_secret());

        let raw = read_body(request)
            .await
            .map_err(|(kind, e)| fetch_error(kind, Some(Box::new(e))))?;

        let profile: Profile = raw.json().map_err(|kind| {
            warn!("Failed to load profile data: {}", kind.user_message());
            fetch_error(kind, None)
        })?;

        debug!("Profile data fetched for user {:?}", profile.user_id);
        Ok(profile)
    }

    /// PUT the mutable fields. Never fails; see [`SaveOutcome`].
    pub async fn save(&self, token: &SecretString, update: &ProfileUpdate) -> SaveOutcome {
        info!(
            "Updating profile using token {}",
            preview(token.expose_secret())
        );

        let request = self
            .client
            .put(format!("{}/auth/me/profile", self.api_base_url))
            .bearer_auth(token.expose_secret())
            .json(update);

        let raw = match read_body(request).await {
            Ok(raw) => raw,
            Err((kind, _)) => return SaveOutcome::from_failure(kind),
        };

        if !raw.status.is_success() {
            warn!("Profile update rejected with status {}", raw.status);
            return SaveOutcome::from_failure(raw.into_server_error());
        }

        let fields = match serde_json::from_str::<Value>(&raw.body) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        info!("Profile updated");
        SaveOutcome::Saved { fields }
    }

    /// Save with a token from `store`, falling back to `manual`.
    ///
    /// With neither available no request is made.
    pub async fn submit(
        &self,
        store: &dyn TokenStore,
        manual: Option<&str>,
        update: &ProfileUpdate,
    ) -> SaveOutcome {
        match resolve_token(store, manual) {
            Some(token) => self.save(&token, update).await,
            None => {
                warn!("No auth token available, profile save skipped");
                SaveOutcome::authentication_missing()
            }
        }
    }
}
