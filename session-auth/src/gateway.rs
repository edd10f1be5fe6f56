//! Google sign-in through the backend.
//!
//! The backend owns the provider credentials. This client only builds the URL the
//! user is sent to and trades the returned authorization code for a bearer token.

use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{exchange_error, Error};
use crate::http::read_body;

/// Path of the OAuth landing route on this application.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Token and identity fields returned by the code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: SecretString,
    pub token_type: String,
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CodeExchangeRequest<'a> {
    code: &'a str,
    redirect_uri: &'a str,
}

/// The redirect URI registered for this application at `app_base_url`.
pub fn callback_redirect_uri(app_base_url: &str) -> String {
    format!("{}{}", app_base_url.trim_end_matches('/'), CALLBACK_PATH)
}

/// Client for the backend's Google sign-in endpoints.
#[derive(Clone)]
pub struct AuthGateway {
    api_base_url: String,
    client: reqwest::Client,
}

impl AuthGateway {
    /// Create a gateway for the API rooted at `api_base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(api_base_url: &str, client: reqwest::Client) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// URL that starts the provider login and comes back to `redirect_uri`.
    pub fn login_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}/auth/google/login/?redirect_uri={}",
            self.api_base_url,
            urlencoding::encode(redirect_uri)
        )
    }

    /// Exchange an authorization code for a bearer token.
    ///
    /// No retry is attempted. The error kind tells a server rejection apart from
    /// an unreachable backend and from a request that could not be built.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<AuthResponse, Error> {
        debug!("Exchanging authorization code, redirect URI {redirect_uri}");

        let request = self
            .client
            .post(format!("{}/auth/google", self.api_base_url))
            .json(&CodeExchangeRequest { code, redirect_uri });

        let raw = read_body(request)
            .await
            .map_err(|(kind, e)| exchange_error(kind, Some(Box::new(e))))?;

        let status = raw.status;
        let response: AuthResponse = raw.json().map_err(|kind| {
            warn!("Code exchange rejected with status {status}");
            exchange_error(kind, None)
        })?;

        info!("Code exchange succeeded for user {}", response.user_id);
        Ok(response)
    }
}
