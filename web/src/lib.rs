//! Browser-facing front end: sign-in page, OAuth callback and profile editor.
//!
//! All routes read the one [`SessionController`] handed in through [`AppState`].

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::*;
use service::config::Config;
use session_auth::gateway::{callback_redirect_uri, AuthGateway};
use session_auth::liveness::Liveness;
use session_auth::profile::ProfileSync;
use session_auth::session::SessionController;
use tokio::net::TcpListener;

mod controller;
mod middleware;
mod router;
mod view;

pub use router::define_routes;

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionController>,
    pub gateway: AuthGateway,
    pub profiles: ProfileSync,
    submitting: Arc<AtomicBool>,
    liveness: Liveness,
}

impl AppState {
    pub fn new(config: Config, session: Arc<SessionController>, http_client: reqwest::Client) -> Self {
        let gateway = AuthGateway::new(config.api_base_url(), http_client.clone());
        let profiles = ProfileSync::new(config.api_base_url(), http_client);

        Self {
            config,
            session,
            gateway,
            profiles,
            submitting: Arc::new(AtomicBool::new(false)),
            liveness: Liveness::new(),
        }
    }

    /// Redirect URI registered with the provider for this application.
    pub fn redirect_uri(&self) -> String {
        callback_redirect_uri(self.config.app_base_url())
    }

    /// Server-lifetime handle, revoked when shutdown starts.
    ///
    /// It covers shutdown only. A request abandoned by its client is dropped by
    /// axum together with its future, so no completion of it runs at all.
    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    /// Claims the single profile-save slot, or `None` if a save is in flight.
    pub(crate) fn begin_submit(&self) -> Option<SubmitGuard> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard(Arc::clone(&self.submitting)))
    }
}

/// Releases the save slot when dropped, including when the request is abandoned.
pub(crate) struct SubmitGuard(Arc<AtomicBool>);

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Resolves the configured interface to a loopback socket address.
///
/// Every client of the server shares the one stored token, so anything that is
/// not a loopback address is refused.
pub fn bind_address(config: &Config) -> io::Result<SocketAddr> {
    let ip = match config.interface.as_deref() {
        None | Some("localhost") => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Some(interface) => interface.parse::<IpAddr>().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid interface {interface}: {e}"),
            )
        })?,
    };

    if !ip.is_loopback() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to listen on non-loopback interface {ip}"),
        ));
    }

    Ok(SocketAddr::new(ip, config.port))
}

/// Binds the configured loopback interface and serves until Ctrl-C.
pub async fn init_server(app_state: AppState) -> io::Result<()> {
    let host = bind_address(&app_state.config)?;

    let listener = TcpListener::bind(host).await?;
    info!("Server starting... listening for connections on http://{host}");

    let liveness = app_state.liveness.clone();
    axum::serve(listener, define_routes(app_state))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutting down");
            liveness.revoke();
        })
        .await
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::response::Response;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use clap::Parser;
    use session_auth::token::MemoryCookieStore;

    pub fn token_for(user_id: i64, email: &str, name: &str) -> String {
        let payload = serde_json::json!({"user_id": user_id, "email": email, "name": name});
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    pub fn app_state(api_base_url: &str, store: Arc<MemoryCookieStore>) -> AppState {
        let config = Config::parse_from(["profile_portal"]).set_api_base_url(api_base_url.to_string());
        let session = Arc::new(SessionController::new(store));
        AppState::new(config, session, reqwest::Client::new())
    }

    pub async fn body_string(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use clap::Parser;
    use session_auth::token::MemoryCookieStore;

    fn config_with(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("profile_portal").chain(args.iter().copied()))
    }

    #[test]
    fn test_bind_address_defaults_to_loopback() {
        let address = bind_address(&config_with(&[])).unwrap();
        assert_eq!(address, "127.0.0.1:3000".parse().unwrap());
    }

    #[test]
    fn test_bind_address_accepts_localhost_and_ipv6_loopback() {
        let address = bind_address(&config_with(&["--interface", "localhost", "--port", "4000"])).unwrap();
        assert_eq!(address, "127.0.0.1:4000".parse().unwrap());

        let address = bind_address(&config_with(&["--interface", "::1"])).unwrap();
        assert!(address.ip().is_loopback());
    }

    #[test]
    fn test_bind_address_refuses_other_interfaces() {
        for interface in ["0.0.0.0", "192.168.1.10", "::"] {
            let err = bind_address(&config_with(&["--interface", interface])).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }

        let err = bind_address(&config_with(&["--interface", "example.com"])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_only_one_submit_at_a_time() {
        let state = app_state("http://localhost:8000/api", Arc::new(MemoryCookieStore::new()));

        let first = state.begin_submit();
        assert!(first.is_some());
        assert!(state.begin_submit().is_none());

        drop(first);
        assert!(state.begin_submit().is_some());
    }

    #[test]
    fn test_redirect_uri_uses_app_base_url() {
        let state = app_state("http://localhost:8000/api", Arc::new(MemoryCookieStore::new()));
        assert_eq!(state.redirect_uri(), "http://localhost:3000/auth/callback");
    }
}
