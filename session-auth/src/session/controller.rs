//! Session controller: the single writer of session state.

use std::sync::Arc;

use log::*;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use super::SessionState;
use crate::decoder;
use crate::error::Error;
use crate::gateway::AuthGateway;
use crate::guard::LANDING_ROUTE;
use crate::token::{preview, TokenStore};

/// Navigation the caller must perform after a session-ending operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Tear down all view state and load `path` from scratch.
    FullReload(&'static str),
}

/// Holds the current [`SessionState`] and publishes every change.
///
/// Build one per process at the composition root and hand out `Arc` clones.
/// Views read with [`current`](Self::current) or follow changes through
/// [`subscribe`](Self::subscribe); only this controller writes.
pub struct SessionController {
    store: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
}

impl SessionController {
    /// Create the controller and resolve the initial session from `store`.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        let controller = Self { store, state };
        controller.refresh();
        controller
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The stored bearer token, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.store.get()
    }

    /// The underlying token store.
    pub fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    /// Re-derive the session from the stored token.
    ///
    /// A missing token and an undecodable one both leave the session anonymous.
    /// Subscribers are only notified when the state actually changes.
    pub fn refresh(&self) -> SessionState {
        let next = match self.store.get() {
            None => {
                debug!("No auth token stored, session is anonymous");
                SessionState::Anonymous
            }
            Some(token) => match decoder::decode(token.expose_secret()) {
                Ok(identity) => {
                    debug!("Session refreshed for user {}", identity.id);
                    SessionState::Authenticated(identity)
                }
                Err(e) => {
                    warn!("Error refreshing user: {e}");
                    SessionState::Anonymous
                }
            },
        };

        self.publish(next.clone());
        next
    }

    /// Clear the stored token and end the session.
    ///
    /// The returned navigation must be performed; it is not a soft transition.
    pub fn logout(&self) -> Navigation {
        info!("Logging out");
        self.store.clear();
        self.publish(SessionState::Anonymous);
        Navigation::FullReload(LANDING_ROUTE)
    }

    /// Store a token supplied by hand and refresh from it.
    pub fn set_manual_token(&self, token: &str) -> SessionState {
        info!("Setting manual token {}", preview(token));
        self.store.set(token);
        self.refresh()
    }

    /// Complete a sign-in: exchange `code`, store the issued token and refresh.
    ///
    /// The new token supersedes whatever was stored before.
    pub async fn sign_in(
        &self,
        gateway: &AuthGateway,
        code: &str,
        redirect_uri: &str,
    ) -> Result<SessionState, Error> {
        let response = gateway.exchange_code(code, redirect_uri).await?;
        self.store.set(response.access_token.expose_secret());
        Ok(self.refresh())
    }

    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
