//! Admission decisions for protected views.
//!
//! The guard holds no session state of its own. Views call it again whenever the
//! session changes.

use tokio::sync::watch;

use crate::decoder::Identity;
use crate::session::SessionState;

/// Landing (login) route.
pub const LANDING_ROUTE: &str = "/";

/// Protected profile view.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// What a protected view should do for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<'a> {
    /// Session not known yet: show a placeholder and wait.
    Placeholder,
    /// Anonymous session: navigate away.
    Redirect(&'static str),
    /// Already redirected: render nothing.
    Nothing,
    /// Render the protected content for this identity.
    Admit(&'a Identity),
}

/// Decision for a protected view.
pub fn guard(state: &SessionState) -> GuardDecision<'_> {
    match state {
        SessionState::Loading => GuardDecision::Placeholder,
        SessionState::Anonymous => GuardDecision::Redirect(LANDING_ROUTE),
        SessionState::Authenticated(identity) => GuardDecision::Admit(identity),
    }
}

/// What the landing page should do for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingDecision {
    Placeholder,
    /// Signed in already: go to the dashboard.
    Redirect(&'static str),
    /// Offer the sign-in button.
    ShowLogin,
}

pub fn landing(state: &SessionState) -> LandingDecision {
    match state {
        SessionState::Loading => LandingDecision::Placeholder,
        SessionState::Authenticated(_) => LandingDecision::Redirect(DASHBOARD_ROUTE),
        SessionState::Anonymous => LandingDecision::ShowLogin,
    }
}

/// Guard for a long-lived view that re-evaluates on every state change.
///
/// Issues one redirect per entry into the anonymous state, then renders nothing
/// until the session changes again.
#[derive(Debug, Default)]
pub struct RedirectOnce {
    redirected: bool,
}

impl RedirectOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe<'a>(&mut self, state: &'a SessionState) -> GuardDecision<'a> {
        match guard(state) {
            GuardDecision::Redirect(_) if self.redirected => GuardDecision::Nothing,
            GuardDecision::Redirect(to) => {
                self.redirected = true;
                GuardDecision::Redirect(to)
            }
            decision => {
                self.redirected = false;
                decision
            }
        }
    }
}

/// Wait until the session leaves [`SessionState::Loading`].
pub async fn wait_resolved(rx: &mut watch::Receiver<SessionState>) -> SessionState {
    let resolved = rx
        .wait_for(|state| !state.is_loading())
        .await
        .map(|state| state.clone())
        .ok();

    resolved.unwrap_or_else(|| rx.borrow().clone())
}
