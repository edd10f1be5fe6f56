//! Session middleware.
//!
//! Every request starts from the token store: the session is re-derived before
//! the handler runs, so an expired or cleared token is noticed on the next page.

use crate::{view, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use log::*;
use session_auth::guard::{guard, GuardDecision};

/// Re-derives the session, then runs the handler whatever the outcome.
pub async fn refresh_session(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    app_state.session.refresh();
    next.run(request).await
}

/// Admits authenticated sessions only.
///
/// The admitted `Identity` reaches handlers as a request extension. Anonymous
/// visitors are sent to the landing page.
pub async fn require_session(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = app_state.session.refresh();
    match guard(&session) {
        GuardDecision::Admit(identity) => {
            request.extensions_mut().insert(identity.clone());
            next.run(request).await
        }
        GuardDecision::Placeholder => view::loading().into_response(),
        GuardDecision::Redirect(to) => {
            debug!("No session for {}, redirecting to {to}", request.uri().path());
            Redirect::to(to).into_response()
        }
        GuardDecision::Nothing => ().into_response(),
    }
}
