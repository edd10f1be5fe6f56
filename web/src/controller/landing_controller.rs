use crate::{view, AppState};
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use log::*;
use session_auth::guard::{landing, LandingDecision};

/// GET /
///
/// Sign-in page. Visitors who are already signed in go straight to the dashboard.
pub async fn index(State(app_state): State<AppState>) -> Response {
    match landing(&app_state.session.current()) {
        LandingDecision::Placeholder => view::loading().into_response(),
        LandingDecision::Redirect(to) => Redirect::to(to).into_response(),
        LandingDecision::ShowLogin => view::login("/auth/login").into_response(),
    }
}

/// GET /auth/login
///
/// Sends the browser to the provider login, which returns to /auth/callback.
pub async fn login(State(app_state): State<AppState>) -> Redirect {
    let url = app_state.gateway.login_url(&app_state.redirect_uri());
    debug!("Redirecting to provider login: {url}");
    Redirect::to(&url)
}
