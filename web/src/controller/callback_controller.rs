//! OAuth landing route.

use crate::{view, AppState};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use log::*;
use serde::Deserialize;
use session_auth::guard::DASHBOARD_ROUTE;

/// Query parameters the provider redirects back with.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/callback
///
/// Exchanges the code, stores the token, refreshes the session and continues to
/// the dashboard. Every failure renders the error panel instead.
pub async fn callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        warn!("Provider returned error: {error}");
        return (StatusCode::BAD_REQUEST, view::callback_error(&error, None)).into_response();
    }

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            view::callback_error("No authorization code received", None),
        )
            .into_response();
    };

    info!("Processing OAuth callback");
    let redirect_uri = app_state.redirect_uri();
    match app_state
        .session
        .sign_in(&app_state.gateway, &code, &redirect_uri)
        .await
    {
        Ok(_) => Redirect::to(DASHBOARD_ROUTE).into_response(),
        Err(e) => {
            error!("Authentication error: {e}");
            let (message, details) = match e.request_failure() {
                Some(kind) => (kind.user_message(), kind.details()),
                None => ("Failed to authenticate with Google".to_string(), None),
            };
            (
                StatusCode::BAD_GATEWAY,
                view::callback_error(&message, details.as_deref()),
            )
                .into_response()
        }
    }
}
