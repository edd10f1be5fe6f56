use crate::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use serde::Serialize;
use session_auth::decoder::Identity;
use session_auth::session::{Navigation, SessionState};

/// What views see of the session: the identity and whether it is still loading.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub user: Option<Identity>,
    pub loading: bool,
}

impl From<&SessionState> for SessionSummary {
    fn from(state: &SessionState) -> Self {
        Self {
            user: state.identity().cloned(),
            loading: state.is_loading(),
        }
    }
}

/// GET /api/session
pub async fn read(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(SessionSummary::from(&app_state.session.current()))
}

/// POST /logout
pub async fn logout(State(app_state): State<AppState>) -> Redirect {
    match app_state.session.logout() {
        Navigation::FullReload(path) => Redirect::to(path),
    }
}
