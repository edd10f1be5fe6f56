//! Protected profile editor.

use crate::view::{self, Banner, DashboardView};
use crate::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use log::*;
use serde::Deserialize;
use session_auth::decoder::Identity;
use session_auth::guard::DASHBOARD_ROUTE;
use session_auth::profile::{ProfileUpdate, SaveOutcome, AUTHENTICATION_MISSING_MESSAGE};

const LOAD_ERROR_MESSAGE: &str = "Failed to load profile data. Please try again later.";
const SAVE_SUCCESS_MESSAGE: &str = "Profile updated successfully!";
const SAVE_IN_PROGRESS_MESSAGE: &str = "A profile update is already in progress.";

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asal_sekolah: String,
    #[serde(default)]
    pub manual_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    #[serde(default)]
    pub manual_token: String,
}

/// GET /dashboard
///
/// Seeds the form from the identity, then replaces it with the fetched profile.
pub async fn show(State(app_state): State<AppState>, Extension(identity): Extension<Identity>) -> Response {
    let token = app_state.session.token();
    let mut view = DashboardView {
        identity: &identity,
        form: seeded_form(&identity),
        banner: None,
        show_token_input: token.is_none(),
        load_error: None,
    };

    if let Some(token) = token {
        match app_state.profiles.fetch(&token).await {
            Ok(profile) => view.form = ProfileUpdate::from(&profile),
            Err(e) => {
                error!("Failed to load profile data: {e}");
                view.load_error = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }
    }

    view::dashboard(&view).into_response()
}

/// POST /dashboard
///
/// Saves name and school of origin. On success the session is refreshed so the
/// displayed name follows; the form keeps the submitted values and is not
/// re-fetched until the next visit.
pub async fn update(
    State(app_state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let update = ProfileUpdate {
        name: form.name,
        asal_sekolah: form.asal_sekolah,
    };

    let banner = match app_state.begin_submit() {
        None => {
            warn!("Rejected profile update while another is in flight");
            Banner::Error {
                message: SAVE_IN_PROGRESS_MESSAGE.to_string(),
                details: None,
            }
        }
        Some(_submitting) => {
            let outcome = app_state
                .profiles
                .submit(
                    app_state.session.store(),
                    form.manual_token.as_deref(),
                    &update,
                )
                .await;
            apply_outcome(&app_state, outcome)
        }
    };

    let session = app_state.session.current();
    let view = DashboardView {
        identity: session.identity().unwrap_or(&identity),
        form: update,
        show_token_input: app_state.session.token().is_none() || is_auth_missing(&banner),
        banner: Some(banner),
        load_error: None,
    };
    view::dashboard(&view).into_response()
}

/// POST /dashboard/token
///
/// Fallback for when the stored cookie is missing or out of sync.
pub async fn set_token(State(app_state): State<AppState>, Form(form): Form<TokenForm>) -> Redirect {
    let token = form.manual_token.trim();
    if !token.is_empty() {
        app_state.session.set_manual_token(token);
    }
    Redirect::to(DASHBOARD_ROUTE)
}

fn seeded_form(identity: &Identity) -> ProfileUpdate {
    ProfileUpdate {
        name: identity.name.clone().unwrap_or_default(),
        asal_sekolah: String::new(),
    }
}

fn apply_outcome(app_state: &AppState, outcome: SaveOutcome) -> Banner {
    match outcome {
        SaveOutcome::Saved { .. } => {
            // Completions that land after shutdown began leave the session alone
            app_state.liveness().apply(|| app_state.session.refresh());
            Banner::Success(SAVE_SUCCESS_MESSAGE.to_string())
        }
        SaveOutcome::Failed { message, details } => Banner::Error {
            message,
            details: details.map(|d| serde_json::to_string_pretty(&d).unwrap_or_else(|_| d.to_string())),
        },
    }
}

fn is_auth_missing(banner: &Banner) -> bool {
    matches!(banner, Banner::Error { message, .. } if message == AUTHENTICATION_MISSING_MESSAGE)
}

#[cfg(test)]
mod tests {
    use crate::define_routes;
    use crate::test_support::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Duration;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use session_auth::session::SessionState;
    use session_auth::token::{MemoryCookieStore, TokenStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn signed_in_store() -> Arc<MemoryCookieStore> {
        let store = Arc::new(MemoryCookieStore::new());
        store.set(&token_for(4, "budi@example.com", "Budi"));
        store
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_show_redirects_anonymous_to_landing() {
        let app = define_routes(app_state("http://localhost:8000/api", Arc::new(MemoryCookieStore::new())));

        let response = app
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_show_redirects_once_token_expires() {
        let store = Arc::new(MemoryCookieStore::with_max_age(Duration::milliseconds(200)));
        store.set(&token_for(4, "budi@example.com", "Budi"));
        let state = app_state("http://localhost:8000/api", store.clone());
        assert!(matches!(state.session.current(), SessionState::Authenticated(_)));

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        let session = state.session.clone();

        let response = define_routes(state)
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(store.get().is_none());
        assert_eq!(session.current(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_update_rejected_after_token_cleared() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/auth/me/profile")
            .expect(0)
            .create_async()
            .await;

        let store = signed_in_store();
        let state = app_state(&server.url(), store.clone());
        store.clear();

        let response = define_routes(state)
            .oneshot(post_form("/dashboard", "name=x&asal_sekolah=y"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_show_renders_fetched_profile() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/auth/me")
            .match_header("authorization", Matcher::Regex("^Bearer h\\.".to_string()))
            .with_status(200)
            .with_body(json!({"user_id": 4, "name": "Budi S", "asal_sekolah": "SMA 3"}).to_string())
            .create_async()
            .await;

        let app = define_routes(app_state(&server.url(), signed_in_store()));
        let response = app
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("value=\"Budi S\""));
        assert!(body.contains("value=\"SMA 3\""));
        assert!(!body.contains("token-form"));
    }

    #[tokio::test]
    async fn test_show_keeps_view_on_fetch_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/auth/me")
            .with_status(500)
            .create_async()
            .await;

        let app = define_routes(app_state(&server.url(), signed_in_store()));
        let response = app
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Failed to load profile data. Please try again later."));
        // Seeded from the identity's name
        assert!(body.contains("value=\"Budi\""));
    }

    #[tokio::test]
    async fn test_update_saves_and_shows_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/auth/me/profile")
            .match_body(Matcher::Json(json!({"name": "Budi S", "asal_sekolah": "SMA 3"})))
            .with_status(200)
            .with_body(json!({"name": "Budi S", "asal_sekolah": "SMA 3"}).to_string())
            .create_async()
            .await;

        let app = define_routes(app_state(&server.url(), signed_in_store()));
        let response = app
            .oneshot(post_form("/dashboard", "name=Budi+S&asal_sekolah=SMA+3"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Profile updated successfully!"));
        assert!(body.contains("value=\"SMA 3\""));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_failure_shows_message_and_details() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", "/auth/me/profile")
            .with_status(422)
            .with_body(r#"{"detail":"name too long"}"#)
            .create_async()
            .await;

        let app = define_routes(app_state(&server.url(), signed_in_store()));
        let response = app
            .oneshot(post_form("/dashboard", "name=x&asal_sekolah=y"))
            .await
            .unwrap();

        let body = body_string(response).await;
        assert!(body.contains("Server error: 422"));
        assert!(body.contains("name too long"));
    }

    #[tokio::test]
    async fn test_update_rejected_while_save_in_flight() {
        let state = app_state("http://localhost:8000/api", signed_in_store());
        let _in_flight = state.begin_submit().unwrap();

        let response = define_routes(state)
            .oneshot(post_form("/dashboard", "name=x&asal_sekolah=y"))
            .await
            .unwrap();

        assert!(body_string(response)
            .await
            .contains("A profile update is already in progress."));
    }

    #[tokio::test]
    async fn test_set_token_signs_in() {
        let store = Arc::new(MemoryCookieStore::new());
        let state = app_state("http://localhost:8000/api", store);
        let session = state.session.clone();
        let token = token_for(5, "m@n.com", "M");

        let response = define_routes(state)
            .oneshot(post_form("/dashboard/token", &format!("manual_token={token}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
        assert!(matches!(session.current(), SessionState::Authenticated(_)));
    }
}
