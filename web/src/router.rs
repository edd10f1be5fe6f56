use crate::controller::{callback_controller, dashboard_controller, landing_controller, session_controller};
use crate::middleware::session::{refresh_session, require_session};
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(landing_routes(app_state.clone()))
        .merge(callback_routes(app_state.clone()))
        .merge(dashboard_routes(app_state.clone()))
        .merge(session_routes(app_state))
}

fn landing_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_controller::index))
        .route_layer(from_fn_with_state(app_state.clone(), refresh_session))
        .route("/auth/login", get(landing_controller::login))
        .with_state(app_state)
}

fn callback_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/callback", get(callback_controller::callback))
        .with_state(app_state)
}

fn dashboard_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/dashboard",
            get(dashboard_controller::show).post(dashboard_controller::update),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_session))
        // Manual token entry is how an anonymous visitor gets a session without
        // the provider, so it sits outside the guard
        .route("/dashboard/token", post(dashboard_controller::set_token))
        .with_state(app_state)
}

fn session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(session_controller::read))
        .route_layer(from_fn_with_state(app_state.clone(), refresh_session))
        .route("/logout", post(session_controller::logout))
        .with_state(app_state)
}
