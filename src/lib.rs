pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod routes;
pub mod email;
pub mod files;
pub mod sheets;
pub mod submission;
pub mod capture;
pub mod rate_limit;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

/// Mount point for shared attachment links.
pub const FILES_PATH: &str = "/files";

pub fn build_app(state: SharedState) -> Router {
    let files_dir = files::local::public_dir(&state.config.upload_dir);
    let max_body_size = state.config.max_body_size;

    let mut router = Router::new()
        .merge(routes::intake_routes())
        .merge(routes::admin_routes())
        .nest_service(FILES_PATH, ServeDir::new(files_dir))
        .route("/health", axum::routing::get(health));

    // The marketing site itself, when this process also hosts it.
    if let Some(dir) = &state.config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
