pub mod intake;
pub mod sheets;

use std::time::Duration;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::SharedState;

/// Path the site's forms post to.
pub const SUBMIT_PATH: &str = "/api/submit";

pub fn intake_routes() -> Router<SharedState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    Router::new()
        .route(SUBMIT_PATH, get(intake::status).post(intake::submit))
        .layer(cors)
}

pub fn admin_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/sheets", get(sheets::list))
        .route("/api/sheets/{name}", get(sheets::export))
}
