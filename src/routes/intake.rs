use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::Record;
use crate::state::SharedState;
use crate::submission::pipeline::{self, PipelineError};
use crate::submission::{metadata, parser};

/// Envelope every intake response uses.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
    pub message: String,
}

fn reply(code: StatusCode, status: &'static str, message: impl Into<String>) -> Response {
    (
        code,
        Json(StatusBody {
            status,
            message: message.into(),
        }),
    )
        .into_response()
}

pub async fn submit(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    let record = match parser::parse_body(content_type, &body).and_then(Record::from_json) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Rejected submission: {e}");
            return reply(StatusCode::BAD_REQUEST, "error", e);
        }
    };

    let client_ip = metadata::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies);

    match pipeline::run(&state, client_ip, record).await {
        Ok(_) => reply(StatusCode::OK, "success", "Submission received"),
        Err(e @ PipelineError::RateLimited { .. }) => {
            reply(StatusCode::TOO_MANY_REQUESTS, "error", e.to_string())
        }
        Err(e) => reply(StatusCode::INTERNAL_SERVER_ERROR, "error", e.to_string()),
    }
}

pub async fn status() -> Response {
    reply(StatusCode::OK, "ok", "Alephic Labs form endpoint is active.")
}
