//! JSON-normalizing proxy to the upstream API.
//!
//! Every upstream response goes through [`classify_response`], which either
//! yields a JSON value to relay or a typed parse failure. Failures are
//! logged exactly once, with the offending body truncated to a short
//! excerpt, so a misbehaving upstream cannot flood the logs.

use crate::error::ApiError;
use crate::state::GatewayState;
use axum::{
    extract::{Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

/// Longest body excerpt that ends up in a log line.
const BODY_EXCERPT_MAX: usize = 500;

/// Request bodies larger than this are rejected before forwarding.
const MAX_REQUEST_BODY: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Failed to parse JSON response")]
    InvalidJson,
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Decide what an upstream response means, independent of transport.
///
/// A response with a JSON content type and an empty (or whitespace-only)
/// body counts as an empty object, since several upstream endpoints reply
/// `204`-style with a JSON header and no payload. A declared non-JSON
/// content type fails immediately, whatever the body contains; a missing
/// content type falls back to attempting the parse. The status code never
/// influences parsing, only the log severity on failure.
pub fn classify_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Value, ProxyError> {
    let declared_json = content_type.map(is_json_content_type);

    if declared_json == Some(true) && body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    if declared_json == Some(false) {
        log_parse_failure(status, content_type, body);
        return Err(ProxyError::InvalidJson);
    }

    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(_) => {
            log_parse_failure(status, content_type, body);
            Err(ProxyError::InvalidJson)
        }
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// One log line per failing response. Client errors from the upstream are
/// expected traffic and log at `warn`; everything else is `error`.
fn log_parse_failure(status: StatusCode, content_type: Option<&str>, body: &[u8]) {
    let excerpt = body_excerpt(body);
    let content_type = content_type.unwrap_or("<none>");
    if status.is_client_error() {
        warn!(%status, content_type, body = %excerpt, "upstream response was not valid JSON");
    } else {
        error!(%status, content_type, body = %excerpt, "upstream response was not valid JSON");
    }
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= BODY_EXCERPT_MAX {
        return text.into_owned();
    }
    let truncated: String = text.chars().take(BODY_EXCERPT_MAX).collect();
    format!("{truncated} (truncated)")
}

/// Forward a request to the configured upstream and relay the classified
/// JSON body with the upstream's status code.
pub async fn forward(
    State(state): State<Arc<GatewayState>>,
    Path(path): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    let mut url = format!("{}/{}", state.proxy.base_url, path.trim_start_matches('/'));
    if let Some(query) = request.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let method = request.method().clone();
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = axum::body::to_bytes(request.into_body(), MAX_REQUEST_BODY)
        .await
        .map_err(|err| ApiError::InvalidRequest(format!("unreadable request body: {err}")))?;

    let mut upstream = state.proxy.http.request(method, url);
    if let Some(content_type) = content_type {
        upstream = upstream.header(CONTENT_TYPE, content_type);
    }
    if !body.is_empty() {
        upstream = upstream.body(body);
    }

    let response = upstream.send().await.map_err(|err| {
        if err.is_connect() || err.is_timeout() {
            ApiError::ServiceUnavailable
        } else {
            ApiError::Upstream(err.to_string())
        }
    })?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .bytes()
        .await
        .map_err(|err| ApiError::Upstream(err.to_string()))?;

    let value = classify_response(status, content_type.as_deref(), &bytes)
        .map_err(|err| ApiError::Upstream(err.to_string()))?;

    Ok((status, Json(value)).into_response())
}
