//! `/api/*` pass-through to the REST backend.
//!
//! DESIGN
//! ======
//! Requests and responses are streamed in both directions, so the chat push
//! stream (`text/event-stream`) flows through without buffering. Only
//! hop-by-hop headers are dropped; everything else is forwarded verbatim.

#[cfg(test)]
#[path = "proxy_test.rs"]
mod proxy_test;

use axum::Json;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::state::HostState;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("invalid upstream response: {0}")]
    BadResponse(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unreachable(e.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "proxy request failed");
        let body = serde_json::json!({ "success": false, "error": "Backend unavailable. Please try again." });
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

// =============================================================================
// HEADERS
// =============================================================================

/// Copy `headers` minus hop-by-hop entries and anything named in `Connection`.
pub(crate) fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let listed: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || listed.iter().any(|l| l == name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Absolute upstream URL for an incoming `/api/...` URI.
pub(crate) fn upstream_url(backend_url: &str, uri: &Uri) -> String {
    let path = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    format!("{backend_url}{path}")
}

// =============================================================================
// HANDLER
// =============================================================================

pub async fn forward(State(state): State<HostState>, req: Request) -> Result<Response, ProxyError> {
    let (parts, body) = req.into_parts();
    let url = upstream_url(&state.backend_url, &parts.uri);

    let mut headers = end_to_end_headers(&parts.headers);
    headers.remove(header::HOST);

    let upstream = state
        .http
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()))
        .send()
        .await?;

    let status = upstream.status();
    tracing::debug!(method = %parts.method, path = %parts.uri.path(), %status, "proxied");

    let mut response = Response::builder().status(status);
    if let Some(out) = response.headers_mut() {
        *out = end_to_end_headers(upstream.headers());
    }
    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ProxyError::BadResponse(e.to_string()))
}
