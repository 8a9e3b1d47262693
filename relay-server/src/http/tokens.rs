//! Token submit and lookup endpoints.
//!
//! Every outcome is a 200 with a [`TokenResponse`] body, except when the
//! optional rate limiter refuses a request (429, same body shape).

use crate::server::TokenRelay;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, OriginalUri};
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use relay_types::{Code, SubmitRequest, TokenResponse};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Plain text answer for anything that is not a submit or a lookup.
pub const GREETING: &str = "Hello World!";

/// Fallback handler.
pub async fn greeting() -> &'static str {
    GREETING
}

/// `POST /` with a JSON `{"token": ...}` body.
pub async fn submit_handler(
    Extension(relay): Extension<Arc<TokenRelay>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(limited) = check_rate_limit(&relay, peer, TokenResponse::rejected()) {
        return limited;
    }

    if !is_json(&headers) {
        return Json(relay.reject_submission("content type is not JSON")).into_response();
    }

    if body.is_empty() {
        return Json(relay.reject_submission("empty body")).into_response();
    }

    let request: SubmitRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            let reason = format!("malformed body: {e}");
            return Json(relay.reject_submission(&reason)).into_response();
        }
    };

    Json(relay.submit(request.token).await).into_response()
}

/// `GET /{code}`.
///
/// The key is the path after the leading slash, still percent-encoded, so
/// segments that do not decode to UTF-8 miss like any other unknown code.
pub async fn lookup_handler(
    Extension(relay): Extension<Arc<TokenRelay>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let key = lookup_key(uri.path());
    let denied = TokenResponse::missing(Code::parse_lenient(key));
    if let Err(limited) = check_rate_limit(&relay, peer, denied) {
        return limited;
    }

    Json(relay.lookup(key).await).into_response()
}

fn lookup_key(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
}

fn check_rate_limit(
    relay: &TokenRelay,
    peer: Option<ConnectInfo<SocketAddr>>,
    denied: TokenResponse,
) -> Result<(), Response> {
    let client = peer.map(|ConnectInfo(addr)| addr.ip());
    relay.rate_limits().check_client(client).map_err(|e| {
        relay.metrics().rate_limit_hits.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("Request from {:?} refused: {}", client, e);
        (StatusCode::TOO_MANY_REQUESTS, Json(denied)).into_response()
    })
}
