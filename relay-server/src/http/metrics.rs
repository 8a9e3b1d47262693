//! Prometheus metrics endpoint.

use crate::http::tokens::GREETING;
use crate::server::TokenRelay;
use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Extension,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Prometheus metrics handler.
///
/// Returns metrics in Prometheus text format, or the greeting when
/// `http.metrics_enabled` is off.
pub async fn metrics_handler(Extension(relay): Extension<Arc<TokenRelay>>) -> Response {
    if !relay.config().http.metrics_enabled {
        return GREETING.into_response();
    }

    let m = relay.metrics();

    // Counters, monotonic since startup
    let submissions = m.submissions_total.load(Ordering::Relaxed);
    let rejected = m.submissions_rejected.load(Ordering::Relaxed);
    let write_failures = m.write_failures.load(Ordering::Relaxed);
    let lookups = m.lookups_total.load(Ordering::Relaxed);
    let hits = m.lookup_hits.load(Ordering::Relaxed);
    let misses = m.lookup_misses.load(Ordering::Relaxed);
    let read_failures = m.read_failures.load(Ordering::Relaxed);
    let rate_limits = m.rate_limit_hits.load(Ordering::Relaxed);

    // Gauges
    let tokens = relay.storage().count_tokens().await.unwrap_or(0);
    let tracked_clients = relay.rate_limits().tracked_clients();

    let body = format!(
        r#"# HELP nearby_relay_info Server information
# TYPE nearby_relay_info gauge
nearby_relay_info{{version="{version}"}} 1

# HELP nearby_relay_submissions_total Token submissions that reached storage
# TYPE nearby_relay_submissions_total counter
nearby_relay_submissions_total {submissions}

# HELP nearby_relay_submissions_rejected_total Submissions refused before storage
# TYPE nearby_relay_submissions_rejected_total counter
nearby_relay_submissions_rejected_total {rejected}

# HELP nearby_relay_write_failures_total Failed token writes
# TYPE nearby_relay_write_failures_total counter
nearby_relay_write_failures_total {write_failures}

# HELP nearby_relay_lookups_total Token lookups handled
# TYPE nearby_relay_lookups_total counter
nearby_relay_lookups_total {lookups}

# HELP nearby_relay_lookup_hits_total Lookups that found a token
# TYPE nearby_relay_lookup_hits_total counter
nearby_relay_lookup_hits_total {hits}

# HELP nearby_relay_lookup_misses_total Lookups that found nothing
# TYPE nearby_relay_lookup_misses_total counter
nearby_relay_lookup_misses_total {misses}

# HELP nearby_relay_read_failures_total Failed token reads
# TYPE nearby_relay_read_failures_total counter
nearby_relay_read_failures_total {read_failures}

# HELP nearby_relay_rate_limit_hits_total Requests refused by the rate limiter
# TYPE nearby_relay_rate_limit_hits_total counter
nearby_relay_rate_limit_hits_total {rate_limits}

# HELP nearby_relay_tokens_stored Tokens currently in the database
# TYPE nearby_relay_tokens_stored gauge
nearby_relay_tokens_stored {tokens}

# HELP nearby_relay_rate_limited_clients Client keys tracked by the rate limiter
# TYPE nearby_relay_rate_limited_clients gauge
nearby_relay_rate_limited_clients {tracked_clients}
"#,
        version = env!("CARGO_PKG_VERSION"),
    );

    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
