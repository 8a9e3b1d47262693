//! HTTP endpoints for relay-server.
//!
//! Token submit/lookup, plus health checks and metrics. Anything else gets
//! a plain greeting rather than an error.

pub mod health;
mod metrics;
pub mod tokens;

use crate::server::TokenRelay;
use axum::{routing::get, Extension, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use health::HealthStatus;
pub use tokens::GREETING;

/// Build the HTTP router with all endpoints.
pub fn build_router(relay: Arc<TokenRelay>) -> Router {
    Router::new()
        .route(
            "/",
            get(tokens::greeting)
                .post(tokens::submit_handler)
                .fallback(tokens::greeting),
        )
        .route(
            "/health",
            get(health::health_handler).fallback(tokens::greeting),
        )
        .route(
            "/metrics",
            get(metrics::metrics_handler).fallback(tokens::greeting),
        )
        .route(
            "/:code",
            get(tokens::lookup_handler).fallback(tokens::greeting),
        )
        .route(
            "/:code/",
            get(tokens::lookup_handler).fallback(tokens::greeting),
        )
        .fallback(tokens::greeting)
        .layer(Extension(relay))
        .layer(TraceLayer::new_for_http())
}

/// Serve the relay on `listener` until `shutdown` resolves.
///
/// Peer addresses are attached to each request so the rate limiter can key
/// on them.
pub async fn serve<F>(relay: Arc<TokenRelay>, listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(relay);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::SqliteStorage;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
    use axum::response::Response;
    use relay_types::{Code, TokenResponse};
    use tower::util::ServiceExt;

    async fn test_relay(config: Config) -> Arc<TokenRelay> {
        let storage = SqliteStorage::in_memory().await.unwrap();
        Arc::new(TokenRelay::new(config, storage).unwrap())
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn token_response(response: Response) -> TokenResponse {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn submit_returns_code_and_token() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay);

        let response = app.oneshot(post_json(r#"{"token":"QUJD"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = token_response(response).await;
        assert!(body.success);
        assert_eq!(body.token, "QUJD");
        assert!((1000..=9999).contains(&body.id.unwrap().value()));
    }

    #[tokio::test]
    async fn submit_then_lookup_round_trip() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay);

        let submitted = token_response(
            app.clone()
                .oneshot(post_json(r#"{"token":"QUJD"}"#))
                .await
                .unwrap(),
        )
        .await;
        let code = submitted.id.unwrap();

        let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            token_response(response).await,
            TokenResponse::found(Some(code), "QUJD".to_string())
        );
    }

    #[tokio::test]
    async fn non_json_submit_is_rejected_without_write() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from(r#"{"token":"QUJD"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(token_response(response).await, TokenResponse::rejected());
        assert_eq!(relay.storage().count_tokens().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn submit_without_content_type_is_rejected() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::from(r#"{"token":"QUJD"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(token_response(response).await, TokenResponse::rejected());
        assert_eq!(relay.storage().count_tokens().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_or_empty_json_is_rejected() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay.clone());

        for body in ["", "{", r#"{"tok":"x"}"#, r#"{"token":42}"#, "[]"] {
            let response = app.clone().oneshot(post_json(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                token_response(response).await,
                TokenResponse::rejected(),
                "body {body:?} should be rejected"
            );
        }
        assert_eq!(relay.storage().count_tokens().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn lookup_of_unknown_code_fails_softly() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay);

        let response = app.oneshot(get("/9999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"{"id":9999,"token":"","success":false}"#
        );
    }

    #[tokio::test]
    async fn lookup_parses_codes_leniently() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay);

        let response = app.clone().oneshot(get("/12abc")).await.unwrap();
        assert_eq!(
            token_response(response).await,
            TokenResponse::missing(Some(Code::new(12)))
        );

        let response = app.oneshot(get("/abc")).await.unwrap();
        assert_eq!(
            body_string(response).await,
            r#"{"id":null,"token":"","success":false}"#
        );
    }

    #[tokio::test]
    async fn undecodable_segments_miss_instead_of_erroring() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay);

        for uri in ["/%FF", "/%E2%28"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(
                body_string(response).await,
                r#"{"id":null,"token":"","success":false}"#
            );
        }
    }

    #[tokio::test]
    async fn lookup_matches_the_encoded_segment() {
        let mut config = Config::default();
        config.codes.min = 4231;
        config.codes.max = 4231;
        let relay = test_relay(config).await;
        let app = build_router(relay);

        app.clone()
            .oneshot(post_json(r#"{"token":"QUJD"}"#))
            .await
            .unwrap();

        let response = app.clone().oneshot(get("/%34%32%33%31")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(token_response(response).await, TokenResponse::missing(None));

        let response = app.oneshot(get("/4231")).await.unwrap();
        assert!(token_response(response).await.success);
    }

    #[tokio::test]
    async fn trailing_slash_is_part_of_the_key() {
        let mut config = Config::default();
        config.codes.min = 1234;
        config.codes.max = 1234;
        let relay = test_relay(config).await;
        let app = build_router(relay);

        app.clone()
            .oneshot(post_json(r#"{"token":"QUJD"}"#))
            .await
            .unwrap();

        let response = app.oneshot(get("/1234/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"{"id":1234,"token":"","success":false}"#
        );
    }

    #[tokio::test]
    async fn colliding_submissions_last_writer_wins() {
        let mut config = Config::default();
        config.codes.min = 4231;
        config.codes.max = 4231;
        let relay = test_relay(config).await;
        let app = build_router(relay);

        for token in ["first", "second"] {
            let body = format!(r#"{{"token":"{token}"}}"#);
            app.clone().oneshot(post_json(&body)).await.unwrap();
        }

        let response = app.oneshot(get("/4231")).await.unwrap();
        assert_eq!(
            token_response(response).await,
            TokenResponse::found(Some(Code::new(4231)), "second".to_string())
        );
    }

    #[tokio::test]
    async fn other_methods_get_greeting_on_any_path() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay);

        for (method, uri) in [
            (Method::PUT, "/"),
            (Method::DELETE, "/4231"),
            (Method::PATCH, "/health"),
            (Method::OPTIONS, "/metrics"),
            (Method::PUT, "/a/b/c"),
        ] {
            let request = Request::builder()
                .method(method.clone())
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{method} {uri}");
            assert_eq!(body_string(response).await, GREETING);
        }
    }

    #[tokio::test]
    async fn unrecognised_get_paths_get_greeting() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay);

        for uri in ["/", "/1234/extra"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, GREETING);
        }
    }

    #[tokio::test]
    async fn post_outside_root_gets_greeting() {
        let relay = test_relay(Config::default()).await;
        let app = build_router(relay.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/4231")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"token":"QUJD"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_string(response).await, GREETING);
        assert_eq!(relay.storage().count_tokens().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rate_limited_requests_get_429() {
        let mut config = Config::default();
        config.limits.requests_per_minute = 1;
        let relay = test_relay(config).await;
        let app = build_router(relay.clone());

        let first = app.clone().oneshot(get("/1234")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.clone().oneshot(get("/1234")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            token_response(second).await,
            TokenResponse::missing(Some(Code::new(1234)))
        );

        let third = app.oneshot(post_json(r#"{"token":"QUJD"}"#)).await.unwrap();
        assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(token_response(third).await, TokenResponse::rejected());
        assert_eq!(relay.storage().count_tokens().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn health_endpoint_reports_token_count() {
        let relay = test_relay(Config::default()).await;
        relay.submit("QUJD".to_string()).await;
        let app = build_router(relay);

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tokens"], 1);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_counters() {
        let relay = test_relay(Config::default()).await;
        relay.lookup("4231").await;
        let app = build_router(relay);

        let response = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("# TYPE nearby_relay_lookups_total counter"));
        assert!(body.contains("nearby_relay_lookup_misses_total 1"));
        assert!(body.contains("nearby_relay_tokens_stored 0"));
    }

    #[tokio::test]
    async fn disabled_metrics_fall_back_to_greeting() {
        let mut config = Config::default();
        config.http.metrics_enabled = false;
        let relay = test_relay(config).await;
        let app = build_router(relay);

        let response = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(body_string(response).await, GREETING);
    }
}
