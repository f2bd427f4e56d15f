//! The standard HTTP layer stack shared by Tradepost services: request-id
//! propagation and generation, per-request tracing spans, timeouts, optional
//! CORS, and a request body limit.

use std::time::Duration;

use axum::http::{HeaderName, Request};
use axum::{body::Body, middleware::from_fn, middleware::Next, response::Response, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use tracing::field::Empty;

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

/// Request extension carrying the effective `x-request-id` value.
#[derive(Clone, Debug)]
pub struct RequestIdValue(pub String);

/// Generates an `x-request-id` (nanoid) when the client did not send one.
#[derive(Clone, Default)]
pub struct GenerateRequestId;

impl MakeRequestId for GenerateRequestId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Middleware that stores the request id in Request.extensions and records it
/// in the current span.
async fn record_request_id(mut req: Request<Body>, next: Next) -> Response {
    let hdr = request_id_header();
    let rid = req
        .headers()
        .get(&hdr)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "n/a".to_string());

    req.extensions_mut().insert(RequestIdValue(rid.clone()));
    tracing::Span::current().record("request_id", tracing::field::display(&rid));

    next.run(req).await
}

fn make_request_span(req: &Request<Body>) -> tracing::Span {
    let hdr = request_id_header();
    let rid = req
        .headers()
        .get(&hdr)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri().path(),
        version = ?req.version(),
        request_id = %rid,
        status = Empty,
        latency_ms = Empty
    )
}

/// Knobs for [`apply_http_layers`].
#[derive(Debug, Clone)]
pub struct HttpLayerConfig {
    pub timeout: Duration,
    pub cors_enabled: bool,
    pub body_limit_bytes: usize,
}

impl Default for HttpLayerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            cors_enabled: false,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// Wrap a router in the standard layer stack: request-id plumbing, the
/// request span, a handler timeout, optional CORS, and a body limit.
pub fn apply_http_layers(mut router: Router, cfg: &HttpLayerConfig) -> Router {
    let x_request_id = request_id_header();

    // 1. If client sent x-request-id, propagate it; otherwise we will set it
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));

    // 2. Generate x-request-id when missing
    router = router.layer(SetRequestIdLayer::new(x_request_id, GenerateRequestId));

    // 3. Put request_id into extensions and span
    router = router.layer(from_fn(record_request_id));

    // 4. Trace with request_id/status/latency
    router = router.layer(
        tower_http::trace::TraceLayer::new_for_http().make_span_with(make_request_span),
    );

    // 5. Timeout layer for handlers
    router = router.layer(TimeoutLayer::new(cfg.timeout));

    // 6. CORS layer (if enabled)
    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    // 7. Body limit layer
    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));

    router
}
