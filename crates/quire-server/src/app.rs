//! Application assembly: router plus the middleware stack.
//!
//! Layers, outermost first:
//! - request id (kept from the client or generated)
//! - CORS from [`CorsOrigins`]
//! - request id copied onto the response
//! - HTTP tracing, one span per request carrying its id
//! - request timeout (408 with an empty body)
//! - panic recovery (400 with the generic error body)

use std::any::Any as PanicPayload;

use axum::{
    Router,
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::{HeaderName, HeaderValue};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::{CorsOrigins, ServerConfig};
use crate::error::ApiError;
use crate::routes;
use crate::state::AppState;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full application for `state`.
pub fn build_app(state: AppState) -> Router {
    let config = state.config().clone();
    apply_middleware(routes::build_router(state), &config)
}

/// Wrap `router` in the middleware stack configured by `config`.
pub fn apply_middleware(router: Router, config: &ServerConfig) -> Router {
    let timeout =
        TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout);
    let cors = cors_layer(&config.cors_allowed_origins);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(timeout)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(cors)
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[derive(Clone, Copy, Debug, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

fn request_span(request: &http::Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id,
    )
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_ERROR_MESSAGE;
    use quire_store::{Store, StoreConfig};
    use std::time::Duration;

    use axum::{body::to_bytes, extract::Request, routing::get};
    use tower::ServiceExt;

    async fn test_app(dir: &tempfile::TempDir) -> Router {
        let store = Store::open(StoreConfig::new(
            dir.path().join("content"),
            dir.path().join("storage"),
        ))
        .await
        .unwrap();
        build_app(AppState::new(store, ServerConfig::default()))
    }

    fn config_with_timeout(timeout: Duration) -> ServerConfig {
        ServerConfig {
            request_timeout: timeout,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_slow_request_times_out_with_empty_body() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "done"
            }),
        );
        let app = apply_middleware(router, &config_with_timeout(Duration::from_millis(50)));

        let response = app
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_fast_request_within_timeout() {
        let router = Router::new().route("/fast", get(|| async { "done" }));
        let app = apply_middleware(router, &config_with_timeout(Duration::from_secs(5)));

        let response = app
            .oneshot(Request::get("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_panicking_handler_gets_generic_error() {
        let router = Router::new().route(
            "/boom",
            get(|| async {
                if true {
                    panic!("secret detail");
                }
                "unreachable"
            }),
        );
        let app = apply_middleware(router, &ServerConfig::default());

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(GENERIC_ERROR_MESSAGE));
        assert!(!body.contains("secret detail"));
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(&dir)
            .await
            .oneshot(Request::get("/select").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_keeps_client_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(&dir)
            .await
            .oneshot(
                Request::get("/select")
                    .header(REQUEST_ID_HEADER, "trace-me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-me");
    }

    #[tokio::test]
    async fn test_cors_list_allows_configured_origin() {
        let layer = cors_layer(&CorsOrigins::List(vec![HeaderValue::from_static(
            "http://localhost:5173",
        )]));
        let app = Router::new()
            .route("/", axum::routing::get(|| async { "ok" }))
            .layer(layer);

        let response = app
            .oneshot(
                Request::get("/")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:5173"
        );
    }
}
