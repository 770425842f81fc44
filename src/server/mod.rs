//! HTTP surface using axum.
//!
//! Endpoints:
//! - POST /predict      - run one assessment
//! - POST /api/predict  - same, at the path the browser client calls
//! - GET  /health       - liveness and default mode
//!
//! Any other method on the prediction paths returns 405 with a JSON body.
//! OPTIONS is answered by CORS only when it carries `Origin` and
//! `Access-Control-Request-Method`; a bare OPTIONS gets the same 405.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::PredictionService;
use crate::ports::{InferenceProvider, RiskSource};

pub use error::ApiError;
pub use handlers::MOCK_MODE_HEADER;

/// Build the router around a shared, immutable prediction service.
pub fn router<P, R>(service: Arc<PredictionService<P, R>>) -> Router
where
    P: InferenceProvider + 'static,
    R: RiskSource + 'static,
{
    let predict = post(handlers::predict::<P, R>).fallback(handlers::method_not_allowed);

    Router::new()
        .route("/predict", predict.clone())
        .route("/api/predict", predict)
        .route("/health", get(handlers::health::<P, R>))
        .with_state(service)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(reject_bare_options))
        .layer(TraceLayer::new_for_http())
}

fn is_preflight(request: &Request) -> bool {
    let headers = request.headers();
    headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Keep CORS from answering OPTIONS requests that are not preflights.
async fn reject_bare_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS && !is_preflight(&request) {
        return ApiError::MethodNotAllowed.into_response();
    }
    next.run(request).await
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
/// Returns an I/O error if the listener cannot be bound or the server fails.
pub async fn serve<P, R>(addr: SocketAddr, service: Arc<PredictionService<P, R>>) -> std::io::Result<()>
where
    P: InferenceProvider + 'static,
    R: RiskSource + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{addr}");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
