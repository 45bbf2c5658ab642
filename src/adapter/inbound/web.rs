//! Liveness and health endpoints.
//!
//! `GET /` answers as long as the process runs. `GET /health` also checks
//! that the database answers a query.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::port::HealthProbe;

/// An unexpected failure, reported as `500`.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": format!("An error occurred: {}", self.0) })),
        )
            .into_response()
    }
}

pub fn router<P: HealthProbe + 'static>(probe: Arc<P>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::<P>))
        .layer(CorsLayer::permissive())
        .with_state(probe)
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "I am alive" }))
}

async fn health<P: HealthProbe>(
    State(probe): State<Arc<P>>,
) -> std::result::Result<(StatusCode, Json<Value>), ApiError> {
    match probe.ping().await {
        Ok(()) => Ok((StatusCode::OK, Json(json!({ "status": "healthy" })))),
        Err(e @ (Error::Connection(_) | Error::Database(_))) => {
            warn!(error = %e, "Health check failed");
            Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "detail": e.to_string() })),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Serve until `shutdown` flips to `true`.
pub async fn serve<P: HealthProbe + 'static>(
    listener: TcpListener,
    probe: Arc<P>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Health server listening");
    axum::serve(listener, router(probe))
        .with_graceful_shutdown(async move {
            while shutdown.changed().await.is_ok() {
                if *shutdown.borrow() {
                    break;
                }
            }
        })
        .await?;
    info!("Health server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_is_internal_server_error() {
        let response = ApiError::from(Error::Parse("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
