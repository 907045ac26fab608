//! # HTTP Routes
//!
//! ```text
//! GET  /                      status
//! GET  /health                store health (200 / 503)
//! /clientes                   clientes::router
//! /productos                  productos::router
//! /ordenes                    ordenes::router
//! ```

mod clientes;
mod ordenes;
mod productos;

use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;
use ventas_core::{Pagination, ValidationError};

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/clientes", clientes::router())
        .nest("/productos", productos::router())
        .nest("/ordenes", ordenes::router())
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record("latency_ms", latency.as_millis() as u64);
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "API is running" }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "healthy" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route")
}

/// `page` and `limit` query parameters.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Result<Pagination, ValidationError> {
        Pagination::from_query(self.page, self.limit)
    }
}

/// `{"message": "<resource> deleted successfully"}`, or 404.
pub(crate) fn deleted(resource: &str, removed: bool) -> Result<Json<Value>, ApiError> {
    if removed {
        Ok(Json(json!({ "message": format!("{resource} deleted successfully") })))
    } else {
        Err(ApiError::not_found(resource))
    }
}
