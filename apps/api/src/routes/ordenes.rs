//! `/ordenes` handlers.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ventas_core::pagination::Filtered;
use ventas_core::validation::validate_date_range;
use ventas_core::{
    timestamp, OrdenForm, OrdenResponse, OrdenStats, OrdenUpdate, Page, ValidationError,
};

use super::{deleted, PageQuery};
use crate::error::{ApiError, ApiResult, OperationContext};
use crate::extract::{ApiQuery, ValidJson};
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/fecha", get(list_by_fecha))
        .route("/cliente/{cliente_id}", get(list_by_cliente))
        .route("/{id}", get(get_one).patch(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct FechaQuery {
    fecha_inicio: Option<String>,
    fecha_fin: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct FechaEcho {
    fecha_inicio: String,
    fecha_fin: String,
}

#[derive(Debug, Serialize)]
struct ClienteEcho {
    cliente_id: String,
}

async fn create(
    State(state): State<AppState>,
    ValidJson(form): ValidJson<OrdenForm>,
) -> ApiResult<Json<OrdenResponse>> {
    let orden = state.ordenes.create(form).await.during("creating orden")?;
    Ok(Json(orden))
}

async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Page<OrdenResponse>>> {
    let page = state
        .ordenes
        .list(query.pagination()?)
        .await
        .during("fetching ordenes")?;
    Ok(Json(page))
}

async fn list_by_cliente(
    State(state): State<AppState>,
    Path(cliente_id): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Filtered<OrdenResponse, ClienteEcho>>> {
    let page = state
        .ordenes
        .list_by_cliente(&cliente_id, query.pagination()?)
        .await
        .during("fetching ordenes by cliente")?;

    Ok(Json(page.with_filter(ClienteEcho { cliente_id })))
}

async fn list_by_fecha(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<FechaQuery>,
) -> ApiResult<Json<Filtered<OrdenResponse, FechaEcho>>> {
    let inicio = required_date("fecha_inicio", params.fecha_inicio.as_deref())?;
    let fin = required_date("fecha_fin", params.fecha_fin.as_deref())?;
    validate_date_range(&inicio, &fin)?;

    let pagination = PageQuery {
        page: params.page,
        limit: params.limit,
    }
    .pagination()?;

    let page = state
        .ordenes
        .list_by_fecha(inicio, fin, pagination)
        .await
        .during("fetching ordenes by fecha")?;

    Ok(Json(page.with_filter(FechaEcho {
        fecha_inicio: timestamp::format(&inicio),
        fecha_fin: timestamp::format(&fin),
    })))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<OrdenStats>> {
    let stats = state
        .ordenes
        .stats()
        .await
        .during("calculating orden stats")?;
    Ok(Json(stats))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrdenResponse>> {
    state
        .ordenes
        .get(&id)
        .await
        .during("fetching orden")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Orden"))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(update): ValidJson<OrdenUpdate>,
) -> ApiResult<Json<OrdenResponse>> {
    state
        .ordenes
        .update(&id, update)
        .await
        .during("updating orden")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Orden"))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let removed = state.ordenes.delete(&id).await.during("deleting orden")?;
    deleted("Orden", removed)
}

fn required_date(
    field: &str,
    raw: Option<&str>,
) -> Result<chrono::DateTime<chrono::Utc>, ValidationError> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => timestamp::parse(field, raw),
        _ => Err(ValidationError::required(field)),
    }
}
