//! `/clientes` handlers.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use ventas_core::{ClienteForm, ClienteResponse, ClienteUpdate, Page};

use super::{deleted, PageQuery};
use crate::error::{ApiError, ApiResult, OperationContext};
use crate::extract::{ApiQuery, ValidJson};
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).patch(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    ValidJson(form): ValidJson<ClienteForm>,
) -> ApiResult<Json<ClienteResponse>> {
    let cliente = state.clientes.create(form).await.during("creating cliente")?;
    Ok(Json(cliente))
}

async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Page<ClienteResponse>>> {
    let page = state
        .clientes
        .list(query.pagination()?)
        .await
        .during("fetching clientes")?;
    Ok(Json(page))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ClienteResponse>> {
    state
        .clientes
        .get(&id)
        .await
        .during("fetching cliente")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Cliente"))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(update): ValidJson<ClienteUpdate>,
) -> ApiResult<Json<ClienteResponse>> {
    state
        .clientes
        .update(&id, update)
        .await
        .during("updating cliente")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Cliente"))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let removed = state.clientes.delete(&id).await.during("deleting cliente")?;
    deleted("Cliente", removed)
}
