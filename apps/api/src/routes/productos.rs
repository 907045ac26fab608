//! `/productos` handlers.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ventas_core::pagination::Filtered;
use ventas_core::validation::validate_search_query;
use ventas_core::{Page, ProductoForm, ProductoResponse, ProductoUpdate};

use super::{deleted, PageQuery};
use crate::error::{ApiError, ApiResult, OperationContext};
use crate::extract::{ApiQuery, ValidJson};
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/categoria/{categoria}", get(list_by_categoria))
        .route("/{id}", get(get_one).patch(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: String,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SearchEcho {
    query: String,
}

#[derive(Debug, Serialize)]
struct CategoriaEcho {
    categoria: String,
}

async fn create(
    State(state): State<AppState>,
    ValidJson(form): ValidJson<ProductoForm>,
) -> ApiResult<Json<ProductoResponse>> {
    let producto = state
        .productos
        .create(form)
        .await
        .during("creating producto")?;
    Ok(Json(producto))
}

async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Page<ProductoResponse>>> {
    let page = state
        .productos
        .list(query.pagination()?)
        .await
        .during("fetching productos")?;
    Ok(Json(page))
}

async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Filtered<ProductoResponse, SearchEcho>>> {
    let query = validate_search_query(&params.query)?;
    let pagination = PageQuery {
        page: params.page,
        limit: params.limit,
    }
    .pagination()?;

    let page = state
        .productos
        .search(&query, pagination)
        .await
        .during("searching productos")?;

    Ok(Json(page.with_filter(SearchEcho { query })))
}

async fn list_by_categoria(
    State(state): State<AppState>,
    Path(categoria): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Filtered<ProductoResponse, CategoriaEcho>>> {
    let page = state
        .productos
        .list_by_categoria(&categoria, query.pagination()?)
        .await
        .during("fetching productos by categoria")?;

    Ok(Json(page.with_filter(CategoriaEcho { categoria })))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductoResponse>> {
    state
        .productos
        .get(&id)
        .await
        .during("fetching producto")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Producto"))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(update): ValidJson<ProductoUpdate>,
) -> ApiResult<Json<ProductoResponse>> {
    state
        .productos
        .update(&id, update)
        .await
        .during("updating producto")?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Producto"))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let removed = state
        .productos
        .delete(&id)
        .await
        .during("deleting producto")?;
    deleted("Producto", removed)
}
