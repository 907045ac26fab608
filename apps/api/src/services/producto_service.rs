//! Product service: CRUD plus text search and category listing.

use std::sync::Arc;

use tracing::info;
use ventas_core::mapper::{decode, map_producto, to_document};
use ventas_core::{
    timestamp, DocumentId, Page, Pagination, ProductoDocument, ProductoForm, ProductoResponse,
    ProductoUpdate,
};
use ventas_db::{Document, DocumentCollection, Filter, PRODUCTOS};

use super::{apply_update, fetch_page, log_notes, parse_id};
use crate::error::ServiceResult;

/// Operations over the `productos` collection.
#[derive(Clone)]
pub struct ProductoService {
    collection: Arc<dyn DocumentCollection>,
}

impl ProductoService {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        ProductoService { collection }
    }

    pub async fn create(&self, form: ProductoForm) -> ServiceResult<ProductoResponse> {
        let id = DocumentId::generate();
        let doc = ProductoDocument::new(id, form, timestamp::now());

        self.collection
            .insert_one(id, to_document(PRODUCTOS, &doc)?)
            .await?;

        info!(id = %id, categoria = ?doc.categoria, "Producto created");

        Ok(map_producto(doc).into_record())
    }

    pub async fn list(&self, pagination: Pagination) -> ServiceResult<Page<ProductoResponse>> {
        self.page(&Filter::All, pagination).await
    }

    /// Products whose `nombre` or `categoria` contains `query`, ignoring case.
    ///
    /// `query` is expected trimmed and non-empty.
    pub async fn search(
        &self,
        query: &str,
        pagination: Pagination,
    ) -> ServiceResult<Page<ProductoResponse>> {
        let filter = Filter::Or(vec![
            Filter::contains_ignore_case("nombre", query),
            Filter::contains_ignore_case("categoria", query),
        ]);
        self.page(&filter, pagination).await
    }

    /// Products in exactly this category.
    pub async fn list_by_categoria(
        &self,
        categoria: &str,
        pagination: Pagination,
    ) -> ServiceResult<Page<ProductoResponse>> {
        self.page(&Filter::eq("categoria", categoria), pagination)
            .await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Option<ProductoResponse>> {
        let Some(id) = parse_id(PRODUCTOS, id) else {
            return Ok(None);
        };

        self.collection
            .find_one(id)
            .await?
            .map(map)
            .transpose()
    }

    pub async fn update(
        &self,
        id: &str,
        update: ProductoUpdate,
    ) -> ServiceResult<Option<ProductoResponse>> {
        let Some(id) = parse_id(PRODUCTOS, id) else {
            return Ok(None);
        };

        let set = to_document(PRODUCTOS, &update)?;

        apply_update(self.collection.as_ref(), id, set)
            .await?
            .map(map)
            .transpose()
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<bool> {
        let Some(id) = parse_id(PRODUCTOS, id) else {
            return Ok(false);
        };

        let deleted = self.collection.delete_one(id).await?;
        if deleted {
            info!(id = %id, "Producto deleted");
        }
        Ok(deleted)
    }

    async fn page(
        &self,
        filter: &Filter,
        pagination: Pagination,
    ) -> ServiceResult<Page<ProductoResponse>> {
        let (docs, total) = fetch_page(self.collection.as_ref(), filter, pagination).await?;
        let data = docs.into_iter().map(map).collect::<ServiceResult<Vec<_>>>()?;
        Ok(Page::new(data, total, pagination))
    }
}

fn map(raw: Document) -> ServiceResult<ProductoResponse> {
    let doc: ProductoDocument = decode(PRODUCTOS, raw)?;
    let id = doc.id.to_string();
    Ok(log_notes(PRODUCTOS, &id, map_producto(doc)))
}
