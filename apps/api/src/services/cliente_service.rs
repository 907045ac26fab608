//! Customer service.

use std::sync::Arc;

use tracing::info;
use ventas_core::mapper::{decode, map_cliente, to_document};
use ventas_core::{
    timestamp, ClienteDocument, ClienteForm, ClienteResponse, ClienteUpdate, DocumentId, Page,
    Pagination,
};
use ventas_db::{Document, DocumentCollection, Filter, CLIENTES};

use super::{apply_update, fetch_page, log_notes, parse_id};
use crate::error::ServiceResult;

/// CRUD over the `clientes` collection.
#[derive(Clone)]
pub struct ClienteService {
    collection: Arc<dyn DocumentCollection>,
}

impl ClienteService {
    /// Create a new customer service.
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        ClienteService { collection }
    }

    pub async fn create(&self, form: ClienteForm) -> ServiceResult<ClienteResponse> {
        let id = DocumentId::generate();
        let now = timestamp::now();
        let doc = ClienteDocument::new(id, form, now);

        self.collection
            .insert_one(id, to_document(CLIENTES, &doc)?)
            .await?;

        info!(id = %id, "Cliente created");

        Ok(map_cliente(doc, now).into_record())
    }

    pub async fn list(&self, pagination: Pagination) -> ServiceResult<Page<ClienteResponse>> {
        let (docs, total) = fetch_page(self.collection.as_ref(), &Filter::All, pagination).await?;

        let data = docs
            .into_iter()
            .map(map)
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Page::new(data, total, pagination))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Option<ClienteResponse>> {
        let Some(id) = parse_id(CLIENTES, id) else {
            return Ok(None);
        };

        self.collection
            .find_one(id)
            .await?
            .map(map)
            .transpose()
    }

    /// Applies the supplied fields. `None` when there is no such customer.
    pub async fn update(
        &self,
        id: &str,
        update: ClienteUpdate,
    ) -> ServiceResult<Option<ClienteResponse>> {
        let Some(id) = parse_id(CLIENTES, id) else {
            return Ok(None);
        };

        let set = to_document(CLIENTES, &update)?;

        apply_update(self.collection.as_ref(), id, set)
            .await?
            .map(map)
            .transpose()
    }

    /// Returns whether a customer was removed.
    pub async fn delete(&self, id: &str) -> ServiceResult<bool> {
        let Some(id) = parse_id(CLIENTES, id) else {
            return Ok(false);
        };

        let deleted = self.collection.delete_one(id).await?;
        if deleted {
            info!(id = %id, "Cliente deleted");
        }
        Ok(deleted)
    }
}

fn map(raw: Document) -> ServiceResult<ClienteResponse> {
    let doc: ClienteDocument = decode(CLIENTES, raw)?;
    let id = doc.id.to_string();
    Ok(log_notes(CLIENTES, &id, map_cliente(doc, timestamp::now())))
}
