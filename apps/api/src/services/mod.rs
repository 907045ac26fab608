//! # Resource Services
//!
//! One service per collection. Each owns an `Arc<dyn DocumentCollection>`
//! handed to it at construction and turns stored documents into API records.
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────────┐   ┌──────────────────────┐
//! │ ClienteService   │   │ ProductoService      │   │ OrdenService         │
//! │ create/list/get  │   │ + search             │   │ + list_by_cliente    │
//! │ update/delete    │   │ + list_by_categoria  │   │ + list_by_fecha      │
//! │                  │   │                      │   │ + stats              │
//! └────────┬─────────┘   └──────────┬───────────┘   └──────────┬───────────┘
//!          └────────────────────────┼──────────────────────────┘
//!                                   ▼
//!                       dyn DocumentCollection (ventas-db)
//! ```
//!
//! ## Outcomes
//! - Malformed id or no such document: `Ok(None)` / `Ok(false)`. A malformed
//!   id never reaches the store.
//! - Store failure or unreadable document: `Err(ServiceError)`.

mod cliente_service;
mod orden_service;
mod producto_service;

pub use cliente_service::ClienteService;
pub use orden_service::OrdenService;
pub use producto_service::ProductoService;

use tracing::{debug, warn};
use ventas_core::mapper::Mapped;
use ventas_core::{DocumentId, Pagination};
use ventas_db::{Document, DocumentCollection, Filter};

use crate::error::ServiceResult;

/// Parses a path id. Malformed ids are logged and yield `None`.
pub(crate) fn parse_id(collection: &'static str, raw: &str) -> Option<DocumentId> {
    match DocumentId::parse(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            debug!(collection, id = raw, error = %e, "Malformed id, skipping lookup");
            None
        }
    }
}

/// Unwraps a mapped record, logging whatever the mapper had to default.
pub(crate) fn log_notes<T>(collection: &'static str, id: &str, mapped: Mapped<T>) -> T {
    let defaulted = mapped.defaulted_fields();
    if !defaulted.is_empty() {
        warn!(collection, id, fields = ?defaulted, "Stored document missing timestamps, defaulted to now");
    }

    let unreadable = mapped.unreadable_items();
    if !unreadable.is_empty() {
        warn!(collection, id, positions = ?unreadable, "Unreadable order items left out of total");
    }

    mapped.into_record()
}

/// One page of matching documents plus the total match count.
pub(crate) async fn fetch_page(
    collection: &dyn DocumentCollection,
    filter: &Filter,
    pagination: Pagination,
) -> ServiceResult<(Vec<Document>, u64)> {
    let (docs, total) = tokio::try_join!(
        collection.find(filter, pagination.skip(), u64::from(pagination.limit)),
        collection.count(filter),
    )?;

    debug!(
        collection = collection.name(),
        page = pagination.page,
        returned = docs.len(),
        total,
        "Page fetched"
    );

    Ok((docs, total))
}

/// Applies a partial update and reads the document back.
///
/// `None` when no document has this id. An update that changes nothing
/// still returns the current document.
pub(crate) async fn apply_update(
    collection: &dyn DocumentCollection,
    id: DocumentId,
    set: Document,
) -> ServiceResult<Option<Document>> {
    let result = collection.update_one(id, set).await?;

    if result.matched == 0 {
        return Ok(None);
    }

    if result.modified == 0 {
        debug!(collection = collection.name(), id = %id, "Update left document unchanged");
    }

    Ok(collection.find_one(id).await?)
}
