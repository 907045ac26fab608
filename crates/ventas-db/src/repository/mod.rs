//! # Repository Module
//!
//! The document collection interface and its SQLite implementation.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Resource service                                                      │
//! │       │                                                                 │
//! │       │  collection.find(&Filter::eq("cliente_id", id), skip, limit)   │
//! │       ▼                                                                 │
//! │  dyn DocumentCollection                                                │
//! │  ├── insert_one / find_one / find / count                              │
//! │  ├── update_one (partial set) / delete_one                             │
//! │  └── summarize (count, sum, avg, min, max of a numeric field)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteCollection ──► documents(seq, collection, id, body)             │
//! │                                                                         │
//! │  Tests swap in their own implementation of the trait.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod collection;
pub mod filter;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use ventas_core::DocumentId;

use crate::error::DbResult;

pub use collection::SqliteCollection;
pub use filter::Filter;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Collection holding customers.
pub const CLIENTES: &str = "clientes";
/// Collection holding products.
pub const PRODUCTOS: &str = "productos";
/// Collection holding orders.
pub const ORDENES: &str = "ordenes";

/// Outcome of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// Documents with the requested identity (0 or 1).
    pub matched: u64,
    /// Documents whose content actually changed (0 or 1).
    pub modified: u64,
}

/// Aggregate over one numeric field across a whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NumericSummary {
    pub count: u64,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Operations a resource service needs from its collection.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name, for logs and error context.
    fn name(&self) -> &'static str;

    /// Stores a new document under `id`. `_id` in the body is set to `id`.
    async fn insert_one(&self, id: DocumentId, doc: Document) -> DbResult<()>;

    async fn find_one(&self, id: DocumentId) -> DbResult<Option<Document>>;

    /// Matching documents in insertion order.
    async fn find(&self, filter: &Filter, skip: u64, limit: u64) -> DbResult<Vec<Document>>;

    async fn count(&self, filter: &Filter) -> DbResult<u64>;

    /// Applies `set` key by key to the document. Nothing is written when
    /// every key already holds the given value.
    async fn update_one(&self, id: DocumentId, set: Document) -> DbResult<UpdateResult>;

    /// Returns whether a document was removed.
    async fn delete_one(&self, id: DocumentId) -> DbResult<bool>;

    /// Aggregates `field` over every document where it is numeric. `None`
    /// when no document has a numeric value there.
    async fn summarize(&self, field: &str) -> DbResult<Option<NumericSummary>>;
}
