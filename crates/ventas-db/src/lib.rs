//! # ventas-db: Document Store for the Ventas API
//!
//! JSON documents grouped into named collections, kept in SQLite and
//! accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ventas Data Flow                                 │
//! │                                                                         │
//! │  Resource service (ClienteService, ...)                                │
//! │       │  Arc<dyn DocumentCollection>                                    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ventas-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌──────────────┐ │   │
//! │  │   │   Database    │    │   repository     │   │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                  │   │  (embedded)  │ │   │
//! │  │   │               │    │ DocumentCollection│   │              │ │   │
//! │  │   │ SqlitePool    │◄───│ SqliteCollection │   │ 001_documents│ │   │
//! │  │   │ DbConfig      │    │ Filter           │   │              │ │   │
//! │  │   └───────────────┘    └──────────────────┘   └──────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (DATABASE_PATH), WAL journal                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Store error types
//! - [`repository`] - Collection interface, filters, SQLite implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ventas_db::{Database, DbConfig, DocumentCollection, Filter};
//!
//! let db = Database::new(DbConfig::new("ventas.db")).await?;
//! let bebidas = db
//!     .productos()
//!     .find(&Filter::eq("categoria", "Bebidas"), 0, 20)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    Document, DocumentCollection, Filter, NumericSummary, SqliteCollection, UpdateResult,
    CLIENTES, ORDENES, PRODUCTOS,
};
