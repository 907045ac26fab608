//! # ventas-core: Pure Business Logic for the Ventas API
//!
//! This crate holds every rule of the sales API that can be expressed as a
//! pure function: order totals, pagination arithmetic, the mapping from
//! stored documents to response records, and payload validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ventas Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP routes (axum)                           │   │
//! │  │    /clientes  /productos  /ordenes                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Resource services                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ventas-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ pagination│  │ validation│  │   │
//! │  │   │  Cliente  │  │  Money    │  │ Pagination│  │  Validate │  │   │
//! │  │   │  Orden    │  │  totals   │  │  Page<T>  │  │  rules    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                        ┌───────────┐                           │   │
//! │  │                        │  mapper   │                           │   │
//! │  │                        └───────────┘                           │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ventas-db (Document store)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Stored documents, payloads and response records
//! - [`money`] - Order total calculation
//! - [`pagination`] - page/limit → skip, total pages
//! - [`mapper`] - Document → response transforms
//! - [`validation`] - Payload validation rules
//! - [`id`] - Document identities
//! - [`timestamp`] - Canonical timestamp format
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use ventas_core::money::calculate_total;
//! use ventas_core::types::OrdenItem;
//!
//! let items = vec![
//!     OrdenItem::new("p1", 2, 10.0, Some(10.0)),
//!     OrdenItem::new("p2", 1, 5.0, None),
//! ];
//!
//! // 2 × 10.00 × 0.9 + 5.00
//! assert_eq!(calculate_total(&items), 23.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod id;
pub mod mapper;
pub mod money;
pub mod pagination;
pub mod timestamp;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use id::DocumentId;
pub use money::Money;
pub use pagination::{Page, Pagination};
pub use types::*;
pub use validation::Validate;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page served when the client does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size served when the client does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size a list endpoint accepts.
pub const MAX_LIMIT: u32 = 100;

/// Allowed values for `Cliente::genero`.
pub const GENEROS: &[&str] = &["Masculino", "Femenino", "Otro"];
