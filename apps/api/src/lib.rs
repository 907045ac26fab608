//! # Ventas API
//!
//! HTTP server exposing customers, products and orders.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Ventas API                                     │
//! │                                                                         │
//! │  ┌────────────────────────────────────────────────────────────────────┐ │
//! │  │  routes (axum)                                                     │ │
//! │  │  ValidJson / ApiQuery extractors ──► 400 before any service call  │ │
//! │  └──────────────────────────────┬─────────────────────────────────────┘ │
//! │                                 ▼                                       │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐ │
//! │  │ ClienteService │  │ProductoService │  │  OrdenService              │ │
//! │  │                │  │ • search       │  │ • list_by_cliente          │ │
//! │  │ CRUD           │  │ • by categoria │  │ • list_by_fecha  • stats   │ │
//! │  └───────┬────────┘  └───────┬────────┘  └─────────────┬──────────────┘ │
//! │          └───────────────────┼─────────────────────────┘                │
//! │                              ▼                                          │
//! │              Arc<dyn DocumentCollection> (ventas-db)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is read first when present):
//! - `BACKEND_HOST` / `BACKEND_PORT` - bind address (default `0.0.0.0:8000`)
//! - `DATABASE_PATH` - SQLite file (default `ventas.db`)
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default 5)
//! - `FRONTEND_URI` / `FRONTEND_PORT` - CORS origin (default `localhost:5173`)
//! - `LOG_FORMAT` - `pretty` or `json`; `RUST_LOG` overrides the filter

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod routes;
pub mod services;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ServiceError};
pub use routes::router;
pub use state::AppState;
