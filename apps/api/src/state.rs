//! Shared application state.

use std::sync::Arc;

use ventas_db::Database;

use crate::services::{ClienteService, OrdenService, ProductoService};

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Store handle, for health checks.
    pub db: Database,
    pub clientes: ClienteService,
    pub productos: ProductoService,
    pub ordenes: OrdenService,
}

impl AppState {
    /// Wires every service to its collection in `db`.
    pub fn new(db: Database) -> Self {
        let clientes = ClienteService::new(Arc::new(db.clientes()));
        let productos = ProductoService::new(Arc::new(db.productos()));
        let ordenes = OrdenService::new(Arc::new(db.ordenes()));
        Self::with_services(db, clientes, productos, ordenes)
    }

    /// Uses the given services instead of ones built from `db`.
    pub fn with_services(
        db: Database,
        clientes: ClienteService,
        productos: ProductoService,
        ordenes: OrdenService,
    ) -> Self {
        AppState {
            db,
            clientes,
            productos,
            ordenes,
        }
    }
}
