//! # Validation Module
//!
//! Field-level rules for every payload the API accepts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: JSON extractor (axum)                                        │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Validate::validate() ← THIS MODULE                                │
//! │           │                                                             │
//! │           ▼  any failure → HTTP 400, service never called              │
//! │  Layer 2: Resource services                                            │
//! │  └── Identity check (malformed id → not found)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Document store                                               │
//! │  └── UNIQUE (collection, id)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ventas_core::validation::{validate_email, validate_genero};
//!
//! assert!(validate_email("ana@example.com").is_ok());
//! assert!(validate_genero("Otro").is_ok());
//! assert!(validate_genero("N/A").is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::{
    ClienteForm, ClienteUpdate, OrdenForm, OrdenItem, OrdenUpdate, ProductoForm, ProductoUpdate,
};
use crate::GENEROS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted customer name, in characters.
pub const MAX_NOMBRE_LEN: usize = 100;

/// Longest accepted free-text search.
pub const MAX_QUERY_LEN: usize = 100;

/// A payload that can check its own field constraints.
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a string field is present after trimming.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use ventas_core::validation::validate_nombre_cliente;
///
/// assert!(validate_nombre_cliente("Ana Solís").is_ok());
/// assert!(validate_nombre_cliente("").is_err());
/// assert!(validate_nombre_cliente(&"a".repeat(101)).is_err());
/// ```
pub fn validate_nombre_cliente(nombre: &str) -> ValidationResult<()> {
    let nombre = nombre.trim();

    if nombre.is_empty() {
        return Err(ValidationError::TooShort {
            field: "nombre".to_string(),
            min: 1,
        });
    }

    if nombre.chars().count() > MAX_NOMBRE_LEN {
        return Err(ValidationError::TooLong {
            field: "nombre".to_string(),
            max: MAX_NOMBRE_LEN,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let invalid = || ValidationError::invalid_format("email", "must be a valid email address");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let dotted = domain
        .split('.')
        .collect::<Vec<_>>();
    if dotted.len() < 2 || dotted.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a gender value against [`GENEROS`].
pub fn validate_genero(genero: &str) -> ValidationResult<()> {
    if GENEROS.contains(&genero) {
        return Ok(());
    }
    Err(ValidationError::NotAllowed {
        field: "genero".to_string(),
        allowed: GENEROS.iter().map(|g| g.to_string()).collect(),
    })
}

/// Validates a free-text product search.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.is_empty() {
        return Err(ValidationError::required("query"));
    }

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Line Item Validators
// =============================================================================

/// Validates one order line.
///
/// ## Rules
/// - `producto_id` present
/// - `cantidad` ≥ 1
/// - `precio_unit` ≥ 0
/// - `descuento_pct` within 0..=100 when given
pub fn validate_item(item: &OrdenItem) -> ValidationResult<()> {
    validate_required("producto_id", &item.producto_id)?;

    if item.cantidad < 1 {
        return Err(ValidationError::OutOfRange {
            field: "cantidad".to_string(),
            min: 1.0,
            max: i64::MAX as f64,
        });
    }

    if !item.precio_unit.is_finite() || item.precio_unit < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "precio_unit".to_string(),
            min: 0.0,
            max: f64::MAX,
        });
    }

    if let Some(pct) = item.descuento_pct {
        if !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: "descuento_pct".to_string(),
                min: 0.0,
                max: 100.0,
            });
        }
    }

    Ok(())
}

/// Validates the line items of an order: at least one, each valid.
pub fn validate_items(items: &[OrdenItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::required("items"));
    }
    items.iter().try_for_each(validate_item)
}

// =============================================================================
// Range Validators
// =============================================================================

/// Validates that a date range is not inverted. Equal bounds are allowed.
pub fn validate_date_range(inicio: &DateTime<Utc>, fin: &DateTime<Utc>) -> ValidationResult<()> {
    if inicio > fin {
        return Err(ValidationError::invalid_format(
            "fecha_inicio",
            "must not be after fecha_fin",
        ));
    }
    Ok(())
}

// =============================================================================
// Payload Rules
// =============================================================================

impl Validate for ClienteForm {
    fn validate(&self) -> ValidationResult<()> {
        validate_nombre_cliente(&self.nombre)?;
        validate_email(&self.email)?;
        validate_genero(&self.genero)?;
        validate_required("pais", &self.pais)
    }
}

impl Validate for ClienteUpdate {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(nombre) = &self.nombre {
            validate_nombre_cliente(nombre)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(genero) = &self.genero {
            validate_genero(genero)?;
        }
        if let Some(pais) = &self.pais {
            validate_required("pais", pais)?;
        }
        Ok(())
    }
}

impl Validate for ProductoForm {
    fn validate(&self) -> ValidationResult<()> {
        validate_required("nombre", &self.nombre)?;
        validate_required("categoria", &self.categoria)?;
        validate_required("codigo", &self.codigo)
    }
}

impl Validate for ProductoUpdate {
    // An empty categoria clears the category and is accepted.
    fn validate(&self) -> ValidationResult<()> {
        if let Some(nombre) = &self.nombre {
            validate_required("nombre", nombre)?;
        }
        if let Some(codigo) = &self.codigo {
            validate_required("codigo", codigo)?;
        }
        Ok(())
    }
}

impl Validate for OrdenForm {
    fn validate(&self) -> ValidationResult<()> {
        validate_required("cliente_id", &self.cliente_id)?;
        validate_required("canal", &self.canal)?;
        validate_required("moneda", &self.moneda)?;
        validate_items(&self.items)
    }
}

impl Validate for OrdenUpdate {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(cliente_id) = &self.cliente_id {
            validate_required("cliente_id", cliente_id)?;
        }
        if let Some(canal) = &self.canal {
            validate_required("canal", canal)?;
        }
        if let Some(moneda) = &self.moneda {
            validate_required("moneda", moneda)?;
        }
        if let Some(items) = &self.items {
            validate_items(items)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
