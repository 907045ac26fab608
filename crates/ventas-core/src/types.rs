//! # Domain Types
//!
//! Core domain types used throughout the Ventas API.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │   payload (in)           stored document            response (out)      │
//! │  ─────────────          ─────────────────          ───────────────      │
//! │  ClienteForm    ──►     ClienteDocument    ──►     ClienteResponse      │
//! │  ClienteUpdate                                                          │
//! │  ProductoForm   ──►     ProductoDocument   ──►     ProductoResponse     │
//! │  ProductoUpdate                                                         │
//! │  OrdenForm      ──►     OrdenDocument      ──►     OrdenResponse        │
//! │  OrdenUpdate              (items verbatim)           (total recomputed) │
//! │                                                                         │
//! │                         OrdenStats (collection-wide aggregate)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Naming
//! Field names are the wire names of the API (`nombre`, `precio_unit`, ...).
//! Stored documents keep their identity under `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::id::DocumentId;
use crate::money::{calculate_total, Money};
use crate::timestamp;

// =============================================================================
// Preferences
// =============================================================================

/// Value of a single customer preference.
///
/// Stored preferences are a mapping from category to either one value or a
/// list of values. Anything else found in storage is kept as raw JSON and
/// rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenciaValor {
    /// Several values, e.g. `["rojo", "azul"]`.
    Lista(Vec<String>),
    /// A single value.
    Texto(String),
    /// Numbers, booleans or other legacy shapes.
    Otro(Value),
}

impl PreferenciaValor {
    /// Renders the value as one string: lists are comma-joined, scalars are
    /// stringified as-is.
    pub fn texto(&self) -> String {
        match self {
            PreferenciaValor::Lista(values) => values.join(","),
            PreferenciaValor::Texto(value) => value.clone(),
            PreferenciaValor::Otro(Value::String(value)) => value.clone(),
            PreferenciaValor::Otro(Value::Null) => String::new(),
            PreferenciaValor::Otro(other) => other.to_string(),
        }
    }
}

/// Stored preference mapping, category → value(s), in the order the client
/// sent the categories.
pub type Preferencias = IndexMap<String, PreferenciaValor>;

/// One preference as surfaced by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferencia {
    pub categoria: String,
    pub texto: String,
}

// =============================================================================
// Cliente
// =============================================================================

/// Customer document as held in the `clientes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClienteDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub nombre: String,
    pub email: String,
    pub genero: String,
    pub pais: String,
    #[serde(default, with = "timestamp::option")]
    pub creado: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferencias: Option<Preferencias>,
}

impl ClienteDocument {
    /// Builds the document for a newly created customer.
    pub fn new(id: DocumentId, form: ClienteForm, now: DateTime<Utc>) -> Self {
        ClienteDocument {
            id,
            nombre: form.nombre,
            email: form.email,
            genero: form.genero,
            pais: form.pais,
            creado: Some(now),
            preferencias: form.preferencias,
        }
    }
}

/// Payload for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClienteForm {
    pub nombre: String,
    pub email: String,
    pub genero: String,
    pub pais: String,
    #[serde(default)]
    pub preferencias: Option<Preferencias>,
}

/// Partial customer update. Only supplied fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClienteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genero: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pais: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferencias: Option<Preferencias>,
}

/// Customer as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClienteResponse {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub genero: String,
    pub pais: String,
    #[serde(with = "timestamp")]
    pub creado: DateTime<Utc>,
    pub preferencias: Vec<Preferencia>,
}

// =============================================================================
// Producto
// =============================================================================

/// Cross-reference codes linking a product to other catalogs.
///
/// Both keys are always present on the wire; unknown codes are `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equivalencias {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub codigo_alt: Option<String>,
}

/// Product document as held in the `productos` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub nombre: String,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equivalencias: Option<Equivalencias>,
    #[serde(default, with = "timestamp::option")]
    pub creado: Option<DateTime<Utc>>,
}

impl ProductoDocument {
    /// Builds the document for a newly created product.
    pub fn new(id: DocumentId, form: ProductoForm, now: DateTime<Utc>) -> Self {
        ProductoDocument {
            id,
            nombre: form.nombre,
            categoria: Some(form.categoria),
            codigo: Some(form.codigo),
            equivalencias: form.equivalencias,
            creado: Some(now),
        }
    }
}

/// Payload for creating a product.
///
/// `codigo_mongo` and `categoriasAdicionales` are accepted as the names the
/// web front end sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductoForm {
    pub nombre: String,
    pub categoria: String,
    #[serde(alias = "codigo_mongo")]
    pub codigo: String,
    #[serde(default, alias = "categoriasAdicionales")]
    pub equivalencias: Option<Equivalencias>,
}

/// Partial product update.
///
/// `categoria` may be set to `""`, which clears the category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(
        default,
        alias = "codigo_mongo",
        skip_serializing_if = "Option::is_none"
    )]
    pub codigo: Option<String>,
    #[serde(
        default,
        alias = "categoriasAdicionales",
        skip_serializing_if = "Option::is_none"
    )]
    pub equivalencias: Option<Equivalencias>,
}

/// Product as returned by the API.
///
/// The stored `codigo` is surfaced as `codigo_mongo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoResponse {
    pub id: String,
    pub codigo_mongo: String,
    pub nombre: String,
    pub categoria: String,
    pub equivalencias: Option<Equivalencias>,
}

// =============================================================================
// Orden
// =============================================================================

/// A line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdenItem {
    pub producto_id: String,
    pub cantidad: i64,
    pub precio_unit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descuento_pct: Option<f64>,
}

impl OrdenItem {
    /// Creates a line item.
    pub fn new(
        producto_id: impl Into<String>,
        cantidad: i64,
        precio_unit: f64,
        descuento_pct: Option<f64>,
    ) -> Self {
        OrdenItem {
            producto_id: producto_id.into(),
            cantidad,
            precio_unit,
            descuento_pct,
        }
    }

    /// Unit price after the discount, if any.
    pub fn unit_price(&self) -> Money {
        let precio = Money::from_f64(self.precio_unit);
        match self.descuento_pct {
            Some(pct) if pct != 0.0 => precio.apply_percentage_discount(pct),
            _ => precio,
        }
    }

    /// Unrounded contribution of this line to the order total.
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.cantidad)
    }
}

/// Order document as held in the `ordenes` collection.
///
/// `items` stays as raw JSON: the API passes stored items through verbatim,
/// and a malformed item must not make the whole order unreadable. The stored
/// `total` is never trusted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdenDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub cliente_id: String,
    #[serde(with = "timestamp")]
    pub fecha: DateTime<Utc>,
    pub canal: String,
    pub moneda: String,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default, with = "timestamp::option")]
    pub creado: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub actualizado: Option<DateTime<Utc>>,
}

impl OrdenDocument {
    /// Builds the document for a newly created order, with its total
    /// computed from the items.
    pub fn new(id: DocumentId, form: OrdenForm, now: DateTime<Utc>) -> CoreResult<Self> {
        let total = calculate_total(&form.items);
        let items = form
            .items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::MalformedDocument {
                collection: "ordenes",
                reason: e.to_string(),
            })?;

        Ok(OrdenDocument {
            id,
            cliente_id: form.cliente_id,
            fecha: form.fecha,
            canal: form.canal,
            moneda: form.moneda,
            items,
            descripcion: form.descripcion,
            total: Some(total),
            creado: Some(now),
            actualizado: Some(now),
        })
    }
}

/// Payload for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdenForm {
    pub cliente_id: String,
    #[serde(with = "timestamp")]
    pub fecha: DateTime<Utc>,
    pub canal: String,
    pub moneda: String,
    pub items: Vec<OrdenItem>,
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// Partial order update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdenUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_id: Option<String>,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moneda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrdenItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// Order as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdenResponse {
    pub id: String,
    pub cliente_id: String,
    #[serde(with = "timestamp")]
    pub fecha: DateTime<Utc>,
    pub canal: String,
    pub moneda: String,
    pub items: Vec<Value>,
    pub descripcion: Option<String>,
    pub total: f64,
    #[serde(with = "timestamp")]
    pub creado: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub actualizado: DateTime<Utc>,
}

/// Collection-wide order statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrdenStats {
    pub total_ordenes: u64,
    pub total_revenue: f64,
    pub avg_order_value: f64,
    pub min_order_value: f64,
    pub max_order_value: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preferencia_valor_shapes() {
        let prefs: Preferencias = serde_json::from_value(json!({
            "colores": ["rojo", "azul"],
            "canal": "WEB",
            "talla": 42,
        }))
        .unwrap();

        assert_eq!(
            prefs["colores"],
            PreferenciaValor::Lista(vec!["rojo".into(), "azul".into()])
        );
        assert_eq!(prefs["canal"], PreferenciaValor::Texto("WEB".into()));
        assert_eq!(prefs["talla"].texto(), "42");
    }

    #[test]
    fn test_preferencias_keep_category_order() {
        let raw = json!({
            "_id": DocumentId::generate(),
            "nombre": "Ana",
            "email": "ana@example.com",
            "genero": "F",
            "pais": "CR",
            "preferencias": {"talla": "M", "colores": ["rojo"], "canal": "WEB"},
        });

        let doc: ClienteDocument = serde_json::from_value(raw).unwrap();
        let prefs = doc.preferencias.as_ref().unwrap();
        let keys: Vec<_> = prefs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["talla", "colores", "canal"]);

        // Back through the stored JSON form
        let stored = serde_json::to_string(&doc).unwrap();
        let reread: ClienteDocument = serde_json::from_str(&stored).unwrap();
        let keys: Vec<_> = reread.preferencias.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["talla", "colores", "canal"]);
    }

    #[test]
    fn test_equivalencias_serialize_both_keys() {
        let eq = Equivalencias {
            sku: Some("SKU-1".into()),
            codigo_alt: None,
        };
        assert_eq!(
            serde_json::to_value(&eq).unwrap(),
            json!({"sku": "SKU-1", "codigo_alt": null})
        );
    }

    #[test]
    fn test_producto_form_accepts_front_end_names() {
        let form: ProductoForm = serde_json::from_value(json!({
            "nombre": "Café 500g",
            "categoria": "Bebidas",
            "codigo_mongo": "CAF-500",
            "categoriasAdicionales": {"sku": "7441", "codigo_alt": "C5"},
        }))
        .unwrap();

        assert_eq!(form.codigo, "CAF-500");
        assert_eq!(form.equivalencias.unwrap().codigo_alt.as_deref(), Some("C5"));
    }

    #[test]
    fn test_update_skips_unset_fields_and_ignores_creado() {
        let update: ClienteUpdate = serde_json::from_value(json!({
            "pais": "Costa Rica",
            "creado": "2020-01-01T00:00:00Z",
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"pais": "Costa Rica"})
        );
    }

    #[test]
    fn test_orden_item_discount_only_when_non_zero() {
        let item = OrdenItem::new("p", 1, 10.0, Some(0.0));
        assert_eq!(item.unit_price().to_f64(), 10.0);

        let item = OrdenItem::new("p", 1, 10.0, Some(25.0));
        assert_eq!(item.unit_price().to_f64(), 7.5);
    }

    #[test]
    fn test_orden_document_tolerates_missing_items() {
        let doc: OrdenDocument = serde_json::from_value(json!({
            "_id": "550e8400-e29b-41d4-a716-446655440000",
            "cliente_id": "c-1",
            "fecha": "2024-02-01",
            "canal": "WEB",
            "moneda": "CRC",
        }))
        .unwrap();

        assert!(doc.items.is_empty());
        assert!(doc.creado.is_none());
    }

    #[test]
    fn test_orden_document_new_stores_total() {
        use chrono::TimeZone;

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let form = OrdenForm {
            cliente_id: "c-1".into(),
            fecha: now,
            canal: "WEB".into(),
            moneda: "USD".into(),
            items: vec![
                OrdenItem::new("p-1", 2, 10.0, Some(10.0)),
                OrdenItem::new("p-2", 1, 5.0, None),
            ],
            descripcion: None,
        };

        let doc = OrdenDocument::new(DocumentId::generate(), form, now).unwrap();

        assert_eq!(doc.total, Some(23.0));
        assert_eq!(doc.creado, Some(now));
        assert_eq!(doc.actualizado, Some(now));
        assert_eq!(doc.items[1], json!({"producto_id": "p-2", "cantidad": 1, "precio_unit": 5.0}));
    }
}
