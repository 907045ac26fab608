//! # Document Mapper
//!
//! Pure transforms from stored documents to API response records.
//!
//! ```text
//! ┌───────────────────┐   decode()   ┌──────────────────┐   map_*()   ┌──────────────────┐
//! │ JSON object (raw) │ ───────────► │ *Document (typed)│ ──────────► │ *Response (API)  │
//! └───────────────────┘              └──────────────────┘             └──────────────────┘
//!                                                                       + MappingNote list
//! ```
//!
//! Mapping never fails once a document has been decoded. Gaps in stored data
//! (missing timestamps, unreadable line items) are filled with defaults and
//! reported as [`MappingNote`]s so the caller can log them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::money::calculate_total;
use crate::types::{
    ClienteDocument, ClienteResponse, OrdenDocument, OrdenItem, OrdenResponse, Preferencia,
    Preferencias, ProductoDocument, ProductoResponse,
};

// =============================================================================
// Mapping Output
// =============================================================================

/// Something the mapper had to paper over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingNote {
    /// A timestamp field was absent and was filled with "now".
    DefaultedTimestamp(&'static str),
    /// The item at this position is not a readable line item and was left
    /// out of the total.
    UnreadableItem(usize),
}

/// A mapped record with the notes produced while mapping it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    pub record: T,
    pub notes: Vec<MappingNote>,
}

impl<T> Mapped<T> {
    fn clean(record: T) -> Self {
        Mapped {
            record,
            notes: Vec::new(),
        }
    }

    /// Drops the notes.
    pub fn into_record(self) -> T {
        self.record
    }

    /// Names of the timestamp fields that were defaulted.
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        self.notes
            .iter()
            .filter_map(|note| match note {
                MappingNote::DefaultedTimestamp(field) => Some(*field),
                MappingNote::UnreadableItem(_) => None,
            })
            .collect()
    }

    /// Positions of the items left out of the total.
    pub fn unreadable_items(&self) -> Vec<usize> {
        self.notes
            .iter()
            .filter_map(|note| match note {
                MappingNote::UnreadableItem(index) => Some(*index),
                MappingNote::DefaultedTimestamp(_) => None,
            })
            .collect()
    }
}

// =============================================================================
// Raw Document Conversion
// =============================================================================

/// Decodes a raw stored object into its typed document.
pub fn decode<T: DeserializeOwned>(collection: &'static str, raw: Map<String, Value>) -> CoreResult<T> {
    serde_json::from_value(Value::Object(raw)).map_err(|e| CoreError::MalformedDocument {
        collection,
        reason: e.to_string(),
    })
}

/// Encodes a document or partial update as a raw object.
///
/// Fields skipped during serialization (unset update fields) do not appear
/// in the result.
pub fn to_document<T: Serialize>(collection: &'static str, value: &T) -> CoreResult<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CoreError::MalformedDocument {
            collection,
            reason: format!("expected an object, got {other}"),
        }),
        Err(e) => Err(CoreError::MalformedDocument {
            collection,
            reason: e.to_string(),
        }),
    }
}

// =============================================================================
// Cliente
// =============================================================================

/// Flattens stored preferences into `{categoria, texto}` pairs, keeping the
/// stored category order. Absent preferences give an empty list.
pub fn normalize_preferencias(preferencias: Option<&Preferencias>) -> Vec<Preferencia> {
    preferencias
        .map(|prefs| {
            prefs
                .iter()
                .map(|(categoria, valor)| Preferencia {
                    categoria: categoria.clone(),
                    texto: valor.texto(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Maps a stored customer.
pub fn map_cliente(doc: ClienteDocument, now: DateTime<Utc>) -> Mapped<ClienteResponse> {
    let mut notes = Vec::new();
    let creado = or_now(doc.creado, "creado", now, &mut notes);

    Mapped {
        record: ClienteResponse {
            id: doc.id.to_string(),
            preferencias: normalize_preferencias(doc.preferencias.as_ref()),
            nombre: doc.nombre,
            email: doc.email,
            genero: doc.genero,
            pais: doc.pais,
            creado,
        },
        notes,
    }
}

// =============================================================================
// Producto
// =============================================================================

/// Maps a stored product.
///
/// `equivalencias` is null exactly when the category is missing or empty;
/// otherwise both keys are always present.
pub fn map_producto(doc: ProductoDocument) -> Mapped<ProductoResponse> {
    let categoria = doc.categoria.unwrap_or_default();
    let equivalencias = if categoria.is_empty() {
        None
    } else {
        Some(doc.equivalencias.unwrap_or_default())
    };

    Mapped::clean(ProductoResponse {
        id: doc.id.to_string(),
        codigo_mongo: doc.codigo.unwrap_or_default(),
        nombre: doc.nombre,
        categoria,
        equivalencias,
    })
}

// =============================================================================
// Orden
// =============================================================================

/// Reads raw stored items as line items.
///
/// Returns the readable items and the positions of the ones that could not
/// be read.
pub fn parse_items(raw: &[Value]) -> (Vec<OrdenItem>, Vec<usize>) {
    let mut items = Vec::with_capacity(raw.len());
    let mut unreadable = Vec::new();

    for (index, value) in raw.iter().enumerate() {
        match OrdenItem::deserialize(value) {
            Ok(item) => items.push(item),
            Err(_) => unreadable.push(index),
        }
    }

    (items, unreadable)
}

/// Maps a stored order, recomputing its total from the stored items.
pub fn map_orden(doc: OrdenDocument, now: DateTime<Utc>) -> Mapped<OrdenResponse> {
    let mut notes = Vec::new();
    let creado = or_now(doc.creado, "creado", now, &mut notes);
    let actualizado = or_now(doc.actualizado, "actualizado", now, &mut notes);

    let (items, unreadable) = parse_items(&doc.items);
    notes.extend(unreadable.into_iter().map(MappingNote::UnreadableItem));

    Mapped {
        record: OrdenResponse {
            id: doc.id.to_string(),
            cliente_id: doc.cliente_id,
            fecha: doc.fecha,
            canal: doc.canal,
            moneda: doc.moneda,
            total: calculate_total(&items),
            items: doc.items,
            descripcion: doc.descripcion,
            creado,
            actualizado,
        },
        notes,
    }
}

fn or_now(
    value: Option<DateTime<Utc>>,
    field: &'static str,
    now: DateTime<Utc>,
    notes: &mut Vec<MappingNote>,
) -> DateTime<Utc> {
    value.unwrap_or_else(|| {
        notes.push(MappingNote::DefaultedTimestamp(field));
        now
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::DocumentId;
    use crate::types::{Equivalencias, PreferenciaValor};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn cliente(preferencias: Option<Preferencias>) -> ClienteDocument {
        ClienteDocument {
            id: DocumentId::generate(),
            nombre: "Ana".into(),
            email: "ana@example.com".into(),
            genero: "Femenino".into(),
            pais: "Costa Rica".into(),
            creado: Some(now()),
            preferencias,
        }
    }

    fn producto(categoria: Option<&str>, equivalencias: Option<Equivalencias>) -> ProductoDocument {
        ProductoDocument {
            id: DocumentId::generate(),
            nombre: "Café".into(),
            categoria: categoria.map(str::to_string),
            codigo: Some("CAF-1".into()),
            equivalencias,
            creado: Some(now()),
        }
    }

    #[test]
    fn test_list_preference_joined_with_commas() {
        let mut prefs = Preferencias::new();
        prefs.insert(
            "colores".into(),
            PreferenciaValor::Lista(vec!["rojo".into(), "azul".into()]),
        );

        let mapped = map_cliente(cliente(Some(prefs)), now()).into_record();
        let json = serde_json::to_value(&mapped.preferencias).unwrap();
        assert_eq!(json, json!([{"categoria": "colores", "texto": "rojo,azul"}]));
    }

    #[test]
    fn test_preferences_listed_in_stored_order() {
        let prefs = Preferencias::from([
            ("talla".to_string(), PreferenciaValor::Texto("M".into())),
            (
                "colores".to_string(),
                PreferenciaValor::Lista(vec!["rojo".into(), "azul".into()]),
            ),
        ]);

        let mapped = map_cliente(cliente(Some(prefs)), now()).into_record();
        let categorias: Vec<_> = mapped
            .preferencias
            .iter()
            .map(|p| p.categoria.as_str())
            .collect();
        assert_eq!(categorias, vec!["talla", "colores"]);
    }

    #[test]
    fn test_absent_preferences_is_empty_list() {
        let mapped = map_cliente(cliente(None), now()).into_record();
        assert!(mapped.preferencias.is_empty());

        let json = serde_json::to_value(&mapped).unwrap();
        assert_eq!(json["preferencias"], json!([]));
    }

    #[test]
    fn test_missing_creado_defaults_and_is_reported() {
        let mut doc = cliente(None);
        doc.creado = None;

        let mapped = map_cliente(doc, now());
        assert_eq!(mapped.record.creado, now());
        assert_eq!(mapped.defaulted_fields(), vec!["creado"]);
    }

    #[test]
    fn test_producto_empty_categoria_nulls_equivalencias() {
        let eq = Equivalencias {
            sku: Some("SKU".into()),
            codigo_alt: Some("ALT".into()),
        };
        let mapped = map_producto(producto(Some(""), Some(eq))).into_record();
        assert_eq!(mapped.equivalencias, None);
        assert_eq!(serde_json::to_value(&mapped).unwrap()["equivalencias"], Value::Null);
    }

    #[test]
    fn test_producto_missing_equivalencias_is_two_null_keys() {
        let mapped = map_producto(producto(Some("Bebidas"), None)).into_record();
        assert_eq!(
            serde_json::to_value(&mapped).unwrap()["equivalencias"],
            json!({"sku": null, "codigo_alt": null})
        );
    }

    #[test]
    fn test_producto_codigo_surfaces_as_codigo_mongo() {
        let mut doc = producto(Some("Bebidas"), None);
        let mapped = map_producto(doc.clone()).into_record();
        assert_eq!(mapped.codigo_mongo, "CAF-1");

        doc.codigo = None;
        assert_eq!(map_producto(doc).into_record().codigo_mongo, "");
    }

    #[test]
    fn test_orden_total_recomputed_ignoring_stored_total() {
        let doc: OrdenDocument = decode(
            "ordenes",
            json!({
                "_id": DocumentId::generate(),
                "cliente_id": "c-1",
                "fecha": "2024-05-01T00:00:00.000Z",
                "canal": "WEB",
                "moneda": "USD",
                "items": [
                    {"producto_id": "p1", "cantidad": 2, "precio_unit": 10.0, "descuento_pct": 10},
                    {"producto_id": "p2", "cantidad": 1, "precio_unit": 5.0},
                ],
                "total": 999.0,
                "creado": "2024-05-01T00:00:00.000Z",
                "actualizado": "2024-05-01T00:00:00.000Z",
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();

        let mapped = map_orden(doc, now());
        assert_eq!(mapped.record.total, 23.0);
        assert!(mapped.notes.is_empty());
    }

    #[test]
    fn test_orden_unreadable_items_pass_through() {
        let doc = OrdenDocument {
            id: DocumentId::generate(),
            cliente_id: "c-1".into(),
            fecha: now(),
            canal: "WEB".into(),
            moneda: "USD".into(),
            items: vec![
                json!({"producto_id": "p1", "cantidad": 1, "precio_unit": 4.0}),
                json!("garbage"),
            ],
            descripcion: None,
            total: None,
            creado: None,
            actualizado: None,
        };

        let mapped = map_orden(doc, now());
        assert_eq!(mapped.record.total, 4.0);
        assert_eq!(mapped.record.items.len(), 2);
        assert_eq!(mapped.unreadable_items(), vec![1]);
        assert_eq!(mapped.defaulted_fields(), vec!["creado", "actualizado"]);
    }

    #[test]
    fn test_mapping_is_a_pure_function_of_content() {
        let doc = cliente(Some(Preferencias::from([(
            "canal".to_string(),
            PreferenciaValor::Texto("WEB".into()),
        )])));
        let first = map_cliente(doc.clone(), now());
        let second = map_cliente(doc, now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_document_skips_unset_fields() {
        let update = crate::types::ProductoUpdate {
            categoria: Some(String::new()),
            ..Default::default()
        };
        let set = to_document("productos", &update).unwrap();
        assert_eq!(Value::Object(set), json!({"categoria": ""}));
    }

    #[test]
    fn test_decode_reports_collection() {
        let err = decode::<ClienteDocument>("clientes", Map::new()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument { collection: "clientes", .. }));
    }
}
