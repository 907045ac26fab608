//! # Order Service
//!
//! CRUD over `ordenes` plus filtered listings and collection statistics.
//!
//! ## Totals
//! ```text
//! create / update(items)      read (get, list, ...)        stats()
//! ──────────────────────      ─────────────────────        ───────────────────
//! calculate_total(items)      map_orden recomputes         summarize("total")
//!   └─► stored `total`          from stored items            over stored totals
//! ```
//! The stored total is written on every path that changes `items`, so the
//! aggregate and the recomputed value agree for well-formed orders.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;
use ventas_core::mapper::{decode, map_orden, to_document};
use ventas_core::money::{calculate_total, round_money};
use ventas_core::{
    timestamp, DocumentId, OrdenDocument, OrdenForm, OrdenResponse, OrdenStats, OrdenUpdate, Page,
    Pagination,
};
use ventas_db::{Document, DocumentCollection, Filter, ORDENES};

use super::{apply_update, fetch_page, log_notes, parse_id};
use crate::error::ServiceResult;

/// Operations over the `ordenes` collection.
#[derive(Clone)]
pub struct OrdenService {
    collection: Arc<dyn DocumentCollection>,
}

impl OrdenService {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        OrdenService { collection }
    }

    /// Stores a new order with its computed total.
    pub async fn create(&self, form: OrdenForm) -> ServiceResult<OrdenResponse> {
        let id = DocumentId::generate();
        let now = timestamp::now();
        let doc = OrdenDocument::new(id, form, now)?;

        self.collection
            .insert_one(id, to_document(ORDENES, &doc)?)
            .await?;

        info!(id = %id, cliente_id = %doc.cliente_id, total = ?doc.total, "Orden created");

        Ok(log_notes(ORDENES, &id.to_string(), map_orden(doc, now)))
    }

    pub async fn list(&self, pagination: Pagination) -> ServiceResult<Page<OrdenResponse>> {
        self.page(&Filter::All, pagination).await
    }

    /// Orders placed by one customer.
    pub async fn list_by_cliente(
        &self,
        cliente_id: &str,
        pagination: Pagination,
    ) -> ServiceResult<Page<OrdenResponse>> {
        self.page(&Filter::eq("cliente_id", cliente_id), pagination)
            .await
    }

    /// Orders with `inicio <= fecha <= fin`.
    pub async fn list_by_fecha(
        &self,
        inicio: DateTime<Utc>,
        fin: DateTime<Utc>,
        pagination: Pagination,
    ) -> ServiceResult<Page<OrdenResponse>> {
        let filter = Filter::between(
            "fecha",
            timestamp::format(&inicio),
            timestamp::format(&fin),
        );
        self.page(&filter, pagination).await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Option<OrdenResponse>> {
        let Some(id) = parse_id(ORDENES, id) else {
            return Ok(None);
        };

        self.collection
            .find_one(id)
            .await?
            .map(map)
            .transpose()
    }

    /// Applies the supplied fields and stamps `actualizado`. New items also
    /// replace the stored total.
    pub async fn update(
        &self,
        id: &str,
        update: OrdenUpdate,
    ) -> ServiceResult<Option<OrdenResponse>> {
        let Some(id) = parse_id(ORDENES, id) else {
            return Ok(None);
        };

        let mut set = to_document(ORDENES, &update)?;
        if let Some(items) = &update.items {
            set.insert("total".to_string(), Value::from(calculate_total(items)));
        }
        set.insert(
            "actualizado".to_string(),
            Value::from(timestamp::format(&timestamp::now())),
        );

        apply_update(self.collection.as_ref(), id, set)
            .await?
            .map(map)
            .transpose()
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<bool> {
        let Some(id) = parse_id(ORDENES, id) else {
            return Ok(false);
        };

        let deleted = self.collection.delete_one(id).await?;
        if deleted {
            info!(id = %id, "Orden deleted");
        }
        Ok(deleted)
    }

    /// Count, revenue, average, minimum and maximum order value over the
    /// whole collection. An empty collection gives all zeros.
    pub async fn stats(&self) -> ServiceResult<OrdenStats> {
        let (total_ordenes, summary) = tokio::try_join!(
            self.collection.count(&Filter::All),
            self.collection.summarize("total"),
        )?;

        let stats = match summary {
            Some(summary) => OrdenStats {
                total_ordenes,
                total_revenue: summary.sum,
                avg_order_value: round_money(summary.avg),
                min_order_value: summary.min,
                max_order_value: summary.max,
            },
            None => OrdenStats {
                total_ordenes,
                ..OrdenStats::default()
            },
        };

        Ok(stats)
    }

    async fn page(
        &self,
        filter: &Filter,
        pagination: Pagination,
    ) -> ServiceResult<Page<OrdenResponse>> {
        let (docs, total) = fetch_page(self.collection.as_ref(), filter, pagination).await?;
        let data = docs.into_iter().map(map).collect::<ServiceResult<Vec<_>>>()?;
        Ok(Page::new(data, total, pagination))
    }
}

fn map(raw: Document) -> ServiceResult<OrdenResponse> {
    let doc: OrdenDocument = decode(ORDENES, raw)?;
    let id = doc.id.to_string();
    Ok(log_notes(ORDENES, &id, map_orden(doc, timestamp::now())))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ventas_core::OrdenItem;
    use ventas_db::Database;

    async fn service() -> (Database, OrdenService) {
        let db = Database::new(ventas_db::DbConfig::in_memory()).await.unwrap();
        let service = OrdenService::new(Arc::new(db.ordenes()));
        (db, service)
    }

    fn form(cliente_id: &str, fecha: &str, items: Vec<OrdenItem>) -> OrdenForm {
        OrdenForm {
            cliente_id: cliente_id.to_string(),
            fecha: timestamp::parse("fecha", fecha).unwrap(),
            canal: "WEB".to_string(),
            moneda: "USD".to_string(),
            items,
            descripcion: None,
        }
    }

    #[tokio::test]
    async fn test_create_computes_total() {
        let (_db, service) = service().await;

        let orden = service
            .create(form(
                "c-1",
                "2024-03-01",
                vec![
                    OrdenItem::new("p-1", 2, 10.0, Some(10.0)),
                    OrdenItem::new("p-2", 1, 5.0, None),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(orden.total, 23.0);

        let fetched = service.get(&orden.id).await.unwrap().unwrap();
        assert_eq!(fetched.total, 23.0);
        assert_eq!(fetched.items, orden.items);
    }

    #[tokio::test]
    async fn test_update_items_refreshes_stored_total() {
        let (_db, service) = service().await;
        let orden = service
            .create(form("c-1", "2024-03-01", vec![OrdenItem::new("p", 1, 4.0, None)]))
            .await
            .unwrap();

        let updated = service
            .update(
                &orden.id,
                OrdenUpdate {
                    items: Some(vec![OrdenItem::new("p", 3, 4.0, None)]),
                    ..OrdenUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.total, 12.0);
        assert_eq!(updated.creado, orden.creado);
        assert!(updated.actualizado >= orden.actualizado);

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_revenue, 12.0);
    }

    #[tokio::test]
    async fn test_stats_empty_collection() {
        let (_db, service) = service().await;
        assert_eq!(service.stats().await.unwrap(), OrdenStats::default());
    }

    #[tokio::test]
    async fn test_stats_aggregates() {
        let (_db, service) = service().await;
        for precio in [10.0, 20.0, 40.0] {
            service
                .create(form("c-1", "2024-03-01", vec![OrdenItem::new("p", 1, precio, None)]))
                .await
                .unwrap();
        }

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_ordenes, 3);
        assert_eq!(stats.total_revenue, 70.0);
        assert_eq!(stats.avg_order_value, 23.33);
        assert_eq!(stats.min_order_value, 10.0);
        assert_eq!(stats.max_order_value, 40.0);
    }

    #[tokio::test]
    async fn test_list_by_fecha_is_inclusive() {
        let (_db, service) = service().await;
        for fecha in ["2024-01-31T23:59:59Z", "2024-02-01", "2024-02-15T10:00:00Z", "2024-03-01"] {
            service
                .create(form("c-1", fecha, vec![OrdenItem::new("p", 1, 1.0, None)]))
                .await
                .unwrap();
        }

        let page = service
            .list_by_fecha(
                timestamp::parse("fecha_inicio", "2024-02-01").unwrap(),
                timestamp::parse("fecha_fin", "2024-03-01").unwrap(),
                Pagination::default(),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 3);
    }

    #[tokio::test]
    async fn test_list_by_cliente() {
        let (_db, service) = service().await;
        for cliente in ["c-1", "c-2", "c-1"] {
            service
                .create(form(cliente, "2024-03-01", vec![OrdenItem::new("p", 1, 1.0, None)]))
                .await
                .unwrap();
        }

        let page = service
            .list_by_cliente("c-1", Pagination::new(1, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total_pages, 2);
        assert!(page.data.iter().all(|o| o.cliente_id == "c-1"));
    }

    #[tokio::test]
    async fn test_malformed_id_is_absent() {
        let (_db, service) = service().await;
        assert!(service.get("not-an-id").await.unwrap().is_none());
        assert!(!service.delete("not-an-id").await.unwrap());
        assert!(service
            .update("not-an-id", OrdenUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_mapped_order_survives_reinsertion() {
        let (db, service) = service().await;
        let ordenes = db.ordenes();

        // Legacy shape: stale total, no timestamps
        let legacy = serde_json::json!({
            "cliente_id": "c-9",
            "fecha": "2024-05-01T00:00:00.000Z",
            "canal": "WEB",
            "moneda": "USD",
            "items": [{"producto_id": "p", "cantidad": 2, "precio_unit": 3.5}],
            "total": 999.0,
        });
        let id = DocumentId::generate();
        ordenes
            .insert_one(id, legacy.as_object().cloned().unwrap())
            .await
            .unwrap();

        let first = service.get(&id.to_string()).await.unwrap().unwrap();
        assert_eq!(first.total, 7.0);

        let mut body = serde_json::to_value(&first).unwrap();
        body.as_object_mut().unwrap().remove("id");
        let copy_id = DocumentId::generate();
        ordenes
            .insert_one(copy_id, body.as_object().cloned().unwrap())
            .await
            .unwrap();

        let second = service.get(&copy_id.to_string()).await.unwrap().unwrap();
        assert_eq!(OrdenResponse { id: first.id.clone(), ..second }, first);
    }

    #[tokio::test]
    async fn test_noop_update_leaves_order_unchanged() {
        let (_db, service) = service().await;
        let orden = service
            .create(form("c-1", "2024-03-01", vec![OrdenItem::new("p", 2, 2.5, Some(20.0))]))
            .await
            .unwrap();
        let before = service.get(&orden.id).await.unwrap().unwrap();

        let same = OrdenUpdate {
            cliente_id: Some(before.cliente_id.clone()),
            fecha: Some(before.fecha),
            canal: Some(before.canal.clone()),
            moneda: Some(before.moneda.clone()),
            ..OrdenUpdate::default()
        };
        service.update(&orden.id, same).await.unwrap().unwrap();

        let after = service.get(&orden.id).await.unwrap().unwrap();
        assert_eq!(
            OrdenResponse {
                actualizado: before.actualizado,
                ..after.clone()
            },
            before
        );
        assert!(after.actualizado >= before.actualizado);
    }

    #[tokio::test]
    async fn test_create_with_huge_line_stores_finite_total() {
        let (_db, service) = service().await;
        let orden = service
            .create(form(
                "c-1",
                "2024-03-01",
                vec![OrdenItem::new("p", 10_000_000_000, 1e20, None)],
            ))
            .await
            .unwrap();

        assert!(orden.total.is_finite());
        assert!(orden.total > 1e29);

        let fetched = service.get(&orden.id).await.unwrap().unwrap();
        assert_eq!(fetched.total, orden.total);
    }
}
