//! # SQLite Document Collection
//!
//! [`DocumentCollection`] over the shared `documents` table.
//!
//! ## Storage Layout
//! ```text
//! documents
//! ┌──────┬────────────┬──────────────────────────────────────┬──────────────────────────┐
//! │ seq  │ collection │ id                                   │ body (JSON)              │
//! ├──────┼────────────┼──────────────────────────────────────┼──────────────────────────┤
//! │ 1    │ clientes   │ 6f1c…                                │ {"_id": "6f1c…", ...}    │
//! │ 2    │ ordenes    │ 0b7e…                                │ {"_id": "0b7e…", ...}    │
//! └──────┴────────────┴──────────────────────────────────────┴──────────────────────────┘
//! ```
//!
//! Reads are independent statements. `update_one` runs read, merge and
//! write inside one `BEGIN IMMEDIATE` transaction: the write lock is taken
//! before the read, so concurrent updates queue on `busy_timeout` instead
//! of failing to upgrade a stale read snapshot.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::{Row, SqlitePool};
use tracing::debug;
use ventas_core::DocumentId;

use crate::error::{DbError, DbResult};
use crate::repository::filter::{field_path, Bind, Filter};
use crate::repository::{Document, DocumentCollection, NumericSummary, UpdateResult};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// One named collection in the `documents` table.
#[derive(Debug, Clone)]
pub struct SqliteCollection {
    pool: SqlitePool,
    name: &'static str,
}

impl SqliteCollection {
    /// Creates a handle for `name` on the pool.
    pub fn new(pool: SqlitePool, name: &'static str) -> Self {
        SqliteCollection { pool, name }
    }
}

#[async_trait]
impl DocumentCollection for SqliteCollection {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn insert_one(&self, id: DocumentId, mut doc: Document) -> DbResult<()> {
        debug!(collection = self.name, id = %id, "Inserting document");

        doc.insert("_id".to_string(), Value::String(id.to_string()));
        let body = serde_json::to_string(&doc)?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(self.name)
            .bind(id.to_string())
            .bind(body)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_one(&self, id: DocumentId) -> DbResult<Option<Document>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(self.name)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| parse_body(row.try_get("body")?)).transpose()
    }

    async fn find(&self, filter: &Filter, skip: u64, limit: u64) -> DbResult<Vec<Document>> {
        let (predicate, binds) = filter.compile()?;
        let sql = format!(
            "SELECT body FROM documents \
             WHERE collection = ? AND {predicate} \
             ORDER BY seq \
             LIMIT ? OFFSET ?"
        );

        let query = bind_all(sqlx::query(&sql).bind(self.name), binds)
            .bind(to_i64(limit))
            .bind(to_i64(skip));

        let rows = query.fetch_all(&self.pool).await?;

        debug!(
            collection = self.name,
            skip,
            limit,
            count = rows.len(),
            "Find returned documents"
        );

        rows.into_iter()
            .map(|row| parse_body(row.try_get("body")?))
            .collect()
    }

    async fn count(&self, filter: &Filter) -> DbResult<u64> {
        let (predicate, binds) = filter.compile()?;
        let sql = format!("SELECT COUNT(*) AS n FROM documents WHERE collection = ? AND {predicate}");

        let row = bind_all(sqlx::query(&sql).bind(self.name), binds)
            .fetch_one(&self.pool)
            .await?;

        let n: i64 = row.try_get("n")?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn update_one(&self, id: DocumentId, set: Document) -> DbResult<UpdateResult> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(self.name)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            debug!(collection = self.name, id = %id, "Update matched nothing");
            return Ok(UpdateResult::default());
        };

        let mut doc = parse_body(row.try_get("body")?)?;
        let mut changed = false;
        for (key, value) in set {
            if key == "_id" {
                continue;
            }
            if doc.get(&key) != Some(&value) {
                doc.insert(key, value);
                changed = true;
            }
        }

        if changed {
            sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
                .bind(serde_json::to_string(&doc)?)
                .bind(self.name)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(collection = self.name, id = %id, changed, "Update applied");

        Ok(UpdateResult {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn delete_one(&self, id: DocumentId) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(self.name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        debug!(collection = self.name, id = %id, rows = result.rows_affected(), "Delete executed");

        Ok(result.rows_affected() > 0)
    }

    async fn summarize(&self, field: &str) -> DbResult<Option<NumericSummary>> {
        let path = field_path(field)?;
        let sql = format!(
            "SELECT COUNT(v) AS n, \
                    CAST(SUM(v) AS REAL) AS total, \
                    CAST(AVG(v) AS REAL) AS mean, \
                    CAST(MIN(v) AS REAL) AS lo, \
                    CAST(MAX(v) AS REAL) AS hi \
             FROM (SELECT json_extract(body, '{path}') AS v \
                   FROM documents WHERE collection = ?) \
             WHERE typeof(v) IN ('integer', 'real')"
        );

        let row = sqlx::query(&sql)
            .bind(self.name)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("n")?;
        if count == 0 {
            return Ok(None);
        }

        Ok(Some(NumericSummary {
            count: u64::try_from(count).unwrap_or(0),
            sum: row.try_get::<Option<f64>, _>("total")?.unwrap_or(0.0),
            avg: row.try_get::<Option<f64>, _>("mean")?.unwrap_or(0.0),
            min: row.try_get::<Option<f64>, _>("lo")?.unwrap_or(0.0),
            max: row.try_get::<Option<f64>, _>("hi")?.unwrap_or(0.0),
        }))
    }
}

fn bind_all(mut query: SqliteQuery<'_>, binds: Vec<Bind>) -> SqliteQuery<'_> {
    for bind in binds {
        query = match bind {
            Bind::Text(value) => query.bind(value),
            Bind::Int(value) => query.bind(value),
            Bind::Real(value) => query.bind(value),
        };
    }
    query
}

fn parse_body(body: String) -> DbResult<Document> {
    match serde_json::from_str(&body)? {
        Value::Object(doc) => Ok(doc),
        other => Err(DbError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use serde_json::json;

    async fn collection(name: &'static str) -> SqliteCollection {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.collection(name)
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    /// Removes the database file and its WAL side files on drop.
    struct ScratchFile(std::path::PathBuf);

    impl ScratchFile {
        fn new() -> Self {
            let name = format!("ventas-{}.db", DocumentId::generate());
            ScratchFile(std::env::temp_dir().join(name))
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut path = self.0.clone().into_os_string();
                path.push(suffix);
                let _ = std::fs::remove_file(path);
            }
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_one() {
        let clientes = collection("clientes").await;
        let id = DocumentId::generate();

        clientes
            .insert_one(id, doc(json!({"nombre": "Ana"})))
            .await
            .unwrap();

        let found = clientes.find_one(id).await.unwrap().unwrap();
        assert_eq!(found["nombre"], "Ana");
        assert_eq!(found["_id"], id.to_string());

        assert!(clientes
            .find_one(DocumentId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let clientes = collection("clientes").await;
        let id = DocumentId::generate();

        clientes.insert_one(id, Document::new()).await.unwrap();
        let err = clientes.insert_one(id, Document::new()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_find_pages_in_insertion_order() {
        let productos = collection("productos").await;
        for i in 0..5 {
            productos
                .insert_one(DocumentId::generate(), doc(json!({"n": i})))
                .await
                .unwrap();
        }

        let page = productos.find(&Filter::All, 2, 2).await.unwrap();
        let ns: Vec<_> = page.iter().map(|d| d["n"].clone()).collect();
        assert_eq!(ns, vec![json!(2), json!(3)]);

        assert_eq!(productos.count(&Filter::All).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.clientes()
            .insert_one(DocumentId::generate(), Document::new())
            .await
            .unwrap();

        assert_eq!(db.clientes().count(&Filter::All).await.unwrap(), 1);
        assert_eq!(db.ordenes().count(&Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_contains_ignore_case_or() {
        let productos = collection("productos").await;
        for (nombre, categoria) in [("Café molido", "Bebidas"), ("Pan", "Panadería"), ("Té", "bebidas calientes")] {
            productos
                .insert_one(
                    DocumentId::generate(),
                    doc(json!({"nombre": nombre, "categoria": categoria})),
                )
                .await
                .unwrap();
        }

        let filter = Filter::Or(vec![
            Filter::contains_ignore_case("nombre", "BEBIDA"),
            Filter::contains_ignore_case("categoria", "BEBIDA"),
        ]);
        assert_eq!(productos.count(&filter).await.unwrap(), 2);

        let filter = Filter::contains_ignore_case("nombre", "pan");
        assert_eq!(productos.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_between_is_inclusive() {
        let ordenes = collection("ordenes").await;
        for fecha in [
            "2024-01-01T00:00:00.000Z",
            "2024-01-15T00:00:00.000Z",
            "2024-01-31T00:00:00.000Z",
            "2024-02-01T00:00:00.000Z",
        ] {
            ordenes
                .insert_one(DocumentId::generate(), doc(json!({"fecha": fecha})))
                .await
                .unwrap();
        }

        let filter = Filter::between(
            "fecha",
            "2024-01-01T00:00:00.000Z",
            "2024-01-31T00:00:00.000Z",
        );
        assert_eq!(ordenes.count(&filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_reports_matched_and_modified() {
        let clientes = collection("clientes").await;
        let id = DocumentId::generate();
        clientes
            .insert_one(id, doc(json!({"nombre": "Ana", "pais": "CR"})))
            .await
            .unwrap();

        let result = clientes
            .update_one(id, doc(json!({"pais": "PA"})))
            .await
            .unwrap();
        assert_eq!(result, UpdateResult { matched: 1, modified: 1 });

        // Same value again: matched, nothing written
        let result = clientes
            .update_one(id, doc(json!({"pais": "PA"})))
            .await
            .unwrap();
        assert_eq!(result, UpdateResult { matched: 1, modified: 0 });

        let result = clientes
            .update_one(DocumentId::generate(), doc(json!({"pais": "PA"})))
            .await
            .unwrap();
        assert_eq!(result, UpdateResult::default());

        let stored = clientes.find_one(id).await.unwrap().unwrap();
        assert_eq!(stored["nombre"], "Ana");
        assert_eq!(stored["pais"], "PA");
    }

    #[tokio::test]
    async fn test_update_never_rewrites_id() {
        let clientes = collection("clientes").await;
        let id = DocumentId::generate();
        clientes.insert_one(id, Document::new()).await.unwrap();

        let result = clientes
            .update_one(id, doc(json!({"_id": "other"})))
            .await
            .unwrap();
        assert_eq!(result.modified, 0);
        assert_eq!(
            clientes.find_one(id).await.unwrap().unwrap()["_id"],
            id.to_string()
        );
    }

    #[tokio::test]
    async fn test_delete_one() {
        let clientes = collection("clientes").await;
        let id = DocumentId::generate();
        clientes.insert_one(id, Document::new()).await.unwrap();

        assert!(clientes.delete_one(id).await.unwrap());
        assert!(!clientes.delete_one(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_summarize() {
        let ordenes = collection("ordenes").await;
        assert!(ordenes.summarize("total").await.unwrap().is_none());

        for total in [json!(10), json!(20.5), json!("n/a"), Value::Null] {
            ordenes
                .insert_one(DocumentId::generate(), doc(json!({"total": total})))
                .await
                .unwrap();
        }

        let summary = ordenes.summarize("total").await.unwrap().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.sum, 30.5);
        assert_eq!(summary.avg, 15.25);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 20.5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_on_file_database() {
        let file = ScratchFile::new();
        let db = Database::new(DbConfig::new(&file.0)).await.unwrap();
        let clientes = std::sync::Arc::new(db.clientes());

        let mut ids = Vec::new();
        for i in 0..20 {
            let id = DocumentId::generate();
            clientes
                .insert_one(id, doc(json!({"nombre": format!("Cliente {i}"), "visitas": 0})))
                .await
                .unwrap();
            ids.push(id);
        }

        let mut handles = Vec::new();
        for round in 1..=5 {
            for id in &ids {
                let clientes = clientes.clone();
                let id = *id;
                handles.push(tokio::spawn(async move {
                    clientes
                        .update_one(id, doc(json!({"visitas": round, "pais": "CR"})))
                        .await
                }));
            }
        }

        let mut failures = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(result) => assert_eq!(result.matched, 1),
                Err(e) => failures.push(e.to_string()),
            }
        }
        assert!(failures.is_empty(), "{} of 100 updates failed: {:?}", failures.len(), failures.first());

        for id in ids {
            let stored = clientes.find_one(id).await.unwrap().unwrap();
            assert_eq!(stored["pais"], "CR");
            assert!(stored["visitas"].as_i64().unwrap() >= 1);
        }

        db.close().await;
    }
}
