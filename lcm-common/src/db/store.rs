//! Document store access layer
//!
//! A small document-database interface (collections of JSON documents keyed by
//! id) and its SQLite implementation. Field updates are applied with
//! `json_set`/`json_remove` inside a single UPDATE, so each `update` call is
//! atomic on its own. Nothing groups several calls into a transaction.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// One stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

impl Document {
    /// Deserialize the body into a typed document
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Path to a field inside a document, one map key per segment
///
/// `FieldPath::new(["levels", "A1", "display_order"])` addresses
/// `body.levels.A1.display_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Render as an SQLite JSON path with every key quoted (`$."a"."b"`)
    pub fn to_json_path(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(Error::InvalidInput("Empty field path".to_string()));
        }

        let mut path = String::from("$");
        for segment in &self.0 {
            if segment.is_empty() || segment.contains('"') {
                return Err(Error::InvalidInput(format!(
                    "Invalid field path segment: {:?}",
                    segment
                )));
            }
            path.push_str(&format!(".\"{}\"", segment));
        }
        Ok(path)
    }
}

/// A single change applied by [`DocumentStore::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Create or overwrite the field (missing parent maps are created)
    Set(FieldPath, Value),
    /// Remove the field if present
    Remove(FieldPath),
}

/// Collection/document persistence interface
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, ordered by id
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// One document, `None` if absent
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Insert a new document; `Conflict` if the id is taken
    async fn create(&self, collection: &str, id: &str, body: Value) -> Result<()>;

    /// Insert or overwrite a document
    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<()>;

    /// Apply field updates in order; `NotFound` if the document is absent
    async fn update(&self, collection: &str, id: &str, updates: &[FieldUpdate]) -> Result<()>;

    /// Delete a document; `NotFound` if absent
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

/// [`DocumentStore`] backed by the `documents` table
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_row(id: String, body: &str) -> Result<Document> {
    Ok(Document {
        id,
        body: serde_json::from_str(body)?,
    })
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query("SELECT id, body FROM documents WHERE collection = ? ORDER BY id")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let body: String = row.get("body");
                parse_row(row.get("id"), &body)
            })
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(body,)| parse_row(id.to_string(), &body))
            .transpose()
    }

    async fn create(&self, collection: &str, id: &str, body: Value) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(body.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!("{}/{}", collection, id)));
        }

        debug!(collection, id, "Document created");
        Ok(())
    }

    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(body.to_string())
        .execute(&self.pool)
        .await?;

        debug!(collection, id, "Document written");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, updates: &[FieldUpdate]) -> Result<()> {
        // Nest one json_set/json_remove call per update around the column;
        // placeholders of inner calls precede outer ones in the SQL text.
        let mut expr = String::from("body");
        let mut binds: Vec<String> = Vec::with_capacity(updates.len() * 2);
        for update in updates {
            match update {
                FieldUpdate::Set(path, value) => {
                    expr = format!("json_set({}, ?, json(?))", expr);
                    binds.push(path.to_json_path()?);
                    binds.push(value.to_string());
                }
                FieldUpdate::Remove(path) => {
                    expr = format!("json_remove({}, ?)", expr);
                    binds.push(path.to_json_path()?);
                }
            }
        }

        let sql = format!(
            "UPDATE documents SET body = {}, updated_at = CURRENT_TIMESTAMP \
             WHERE collection = ? AND id = ?",
            expr
        );

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let result = query
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{}/{}", collection, id)));
        }

        debug!(collection, id, fields = updates.len(), "Document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{}/{}", collection, id)));
        }

        debug!(collection, id, "Document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> SqliteDocumentStore {
        // Single connection: every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init::create_documents_table(&pool).await.unwrap();
        SqliteDocumentStore::new(pool)
    }

    #[test]
    fn test_field_path_rendering() {
        let path = FieldPath::new(["levels", "A1", "display_order"]);
        assert_eq!(path.to_json_path().unwrap(), "$.\"levels\".\"A1\".\"display_order\"");

        assert!(FieldPath::new(Vec::<String>::new()).to_json_path().is_err());
        assert!(FieldPath::new(["bad\"key"]).to_json_path().is_err());
    }

    #[tokio::test]
    async fn test_create_get_list() {
        let store = test_store().await;

        store.create("subjects", "B", json!({"subject_name": "Beta"})).await.unwrap();
        store.create("subjects", "A", json!({"subject_name": "Alpha"})).await.unwrap();

        let doc = store.get("subjects", "A").await.unwrap().expect("doc exists");
        assert_eq!(doc.body["subject_name"], "Alpha");

        let ids: Vec<String> = store
            .list("subjects")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["A", "B"]);

        assert!(store.get("subjects", "missing").await.unwrap().is_none());
        assert!(store.list("levels").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let store = test_store().await;
        store.create("subjects", "A", json!({})).await.unwrap();

        let err = store.create("subjects", "A", json!({})).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_sets_nested_and_removes() {
        let store = test_store().await;
        store
            .create(
                "subjects",
                "ENG",
                json!({"levels": {"A1": {"lessons": {"lesson_1": {"video": "old"}}}}}),
            )
            .await
            .unwrap();

        store
            .update(
                "subjects",
                "ENG",
                &[
                    FieldUpdate::Set(
                        FieldPath::new(["levels", "A1", "lessons", "lesson_1", "video"]),
                        json!("new"),
                    ),
                    FieldUpdate::Set(FieldPath::new(["levels", "A1", "display_order"]), json!(3)),
                    FieldUpdate::Remove(FieldPath::new(["levels", "A1", "lessons", "lesson_2"])),
                ],
            )
            .await
            .unwrap();

        let doc = store.get("subjects", "ENG").await.unwrap().unwrap();
        assert_eq!(doc.body["levels"]["A1"]["lessons"]["lesson_1"]["video"], "new");
        assert_eq!(doc.body["levels"]["A1"]["display_order"], 3);

        store
            .update(
                "subjects",
                "ENG",
                &[FieldUpdate::Remove(FieldPath::new(["levels", "A1"]))],
            )
            .await
            .unwrap();
        let doc = store.get("subjects", "ENG").await.unwrap().unwrap();
        assert_eq!(doc.body["levels"], json!({}));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_document() {
        let store = test_store().await;

        let err = store
            .update("subjects", "nope", &[FieldUpdate::Remove(FieldPath::new(["x"]))])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = store.delete("subjects", "nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = test_store().await;
        store.set("studentBooks", "A1", json!({"url": "one"})).await.unwrap();
        store.set("studentBooks", "A1", json!({"url": "two"})).await.unwrap();

        let doc = store.get("studentBooks", "A1").await.unwrap().unwrap();
        assert_eq!(doc.body["url"], "two");
    }
}
