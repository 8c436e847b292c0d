//! `DocumentStore` and `TagStore` over one SQLite connection
//!
//! A session borrows whatever connection it is given. [`crate::SqliteBackend`]
//! hands it an open transaction, so every statement below is part of the
//! caller's unit of work.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use fireside_core::storage::{Document, DocumentStore, StorageResult, TagStore};
use fireside_core::types::{canonical_name, Tag, TagId};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use tracing::debug;

use crate::error::SqliteError;

const DOCUMENT_COLUMNS: &str = "id, collection, data, created_at, updated_at";
const TAG_COLUMNS: &str = "id, name, reference_count, created_at, updated_at";

/// Storage operations bound to a borrowed connection
pub struct SqliteSession<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteSession<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn query_documents(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<Document>> {
        let run = || -> rusqlite::Result<Vec<Document>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, row_to_document)?;
            rows.collect()
        };
        Ok(run().map_err(SqliteError::from)?)
    }

    fn query_tag(&self, sql: &str, params: impl rusqlite::Params) -> StorageResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(sql, params, row_to_tag)
            .optional()
            .map_err(SqliteError::from)?;
        Ok(tag)
    }

    /// Apply a counter statement that returns the new count
    fn adjust(&self, sql: &str, id: &TagId) -> StorageResult<u32> {
        let count: Option<i64> = self
            .conn
            .query_row(sql, params![id.as_str(), timestamp(&now())], |row| row.get(0))
            .optional()
            .map_err(SqliteError::from)?;

        match count {
            Some(count) => Ok(u32::try_from(count).unwrap_or(u32::MAX)),
            None => Err(SqliteError::not_found("tag", id.as_str()).into()),
        }
    }
}

impl DocumentStore for SqliteSession<'_> {
    fn find_by_id(&self, collection: &str, id: &str) -> StorageResult<Option<Document>> {
        let doc = self
            .conn
            .query_row(
                &format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE collection = ?1 AND id = ?2"
                ),
                params![collection, id],
                row_to_document,
            )
            .optional()
            .map_err(SqliteError::from)?;
        Ok(doc)
    }

    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StorageResult<Vec<Document>> {
        // `IS` instead of `=` so a JSON null matches a missing or null field
        self.query_documents(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents
                 WHERE collection = ?1 AND json_extract(data, ?2) IS ?3
                 ORDER BY rowid"
            ),
            params![collection, json_path(field), json_to_sql(value)],
        )
    }

    fn find_all(&self, collection: &str) -> StorageResult<Vec<Document>> {
        self.query_documents(
            &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE collection = ?1 ORDER BY rowid"
            ),
            params![collection],
        )
    }

    fn insert(&self, collection: &str, data: Value) -> StorageResult<Document> {
        let now = now();
        let doc = Document {
            created_at: now,
            updated_at: now,
            ..Document::new(collection, data)
        };

        self.conn
            .execute(
                "INSERT INTO documents (id, collection, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    doc.id,
                    doc.collection,
                    doc.data.to_string(),
                    timestamp(&doc.created_at),
                    timestamp(&doc.updated_at),
                ],
            )
            .map_err(SqliteError::from)?;

        debug!(collection, id = %doc.id, "Inserted document");
        Ok(doc)
    }

    fn update(&self, collection: &str, id: &str, data: Value) -> StorageResult<Document> {
        let updated_at = now();
        let created_at: Option<String> = self
            .conn
            .query_row(
                "UPDATE documents SET data = ?3, updated_at = ?4
                 WHERE collection = ?1 AND id = ?2
                 RETURNING created_at",
                params![collection, id, data.to_string(), timestamp(&updated_at)],
                |row| row.get(0),
            )
            .optional()
            .map_err(SqliteError::from)?;

        let created_at = created_at.ok_or_else(|| SqliteError::not_found(collection, id))?;
        Ok(Document {
            id: id.to_string(),
            collection: collection.to_string(),
            data,
            created_at: parse_timestamp(&created_at)
                .map_err(|e| SqliteError::Serialization(e.to_string()))?,
            updated_at,
        })
    }

    fn delete(&self, collection: &str, id: &str) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .map_err(SqliteError::from)?;
        Ok(removed > 0)
    }
}

impl TagStore for SqliteSession<'_> {
    fn get_tag(&self, id: &TagId) -> StorageResult<Option<Tag>> {
        self.query_tag(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1"),
            params![id.as_str()],
        )
    }

    fn find_tag_by_name(&self, name: &str) -> StorageResult<Option<Tag>> {
        self.query_tag(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE name_key = ?1"),
            params![canonical_name(name)],
        )
    }

    fn list_tags(&self) -> StorageResult<Vec<Tag>> {
        let run = || -> rusqlite::Result<Vec<Tag>> {
            let mut stmt = self
                .conn
                .prepare(&format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY name_key"))?;
            let rows = stmt.query_map([], row_to_tag)?;
            rows.collect()
        };
        Ok(run().map_err(SqliteError::from)?)
    }

    fn create_tag(&self, name: &str) -> StorageResult<Tag> {
        let now = now();
        let tag = Tag {
            created_at: now,
            updated_at: now,
            ..Tag::new(name.trim())
        };

        let inserted = self
            .conn
            .execute(
                "INSERT INTO tags (id, name, name_key, reference_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5)
                 ON CONFLICT(name_key) DO NOTHING",
                params![
                    tag.id.as_str(),
                    tag.name,
                    tag.name_key(),
                    timestamp(&tag.created_at),
                    timestamp(&tag.updated_at),
                ],
            )
            .map_err(SqliteError::from)?;

        if inserted == 0 {
            let message = format!("tag '{}' already exists", tag.name);
            return Err(SqliteError::InvalidOperation(message).into());
        }
        Ok(tag)
    }

    /// Upsert on the unique name key, then read back whichever row won
    fn resolve_or_create(&self, name: &str) -> StorageResult<TagId> {
        let stamp = timestamp(&now());
        let candidate = TagId::generate();
        let key = canonical_name(name);

        let inserted = self
            .conn
            .execute(
                "INSERT INTO tags (id, name, name_key, reference_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?4)
                 ON CONFLICT(name_key) DO NOTHING",
                params![candidate.as_str(), name.trim(), key, stamp],
            )
            .map_err(SqliteError::from)?;

        let id: String = self
            .conn
            .query_row("SELECT id FROM tags WHERE name_key = ?1", params![key], |row| row.get(0))
            .map_err(SqliteError::from)?;

        if inserted > 0 {
            debug!(tag_id = %id, name = name.trim(), "Created tag");
        }
        Ok(TagId::new(id))
    }

    fn increment(&self, id: &TagId) -> StorageResult<u32> {
        self.adjust(
            "UPDATE tags SET reference_count = reference_count + 1, updated_at = ?2
             WHERE id = ?1
             RETURNING reference_count",
            id,
        )
    }

    fn decrement(&self, id: &TagId) -> StorageResult<u32> {
        self.adjust(
            "UPDATE tags SET reference_count = MAX(reference_count - 1, 0), updated_at = ?2
             WHERE id = ?1
             RETURNING reference_count",
            id,
        )
    }

    fn set_reference_count(&self, id: &TagId, count: u32) -> StorageResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE tags SET reference_count = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.as_str(), count, timestamp(&now())],
            )
            .map_err(SqliteError::from)?;

        if changed == 0 {
            return Err(SqliteError::not_found("tag", id.as_str()).into());
        }
        Ok(())
    }

    fn delete_tag(&self, id: &TagId) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1", params![id.as_str()])
            .map_err(SqliteError::from)?;
        Ok(removed > 0)
    }
}

/// Current time at the precision stored on disk
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so stored timestamps sort as text
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

/// Bind a JSON scalar the way `json_extract` returns it
fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // json_extract returns containers as minified JSON text
        other => SqlValue::Text(other.to_string()),
    }
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

fn row_to_document(row: &Row) -> rusqlite::Result<Document> {
    let data: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Document {
        id: row.get(0)?,
        collection: row.get(1)?,
        data: serde_json::from_str(&data).map_err(|e| conversion_error(2, e))?,
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_error(3, e))?,
        updated_at: parse_timestamp(&updated_at).map_err(|e| conversion_error(4, e))?,
    })
}

fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    let id: String = row.get(0)?;
    let reference_count: i64 = row.get(2)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Tag {
        id: TagId::new(id),
        name: row.get(1)?,
        reference_count: u32::try_from(reference_count).map_err(|e| conversion_error(2, e))?,
        created_at: parse_timestamp(&created_at).map_err(|e| conversion_error(3, e))?,
        updated_at: parse_timestamp(&updated_at).map_err(|e| conversion_error(4, e))?,
    })
}
