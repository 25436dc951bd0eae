//! SQLite-backed record storage.
//!
//! [`insert_memory`], [`get_memory`] and [`load_memories`] are the reference query layer the
//! CLI feeds into scoring. [`SqliteStore`] implements [`ValidationStore`] with an immediate
//! (write-locking) transaction per call, so concurrent validations serialize inside SQLite.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::Mutex;

use super::confidence::{ValidationState, ValidationStore, ValidationTx, ValidationUpdate};
use super::types::{parse_timestamp, ImportanceTier, MemoryRecord};
use crate::error::MemoryError;

const SELECT_COLUMNS: &str = "id, title, path, memory_type, anchors, importance_tier, \
     importance_weight, access_count, confidence, validation_count, created_at, updated_at, \
     last_accessed, last_cited, last_review, stability";

/// Insert a record. An empty id is replaced with a fresh UUID v7. Returns the stored id.
pub fn insert_memory(conn: &mut Connection, record: &MemoryRecord) -> Result<String> {
    let id = if record.id.is_empty() {
        uuid::Uuid::now_v7().to_string()
    } else {
        record.id.clone()
    };
    let anchors = serde_json::to_string(&record.anchors)?;
    let ts = |t: Option<chrono::DateTime<chrono::Utc>>| t.map(|t| t.to_rfc3339());

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO memories (id, title, path, memory_type, anchors, importance_tier, \
         importance_weight, access_count, confidence, validation_count, created_at, updated_at, \
         last_accessed, last_cited, last_review, stability) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            id,
            record.title,
            record.path,
            record.memory_type.map(|t| t.as_str()),
            anchors,
            record.importance_tier.as_str(),
            record.importance_weight(),
            record.access_count as i64,
            record.confidence(),
            record.validation_count,
            ts(record.created_at),
            ts(record.updated_at),
            ts(record.last_accessed),
            ts(record.last_cited),
            ts(record.last_review),
            record.stability(),
        ],
    )?;
    write_audit_log(&tx, "create", &id, None)?;
    tx.commit()?;

    Ok(id)
}

/// Fetch one record by id.
pub fn get_memory(conn: &Connection, id: &str) -> Result<Option<MemoryRecord>> {
    let record = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM memories WHERE id = ?1"),
            params![id],
            row_to_record,
        )
        .optional()?;
    Ok(record)
}

/// Load all records, optionally restricted to paths starting with `path_prefix`.
pub fn load_memories(conn: &Connection, path_prefix: Option<&str>) -> Result<Vec<MemoryRecord>> {
    let records = match path_prefix {
        Some(prefix) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM memories WHERE substr(path, 1, length(?1)) = ?1 \
                 ORDER BY rowid"
            ))?;
            let rows = stmt.query_map(params![prefix], row_to_record)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt =
                conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM memories ORDER BY rowid"))?;
            let rows = stmt.query_map([], row_to_record)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(records)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let anchors: String = row.get(4)?;
    let tier: String = row.get(5)?;
    let memory_type: Option<String> = row.get(3)?;
    let ts = |idx: usize| -> rusqlite::Result<_> {
        Ok(row.get::<_, Option<String>>(idx)?.as_deref().and_then(parse_timestamp))
    };

    Ok(MemoryRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        path: row.get(2)?,
        memory_type: memory_type.and_then(|t| t.parse().ok()),
        anchors: serde_json::from_str(&anchors).unwrap_or_default(),
        similarity: 0.0,
        importance_tier: super::tiers::normalize_tier(&tier),
        importance_weight: row.get(6)?,
        access_count: row.get::<_, i64>(7)?.max(0) as u64,
        confidence: row.get(8)?,
        validation_count: row.get(9)?,
        created_at: ts(10)?,
        updated_at: ts(11)?,
        last_accessed: ts(12)?,
        last_cited: ts(13)?,
        last_review: ts(14)?,
        stability: row.get(15)?,
    })
}

/// Write an entry to the memory_log audit table.
pub(crate) fn write_audit_log(
    conn: &Connection,
    operation: &str,
    memory_id: &str,
    details: Option<&serde_json::Value>,
) -> rusqlite::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let details_json = details.map(|d| d.to_string());
    conn.execute(
        "INSERT INTO memory_log (operation, memory_id, details, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![operation, memory_id, details_json, now],
    )?;
    Ok(())
}

// ── Validation store ─────────────────────────────────────────────────────────

/// [`ValidationStore`] over a shared SQLite connection.
///
/// The single connection sits behind one mutex, so validations through the same
/// `SqliteStore` serialize even when they target different records. For cross-record
/// concurrency, open one store per thread on the same database file; SQLite's write lock
/// then orders their immediate transactions.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` with the underlying connection (for loading and inserting records).
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))?;
        f(&mut conn)
    }
}

struct SqliteTx<'a> {
    tx: &'a rusqlite::Transaction<'a>,
    scope: &'a str,
    current_tier: Option<ImportanceTier>,
}

impl SqliteTx<'_> {
    fn check_scope(&self, id: &str) -> Result<(), MemoryError> {
        if id == self.scope {
            Ok(())
        } else {
            Err(MemoryError::Storage(format!(
                "transaction scoped to {} cannot touch {id}",
                self.scope
            )))
        }
    }
}

impl ValidationTx for SqliteTx<'_> {
    fn fetch(&mut self, id: &str) -> Result<Option<ValidationState>, MemoryError> {
        self.check_scope(id)?;
        let state = self
            .tx
            .query_row(
                "SELECT confidence, validation_count, importance_tier FROM memories WHERE id = ?1",
                params![id],
                |row| {
                    let tier: String = row.get(2)?;
                    Ok(ValidationState {
                        confidence: row.get(0)?,
                        validation_count: row.get(1)?,
                        tier: super::tiers::normalize_tier(&tier),
                    })
                },
            )
            .optional()?;
        self.current_tier = state.as_ref().map(|s| s.tier);
        Ok(state)
    }

    fn update(&mut self, id: &str, update: &ValidationUpdate) -> Result<(), MemoryError> {
        self.check_scope(id)?;
        let rows = self.tx.execute(
            "UPDATE memories SET confidence = ?1, validation_count = ?2, importance_tier = ?3, \
             updated_at = ?4 WHERE id = ?5",
            params![
                update.confidence.clamp(0.0, 1.0),
                update.validation_count,
                update.tier.as_str(),
                update.updated_at.to_rfc3339(),
                id,
            ],
        )?;
        if rows == 0 {
            return Err(MemoryError::NotFound(id.to_string()));
        }

        let promoted = self.current_tier.is_some_and(|t| t != update.tier);
        let details = serde_json::json!({
            "confidence": update.confidence,
            "validation_count": update.validation_count,
            "tier": update.tier.as_str(),
        });
        let operation = if promoted { "promote" } else { "validate" };
        write_audit_log(self.tx, operation, id, Some(&details))?;
        self.current_tier = Some(update.tier);
        Ok(())
    }
}

impl ValidationStore for SqliteStore {
    fn run<T, F>(&self, id: &str, f: F) -> Result<T, MemoryError>
    where
        F: FnOnce(&mut dyn ValidationTx) -> Result<T, MemoryError>,
    {
        let mut conn = self.conn.lock().map_err(|_| MemoryError::LockPoisoned)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = {
            let mut scoped = SqliteTx {
                tx: &tx,
                scope: id,
                current_tier: None,
            };
            f(&mut scoped)?
        };
        tx.commit()?;
        Ok(value)
    }
}
