#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use memrank::db;
use memrank::memory::types::{ImportanceTier, MemoryRecord};
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// A record with the given similarity and tier, last updated `days_old` days before `now`.
pub fn record(
    id: &str,
    similarity: f64,
    tier: ImportanceTier,
    days_old: i64,
    now: DateTime<Utc>,
) -> MemoryRecord {
    MemoryRecord {
        id: id.into(),
        title: format!("Record {id}"),
        similarity,
        importance_tier: tier,
        created_at: Some(now - Duration::days(days_old)),
        updated_at: Some(now - Duration::days(days_old)),
        ..Default::default()
    }
}

/// A record stored under `path`.
pub fn record_in(path: &str, tier: ImportanceTier, days_old: i64, now: DateTime<Utc>) -> MemoryRecord {
    MemoryRecord {
        path: Some(path.into()),
        ..record("", 50.0, tier, days_old, now)
    }
}

/// Insert a record and return its id.
pub fn insert(conn: &mut Connection, record: &MemoryRecord) -> String {
    memrank::memory::store::insert_memory(conn, record).unwrap()
}
