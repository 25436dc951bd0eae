pub mod expired;
pub mod folders;
pub mod import;
pub mod rank;
pub mod validate;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use memrank::config::MemrankConfig;
use memrank::memory::store::{load_memories, SqliteStore};
use memrank::memory::types::MemoryRecord;

/// Read candidate records from a JSON file, or from the database when no file is given.
pub fn load_records(config: &MemrankConfig, input: Option<&Path>) -> Result<Vec<MemoryRecord>> {
    match input {
        Some(file) => read_records_file(file),
        None => {
            let conn = memrank::db::open_database(config.resolved_db_path())?;
            load_memories(&conn, None)
        }
    }
}

/// Parse a JSON array of records.
pub fn read_records_file(file: &Path) -> Result<Vec<MemoryRecord>> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read records file: {}", file.display()))?;
    serde_json::from_str(&json).context("failed to parse records JSON")
}

pub fn open_store(config: &MemrankConfig) -> Result<SqliteStore> {
    let conn = memrank::db::open_database(config.resolved_db_path())?;
    Ok(SqliteStore::new(conn))
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
