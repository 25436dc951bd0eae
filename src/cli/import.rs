use anyhow::Result;
use rusqlite::params;
use std::path::Path;

use memrank::config::MemrankConfig;
use memrank::memory::store::insert_memory;

/// Import records from a JSON array. Skips records whose id already exists.
pub fn import(config: &MemrankConfig, file: &Path) -> Result<()> {
    let records = super::read_records_file(file)?;

    let db_path = config.resolved_db_path();
    let mut conn = memrank::db::open_database(&db_path)?;

    let mut imported = 0u64;
    let mut skipped = 0u64;

    for record in &records {
        if !record.id.is_empty() {
            let exists: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM memories WHERE id = ?1",
                params![record.id],
                |row| row.get(0),
            )?;
            if exists {
                skipped += 1;
                continue;
            }
        }

        insert_memory(&mut conn, record)?;
        imported += 1;
    }

    tracing::info!(imported, skipped, db = %db_path.display(), "import complete");
    super::print_json(&serde_json::json!({ "imported": imported, "skipped": skipped }))
}
