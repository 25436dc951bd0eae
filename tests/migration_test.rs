mod helpers;

use memrank::db;
use memrank::db::migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migrations_are_idempotent() {
    let conn = helpers::test_db();
    // Running again should be a no-op
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn v1_rows_get_default_stability() {
    // Simulate a v1 database holding data from before the FSRS columns existed
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), 1);

    conn.execute(
        "INSERT INTO memories (id, title, importance_tier) VALUES ('old', 'legacy row', 'important')",
        [],
    )
    .unwrap();

    run_migrations(&conn).unwrap();

    let record = memrank::memory::store::get_memory(&conn, "old").unwrap().unwrap();
    assert_eq!(record.stability, 1.0);
    assert!(record.last_review.is_none());
    assert_eq!(record.importance_tier, memrank::memory::types::ImportanceTier::Important);
}
