//! Versioned database migrations.
//!
//! Migrations run sequentially from the current stored version to the latest.
//! Each migration is an idempotent SQL script.

use rusqlite::Connection;
use tl_core::constants::DB_SCHEMA_VERSION;
use tl_core::error::{TlError, TlResult};
use tracing::{info, warn};

/// Run all pending migrations on the database.
pub fn run_migrations(conn: &Connection) -> TlResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version >= DB_SCHEMA_VERSION {
        info!("database schema is up to date (version {current_version})");
        return Ok(());
    }

    info!("running migrations from version {current_version} to {DB_SCHEMA_VERSION}");

    for version in (current_version + 1)..=DB_SCHEMA_VERSION {
        run_migration(conn, version)?;
    }

    set_schema_version(conn, DB_SCHEMA_VERSION)?;
    info!("migrations complete, schema at version {DB_SCHEMA_VERSION}");
    Ok(())
}

/// Get the current schema version from the database.
fn get_schema_version(conn: &Connection) -> TlResult<i32> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .map_err(|e| TlError::Database(e.to_string()))?;

    if count == 0 {
        // First run - set version to 0
        conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])
            .map_err(|e| TlError::Database(e.to_string()))?;
        return Ok(0);
    }

    conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get(0)
    })
    .map_err(|e| TlError::Database(e.to_string()))
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> TlResult<()> {
    conn.execute("UPDATE schema_version SET version = ?1", [version])
        .map_err(|e| TlError::Database(e.to_string()))?;
    Ok(())
}

/// Run a specific migration version.
fn run_migration(conn: &Connection, version: i32) -> TlResult<()> {
    info!("applying migration version {version}");

    match version {
        1 => migration_v1(conn),
        _ => {
            warn!("unknown migration version {version}, skipping");
            Ok(())
        }
    }
}

/// Migration v1: initial schema is created by schema::create_tables.
/// Backfills `is_read = 0` for any notification row imported without one.
fn migration_v1(conn: &Connection) -> TlResult<()> {
    conn.execute(
        "UPDATE notifications SET is_read = 0 WHERE is_read IS NULL",
        [],
    )
    .map_err(|e| TlError::Migration(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_migrations_run_and_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();

        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), DB_SCHEMA_VERSION);

        // Second run is a no-op
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), DB_SCHEMA_VERSION);
    }
}
