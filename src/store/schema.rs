/*!
 * Store schema definitions.
 *
 * Two tables, both keyed by `(platform, id)`: `mods` mirrors the upstream
 * source listings and is read-only to the pipeline; `translations` holds one
 * durable record per translated identity.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the store schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing store schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        debug!("Store schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get::<_, i32>(0).map(|n| n > 0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all store tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    // WAL mode for better concurrency and crash recovery
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mods (
            platform TEXT NOT NULL,
            id TEXT NOT NULL,
            summary TEXT NOT NULL,
            PRIMARY KEY (platform, id)
        );

        CREATE TABLE IF NOT EXISTS translations (
            platform TEXT NOT NULL,
            id TEXT NOT NULL,
            original TEXT NOT NULL,
            translated TEXT NOT NULL,
            translated_at TEXT NOT NULL,
            needs_update INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (platform, id)
        );
        "#,
    )
    .context("Failed to create store tables")?;

    Ok(())
}
