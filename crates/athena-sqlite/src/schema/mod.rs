//! Schema management and migrations

use crate::error::{SqliteError, SqliteResult};
use rusqlite::Connection;
use tracing::{debug, info};

/// Schema version - increment when making schema changes
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < 1 {
        info!(from = current_version, to = SCHEMA_VERSION, "Applying schema migrations");
        apply_migration_v1(conn)?;
    }

    Ok(())
}

/// Highest applied migration, 0 for a fresh database
pub fn current_version(conn: &Connection) -> SqliteResult<i32> {
    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;

    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: graph nodes and relationships
fn apply_migration_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("Applying migration v1: graph tables");

    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| SqliteError::Schema(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied");
    Ok(())
}

const SCHEMA_V1: &str = r#"
-- Nodes are identified by (id, type); properties is a JSON object of strings
CREATE TABLE IF NOT EXISTS graph_nodes (
    id TEXT NOT NULL,
    type TEXT NOT NULL,
    properties TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (id, type)
);

CREATE INDEX IF NOT EXISTS idx_graph_nodes_type ON graph_nodes(type);

-- Relationships are identified by (source key, target key, type)
CREATE TABLE IF NOT EXISTS graph_relationships (
    source_id TEXT NOT NULL,
    source_type TEXT NOT NULL,
    target_id TEXT NOT NULL,
    target_type TEXT NOT NULL,
    type TEXT NOT NULL,
    properties TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (source_id, source_type, target_id, target_type, type),
    FOREIGN KEY (source_id, source_type) REFERENCES graph_nodes(id, type) ON DELETE CASCADE,
    FOREIGN KEY (target_id, target_type) REFERENCES graph_nodes(id, type) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_graph_relationships_type ON graph_relationships(type);
CREATE INDEX IF NOT EXISTS idx_graph_relationships_target
    ON graph_relationships(target_id, target_type);
"#;
