//! SQLite connection handling
//!
//! One `Arc<Mutex<Connection>>` per pool. Writers in other pools (or other processes)
//! on the same file are arbitrated by SQLite's own locking and `busy_timeout`.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared handle to an initialized graph database
///
/// Clones share the connection. Callers on an async runtime should enter it through
/// `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Connection>>,
    config: SqliteConfig,
}

impl SqlitePool {
    /// Open the database, apply pragmas and bring the schema up to date
    pub fn new(config: SqliteConfig) -> SqliteResult<Self> {
        info!(path = ?config.path, "Opening SQLite graph store");

        let conn = open(&config)?;
        apply_pragmas(&conn, &config)?;
        schema::apply_migrations(&conn)?;
        debug!("SQLite graph store ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Private in-memory database
    pub fn memory() -> SqliteResult<Self> {
        Self::new(SqliteConfig::memory())
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Run `f` with exclusive access to the connection
    pub fn with_connection_mut<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T>,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }
}

fn open(config: &SqliteConfig) -> SqliteResult<Connection> {
    if config.is_memory() {
        return Ok(Connection::open_in_memory()?);
    }

    if let Some(parent) = config.path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            SqliteError::Connection(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    Ok(Connection::open(&config.path)?)
}

fn apply_pragmas(conn: &Connection, config: &SqliteConfig) -> SqliteResult<()> {
    let mut pragmas = Vec::new();
    if config.wal_mode {
        pragmas.push("PRAGMA journal_mode = WAL;".to_string());
        pragmas.push("PRAGMA synchronous = NORMAL;".to_string());
    }
    if config.foreign_keys {
        pragmas.push("PRAGMA foreign_keys = ON;".to_string());
    }
    pragmas.push(format!("PRAGMA busy_timeout = {};", config.busy_timeout_ms));
    pragmas.push(format!("PRAGMA cache_size = {};", config.cache_size));
    if config.mmap_size > 0 {
        pragmas.push(format!("PRAGMA mmap_size = {};", config.mmap_size));
    }

    debug!(count = pragmas.len(), "Applying SQLite pragmas");
    conn.execute_batch(&pragmas.join("\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pragma<T: rusqlite::types::FromSql>(pool: &SqlitePool, name: &str) -> T {
        pool.with_connection_mut(|conn| {
            Ok(conn.query_row(&format!("PRAGMA {name};"), [], |row| row.get(0))?)
        })
        .unwrap()
    }

    #[test]
    fn test_file_pool_creates_parent_and_uses_wal() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("graph.db");

        let pool = SqlitePool::new(SqliteConfig::new(&db_path).with_busy_timeout_ms(750))
            .expect("Failed to create pool");

        assert!(db_path.exists());
        assert_eq!(pragma::<String>(&pool, "journal_mode").to_lowercase(), "wal");
        assert_eq!(pragma::<i64>(&pool, "busy_timeout"), 750);
        assert_eq!(pragma::<i64>(&pool, "foreign_keys"), 1);
    }

    #[test]
    fn test_graph_tables_exist_after_open() {
        let pool = SqlitePool::memory().expect("Failed to create pool");

        let tables: Vec<String> = pool
            .with_connection_mut(|conn| {
                let mut stmt = conn
                    .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                Ok(rows.filter_map(Result::ok).collect())
            })
            .unwrap();

        assert!(tables.contains(&"graph_nodes".to_string()));
        assert!(tables.contains(&"graph_relationships".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }
}
