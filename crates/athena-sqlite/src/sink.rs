//! `GraphSink` backed by SQLite
//!
//! Each upsert is one transaction: nodes first, then relationships, with properties
//! merged key by key into the stored JSON object. Write transactions start with
//! `BEGIN IMMEDIATE`: a deferred transaction that reads first cannot wait out
//! `busy_timeout` when another pool on the same file holds the write lock.

use crate::connection::SqlitePool;
use crate::error::SqliteResult;
use async_trait::async_trait;
use athena_core::{
    GraphDocument, GraphNode, GraphSink, NodeKey, PropertyMap, RelationshipKey, SinkHealth,
    SinkResult, UpsertSummary, WipeOutcome,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

/// SQLite implementation of [`GraphSink`]
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct SqliteGraphSink {
    pool: SqlitePool,
}

impl SqliteGraphSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run `f` against the connection on the blocking thread pool
    async fn blocking<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || pool.with_connection_mut(f)).await?
    }

    pub async fn node_count(&self) -> SqliteResult<usize> {
        self.blocking(|conn| count(conn, "graph_nodes")).await
    }

    pub async fn relationship_count(&self) -> SqliteResult<usize> {
        self.blocking(|conn| count(conn, "graph_relationships"))
            .await
    }

    /// Fetch a stored node with its merged properties
    pub async fn get_node(&self, id: &str, node_type: &str) -> SqliteResult<Option<GraphNode>> {
        let key = NodeKey::new(id, node_type);
        self.blocking(move |conn| {
            let Some(properties) = node_properties(conn, &key)? else {
                return Ok(None);
            };
            Ok(Some(GraphNode {
                id: key.id,
                node_type: key.node_type,
                properties,
            }))
        })
        .await
    }

    /// Stored properties of a relationship, if it exists
    pub async fn get_relationship(&self, key: &RelationshipKey) -> SqliteResult<Option<PropertyMap>> {
        let key = key.clone();
        self.blocking(move |conn| relationship_properties(conn, &key))
            .await
    }
}

#[async_trait]
impl GraphSink for SqliteGraphSink {
    async fn upsert(&self, document: GraphDocument) -> SinkResult<UpsertSummary> {
        let (source, nodes, relationships) = document.into_parts();
        let note_id = source.note_id;

        let summary = self
            .blocking(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let mut summary = UpsertSummary::default();

                for node in nodes {
                    if upsert_node(&tx, &node.key(), node.properties)? {
                        summary.nodes_created += 1;
                    } else {
                        summary.nodes_merged += 1;
                    }
                }

                for relationship in relationships {
                    let key = relationship.key();
                    for endpoint in [&key.source, &key.target] {
                        summary.nodes_created += ensure_node(&tx, endpoint)?;
                    }
                    if upsert_relationship(&tx, &key, relationship.properties)? {
                        summary.relationships_created += 1;
                    } else {
                        summary.relationships_merged += 1;
                    }
                }

                tx.commit()?;
                Ok(summary)
            })
            .await
            .inspect_err(|e| warn!(note_id = %note_id, error = %e, "SQLite upsert failed"))?;

        debug!(
            note_id = %note_id,
            nodes_created = summary.nodes_created,
            nodes_merged = summary.nodes_merged,
            relationships_created = summary.relationships_created,
            relationships_merged = summary.relationships_merged,
            "SQLite upsert committed"
        );

        Ok(summary)
    }

    async fn wipe_all(&self, confirmed: bool) -> SinkResult<WipeOutcome> {
        if !confirmed {
            debug!("Wipe requested without confirmation, skipping");
            return Ok(WipeOutcome::Skipped);
        }

        let outcome = self
            .blocking(|conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let relationships_removed = tx.execute("DELETE FROM graph_relationships", [])?;
                let nodes_removed = tx.execute("DELETE FROM graph_nodes", [])?;
                tx.commit()?;
                Ok(WipeOutcome::Wiped {
                    nodes_removed,
                    relationships_removed,
                })
            })
            .await
            .inspect_err(|e| warn!(error = %e, "SQLite wipe failed"))?;

        info!(?outcome, "SQLite graph wiped");
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn health_check(&self) -> SinkHealth {
        let reachable = self
            .blocking(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await;

        match reachable {
            Ok(()) => SinkHealth::Healthy,
            Err(e) => SinkHealth::Unhealthy {
                reason: e.to_string(),
            },
        }
    }
}

fn count(conn: &Connection, table: &str) -> SqliteResult<usize> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n as usize)
}

fn node_properties(conn: &Connection, key: &NodeKey) -> SqliteResult<Option<PropertyMap>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT properties FROM graph_nodes WHERE id = ?1 AND type = ?2",
            params![key.id, key.node_type],
            |row| row.get(0),
        )
        .optional()?;
    json.map(|json| serde_json::from_str::<PropertyMap>(&json).map_err(Into::into))
        .transpose()
}

fn relationship_properties(
    conn: &Connection,
    key: &RelationshipKey,
) -> SqliteResult<Option<PropertyMap>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT properties FROM graph_relationships
             WHERE source_id = ?1 AND source_type = ?2
               AND target_id = ?3 AND target_type = ?4 AND type = ?5",
            params![
                key.source.id,
                key.source.node_type,
                key.target.id,
                key.target.node_type,
                key.rel_type
            ],
            |row| row.get(0),
        )
        .optional()?;
    json.map(|json| serde_json::from_str::<PropertyMap>(&json).map_err(Into::into))
        .transpose()
}

/// Insert or merge a node; returns `true` when it was created
fn upsert_node(tx: &Transaction<'_>, key: &NodeKey, properties: PropertyMap) -> SqliteResult<bool> {
    match node_properties(tx, key)? {
        Some(mut stored) => {
            stored.extend(properties);
            tx.execute(
                "UPDATE graph_nodes SET properties = ?3, updated_at = datetime('now')
                 WHERE id = ?1 AND type = ?2",
                params![key.id, key.node_type, serde_json::to_string(&stored)?],
            )?;
            Ok(false)
        }
        None => {
            tx.execute(
                "INSERT INTO graph_nodes (id, type, properties) VALUES (?1, ?2, ?3)",
                params![key.id, key.node_type, serde_json::to_string(&properties)?],
            )?;
            Ok(true)
        }
    }
}

/// Make sure a relationship endpoint exists; returns the number of rows created
fn ensure_node(tx: &Transaction<'_>, key: &NodeKey) -> SqliteResult<usize> {
    Ok(tx.execute(
        "INSERT OR IGNORE INTO graph_nodes (id, type) VALUES (?1, ?2)",
        params![key.id, key.node_type],
    )?)
}

/// Insert or merge a relationship; returns `true` when it was created
fn upsert_relationship(
    tx: &Transaction<'_>,
    key: &RelationshipKey,
    properties: PropertyMap,
) -> SqliteResult<bool> {
    match relationship_properties(tx, key)? {
        Some(mut stored) => {
            stored.extend(properties);
            tx.execute(
                "UPDATE graph_relationships SET properties = ?6, updated_at = datetime('now')
                 WHERE source_id = ?1 AND source_type = ?2
                   AND target_id = ?3 AND target_type = ?4 AND type = ?5",
                params![
                    key.source.id,
                    key.source.node_type,
                    key.target.id,
                    key.target.node_type,
                    key.rel_type,
                    serde_json::to_string(&stored)?
                ],
            )?;
            Ok(false)
        }
        None => {
            tx.execute(
                "INSERT INTO graph_relationships
                     (source_id, source_type, target_id, target_type, type, properties)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    key.source.id,
                    key.source.node_type,
                    key.target.id,
                    key.target.node_type,
                    key.rel_type,
                    serde_json::to_string(&properties)?
                ],
            )?;
            Ok(true)
        }
    }
}
