//! Database placement: which node hosts which database names

use super::{NetworkNode, NodeRegistry};
use crate::Result;
use crate::catalog::{AvailableDatabase, Catalog};
use tracing::debug;

/// Attach and detach database names on nodes
#[derive(Clone)]
pub struct DatabasePlacement {
    registry: NodeRegistry,
    catalog: Catalog,
}

impl DatabasePlacement {
    pub fn new(registry: NodeRegistry, catalog: Catalog) -> Self {
        Self { registry, catalog }
    }

    /// Add `database` to a node's set. Idempotent.
    ///
    /// Returns whether the node exists; unknown nodes are left alone.
    pub fn add_database(&self, node_id: &str, database: &str) -> Result<bool> {
        let updated = self.registry.modify(node_id, |node| {
            if !node.hosts(database) {
                node.databases.push(database.to_string());
            }
        })?;
        if updated.is_some() {
            debug!(node_id = %node_id, database = %database, "database attached");
        }
        Ok(updated.is_some())
    }

    /// Remove `database` from a node's set if present
    ///
    /// Returns whether the node exists.
    pub fn remove_database(&self, node_id: &str, database: &str) -> Result<bool> {
        let updated = self
            .registry
            .modify(node_id, |node| node.databases.retain(|d| d != database))?;
        if updated.is_some() {
            debug!(node_id = %node_id, database = %database, "database detached");
        }
        Ok(updated.is_some())
    }

    /// Nodes whose set contains `database`, registry order
    pub fn nodes_hosting(&self, database: &str) -> Result<Vec<NetworkNode>> {
        Ok(self
            .registry
            .list_nodes()?
            .into_iter()
            .filter(|n| n.hosts(database))
            .collect())
    }

    /// Databases known to the catalog that can be attached to a node
    pub fn available_databases(&self) -> Result<Vec<AvailableDatabase>> {
        self.catalog.available_databases()
    }
}
