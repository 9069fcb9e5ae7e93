//! Node registry: CRUD over `network_nodes`

use super::{NetworkNode, NewNode, NodeStatus, NodeUpdate};
use crate::Result;
use crate::simulation::Clock;
use crate::store::{Store, namespace::NETWORK_NODES};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// CRUD over network nodes
///
/// Every call re-reads the full collection; every mutation rewrites it.
#[derive(Clone)]
pub struct NodeRegistry {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl NodeRegistry {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// All nodes in storage (insertion) order
    pub fn list_nodes(&self) -> Result<Vec<NetworkNode>> {
        self.store.get(NETWORK_NODES)
    }

    pub fn get_node(&self, id: &str) -> Result<Option<NetworkNode>> {
        Ok(self.list_nodes()?.into_iter().find(|n| n.id == id))
    }

    /// First node carrying `name`, registry order
    pub fn find_by_name(&self, name: &str) -> Result<Option<NetworkNode>> {
        Ok(self.list_nodes()?.into_iter().find(|n| n.name == name))
    }

    /// Set a node's status. Unknown ids are ignored.
    pub fn set_node_status(&self, id: &str, status: NodeStatus) -> Result<()> {
        let updated = self.modify(id, |node| node.status = status)?;
        if updated.is_some() {
            debug!(node_id = %id, %status, "node status changed");
        }
        Ok(())
    }

    /// Flip `online` to `offline` and anything else to `online`
    ///
    /// Returns the new status, `None` for an unknown id.
    pub fn toggle_status(&self, id: &str) -> Result<Option<NodeStatus>> {
        let updated = self.modify(id, |node| {
            node.status = match node.status {
                NodeStatus::Online => NodeStatus::Offline,
                NodeStatus::Offline | NodeStatus::Syncing => NodeStatus::Online,
            };
        })?;
        Ok(updated.map(|node| {
            info!(node_id = %id, status = %node.status, "node status toggled");
            node.status
        }))
    }

    /// Register a new node
    ///
    /// The node gets a fresh id and `created_at = now`; it always starts
    /// offline with no databases, whatever the form carried.
    pub fn create_node(&self, fields: NewNode) -> Result<NetworkNode> {
        let mut nodes = self.list_nodes()?;

        let mut id = Uuid::new_v4().to_string();
        while nodes.iter().any(|n| n.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let node = NetworkNode {
            id,
            name: fields.name,
            host: fields.host,
            port: fields.port,
            node_type: fields.node_type,
            status: NodeStatus::Offline,
            databases: Vec::new(),
            created_at: self.clock.now(),
        };

        nodes.push(node.clone());
        self.store.set(NETWORK_NODES, &nodes)?;

        info!(node_id = %node.id, name = %node.name, node_type = %node.node_type, "node created");
        Ok(node)
    }

    /// Edit name/host/port/type of a node
    pub fn update_node(&self, id: &str, update: NodeUpdate) -> Result<Option<NetworkNode>> {
        self.modify(id, move |node| update.apply(node))
    }

    /// Remove a node. Returns whether anything was removed.
    pub fn delete_node(&self, id: &str) -> Result<bool> {
        let mut nodes = self.list_nodes()?;
        let before = nodes.len();
        nodes.retain(|n| n.id != id);
        if nodes.len() == before {
            return Ok(false);
        }
        self.store.set(NETWORK_NODES, &nodes)?;
        info!(node_id = %id, "node deleted");
        Ok(true)
    }

    /// Apply `f` to the node with `id` and persist the collection
    ///
    /// Nothing is written when the id is unknown.
    pub(crate) fn modify<F>(&self, id: &str, f: F) -> Result<Option<NetworkNode>>
    where
        F: FnOnce(&mut NetworkNode),
    {
        let mut nodes = self.list_nodes()?;
        let Some(node) = nodes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        f(node);
        let updated = node.clone();
        self.store.set(NETWORK_NODES, &nodes)?;
        Ok(Some(updated))
    }
}
