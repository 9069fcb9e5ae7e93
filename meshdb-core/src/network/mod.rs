//! Simulated node network
//!
//! A node is a named host that carries a set of database names. Nodes are
//! created offline and empty; they come online through an explicit status
//! change or by receiving a replica.
//!
//! ```text
//!            set_node_status / toggle_status
//!   offline ◄──────────────────────────────► online
//!      │                                       ▲
//!      │ replicate(target)                     │ transfer done
//!      └────────────► syncing ─────────────────┘
//! ```

pub mod placement;
pub mod registry;

pub use placement::DatabasePlacement;
pub use registry::NodeRegistry;

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a node in the network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Accepts writes
    Primary,
    /// Serves its own databases
    #[default]
    Secondary,
    /// Holds copies of databases from other nodes
    Replica,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Primary => write!(f, "primary"),
            NodeType::Secondary => write!(f, "secondary"),
            NodeType::Replica => write!(f, "replica"),
        }
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(NodeType::Primary),
            "secondary" => Ok(NodeType::Secondary),
            "replica" => Ok(NodeType::Replica),
            other => Err(Error::invalid_input(format!("unknown node type '{other}'"))),
        }
    }
}

/// Availability of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Offline,
    /// Receiving a replica
    Syncing,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Online => write!(f, "online"),
            NodeStatus::Offline => write!(f, "offline"),
            NodeStatus::Syncing => write!(f, "syncing"),
        }
    }
}

impl FromStr for NodeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(NodeStatus::Online),
            "offline" => Ok(NodeStatus::Offline),
            "syncing" => Ok(NodeStatus::Syncing),
            other => Err(Error::invalid_input(format!(
                "unknown node status '{other}'"
            ))),
        }
    }
}

/// A node record as persisted under `network_nodes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// Unique, immutable id
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub status: NodeStatus,
    /// Hosted database names, duplicate-free, insertion order
    pub databases: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NetworkNode {
    /// Whether `database` is hosted here
    pub fn hosts(&self, database: &str) -> bool {
        self.databases.iter().any(|d| d == database)
    }

    pub fn is_online(&self) -> bool {
        self.status == NodeStatus::Online
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fields accepted when creating a node
///
/// `status` and `databases` may arrive from a submitted form but are
/// ignored: a new node always starts offline and empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
    pub name: String,
    pub host: String,
    pub port: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub databases: Vec<String>,
}

impl NewNode {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<String>,
        node_type: NodeType,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: port.into(),
            node_type,
            status: None,
            databases: Vec::new(),
        }
    }
}

/// Explicit edit of a node's descriptive fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<NodeType>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.host.is_none() && self.port.is_none() && self.node_type.is_none()
    }

    pub(crate) fn apply(self, node: &mut NetworkNode) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(host) = self.host {
            node.host = host;
        }
        if let Some(port) = self.port {
            node.port = port;
        }
        if let Some(node_type) = self.node_type {
            node.node_type = node_type;
        }
    }
}
