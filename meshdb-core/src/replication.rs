//! Simulated database replication between nodes
//!
//! One replication copies a database name from a source node onto a target
//! node. Only the target's `status` and `databases` change; the operation
//! itself is not persisted.
//!
//! ```text
//! Validating ──(source/target missing, db not on source)──► Failed
//!     │
//!     ▼  target.status = syncing
//!  Syncing ──(transfer delay)──► target.databases ∪= {db}
//!     │
//!     ▼  target.status = online
//!   Online
//! ```
//!
//! Once `Syncing` is entered the operation always completes. There is no
//! per-node lock: two replications into the same target race on the status
//! writes and the last one wins.

use crate::Result;
use crate::network::{DatabasePlacement, NodeRegistry, NodeStatus};
use crate::simulation::Delay;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Phase of one replication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationPhase {
    /// Checking source, target and database
    Validating,
    /// Target marked `syncing`, transfer in flight
    Syncing,
    /// Database copied, target `online`
    Online,
    /// Rejected during validation; nothing was touched
    Failed,
}

impl fmt::Display for ReplicationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicationPhase::Validating => write!(f, "validating"),
            ReplicationPhase::Syncing => write!(f, "syncing"),
            ReplicationPhase::Online => write!(f, "online"),
            ReplicationPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one target in a multi-target replication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationReport {
    pub target_id: String,
    pub phase: ReplicationPhase,
}

impl ReplicationReport {
    pub fn replicated(&self) -> bool {
        self.phase == ReplicationPhase::Online
    }
}

/// Copies database names between nodes
#[derive(Clone)]
pub struct ReplicationCoordinator {
    registry: NodeRegistry,
    placement: DatabasePlacement,
    delay: Arc<dyn Delay>,
    transfer_delay: Duration,
}

impl ReplicationCoordinator {
    pub fn new(
        registry: NodeRegistry,
        placement: DatabasePlacement,
        delay: Arc<dyn Delay>,
        transfer_delay: Duration,
    ) -> Self {
        Self {
            registry,
            placement,
            delay,
            transfer_delay,
        }
    }

    /// Replicate `database` from `source_id` onto `target_id`
    ///
    /// Returns `false` without touching anything when either node is
    /// missing or the source does not host `database`; otherwise marks the
    /// target `syncing`, waits out the transfer delay, adds the database to
    /// the target and brings it `online`.
    pub async fn replicate(&self, database: &str, source_id: &str, target_id: &str) -> Result<bool> {
        let phase = self.run(database, source_id, target_id).await?;
        Ok(phase == ReplicationPhase::Online)
    }

    /// Replicate onto several targets, one after another, in the given order
    pub async fn replicate_to_many(
        &self,
        database: &str,
        source_id: &str,
        target_ids: &[String],
    ) -> Result<Vec<ReplicationReport>> {
        let mut reports = Vec::with_capacity(target_ids.len());
        for target_id in target_ids {
            let phase = self.run(database, source_id, target_id).await?;
            reports.push(ReplicationReport {
                target_id: target_id.clone(),
                phase,
            });
        }

        let replicated = reports.iter().filter(|r| r.replicated()).count();
        info!(
            database = %database,
            source = %source_id,
            targets = target_ids.len(),
            replicated,
            "multi-target replication finished"
        );
        Ok(reports)
    }

    async fn run(&self, database: &str, source_id: &str, target_id: &str) -> Result<ReplicationPhase> {
        let (Some(source), Some(_target)) = (
            self.registry.get_node(source_id)?,
            self.registry.get_node(target_id)?,
        ) else {
            warn!(source = %source_id, target = %target_id, "replication rejected: unknown node");
            return Ok(ReplicationPhase::Failed);
        };

        if !source.hosts(database) {
            warn!(
                database = %database,
                source = %source_id,
                "replication rejected: database not on source"
            );
            return Ok(ReplicationPhase::Failed);
        }

        self.registry.set_node_status(target_id, NodeStatus::Syncing)?;
        info!(
            database = %database,
            source = %source_id,
            target = %target_id,
            phase = %ReplicationPhase::Syncing,
            "replication started"
        );

        self.delay.pause(self.transfer_delay).await;

        self.placement.add_database(target_id, database)?;
        self.registry.set_node_status(target_id, NodeStatus::Online)?;
        info!(
            database = %database,
            target = %target_id,
            phase = %ReplicationPhase::Online,
            "replication complete"
        );
        Ok(ReplicationPhase::Online)
    }
}
