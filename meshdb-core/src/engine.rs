//! Composition root
//!
//! An [`Engine`] hands one [`Store`] handle and one [`Runtime`] to every
//! component, so everything built from the same engine sees the same data.

use crate::Result;
use crate::catalog::Catalog;
use crate::config::SimulationConfig;
use crate::network::{DatabasePlacement, NodeRegistry};
use crate::query::{DistributedQueryRunner, QueryEditor, SavedQueries};
use crate::replication::ReplicationCoordinator;
use crate::simulation::Runtime;
use crate::store::{FileStore, Store};
use crate::transaction::TransactionCoordinator;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// All MeshDB components over one store
#[derive(Clone)]
pub struct Engine {
    store: Store,
    config: SimulationConfig,
    nodes: NodeRegistry,
    placement: DatabasePlacement,
    replication: ReplicationCoordinator,
    transactions: TransactionCoordinator,
    queries: DistributedQueryRunner,
    editor: QueryEditor,
    saved_queries: SavedQueries,
    catalog: Catalog,
}

impl Engine {
    /// Build an engine with real timers, the system clock and the RNG
    /// selected by `config.seed`
    pub fn new(store: Store, config: SimulationConfig) -> Result<Self> {
        let runtime = Runtime::from_config(&config);
        Self::with_runtime(store, config, runtime)
    }

    /// Build an engine persisted as JSON files under `dir`
    pub fn with_data_dir(dir: impl AsRef<Path>, config: SimulationConfig) -> Result<Self> {
        let store = Store::new(FileStore::open(dir.as_ref())?);
        Self::new(store, config)
    }

    /// Build an engine with explicit simulation seams
    pub fn with_runtime(store: Store, config: SimulationConfig, runtime: Runtime) -> Result<Self> {
        config.validate()?;

        let nodes = NodeRegistry::new(store.clone(), runtime.clock.clone());
        let catalog = Catalog::new(store.clone(), runtime.clock.clone());
        let placement = DatabasePlacement::new(nodes.clone(), catalog.clone());
        let replication = ReplicationCoordinator::new(
            nodes.clone(),
            placement.clone(),
            runtime.delay.clone(),
            config.replication_delay(),
        );
        let transactions = TransactionCoordinator::new(
            store.clone(),
            runtime.delay.clone(),
            runtime.chance.clone(),
            runtime.clock.clone(),
            config.transaction_delay(),
            config.commit_probability,
        );
        let queries = DistributedQueryRunner::new(
            placement.clone(),
            runtime.delay.clone(),
            runtime.chance.clone(),
            config.query_delay(),
        );
        let editor = QueryEditor::new(
            runtime.delay.clone(),
            runtime.clock.clone(),
            config.editor_delay(),
        );
        let saved_queries = SavedQueries::new(
            store.clone(),
            runtime.delay,
            runtime.clock,
            config.save_delay(),
        );

        debug!(store = ?store, "engine ready");
        Ok(Self {
            store,
            config,
            nodes,
            placement,
            replication,
            transactions,
            queries,
            editor,
            saved_queries,
            catalog,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn placement(&self) -> &DatabasePlacement {
        &self.placement
    }

    pub fn replication(&self) -> &ReplicationCoordinator {
        &self.replication
    }

    pub fn transactions(&self) -> &TransactionCoordinator {
        &self.transactions
    }

    pub fn queries(&self) -> &DistributedQueryRunner {
        &self.queries
    }

    pub fn editor(&self) -> &QueryEditor {
        &self.editor
    }

    pub fn saved_queries(&self) -> &SavedQueries {
        &self.saved_queries
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
