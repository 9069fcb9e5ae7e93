//! MeshDB Core - simulated distributed database control plane
//!
//! This crate models a small network of database nodes and the operations
//! an operator runs against it:
//! - Node registry (primary / secondary / replica nodes with a status)
//! - Database placement (which node hosts which database names)
//! - Simulated replication, transactions and distributed queries
//! - PostgreSQL-flavoured and MongoDB-flavoured catalogs
//!
//! Nothing here talks to a real database. Latency, randomness and time come
//! from injectable seams in [`simulation`], and all state lives in named
//! JSON collections behind a [`store::KeyValueStore`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Engine                      │
//! │       (one Store + one Runtime shared)       │
//! └──────────────┬──────────────────────────────┘
//!                │
//! ┌──────────────┴──────────────────────────────┐
//! │   Replication · Transactions · Queries       │
//! │        (async, one suspension each)          │
//! └──────────────┬──────────────────────────────┘
//!                │
//! ┌──────────────┴──────────────────────────────┐
//! │   NodeRegistry · DatabasePlacement · Catalog │
//! └──────────────┬──────────────────────────────┘
//!                │
//! ┌──────────────┴──────────────────────────────┐
//! │              Store (typed)                   │
//! │   KeyValueStore: Memory · File · Detached    │
//! └─────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod network;
pub mod query;
pub mod replication;
pub mod simulation;
pub mod store;
pub mod testing;
pub mod transaction;

pub use config::SimulationConfig;
pub use engine::Engine;
pub use error::{Error, Result};
