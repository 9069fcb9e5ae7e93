//! Query simulation
//!
//! - [`DistributedQueryRunner`]: fans a query out to the online nodes
//!   hosting a database and fabricates a result set.
//! - [`QueryEditor`]: single-database editor with canned SQL and MongoDB
//!   shell results.
//! - [`SavedQueries`]: named queries kept per engine.
//!
//! Query text is never parsed; results are chosen by lowercase substring.

pub mod distributed;
pub mod editor;
pub mod saved;

pub use distributed::{DistributedQueryRunner, QueryOutcome};
pub use editor::{DocumentResult, QueryEditor, SqlResult};
pub use saved::{SavedQueries, SavedQuery};

/// Elapsed milliseconds between `start` and now, fractional
pub(crate) fn elapsed_ms(start: tokio::time::Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
