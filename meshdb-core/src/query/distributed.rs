//! Distributed query runner

use super::elapsed_ms;
use crate::Result;
use crate::network::DatabasePlacement;
use crate::simulation::{Chance, Delay};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Result of a distributed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub success: bool,
    pub results: Vec<Value>,
    /// Wall time around the simulated execution, milliseconds
    #[serde(rename = "executionTime")]
    pub execution_time_ms: f64,
    /// Online hosting nodes the query was gated on
    pub node_count: usize,
}

impl QueryOutcome {
    fn unavailable() -> Self {
        Self {
            success: false,
            results: Vec::new(),
            execution_time_ms: 0.0,
            node_count: 0,
        }
    }
}

#[derive(Clone)]
pub struct DistributedQueryRunner {
    placement: DatabasePlacement,
    delay: Arc<dyn Delay>,
    chance: Arc<dyn Chance>,
    query_delay: Duration,
}

impl DistributedQueryRunner {
    pub fn new(
        placement: DatabasePlacement,
        delay: Arc<dyn Delay>,
        chance: Arc<dyn Chance>,
        query_delay: Duration,
    ) -> Self {
        Self {
            placement,
            delay,
            chance,
            query_delay,
        }
    }

    /// Run `query` against `database`
    ///
    /// Fails fast, without suspending, when no online node hosts the
    /// database. Otherwise read-like queries (`select`, `find`) yield three
    /// generated rows and anything else yields an `affected_rows` count.
    pub async fn execute(&self, query: &str, database: &str) -> Result<QueryOutcome> {
        let node_count = self
            .placement
            .nodes_hosting(database)?
            .iter()
            .filter(|n| n.is_online())
            .count();
        if node_count == 0 {
            debug!(database = %database, "no online node hosts database");
            return Ok(QueryOutcome::unavailable());
        }

        let start = Instant::now();
        self.delay.pause(self.query_delay).await;

        let lowered = query.to_lowercase();
        let results: Vec<Value> = if lowered.contains("select") || lowered.contains("find") {
            (1..=3)
                .map(|i| {
                    json!({
                        "id": i,
                        "name": format!("Result {i}"),
                        "value": self.chance.between(0.0, 100.0),
                    })
                })
                .collect()
        } else {
            vec![json!({ "affected_rows": self.chance.int_inclusive(1, 5) })]
        };

        let execution_time_ms = elapsed_ms(start);
        info!(
            database = %database,
            nodes = node_count,
            rows = results.len(),
            elapsed_ms = execution_time_ms,
            "distributed query executed"
        );
        Ok(QueryOutcome {
            success: true,
            results,
            execution_time_ms,
            node_count,
        })
    }
}
