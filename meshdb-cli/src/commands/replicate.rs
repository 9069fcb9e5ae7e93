use anyhow::{Result, bail};
use clap::Args;
use meshdb_core::Engine;
use serde_json::json;

use super::OutputContext;

#[derive(Args)]
pub struct ReplicateArgs {
    /// Database name to copy
    pub database: String,
    /// Source node id (must host the database)
    #[arg(long = "from")]
    pub source: String,
    /// Target node ids, replicated one after another
    #[arg(long = "to", required = true, num_args = 1..)]
    pub targets: Vec<String>,
}

pub async fn execute(engine: &Engine, args: ReplicateArgs, output: &OutputContext) -> Result<()> {
    if !output.json {
        output.print_info(&format!(
            "Replicating '{}' to {} node(s)...",
            args.database,
            args.targets.len()
        ));
    }

    let reports = engine
        .replication()
        .replicate_to_many(&args.database, &args.source, &args.targets)
        .await?;

    if output.json {
        output.print_json(&reports)?;
    } else {
        let rows: Vec<Vec<serde_json::Value>> = reports
            .iter()
            .map(|r| vec![json!(r.target_id), json!(r.phase.to_string())])
            .collect();
        output.print_table(&["Target", "Result"], &rows)?;
    }

    let failed = reports.iter().filter(|r| !r.replicated()).count();
    if failed > 0 {
        bail!(
            "{failed} of {} replication(s) rejected: check that both nodes exist and the source hosts '{}'",
            reports.len(),
            args.database
        );
    }
    if !output.json {
        output.print_success("Replication complete");
    }
    Ok(())
}
