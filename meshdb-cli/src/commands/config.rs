use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

use super::OutputContext;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show configuration file path
    Path,
}

pub async fn execute(
    args: ConfigArgs,
    cfg: &Config,
    config_path: &Path,
    data_dir: &Path,
    output: &OutputContext,
) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(cfg, data_dir, output),
        ConfigCommands::Path => {
            if output.json {
                return output.print_json(&serde_json::json!({ "path": config_path }));
            }
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn show_config(cfg: &Config, data_dir: &Path, output: &OutputContext) -> Result<()> {
    if output.json {
        return output.print_json(&serde_json::json!({
            "data_dir": data_dir,
            "simulation": cfg.simulation,
        }));
    }

    let sim = &cfg.simulation;
    println!("Current Configuration");
    println!("=====================");
    println!("Data dir:           {}", data_dir.display());
    println!("Replication delay:  {}ms", sim.replication_delay_ms);
    println!("Transaction delay:  {}ms", sim.transaction_delay_ms);
    println!("Query delay:        {}ms", sim.query_delay_ms);
    println!("Editor delay:       {}ms", sim.editor_delay_ms);
    println!("Save delay:         {}ms", sim.save_delay_ms);
    println!("Commit probability: {}", sim.commit_probability);
    println!(
        "Seed:               {}",
        sim.seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(random)".to_string())
    );
    Ok(())
}
