use anyhow::Result;
use clap::{Parser, Subcommand};
use meshdb_cli::commands::{self, config as config_cmd, db, node, query, replicate, tx};
use meshdb_cli::{config, logging};
use meshdb_core::Engine;
use std::path::PathBuf;

/// Command-line interface for the MeshDB node network simulator
#[derive(Parser)]
#[command(name = "meshdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "MESHDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the JSON collections
    #[arg(long, env = "MESHDB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Debug output
    #[arg(long)]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Node registry and placement
    Node(node::NodeArgs),
    /// Replicate a database between nodes
    Replicate(replicate::ReplicateArgs),
    /// Transactions
    Tx(tx::TxArgs),
    /// Distributed and editor queries
    Query(query::QueryArgs),
    /// Catalog databases
    Db(db::DbArgs),
    /// Configuration management
    Config(config_cmd::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.debug);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::Config::default_path);
    let cfg = config::Config::load(Some(&config_path))?;
    let data_dir = cfg.resolve_data_dir(cli.data_dir.as_deref());

    let output = commands::OutputContext { json: cli.json };

    // Config commands must work without touching the data directory
    let command = match cli.command {
        Commands::Config(args) => {
            return config_cmd::execute(args, &cfg, &config_path, &data_dir, &output).await;
        }
        command => command,
    };

    tracing::debug!(data_dir = %data_dir.display(), "opening engine");
    let engine = Engine::with_data_dir(&data_dir, cfg.simulation.clone())?;

    match command {
        Commands::Node(args) => node::execute(&engine, args, &output).await,
        Commands::Replicate(args) => replicate::execute(&engine, args, &output).await,
        Commands::Tx(args) => tx::execute(&engine, args, &output).await,
        Commands::Query(args) => query::execute(&engine, args, &output).await,
        Commands::Db(args) => db::execute(&engine, args, &output).await,
        Commands::Config(_) => Ok(()),
    }
}
