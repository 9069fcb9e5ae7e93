use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use meshdb_core::Engine;
use serde_json::{Value, json};

use super::OutputContext;

#[derive(Args)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommands,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// List catalog databases of both engines
    List,
    /// Create a PostgreSQL database
    PgCreate {
        /// Database name
        name: String,
    },
    /// Drop a PostgreSQL database with its tables and rows
    PgDrop {
        /// Database id
        id: String,
    },
    /// Create a MongoDB database
    MongoCreate {
        /// Database name
        name: String,
    },
    /// Drop a MongoDB database with its collections and documents
    MongoDrop {
        /// Database id
        id: String,
    },
}

pub async fn execute(engine: &Engine, args: DbArgs, output: &OutputContext) -> Result<()> {
    let catalog = engine.catalog();
    match args.command {
        DbCommands::List => {
            let databases = catalog.available_databases()?;
            if output.json {
                return output.print_json(&databases);
            }
            if databases.is_empty() {
                output.print_info("No databases");
                return Ok(());
            }
            let rows: Vec<Vec<Value>> = databases
                .iter()
                .map(|db| vec![json!(db.id), json!(db.name), json!(db.engine.to_string())])
                .collect();
            output.print_table(&["ID", "Name", "Engine"], &rows)
        }
        DbCommands::PgCreate { name } => {
            let db = catalog.postgres().create_database(&name)?;
            if output.json {
                return output.print_json(&db);
            }
            output.print_success(&format!("PostgreSQL database '{}' created with id {}", db.name, db.id));
            Ok(())
        }
        DbCommands::PgDrop { id } => {
            if !catalog.postgres().delete_database(&id)? {
                bail!("PostgreSQL database '{id}' not found");
            }
            output.print_success(&format!("PostgreSQL database {id} dropped"));
            Ok(())
        }
        DbCommands::MongoCreate { name } => {
            let db = catalog.mongo().create_database(&name)?;
            if output.json {
                return output.print_json(&db);
            }
            output.print_success(&format!("MongoDB database '{}' created with id {}", db.name, db.id));
            Ok(())
        }
        DbCommands::MongoDrop { id } => {
            if !catalog.mongo().delete_database(&id)? {
                bail!("MongoDB database '{id}' not found");
            }
            output.print_success(&format!("MongoDB database {id} dropped"));
            Ok(())
        }
    }
}
