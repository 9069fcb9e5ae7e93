use anyhow::{Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use meshdb_core::Engine;
use meshdb_core::catalog::DatabaseEngine;
use serde_json::{Value, json};

use super::{OutputContext, object_columns, print_objects};

#[derive(Args)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub command: QueryCommands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EngineKind {
    Postgresql,
    Mongodb,
}

impl From<EngineKind> for DatabaseEngine {
    fn from(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Postgresql => DatabaseEngine::Postgresql,
            EngineKind::Mongodb => DatabaseEngine::Mongodb,
        }
    }
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Run a query across the online nodes hosting a database
    Run {
        /// Database name
        database: String,
        /// Query text
        query: String,
    },
    /// Run SQL in the PostgreSQL editor
    Sql {
        /// SQL text
        query: String,
    },
    /// Run a MongoDB shell query in the editor
    Mongo {
        /// Query text, e.g. 'db.users.find({})'
        query: String,
    },
    /// Save a named query
    Save {
        #[arg(long, value_enum)]
        engine: EngineKind,
        /// Query name
        #[arg(long)]
        name: String,
        /// Catalog database id
        #[arg(long)]
        database: String,
        /// Query text
        query: String,
    },
    /// List saved queries
    Saved {
        #[arg(value_enum)]
        engine: EngineKind,
    },
    /// Delete a saved query
    Forget {
        #[arg(value_enum)]
        engine: EngineKind,
        /// Saved query id
        id: String,
    },
}

pub async fn execute(engine: &Engine, args: QueryArgs, output: &OutputContext) -> Result<()> {
    match args.command {
        QueryCommands::Run { database, query } => run_distributed(engine, &database, &query, output).await,
        QueryCommands::Sql { query } => {
            let result = engine.editor().run_sql(&query).await?;
            if output.json {
                return output.print_json(&result);
            }
            print_objects(output, &result.columns, &result.rows)?;
            println!("{} row(s) in {:.2}ms", result.row_count, result.execution_time_ms);
            Ok(())
        }
        QueryCommands::Mongo { query } => {
            let result = engine.editor().run_mongo(&query).await?;
            if output.json {
                return output.print_json(&result);
            }
            for document in &result.data {
                println!("{}", serde_json::to_string_pretty(document)?);
            }
            println!(
                "{} document(s) in {:.2}ms",
                result.data.len(),
                result.execution_time_ms
            );
            Ok(())
        }
        QueryCommands::Save {
            engine: kind,
            name,
            database,
            query,
        } => {
            let saved = engine
                .saved_queries()
                .save(kind.into(), &name, &query, &database)
                .await?;
            if output.json {
                return output.print_json(&saved);
            }
            output.print_success(&format!("Query \"{}\" has been saved", saved.name));
            Ok(())
        }
        QueryCommands::Saved { engine: kind } => {
            let saved = engine.saved_queries().list(kind.into())?;
            if output.json {
                return output.print_json(&saved);
            }
            let rows: Vec<Vec<Value>> = saved
                .iter()
                .map(|q| vec![json!(q.id), json!(q.name), json!(q.database), json!(q.query)])
                .collect();
            output.print_table(&["ID", "Name", "Database", "Query"], &rows)
        }
        QueryCommands::Forget { engine: kind, id } => {
            if !engine.saved_queries().delete(kind.into(), &id)? {
                bail!("saved query '{id}' not found");
            }
            output.print_success("Query deleted");
            Ok(())
        }
    }
}

async fn run_distributed(
    engine: &Engine,
    database: &str,
    query: &str,
    output: &OutputContext,
) -> Result<()> {
    let outcome = engine.queries().execute(query, database).await?;
    if output.json {
        output.print_json(&outcome)?;
    }
    if !outcome.success {
        bail!("no online node hosts database '{database}'");
    }
    if output.json {
        return Ok(());
    }

    let columns = object_columns(&outcome.results);
    print_objects(output, &columns, &outcome.results)?;
    println!(
        "{} row(s) from {} node(s) in {:.2}ms",
        outcome.results.len(),
        outcome.node_count,
        outcome.execution_time_ms
    );
    Ok(())
}
