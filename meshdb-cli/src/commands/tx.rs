use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use meshdb_core::Engine;
use meshdb_core::transaction::Transaction;
use serde_json::{Value, json};

use super::OutputContext;

#[derive(Args)]
pub struct TxArgs {
    #[command(subcommand)]
    pub command: TxCommands,
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Open a transaction against a database
    Begin {
        /// Catalog database id
        database_id: String,
    },
    /// Append a statement to a pending transaction
    Add {
        /// Transaction id
        tx_id: String,
        /// Statement text
        statement: String,
    },
    /// Execute a pending transaction
    Exec {
        /// Transaction id
        tx_id: String,
    },
    /// Show one transaction
    Show {
        /// Transaction id
        tx_id: String,
    },
    /// List pending transactions for a database
    Active {
        /// Catalog database id
        database_id: String,
    },
    /// List every transaction for a database
    List {
        /// Catalog database id
        database_id: String,
    },
    /// Mark a pending transaction committed
    Commit {
        /// Transaction id
        tx_id: String,
    },
    /// Mark a pending transaction rolled back
    Rollback {
        /// Transaction id
        tx_id: String,
    },
}

pub async fn execute(engine: &Engine, args: TxArgs, output: &OutputContext) -> Result<()> {
    let tx = engine.transactions();
    match args.command {
        TxCommands::Begin { database_id } => {
            let t = tx.create(&database_id)?;
            if output.json {
                return output.print_json(&t);
            }
            output.print_success(&format!("Transaction {} opened", t.id));
            Ok(())
        }
        TxCommands::Add { tx_id, statement } => {
            if !tx.add_statement(&tx_id, &statement)? {
                bail!("transaction '{tx_id}' is not pending");
            }
            output.print_success("Statement added");
            Ok(())
        }
        TxCommands::Exec { tx_id } => {
            let outcome = tx.execute(&tx_id).await?;
            if output.json {
                return output.print_json(&outcome);
            }
            if outcome.success {
                output.print_success(&outcome.message);
            } else {
                output.print_error(&outcome.message);
            }
            Ok(())
        }
        TxCommands::Show { tx_id } => match tx.get(&tx_id)? {
            Some(t) => print_transaction(&t, output),
            None => bail!("Transaction not found"),
        },
        TxCommands::Active { database_id } => print_transactions(&tx.list_active(&database_id)?, output),
        TxCommands::List { database_id } => print_transactions(&tx.list(&database_id)?, output),
        TxCommands::Commit { tx_id } => {
            if !tx.commit(&tx_id)? {
                bail!("transaction '{tx_id}' is not pending");
            }
            output.print_success(&format!("Transaction {tx_id} committed"));
            Ok(())
        }
        TxCommands::Rollback { tx_id } => {
            if !tx.rollback(&tx_id)? {
                bail!("transaction '{tx_id}' is not pending");
            }
            output.print_success(&format!("Transaction {tx_id} rolled back"));
            Ok(())
        }
    }
}

fn print_transaction(t: &Transaction, output: &OutputContext) -> Result<()> {
    if output.json {
        return output.print_json(t);
    }
    println!("Transaction {}", t.id);
    println!("  Database: {}", t.database_id);
    println!("  Status:   {}", t.status);
    println!("  Created:  {}", t.created_at.to_rfc3339());
    println!("  Statements:");
    for (i, statement) in t.statements.iter().enumerate() {
        println!("    {}. {}", i + 1, statement);
    }
    Ok(())
}

fn print_transactions(transactions: &[Transaction], output: &OutputContext) -> Result<()> {
    if output.json {
        return output.print_json(&transactions);
    }
    if transactions.is_empty() {
        output.print_info("No transactions");
        return Ok(());
    }
    let rows: Vec<Vec<Value>> = transactions
        .iter()
        .map(|t| {
            vec![
                json!(t.id),
                json!(t.status.to_string()),
                json!(t.statements.len()),
                json!(t.created_at.to_rfc3339()),
            ]
        })
        .collect();
    output.print_table(&["ID", "Status", "Statements", "Created"], &rows)
}
