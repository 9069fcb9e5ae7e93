use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use meshdb_core::Engine;
use meshdb_core::network::{NetworkNode, NewNode, NodeStatus, NodeType, NodeUpdate};
use serde_json::{Value, json};

use super::OutputContext;

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// List all nodes
    List,
    /// Register a new node (starts offline with no databases)
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Host name or address
        #[arg(long)]
        host: String,
        /// Port
        #[arg(long)]
        port: String,
        /// primary, secondary or replica
        #[arg(long = "type", default_value = "secondary")]
        node_type: NodeType,
    },
    /// Show one node
    Show {
        /// Node id or name
        node: String,
    },
    /// Set a node's status
    Status {
        /// Node id
        id: String,
        /// online, offline or syncing
        status: NodeStatus,
    },
    /// Flip a node between online and offline
    Toggle {
        /// Node id
        id: String,
    },
    /// Edit name, host, port or type
    Edit {
        /// Node id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<String>,
        #[arg(long = "type")]
        node_type: Option<NodeType>,
    },
    /// Remove a node
    Remove {
        /// Node id
        id: String,
    },
    /// Attach a database name to a node
    Attach {
        /// Node id
        id: String,
        /// Database name
        database: String,
    },
    /// Detach a database name from a node
    Detach {
        /// Node id
        id: String,
        /// Database name
        database: String,
    },
    /// List the nodes hosting a database
    Hosting {
        /// Database name
        database: String,
    },
}

pub async fn execute(engine: &Engine, args: NodeArgs, output: &OutputContext) -> Result<()> {
    match args.command {
        NodeCommands::List => print_nodes(&engine.nodes().list_nodes()?, output),
        NodeCommands::Add {
            name,
            host,
            port,
            node_type,
        } => add_node(engine, NewNode::new(name, host, port, node_type), output),
        NodeCommands::Show { node } => show_node(engine, &node, output),
        NodeCommands::Status { id, status } => set_status(engine, &id, status, output),
        NodeCommands::Toggle { id } => toggle(engine, &id, output),
        NodeCommands::Edit {
            id,
            name,
            host,
            port,
            node_type,
        } => edit_node(
            engine,
            &id,
            NodeUpdate {
                name,
                host,
                port,
                node_type,
            },
            output,
        ),
        NodeCommands::Remove { id } => remove_node(engine, &id, output),
        NodeCommands::Attach { id, database } => attach(engine, &id, &database, output),
        NodeCommands::Detach { id, database } => detach(engine, &id, &database, output),
        NodeCommands::Hosting { database } => {
            print_nodes(&engine.placement().nodes_hosting(&database)?, output)
        }
    }
}

fn node_row(node: &NetworkNode) -> Vec<Value> {
    vec![
        json!(node.id),
        json!(node.name),
        json!(node.address()),
        json!(node.node_type.to_string()),
        json!(node.status.to_string()),
        json!(node.databases.join(", ")),
    ]
}

fn print_nodes(nodes: &[NetworkNode], output: &OutputContext) -> Result<()> {
    if output.json {
        return output.print_json(&nodes);
    }
    if nodes.is_empty() {
        output.print_info("No nodes");
        return Ok(());
    }
    let rows: Vec<Vec<Value>> = nodes.iter().map(node_row).collect();
    output.print_table(
        &["ID", "Name", "Address", "Type", "Status", "Databases"],
        &rows,
    )
}

fn print_node(node: &NetworkNode, output: &OutputContext) -> Result<()> {
    if output.json {
        return output.print_json(node);
    }
    println!("Node {}", node.id);
    println!("  Name:      {}", node.name);
    println!("  Address:   {}", node.address());
    println!("  Type:      {}", node.node_type);
    println!("  Status:    {}", node.status);
    println!("  Databases: {}", node.databases.join(", "));
    println!("  Created:   {}", node.created_at.to_rfc3339());
    Ok(())
}

/// Reject blank values for flags that must carry text
fn require_field(flag: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("--{flag} must not be empty");
    }
    Ok(())
}

fn add_node(engine: &Engine, fields: NewNode, output: &OutputContext) -> Result<()> {
    require_field("name", &fields.name)?;
    require_field("host", &fields.host)?;
    require_field("port", &fields.port)?;

    let node = engine.nodes().create_node(fields)?;
    if output.json {
        return output.print_json(&node);
    }
    output.print_success(&format!("Node '{}' created with id {}", node.name, node.id));
    Ok(())
}

/// Look a node up by id, falling back to the first node with that name
fn resolve_node(engine: &Engine, key: &str) -> Result<Option<NetworkNode>> {
    match engine.nodes().get_node(key)? {
        Some(node) => Ok(Some(node)),
        None => Ok(engine.nodes().find_by_name(key)?),
    }
}

fn show_node(engine: &Engine, key: &str, output: &OutputContext) -> Result<()> {
    match resolve_node(engine, key)? {
        Some(node) => print_node(&node, output),
        None => bail!("node '{key}' not found"),
    }
}

fn set_status(engine: &Engine, id: &str, status: NodeStatus, output: &OutputContext) -> Result<()> {
    if engine.nodes().get_node(id)?.is_none() {
        bail!("node '{id}' not found");
    }
    engine.nodes().set_node_status(id, status)?;
    output.print_success(&format!("Node {id} is now {status}"));
    Ok(())
}

fn toggle(engine: &Engine, id: &str, output: &OutputContext) -> Result<()> {
    match engine.nodes().toggle_status(id)? {
        Some(status) => {
            output.print_success(&format!("Node {id} is now {status}"));
            Ok(())
        }
        None => bail!("node '{id}' not found"),
    }
}

fn edit_node(engine: &Engine, id: &str, update: NodeUpdate, output: &OutputContext) -> Result<()> {
    if update.is_empty() {
        output.print_info("Nothing to change");
        return Ok(());
    }
    for (flag, value) in [
        ("name", &update.name),
        ("host", &update.host),
        ("port", &update.port),
    ] {
        if let Some(value) = value {
            require_field(flag, value)?;
        }
    }
    match engine.nodes().update_node(id, update)? {
        Some(node) => {
            if output.json {
                return output.print_json(&node);
            }
            output.print_success(&format!("Node {id} updated"));
            Ok(())
        }
        None => bail!("node '{id}' not found"),
    }
}

fn remove_node(engine: &Engine, id: &str, output: &OutputContext) -> Result<()> {
    if !engine.nodes().delete_node(id)? {
        bail!("node '{id}' not found");
    }
    output.print_success(&format!("Node {id} removed"));
    Ok(())
}

fn attach(engine: &Engine, id: &str, database: &str, output: &OutputContext) -> Result<()> {
    if !engine.placement().add_database(id, database)? {
        bail!("node '{id}' not found");
    }
    output.print_success(&format!("Database '{database}' attached to node {id}"));
    Ok(())
}

fn detach(engine: &Engine, id: &str, database: &str, output: &OutputContext) -> Result<()> {
    if !engine.placement().remove_database(id, database)? {
        bail!("node '{id}' not found");
    }
    output.print_success(&format!("Database '{database}' detached from node {id}"));
    Ok(())
}
