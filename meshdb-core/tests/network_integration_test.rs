//! Node registry and placement integration tests
//!
//! Covers node creation defaults, status changes, edits and the placement
//! invariants over a shared engine.

use meshdb_core::network::{NewNode, NodeStatus, NodeType, NodeUpdate};
use meshdb_core::testing::{setup_file_engine, test_engine};
use meshdb_core::{Engine, SimulationConfig};
use proptest::prelude::*;

fn arb_node_type() -> impl Strategy<Value = NodeType> {
    prop_oneof![
        Just(NodeType::Primary),
        Just(NodeType::Secondary),
        Just(NodeType::Replica),
    ]
}

fn arb_status() -> impl Strategy<Value = Option<NodeStatus>> {
    prop::option::of(prop_oneof![
        Just(NodeStatus::Online),
        Just(NodeStatus::Offline),
        Just(NodeStatus::Syncing),
    ])
}

fn arb_new_node() -> impl Strategy<Value = NewNode> {
    (
        "[A-Za-z ]{1,20}",
        "[a-z0-9.]{1,20}",
        "[0-9]{1,5}",
        arb_node_type(),
        arb_status(),
        prop::collection::vec("[a-z_]{1,10}", 0..4),
    )
        .prop_map(|(name, host, port, node_type, status, databases)| NewNode {
            name,
            host,
            port,
            node_type,
            status,
            databases,
        })
}

proptest! {
    #[test]
    fn proptest_new_nodes_start_offline_and_empty(fields in arb_new_node()) {
        let harness = test_engine().unwrap();
        let node = harness.engine.nodes().create_node(fields.clone()).unwrap();

        prop_assert_eq!(node.status, NodeStatus::Offline);
        prop_assert!(node.databases.is_empty());
        prop_assert_eq!(&node.name, &fields.name);
        prop_assert_eq!(node.node_type, fields.node_type);
    }

    #[test]
    fn proptest_add_database_twice_keeps_one(database in "[a-z_]{1,12}", before in prop::collection::vec("[a-z_]{1,12}", 0..4)) {
        let harness = test_engine().unwrap();
        let engine = &harness.engine;
        let id = engine
            .nodes()
            .create_node(NewNode::new("A", "h", "5432", NodeType::Primary))
            .unwrap()
            .id;
        for db in &before {
            engine.placement().add_database(&id, db).unwrap();
        }

        engine.placement().add_database(&id, &database).unwrap();
        engine.placement().add_database(&id, &database).unwrap();

        let node = engine.nodes().get_node(&id).unwrap().unwrap();
        prop_assert_eq!(node.databases.iter().filter(|d| **d == database).count(), 1);
        let mut deduped = node.databases.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), node.databases.len());
    }
}

/// Create a primary node, then bring it online
#[test]
fn test_create_then_set_online() -> Result<(), meshdb_core::Error> {
    let harness = test_engine()?;
    let nodes = harness.engine.nodes();

    let node = nodes.create_node(NewNode::new("A", "h", "5432", NodeType::Primary))?;
    assert!(!node.id.is_empty());
    assert_eq!(node.status, NodeStatus::Offline);
    assert!(node.databases.is_empty());

    nodes.set_node_status(&node.id, NodeStatus::Online)?;
    assert_eq!(nodes.get_node(&node.id)?.unwrap().status, NodeStatus::Online);
    Ok(())
}

#[test]
fn test_ids_are_unique() -> Result<(), meshdb_core::Error> {
    let harness = test_engine()?;
    let mut ids: Vec<String> = (0..50)
        .map(|i| {
            harness
                .engine
                .nodes()
                .create_node(NewNode::new(format!("n{i}"), "h", "1", NodeType::Replica))
                .map(|n| n.id)
        })
        .collect::<Result<_, _>>()?;
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
    Ok(())
}

#[test]
fn test_toggle_cycle() -> Result<(), meshdb_core::Error> {
    let harness = test_engine()?;
    let nodes = harness.engine.nodes();
    let id = nodes.create_node(NewNode::new("A", "h", "1", NodeType::Primary))?.id;

    assert_eq!(nodes.toggle_status(&id)?, Some(NodeStatus::Online));
    assert_eq!(nodes.toggle_status(&id)?, Some(NodeStatus::Offline));

    nodes.set_node_status(&id, NodeStatus::Syncing)?;
    assert_eq!(nodes.toggle_status(&id)?, Some(NodeStatus::Online));
    assert_eq!(nodes.toggle_status("missing")?, None);
    Ok(())
}

#[test]
fn test_update_keeps_status_and_databases() -> Result<(), meshdb_core::Error> {
    let harness = test_engine()?;
    let engine = &harness.engine;
    let original = engine
        .nodes()
        .create_node(NewNode::new("A", "h", "1", NodeType::Primary))?;
    engine.nodes().set_node_status(&original.id, NodeStatus::Online)?;
    engine.placement().add_database(&original.id, "sales")?;

    let updated = engine
        .nodes()
        .update_node(
            &original.id,
            NodeUpdate {
                name: Some("A-renamed".to_string()),
                node_type: Some(NodeType::Replica),
                ..Default::default()
            },
        )?
        .unwrap();

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.name, "A-renamed");
    assert_eq!(updated.node_type, NodeType::Replica);
    assert_eq!(updated.host, "h");
    assert_eq!(updated.status, NodeStatus::Online);
    assert_eq!(updated.databases, vec!["sales"]);
    Ok(())
}

#[test]
fn test_delete_node_removes_from_hosting() -> Result<(), meshdb_core::Error> {
    let harness = test_engine()?;
    let engine = &harness.engine;
    let a = engine.nodes().create_node(NewNode::new("A", "h", "1", NodeType::Primary))?;
    let b = engine.nodes().create_node(NewNode::new("B", "h", "2", NodeType::Replica))?;
    engine.placement().add_database(&a.id, "sales")?;
    engine.placement().add_database(&b.id, "sales")?;

    assert!(engine.nodes().delete_node(&a.id)?);
    assert!(!engine.nodes().delete_node(&a.id)?);

    let hosting: Vec<String> = engine
        .placement()
        .nodes_hosting("sales")?
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(hosting, vec![b.id]);
    Ok(())
}

#[test]
fn test_available_databases_come_from_catalog() -> Result<(), meshdb_core::Error> {
    let harness = test_engine()?;
    let engine = &harness.engine;
    engine.catalog().postgres().create_database("customers_db")?;
    engine.catalog().mongo().create_database("users_db")?;

    let names: Vec<String> = engine
        .placement()
        .available_databases()?
        .into_iter()
        .map(|db| db.name)
        .collect();
    assert_eq!(names, vec!["customers_db", "users_db"]);
    Ok(())
}

/// Nodes written through one file-backed engine are visible to another
#[test]
fn test_file_store_shared_between_engines() -> Result<(), meshdb_core::Error> {
    let (engine, ctx) = setup_file_engine()?;
    let node = engine
        .nodes()
        .create_node(NewNode::new("A", "h", "5432", NodeType::Primary))?;
    engine.placement().add_database(&node.id, "sales")?;

    let other = Engine::with_data_dir(ctx.path(), SimulationConfig::immediate())?;
    let reread = other.nodes().get_node(&node.id)?.unwrap();
    assert_eq!(reread, engine.nodes().get_node(&node.id)?.unwrap());
    assert_eq!(reread.databases, vec!["sales"]);
    assert!(ctx.path().join("network_nodes.json").exists());
    Ok(())
}
