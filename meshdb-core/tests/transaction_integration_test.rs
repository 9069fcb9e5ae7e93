//! Transaction integration tests

use meshdb_core::store::Store;
use meshdb_core::testing::{test_engine, test_engine_with_draw};
use meshdb_core::transaction::{TransactionFailure, TransactionStatus};
use meshdb_core::{Engine, SimulationConfig};

#[tokio::test]
async fn test_statements_frozen_after_execute() {
    for draw in [0.0, 0.95] {
        let harness = test_engine_with_draw(draw).unwrap();
        let tx = harness.engine.transactions();
        let t = tx.create("db1").unwrap();
        tx.add_statement(&t.id, "INSERT INTO a VALUES (1)").unwrap();
        tx.add_statement(&t.id, "INSERT INTO a VALUES (2)").unwrap();

        tx.execute(&t.id).await.unwrap();

        assert!(!tx.add_statement(&t.id, "INSERT INTO a VALUES (3)").unwrap());
        let stored = tx.get(&t.id).unwrap().unwrap();
        assert_eq!(stored.statements.len(), 2);
        assert!(stored.status.is_terminal());
    }
}

#[tokio::test]
async fn test_forced_commit_and_rollback() {
    let commits = test_engine_with_draw(0.89).unwrap();
    let t = commits.engine.transactions().create("db1").unwrap();
    commits.engine.transactions().add_statement(&t.id, "SELECT 1").unwrap();
    let outcome = commits.engine.transactions().execute(&t.id).await.unwrap();
    assert!(outcome.success);
    assert_eq!(
        commits.engine.transactions().get(&t.id).unwrap().unwrap().status,
        TransactionStatus::Committed
    );

    let rolls_back = test_engine_with_draw(0.9).unwrap();
    let t = rolls_back.engine.transactions().create("db1").unwrap();
    rolls_back.engine.transactions().add_statement(&t.id, "SELECT 1").unwrap();
    let outcome = rolls_back.engine.transactions().execute(&t.id).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.reason, Some(TransactionFailure::RolledBack));
    assert_eq!(
        rolls_back.engine.transactions().get(&t.id).unwrap().unwrap().status,
        TransactionStatus::RolledBack
    );
}

#[tokio::test]
async fn test_empty_transaction_stays_pending() {
    let harness = test_engine().unwrap();
    let tx = harness.engine.transactions();
    let t = tx.create("db1").unwrap();

    let outcome = tx.execute(&t.id).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Transaction has no statements");
    assert_eq!(tx.get(&t.id).unwrap().unwrap().status, TransactionStatus::Pending);
    assert_eq!(tx.list_active("db1").unwrap().len(), 1);
    assert_eq!(harness.delay.count(), 0);
}

/// Two engines with the same seed draw the same outcomes
#[tokio::test]
async fn test_seeded_outcomes_are_reproducible() {
    async fn outcomes(seed: u64) -> Vec<bool> {
        let config = SimulationConfig::immediate().with_seed(seed);
        let engine = Engine::new(Store::memory(), config).unwrap();
        let tx = engine.transactions();
        let mut results = Vec::new();
        for _ in 0..20 {
            let t = tx.create("db1").unwrap();
            tx.add_statement(&t.id, "UPDATE a SET b = 1").unwrap();
            results.push(tx.execute(&t.id).await.unwrap().success);
        }
        results
    }

    assert_eq!(outcomes(42).await, outcomes(42).await);
}

#[tokio::test]
async fn test_concurrent_executions_each_finish_once() {
    let harness = test_engine().unwrap();
    let tx = harness.engine.transactions().clone();
    let mut ids = Vec::new();
    for i in 0..5 {
        let t = tx.create("db1").unwrap();
        tx.add_statement(&t.id, &format!("UPDATE a SET b = {i}")).unwrap();
        ids.push(t.id);
    }

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let tx = tx.clone();
            tokio::spawn(async move { tx.execute(&id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // The re-read and write after the delay happen without yielding
    for id in &ids {
        assert_eq!(
            tx.get(id).unwrap().unwrap().status,
            TransactionStatus::Committed
        );
    }
    assert_eq!(harness.delay.count(), 5);
    assert!(tx.list_active("db1").unwrap().is_empty());
}
