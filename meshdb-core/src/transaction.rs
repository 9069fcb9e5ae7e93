//! Per-database transactions with a simulated commit
//!
//! A transaction collects statements while `pending` and ends in exactly
//! one terminal state. Execution waits out the configured latency and then
//! commits with probability `commit_probability`; otherwise it rolls back.
//! Statements are stored but never interpreted.

use crate::Result;
use crate::simulation::{Chance, Clock, Delay};
use crate::store::Store;
use crate::store::namespace::POSTGRESQL_TRANSACTIONS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Transaction lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Committed,
    RolledBack,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Committed => write!(f, "committed"),
            TransactionStatus::RolledBack => write!(f, "rolled_back"),
        }
    }
}

/// A stored transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "databaseId")]
    pub database_id: String,
    pub statements: Vec<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Why an execution did not commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFailure {
    NotFound,
    InvalidState,
    EmptyTransaction,
    RolledBack,
}

/// Result of [`TransactionCoordinator::execute`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<TransactionFailure>,
}

impl ExecutionOutcome {
    fn committed() -> Self {
        Self {
            success: true,
            message: "Transaction committed successfully".to_string(),
            reason: None,
        }
    }

    fn failed(reason: TransactionFailure, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            reason: Some(reason),
        }
    }

    fn not_found() -> Self {
        Self::failed(TransactionFailure::NotFound, "Transaction not found")
    }

    fn already(status: TransactionStatus) -> Self {
        Self::failed(
            TransactionFailure::InvalidState,
            format!("Transaction is already {status}"),
        )
    }
}

/// Creates, extends and executes transactions
#[derive(Clone)]
pub struct TransactionCoordinator {
    store: Store,
    delay: Arc<dyn Delay>,
    chance: Arc<dyn Chance>,
    clock: Arc<dyn Clock>,
    execution_delay: Duration,
    commit_probability: f64,
}

impl TransactionCoordinator {
    pub fn new(
        store: Store,
        delay: Arc<dyn Delay>,
        chance: Arc<dyn Chance>,
        clock: Arc<dyn Clock>,
        execution_delay: Duration,
        commit_probability: f64,
    ) -> Self {
        Self {
            store,
            delay,
            chance,
            clock,
            execution_delay,
            commit_probability,
        }
    }

    fn load(&self) -> Result<Vec<Transaction>> {
        self.store.get(POSTGRESQL_TRANSACTIONS)
    }

    /// Open a new pending transaction with no statements
    ///
    /// `database_id` is not checked against the catalog.
    pub fn create(&self, database_id: &str) -> Result<Transaction> {
        let mut transactions = self.load()?;
        let mut id = Uuid::new_v4().to_string();
        while transactions.iter().any(|t| t.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let transaction = Transaction {
            id,
            database_id: database_id.to_string(),
            statements: Vec::new(),
            status: TransactionStatus::Pending,
            created_at: self.clock.now(),
        };
        transactions.push(transaction.clone());
        self.store.set(POSTGRESQL_TRANSACTIONS, &transactions)?;
        info!(transaction_id = %transaction.id, database_id = %database_id, "transaction created");
        Ok(transaction)
    }

    /// Append a statement to a pending transaction
    ///
    /// Unknown or terminal transactions are left untouched; the return value
    /// says whether the statement was recorded.
    pub fn add_statement(&self, transaction_id: &str, statement: &str) -> Result<bool> {
        let mut transactions = self.load()?;
        let Some(transaction) = transactions
            .iter_mut()
            .find(|t| t.id == transaction_id && t.status == TransactionStatus::Pending)
        else {
            debug!(transaction_id = %transaction_id, "statement ignored: no pending transaction");
            return Ok(false);
        };

        transaction.statements.push(statement.to_string());
        self.store.set(POSTGRESQL_TRANSACTIONS, &transactions)?;
        Ok(true)
    }

    /// Execute a pending transaction
    ///
    /// Preconditions are checked before the latency is taken; once past them
    /// the transaction ends `committed` or `rolled_back`. The record is
    /// re-read after the delay so a concurrent terminal transition is
    /// reported instead of overwritten.
    pub async fn execute(&self, transaction_id: &str) -> Result<ExecutionOutcome> {
        let Some(transaction) = self.get(transaction_id)? else {
            return Ok(ExecutionOutcome::not_found());
        };
        if transaction.status.is_terminal() {
            return Ok(ExecutionOutcome::already(transaction.status));
        }
        if transaction.statements.is_empty() {
            return Ok(ExecutionOutcome::failed(
                TransactionFailure::EmptyTransaction,
                "Transaction has no statements",
            ));
        }

        self.delay.pause(self.execution_delay).await;

        let commit = self.chance.draw() < self.commit_probability;
        let status = if commit {
            TransactionStatus::Committed
        } else {
            TransactionStatus::RolledBack
        };

        let mut transactions = self.load()?;
        let Some(current) = transactions.iter_mut().find(|t| t.id == transaction_id) else {
            return Ok(ExecutionOutcome::not_found());
        };
        if current.status.is_terminal() {
            return Ok(ExecutionOutcome::already(current.status));
        }
        current.status = status;
        self.store.set(POSTGRESQL_TRANSACTIONS, &transactions)?;

        if commit {
            info!(transaction_id = %transaction_id, "transaction committed");
            Ok(ExecutionOutcome::committed())
        } else {
            warn!(transaction_id = %transaction_id, "transaction rolled back");
            Ok(ExecutionOutcome::failed(
                TransactionFailure::RolledBack,
                "Transaction rolled back due to an error",
            ))
        }
    }

    /// Mark a pending transaction committed without executing it
    pub fn commit(&self, transaction_id: &str) -> Result<bool> {
        self.finish(transaction_id, TransactionStatus::Committed)
    }

    /// Mark a pending transaction rolled back
    pub fn rollback(&self, transaction_id: &str) -> Result<bool> {
        self.finish(transaction_id, TransactionStatus::RolledBack)
    }

    fn finish(&self, transaction_id: &str, status: TransactionStatus) -> Result<bool> {
        let mut transactions = self.load()?;
        let Some(transaction) = transactions
            .iter_mut()
            .find(|t| t.id == transaction_id && t.status == TransactionStatus::Pending)
        else {
            return Ok(false);
        };

        transaction.status = status;
        self.store.set(POSTGRESQL_TRANSACTIONS, &transactions)?;
        info!(transaction_id = %transaction_id, status = %status, "transaction finished");
        Ok(true)
    }

    pub fn get(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        Ok(self.load()?.into_iter().find(|t| t.id == transaction_id))
    }

    /// Pending transactions for a database, storage order
    pub fn list_active(&self, database_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|t| t.database_id == database_id && t.status == TransactionStatus::Pending)
            .collect())
    }

    /// Every transaction for a database, storage order
    pub fn list(&self, database_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|t| t.database_id == database_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{FixedChance, InstantDelay, SystemClock};

    fn coordinator(draw: f64) -> (TransactionCoordinator, Arc<InstantDelay>) {
        let delay = Arc::new(InstantDelay::new());
        let coordinator = TransactionCoordinator::new(
            Store::memory(),
            delay.clone(),
            Arc::new(FixedChance::new(draw)),
            Arc::new(SystemClock),
            Duration::from_millis(1000),
            0.9,
        );
        (coordinator, delay)
    }

    #[test]
    fn test_create_is_pending_and_empty() {
        let (tx, _) = coordinator(0.0);
        let t = tx.create("db1").unwrap();
        assert_eq!(t.status, TransactionStatus::Pending);
        assert!(t.statements.is_empty());
        assert_eq!(t.database_id, "db1");
        assert_eq!(tx.get(&t.id).unwrap(), Some(t));
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TransactionStatus::RolledBack).unwrap();
        assert_eq!(json, "\"rolled_back\"");
        assert_eq!(TransactionStatus::RolledBack.to_string(), "rolled_back");
    }

    #[test]
    fn test_transaction_field_names() {
        let (tx, _) = coordinator(0.0);
        let t = tx.create("db1").unwrap();
        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["databaseId"], "db1");
        assert!(value.get("created_at").is_some());
    }

    #[tokio::test]
    async fn test_execute_commits_below_probability() {
        let (tx, delay) = coordinator(0.5);
        let t = tx.create("db1").unwrap();
        assert!(tx.add_statement(&t.id, "UPDATE a SET b = 1").unwrap());

        let outcome = tx.execute(&t.id).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Transaction committed successfully");
        assert_eq!(outcome.reason, None);
        assert_eq!(
            tx.get(&t.id).unwrap().unwrap().status,
            TransactionStatus::Committed
        );
        assert_eq!(delay.requested(), vec![Duration::from_millis(1000)]);
    }

    #[tokio::test]
    async fn test_execute_rolls_back_at_or_above_probability() {
        let (tx, _) = coordinator(0.9);
        let t = tx.create("db1").unwrap();
        tx.add_statement(&t.id, "DELETE FROM a").unwrap();

        let outcome = tx.execute(&t.id).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Transaction rolled back due to an error");
        assert_eq!(outcome.reason, Some(TransactionFailure::RolledBack));
        assert_eq!(
            tx.get(&t.id).unwrap().unwrap().status,
            TransactionStatus::RolledBack
        );
    }

    #[tokio::test]
    async fn test_execute_empty_keeps_pending() {
        let (tx, delay) = coordinator(0.0);
        let t = tx.create("db1").unwrap();

        let outcome = tx.execute(&t.id).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Transaction has no statements");
        assert_eq!(outcome.reason, Some(TransactionFailure::EmptyTransaction));
        assert_eq!(
            tx.get(&t.id).unwrap().unwrap().status,
            TransactionStatus::Pending
        );
        assert_eq!(delay.count(), 0);
    }

    #[tokio::test]
    async fn test_execute_unknown_and_terminal() {
        let (tx, delay) = coordinator(0.0);
        let outcome = tx.execute("missing").await.unwrap();
        assert_eq!(outcome.message, "Transaction not found");
        assert_eq!(outcome.reason, Some(TransactionFailure::NotFound));

        let t = tx.create("db1").unwrap();
        tx.add_statement(&t.id, "SELECT 1").unwrap();
        tx.execute(&t.id).await.unwrap();

        let again = tx.execute(&t.id).await.unwrap();
        assert!(!again.success);
        assert_eq!(again.message, "Transaction is already committed");
        assert_eq!(again.reason, Some(TransactionFailure::InvalidState));
        assert_eq!(delay.count(), 1);
    }

    #[test]
    fn test_add_statement_after_terminal_is_ignored() {
        let (tx, _) = coordinator(0.0);
        let t = tx.create("db1").unwrap();
        tx.add_statement(&t.id, "a").unwrap();
        assert!(tx.rollback(&t.id).unwrap());

        assert!(!tx.add_statement(&t.id, "b").unwrap());
        assert!(!tx.add_statement("missing", "b").unwrap());
        assert_eq!(tx.get(&t.id).unwrap().unwrap().statements, vec!["a"]);
    }

    #[test]
    fn test_commit_and_rollback_only_from_pending() {
        let (tx, _) = coordinator(0.0);
        let t = tx.create("db1").unwrap();
        assert!(tx.commit(&t.id).unwrap());
        assert!(!tx.rollback(&t.id).unwrap());
        assert!(!tx.commit(&t.id).unwrap());
        assert!(!tx.commit("missing").unwrap());
        assert_eq!(
            tx.get(&t.id).unwrap().unwrap().status,
            TransactionStatus::Committed
        );
    }

    #[test]
    fn test_list_active_and_list() {
        let (tx, _) = coordinator(0.0);
        let a = tx.create("db1").unwrap();
        let b = tx.create("db1").unwrap();
        let other = tx.create("db2").unwrap();
        tx.rollback(&a.id).unwrap();

        let active: Vec<String> = tx.list_active("db1").unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(active, vec![b.id.clone()]);

        let all: Vec<String> = tx.list("db1").unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(all, vec![a.id, b.id]);
        assert_eq!(tx.list("db2").unwrap().len(), 1);
        assert_eq!(tx.list("db2").unwrap()[0].id, other.id);
    }
}
