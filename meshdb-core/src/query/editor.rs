//! Single-database query editor with canned results

use super::elapsed_ms;
use crate::Result;
use crate::error::require_non_blank;
use crate::simulation::{Clock, Delay};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Tabular result of a SQL query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlResult {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub row_count: usize,
    #[serde(rename = "executionTime")]
    pub execution_time_ms: f64,
}

/// Document result of a MongoDB shell query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub data: Vec<Value>,
    #[serde(rename = "executionTime")]
    pub execution_time_ms: f64,
}

const EXECUTED: &str = "Query executed successfully";

#[derive(Clone)]
pub struct QueryEditor {
    delay: Arc<dyn Delay>,
    clock: Arc<dyn Clock>,
    editor_delay: Duration,
}

impl QueryEditor {
    pub fn new(delay: Arc<dyn Delay>, clock: Arc<dyn Clock>, editor_delay: Duration) -> Self {
        Self {
            delay,
            clock,
            editor_delay,
        }
    }

    /// Run SQL text and return the matching canned table
    pub async fn run_sql(&self, query: &str) -> Result<SqlResult> {
        require_non_blank("query", query)?;
        let start = Instant::now();
        self.delay.pause(self.editor_delay).await;

        let (columns, rows) = sql_rows(&query.to_lowercase());
        let result = SqlResult {
            columns: columns.into_iter().map(String::from).collect(),
            row_count: rows.len(),
            rows,
            execution_time_ms: elapsed_ms(start),
        };
        debug!(rows = result.row_count, "sql editor query executed");
        Ok(result)
    }

    /// Run MongoDB shell text and return the matching canned documents
    pub async fn run_mongo(&self, query: &str) -> Result<DocumentResult> {
        require_non_blank("query", query)?;
        let start = Instant::now();
        self.delay.pause(self.editor_delay).await;

        let data = self.mongo_documents(&query.to_lowercase());
        debug!(documents = data.len(), "mongodb editor query executed");
        Ok(DocumentResult {
            data,
            execution_time_ms: elapsed_ms(start),
        })
    }

    fn mongo_documents(&self, q: &str) -> Vec<Value> {
        if q.contains("users.find") {
            vec![
                json!({"_id": "user_1", "name": "John Doe", "email": "john@example.com", "age": 30, "roles": ["user", "admin"]}),
                json!({"_id": "user_2", "name": "Jane Smith", "email": "jane@example.com", "age": 28, "roles": ["user"]}),
                json!({"_id": "user_3", "name": "Bob Johnson", "email": "bob@example.com", "age": 35, "roles": ["user"]}),
            ]
        } else if q.contains("sessions.find") {
            vec![
                json!({"_id": "session_1", "userId": "user_1", "token": "abc123xyz", "expires": "2023-06-16T10:30:00Z", "lastActive": "2023-05-16T10:30:00Z"}),
                json!({"_id": "session_2", "userId": "user_2", "token": "def456uvw", "expires": "2023-06-17T14:45:00Z", "lastActive": "2023-05-17T14:45:00Z"}),
            ]
        } else if q.contains("aggregate") {
            vec![
                json!({"_id": "user", "count": 3}),
                json!({"_id": "admin", "count": 1}),
            ]
        } else if q.contains("insertone") || q.contains("insertmany") {
            let inserted = format!("new_id_{}", self.clock.now().timestamp_millis());
            vec![json!({"acknowledged": true, "insertedId": inserted})]
        } else if q.contains("updateone") || q.contains("updatemany") {
            vec![json!({"acknowledged": true, "matchedCount": 1, "modifiedCount": 1})]
        } else if q.contains("deleteone") || q.contains("deletemany") {
            vec![json!({"acknowledged": true, "deletedCount": 1})]
        } else {
            vec![json!({"result": EXECUTED})]
        }
    }
}

fn sql_rows(q: &str) -> (Vec<&'static str>, Vec<Value>) {
    if q.contains("select") && q.contains("from customers") {
        (
            vec!["id", "name", "email"],
            vec![
                json!({"id": 1, "name": "John Doe", "email": "john@example.com"}),
                json!({"id": 2, "name": "Jane Smith", "email": "jane@example.com"}),
                json!({"id": 3, "name": "Bob Johnson", "email": "bob@example.com"}),
            ],
        )
    } else if q.contains("select") && q.contains("from orders") {
        (
            vec!["id", "customer_id", "order_date"],
            vec![
                json!({"id": 1, "customer_id": 1, "order_date": "2023-05-20T10:30:00Z"}),
                json!({"id": 2, "customer_id": 1, "order_date": "2023-06-15T14:45:00Z"}),
                json!({"id": 3, "customer_id": 2, "order_date": "2023-06-22T09:15:00Z"}),
            ],
        )
    } else if q.contains("join") {
        (
            vec!["name", "order_count"],
            vec![
                json!({"name": "John Doe", "order_count": 2}),
                json!({"name": "Jane Smith", "order_count": 1}),
                json!({"name": "Bob Johnson", "order_count": 0}),
            ],
        )
    } else if q.contains("insert") || q.contains("update") || q.contains("delete") {
        (vec!["affected_rows"], vec![json!({"affected_rows": 1})])
    } else {
        // DDL lands here too
        (vec!["result"], vec![json!({"result": EXECUTED})])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::simulation::{FixedClock, InstantDelay};
    use chrono::{TimeZone, Utc};

    fn editor() -> (QueryEditor, Arc<InstantDelay>) {
        let delay = Arc::new(InstantDelay::new());
        let clock = Arc::new(FixedClock(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()));
        (
            QueryEditor::new(delay.clone(), clock, Duration::from_millis(800)),
            delay,
        )
    }

    #[tokio::test]
    async fn test_sql_classification() {
        let (editor, delay) = editor();

        let customers = editor.run_sql("SELECT * FROM customers LIMIT 10;").await.unwrap();
        assert_eq!(customers.columns, vec!["id", "name", "email"]);
        assert_eq!(customers.row_count, 3);
        assert_eq!(customers.rows[1]["name"], "Jane Smith");

        let orders = editor.run_sql("select * from orders").await.unwrap();
        assert_eq!(orders.columns, vec!["id", "customer_id", "order_date"]);

        // "from customers c" still matches the customers table first
        let joined = editor
            .run_sql("SELECT c.name FROM customers c LEFT JOIN orders o ON c.id = o.customer_id")
            .await
            .unwrap();
        assert_eq!(joined.columns, vec!["id", "name", "email"]);

        let join_only = editor.run_sql("select * from a join b").await.unwrap();
        assert_eq!(join_only.columns, vec!["name", "order_count"]);

        let write = editor.run_sql("UPDATE customers SET name = 'x'").await.unwrap();
        assert_eq!(write.rows, vec![json!({"affected_rows": 1})]);

        let ddl = editor.run_sql("CREATE TABLE t (id int)").await.unwrap();
        assert_eq!(ddl.columns, vec!["result"]);
        assert_eq!(ddl.rows, vec![json!({"result": "Query executed successfully"})]);

        assert_eq!(delay.count(), 6);
        assert!(delay.requested().iter().all(|d| *d == Duration::from_millis(800)));
    }

    #[tokio::test]
    async fn test_mongo_classification() {
        let (editor, _) = editor();

        let users = editor.run_mongo("db.users.find({})").await.unwrap();
        assert_eq!(users.data.len(), 3);
        assert_eq!(users.data[0]["roles"], json!(["user", "admin"]));

        let sessions = editor.run_mongo("db.sessions.find({})").await.unwrap();
        assert_eq!(sessions.data.len(), 2);

        let roles = editor
            .run_mongo("db.users.aggregate([{ $unwind: \"$roles\" }])")
            .await
            .unwrap();
        assert_eq!(roles.data[0], json!({"_id": "user", "count": 3}));

        let insert = editor.run_mongo("db.users.insertOne({})").await.unwrap();
        assert_eq!(insert.data[0]["insertedId"], "new_id_1700000000123");

        let update = editor.run_mongo("db.users.updateMany({}, {})").await.unwrap();
        assert_eq!(update.data[0]["modifiedCount"], 1);

        let delete = editor.run_mongo("db.users.deleteOne({})").await.unwrap();
        assert_eq!(delete.data[0]["deletedCount"], 1);

        let other = editor.run_mongo("db.stats()").await.unwrap();
        assert_eq!(other.data, vec![json!({"result": "Query executed successfully"})]);
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let (editor, delay) = editor();
        assert!(matches!(editor.run_sql("   ").await, Err(Error::InvalidInput(_))));
        assert!(matches!(editor.run_mongo("").await, Err(Error::InvalidInput(_))));
        assert_eq!(delay.count(), 0);
    }
}
