//! Named queries saved per engine

use crate::Result;
use crate::catalog::DatabaseEngine;
use crate::error::require_non_blank;
use crate::simulation::{Clock, Delay};
use crate::store::Store;
use crate::store::namespace::{MONGODB_SAVED_QUERIES, POSTGRESQL_SAVED_QUERIES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuery {
    pub id: String,
    pub name: String,
    pub query: String,
    /// Catalog database id the query was written against
    pub database: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SavedQueries {
    store: Store,
    delay: Arc<dyn Delay>,
    clock: Arc<dyn Clock>,
    save_delay: Duration,
}

fn namespace(engine: DatabaseEngine) -> &'static str {
    match engine {
        DatabaseEngine::Postgresql => POSTGRESQL_SAVED_QUERIES,
        DatabaseEngine::Mongodb => MONGODB_SAVED_QUERIES,
    }
}

impl SavedQueries {
    pub fn new(store: Store, delay: Arc<dyn Delay>, clock: Arc<dyn Clock>, save_delay: Duration) -> Self {
        Self {
            store,
            delay,
            clock,
            save_delay,
        }
    }

    pub fn list(&self, engine: DatabaseEngine) -> Result<Vec<SavedQuery>> {
        self.store.get(namespace(engine))
    }

    /// Save a named query; every field must be non-blank
    pub async fn save(
        &self,
        engine: DatabaseEngine,
        name: &str,
        query: &str,
        database: &str,
    ) -> Result<SavedQuery> {
        require_non_blank("query name", name)?;
        require_non_blank("query", query)?;
        require_non_blank("database", database)?;

        self.delay.pause(self.save_delay).await;

        let mut saved = self.list(engine)?;
        let entry = SavedQuery {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            query: query.to_string(),
            database: database.to_string(),
            created_at: self.clock.now(),
        };
        saved.push(entry.clone());
        self.store.set(namespace(engine), &saved)?;
        info!(engine = %engine, name = %entry.name, "query saved");
        Ok(entry)
    }

    pub fn delete(&self, engine: DatabaseEngine, id: &str) -> Result<bool> {
        let mut saved = self.list(engine)?;
        let before = saved.len();
        saved.retain(|q| q.id != id);
        if saved.len() == before {
            return Ok(false);
        }
        self.store.set(namespace(engine), &saved)?;
        Ok(true)
    }
}
