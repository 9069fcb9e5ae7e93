//! Database catalog
//!
//! Typed access to the PostgreSQL-flavoured and MongoDB-flavoured
//! collections: databases, tables and rows on one side, databases,
//! collections and documents on the other. Nodes refer to catalog databases
//! by name only.

pub mod mongo;
pub mod postgres;

pub use mongo::{MongoCatalog, MongoCollection, MongoDatabase, MongoDocument};
pub use postgres::{Column, PgDatabase, PgTable, PostgresCatalog, Row};

use crate::Result;
use crate::simulation::Clock;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which flavour of database an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgresql,
    Mongodb,
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseEngine::Postgresql => write!(f, "postgresql"),
            DatabaseEngine::Mongodb => write!(f, "mongodb"),
        }
    }
}

/// A catalog database that can be attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableDatabase {
    pub id: String,
    pub name: String,
    pub engine: DatabaseEngine,
}

/// Both catalogs over one store
#[derive(Clone)]
pub struct Catalog {
    postgres: PostgresCatalog,
    mongo: MongoCatalog,
}

impl Catalog {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            postgres: PostgresCatalog::new(store.clone(), clock.clone()),
            mongo: MongoCatalog::new(store, clock),
        }
    }

    pub fn postgres(&self) -> &PostgresCatalog {
        &self.postgres
    }

    pub fn mongo(&self) -> &MongoCatalog {
        &self.mongo
    }

    /// PostgreSQL databases then MongoDB databases, storage order
    pub fn available_databases(&self) -> Result<Vec<AvailableDatabase>> {
        let postgres = self
            .postgres
            .list_databases()?
            .into_iter()
            .map(|db| AvailableDatabase {
                id: db.id,
                name: db.name,
                engine: DatabaseEngine::Postgresql,
            });
        let mongo = self
            .mongo
            .list_databases()?
            .into_iter()
            .map(|db| AvailableDatabase {
                id: db.id,
                name: db.name,
                engine: DatabaseEngine::Mongodb,
            });
        Ok(postgres.chain(mongo).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SystemClock;

    #[test]
    fn test_available_databases_order() {
        let catalog = Catalog::new(Store::memory(), Arc::new(SystemClock));
        catalog.mongo().create_database("users_db").unwrap();
        catalog.postgres().create_database("customers_db").unwrap();
        catalog.postgres().create_database("inventory_db").unwrap();

        let available = catalog.available_databases().unwrap();
        let names: Vec<(&str, DatabaseEngine)> = available
            .iter()
            .map(|db| (db.name.as_str(), db.engine))
            .collect();
        assert_eq!(
            names,
            vec![
                ("customers_db", DatabaseEngine::Postgresql),
                ("inventory_db", DatabaseEngine::Postgresql),
                ("users_db", DatabaseEngine::Mongodb),
            ]
        );
    }

    #[test]
    fn test_engine_display() {
        assert_eq!(DatabaseEngine::Postgresql.to_string(), "postgresql");
        assert_eq!(DatabaseEngine::Mongodb.to_string(), "mongodb");
    }
}
