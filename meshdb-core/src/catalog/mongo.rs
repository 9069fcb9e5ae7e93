//! MongoDB-flavoured catalog: databases, collections, documents

use crate::error::require_non_blank;
use crate::simulation::Clock;
use crate::store::Store;
use crate::store::namespace::{MONGODB_DATABASES, mongodb_collections, mongodb_documents};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoDatabase {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoCollection {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Kept equal to the number of stored documents
    #[serde(rename = "documentCount")]
    pub document_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoDocument {
    pub id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

/// CRUD over the `mongodb_*` namespaces
#[derive(Clone)]
pub struct MongoCatalog {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl MongoCatalog {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn list_databases(&self) -> Result<Vec<MongoDatabase>> {
        self.store.get(MONGODB_DATABASES)
    }

    pub fn get_database(&self, id: &str) -> Result<Option<MongoDatabase>> {
        Ok(self.list_databases()?.into_iter().find(|db| db.id == id))
    }

    pub fn create_database(&self, name: &str) -> Result<MongoDatabase> {
        require_non_blank("database name", name)?;
        let mut databases = self.list_databases()?;
        let database = MongoDatabase {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: self.clock.now(),
        };
        databases.push(database.clone());
        self.store.set(MONGODB_DATABASES, &databases)?;
        info!(database_id = %database.id, name = %database.name, "mongodb database created");
        Ok(database)
    }

    /// Delete a database together with its collections and documents
    pub fn delete_database(&self, id: &str) -> Result<bool> {
        let mut databases = self.list_databases()?;
        let before = databases.len();
        databases.retain(|db| db.id != id);
        if databases.len() == before {
            return Ok(false);
        }

        for collection in self.list_collections(id)? {
            self.store.clear(&mongodb_documents(id, &collection.id))?;
        }
        self.store.clear(&mongodb_collections(id))?;
        self.store.set(MONGODB_DATABASES, &databases)?;
        info!(database_id = %id, "mongodb database deleted");
        Ok(true)
    }

    pub fn list_collections(&self, database_id: &str) -> Result<Vec<MongoCollection>> {
        self.store.get(&mongodb_collections(database_id))
    }

    pub fn get_collection(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> Result<Option<MongoCollection>> {
        Ok(self
            .list_collections(database_id)?
            .into_iter()
            .find(|c| c.id == collection_id))
    }

    pub fn create_collection(&self, database_id: &str, name: &str) -> Result<MongoCollection> {
        require_non_blank("collection name", name)?;
        if self.get_database(database_id)?.is_none() {
            return Err(Error::not_found(format!("mongodb database '{database_id}'")));
        }

        let mut collections = self.list_collections(database_id)?;
        let collection = MongoCollection {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: self.clock.now(),
            document_count: 0,
        };
        collections.push(collection.clone());
        self.store.set(&mongodb_collections(database_id), &collections)?;
        Ok(collection)
    }

    /// Delete a collection and its documents
    pub fn delete_collection(&self, database_id: &str, collection_id: &str) -> Result<bool> {
        let mut collections = self.list_collections(database_id)?;
        let before = collections.len();
        collections.retain(|c| c.id != collection_id);
        if collections.len() == before {
            return Ok(false);
        }
        self.store
            .clear(&mongodb_documents(database_id, collection_id))?;
        self.store.set(&mongodb_collections(database_id), &collections)?;
        Ok(true)
    }

    pub fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> Result<Vec<MongoDocument>> {
        self.store.get(&mongodb_documents(database_id, collection_id))
    }

    /// Store a JSON object as a new document
    pub fn insert_document(
        &self,
        database_id: &str,
        collection_id: &str,
        data: Value,
    ) -> Result<MongoDocument> {
        if !data.is_object() {
            return Err(Error::invalid_input("a document must be a JSON object"));
        }
        if self.get_collection(database_id, collection_id)?.is_none() {
            return Err(Error::not_found(format!(
                "collection '{collection_id}' in database '{database_id}'"
            )));
        }

        let mut documents = self.list_documents(database_id, collection_id)?;
        let document = MongoDocument {
            id: Uuid::new_v4().to_string(),
            data,
            created_at: self.clock.now(),
        };
        documents.push(document.clone());
        self.store
            .set(&mongodb_documents(database_id, collection_id), &documents)?;
        self.sync_document_count(database_id, collection_id, documents.len())?;
        Ok(document)
    }

    pub fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<bool> {
        let mut documents = self.list_documents(database_id, collection_id)?;
        let before = documents.len();
        documents.retain(|d| d.id != document_id);
        if documents.len() == before {
            return Ok(false);
        }
        self.store
            .set(&mongodb_documents(database_id, collection_id), &documents)?;
        self.sync_document_count(database_id, collection_id, documents.len())?;
        Ok(true)
    }

    fn sync_document_count(
        &self,
        database_id: &str,
        collection_id: &str,
        count: usize,
    ) -> Result<()> {
        let mut collections = self.list_collections(database_id)?;
        if let Some(collection) = collections.iter_mut().find(|c| c.id == collection_id) {
            collection.document_count = count as u64;
            self.store.set(&mongodb_collections(database_id), &collections)?;
        }
        Ok(())
    }
}
