//! PostgreSQL-flavoured catalog: databases, tables, rows

use crate::error::require_non_blank;
use crate::simulation::Clock;
use crate::store::Store;
use crate::store::namespace::{POSTGRESQL_DATABASES, postgresql_data, postgresql_tables};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A table row; always carries a numeric `id`
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgDatabase {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(rename = "isPrimaryKey")]
    pub is_primary_key: bool,
    #[serde(rename = "isNullable")]
    pub is_nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>, is_nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            is_primary_key: false,
            is_nullable,
        }
    }

    /// The auto-numbered `id serial` primary key every new table starts with
    pub fn serial_id() -> Self {
        Self {
            name: "id".to_string(),
            column_type: "serial".to_string(),
            is_primary_key: true,
            is_nullable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgTable {
    pub id: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub created_at: DateTime<Utc>,
}

/// CRUD over the `postgresql_*` namespaces
#[derive(Clone)]
pub struct PostgresCatalog {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl PostgresCatalog {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn list_databases(&self) -> Result<Vec<PgDatabase>> {
        self.store.get(POSTGRESQL_DATABASES)
    }

    pub fn get_database(&self, id: &str) -> Result<Option<PgDatabase>> {
        Ok(self.list_databases()?.into_iter().find(|db| db.id == id))
    }

    pub fn create_database(&self, name: &str) -> Result<PgDatabase> {
        require_non_blank("database name", name)?;
        let mut databases = self.list_databases()?;
        let database = PgDatabase {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: self.clock.now(),
        };
        databases.push(database.clone());
        self.store.set(POSTGRESQL_DATABASES, &databases)?;
        info!(database_id = %database.id, name = %database.name, "postgresql database created");
        Ok(database)
    }

    /// Delete a database together with its tables and rows
    pub fn delete_database(&self, id: &str) -> Result<bool> {
        let mut databases = self.list_databases()?;
        let before = databases.len();
        databases.retain(|db| db.id != id);
        if databases.len() == before {
            return Ok(false);
        }

        for table in self.list_tables(id)? {
            self.store.clear(&postgresql_data(id, &table.id))?;
        }
        self.store.clear(&postgresql_tables(id))?;
        self.store.set(POSTGRESQL_DATABASES, &databases)?;
        info!(database_id = %id, "postgresql database deleted");
        Ok(true)
    }

    pub fn list_tables(&self, database_id: &str) -> Result<Vec<PgTable>> {
        self.store.get(&postgresql_tables(database_id))
    }

    pub fn get_table(&self, database_id: &str, table_id: &str) -> Result<Option<PgTable>> {
        Ok(self
            .list_tables(database_id)?
            .into_iter()
            .find(|t| t.id == table_id))
    }

    pub fn create_table(
        &self,
        database_id: &str,
        name: &str,
        columns: Vec<Column>,
    ) -> Result<PgTable> {
        require_non_blank("table name", name)?;
        if columns.is_empty() {
            return Err(Error::invalid_input("a table needs at least one column"));
        }
        if let Some(column) = columns.iter().find(|c| c.name.trim().is_empty()) {
            return Err(Error::invalid_input(format!(
                "column of type '{}' has no name",
                column.column_type
            )));
        }
        self.require_database(database_id)?;

        let mut tables = self.list_tables(database_id)?;
        let table = PgTable {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            columns,
            created_at: self.clock.now(),
        };
        tables.push(table.clone());
        self.store.set(&postgresql_tables(database_id), &tables)?;
        Ok(table)
    }

    /// Delete a table and its rows
    pub fn delete_table(&self, database_id: &str, table_id: &str) -> Result<bool> {
        let mut tables = self.list_tables(database_id)?;
        let before = tables.len();
        tables.retain(|t| t.id != table_id);
        if tables.len() == before {
            return Ok(false);
        }
        self.store.clear(&postgresql_data(database_id, table_id))?;
        self.store.set(&postgresql_tables(database_id), &tables)?;
        Ok(true)
    }

    pub fn list_rows(&self, database_id: &str, table_id: &str) -> Result<Vec<Row>> {
        self.store.get(&postgresql_data(database_id, table_id))
    }

    /// Append a row, numbering it one past the largest existing `id`
    ///
    /// Every non-nullable column other than `id` must carry a non-empty value.
    pub fn insert_row(&self, database_id: &str, table_id: &str, mut row: Row) -> Result<Row> {
        let table = self.get_table(database_id, table_id)?.ok_or_else(|| {
            Error::not_found(format!("table '{table_id}' in database '{database_id}'"))
        })?;

        let missing: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| !c.is_nullable && c.name != "id")
            .filter(|c| is_blank(row.get(&c.name)))
            .map(|c| c.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(Error::invalid_input(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut rows = self.list_rows(database_id, table_id)?;
        let next_id = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .fold(0, i64::max)
            + 1;
        row.insert("id".to_string(), Value::from(next_id));

        rows.push(row.clone());
        self.store.set(&postgresql_data(database_id, table_id), &rows)?;
        Ok(row)
    }

    pub fn delete_row(&self, database_id: &str, table_id: &str, row_id: i64) -> Result<bool> {
        let mut rows = self.list_rows(database_id, table_id)?;
        let before = rows.len();
        rows.retain(|r| r.get("id").and_then(Value::as_i64) != Some(row_id));
        if rows.len() == before {
            return Ok(false);
        }
        self.store.set(&postgresql_data(database_id, table_id), &rows)?;
        Ok(true)
    }

    fn require_database(&self, id: &str) -> Result<PgDatabase> {
        self.get_database(id)?
            .ok_or_else(|| Error::not_found(format!("postgresql database '{id}'")))
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SystemClock;
    use serde_json::json;

    fn catalog() -> (Store, PostgresCatalog) {
        let store = Store::memory();
        let catalog = PostgresCatalog::new(store.clone(), Arc::new(SystemClock));
        (store, catalog)
    }

    fn customers(catalog: &PostgresCatalog, db: &str) -> PgTable {
        catalog
            .create_table(
                db,
                "customers",
                vec![
                    Column::serial_id(),
                    Column::new("name", "varchar", false),
                    Column::new("email", "varchar", true),
                ],
            )
            .unwrap()
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_and_list_databases() {
        let (_, catalog) = catalog();
        let db = catalog.create_database("customers_db").unwrap();
        assert_eq!(catalog.list_databases().unwrap(), vec![db.clone()]);
        assert_eq!(catalog.get_database(&db.id).unwrap(), Some(db));
        assert!(catalog.create_database("  ").is_err());
    }

    #[test]
    fn test_table_requires_database_and_columns() {
        let (_, catalog) = catalog();
        assert!(matches!(
            catalog.create_table("missing", "t", vec![Column::serial_id()]),
            Err(Error::NotFound(_))
        ));

        let db = catalog.create_database("db").unwrap();
        assert!(matches!(
            catalog.create_table(&db.id, "t", Vec::new()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            catalog.create_table(&db.id, "t", vec![Column::new("", "int", true)]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_insert_row_numbers_after_max_id() {
        let (_, catalog) = catalog();
        let db = catalog.create_database("db").unwrap();
        let table = customers(&catalog, &db.id);

        let first = catalog
            .insert_row(&db.id, &table.id, row(json!({"name": "John Doe"})))
            .unwrap();
        assert_eq!(first["id"], 1);

        let second = catalog
            .insert_row(&db.id, &table.id, row(json!({"name": "Jane Smith"})))
            .unwrap();
        assert_eq!(second["id"], 2);

        catalog.delete_row(&db.id, &table.id, 1).unwrap();
        let third = catalog
            .insert_row(&db.id, &table.id, row(json!({"name": "Bob Johnson"})))
            .unwrap();
        assert_eq!(third["id"], 3);

        assert_eq!(catalog.list_rows(&db.id, &table.id).unwrap().len(), 2);
    }

    #[test]
    fn test_insert_row_rejects_missing_required() {
        let (_, catalog) = catalog();
        let db = catalog.create_database("db").unwrap();
        let table = customers(&catalog, &db.id);

        let result = catalog.insert_row(&db.id, &table.id, row(json!({"email": "x@y.z"})));
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = catalog.insert_row(&db.id, &table.id, row(json!({"name": ""})));
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        assert!(catalog.list_rows(&db.id, &table.id).unwrap().is_empty());
    }

    #[test]
    fn test_insert_row_unknown_table() {
        let (_, catalog) = catalog();
        let db = catalog.create_database("db").unwrap();
        let result = catalog.insert_row(&db.id, "nope", Row::new());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_database_cascades() {
        let (store, catalog) = catalog();
        let db = catalog.create_database("db").unwrap();
        let table = customers(&catalog, &db.id);
        catalog
            .insert_row(&db.id, &table.id, row(json!({"name": "John Doe"})))
            .unwrap();

        assert!(catalog.delete_database(&db.id).unwrap());
        assert!(!catalog.delete_database(&db.id).unwrap());
        assert!(catalog.list_tables(&db.id).unwrap().is_empty());
        assert!(
            !store
                .namespaces()
                .unwrap()
                .iter()
                .any(|ns| ns.starts_with("postgresql_data_"))
        );
    }

    #[test]
    fn test_delete_table_drops_rows() {
        let (_, catalog) = catalog();
        let db = catalog.create_database("db").unwrap();
        let table = customers(&catalog, &db.id);
        catalog
            .insert_row(&db.id, &table.id, row(json!({"name": "John Doe"})))
            .unwrap();

        assert!(catalog.delete_table(&db.id, &table.id).unwrap());
        assert!(catalog.list_rows(&db.id, &table.id).unwrap().is_empty());
        assert!(!catalog.delete_table(&db.id, &table.id).unwrap());
    }

    #[test]
    fn test_column_wire_format() {
        let value = serde_json::to_value(Column::serial_id()).unwrap();
        assert_eq!(
            value,
            json!({"name": "id", "type": "serial", "isPrimaryKey": true, "isNullable": false})
        );
    }
}
