//! Store namespaces
//!
//! Fixed collections are constants; per-database and per-table collections
//! are built from their parent ids.

/// Network node registry
pub const NETWORK_NODES: &str = "network_nodes";

/// PostgreSQL-flavoured transactions
pub const POSTGRESQL_TRANSACTIONS: &str = "postgresql_transactions";

/// PostgreSQL database list
pub const POSTGRESQL_DATABASES: &str = "postgresql_databases";

/// MongoDB database list
pub const MONGODB_DATABASES: &str = "mongodb_databases";

/// Saved SQL queries
pub const POSTGRESQL_SAVED_QUERIES: &str = "postgresql_saved_queries";

/// Saved MongoDB queries
pub const MONGODB_SAVED_QUERIES: &str = "mongodb_saved_queries";

/// Tables of one PostgreSQL database
pub fn postgresql_tables(database_id: &str) -> String {
    format!("postgresql_tables_{database_id}")
}

/// Rows of one PostgreSQL table
pub fn postgresql_data(database_id: &str, table_id: &str) -> String {
    format!("postgresql_data_{database_id}_{table_id}")
}

/// Collections of one MongoDB database
pub fn mongodb_collections(database_id: &str) -> String {
    format!("mongodb_collections_{database_id}")
}

/// Documents of one MongoDB collection
pub fn mongodb_documents(database_id: &str, collection_id: &str) -> String {
    format!("mongodb_documents_{database_id}_{collection_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_namespaces() {
        assert_eq!(postgresql_tables("1"), "postgresql_tables_1");
        assert_eq!(postgresql_data("1", "2"), "postgresql_data_1_2");
        assert_eq!(mongodb_collections("7"), "mongodb_collections_7");
        assert_eq!(mongodb_documents("7", "3"), "mongodb_documents_7_3");
    }
}
