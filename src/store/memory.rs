use std::collections::HashMap;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use super::{CatalogStore, StoreError, Table};

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn load_table(&self, table: Table) -> Result<Vec<Value>, StoreError> {
        Ok(self.tables.lock().await.get(&table).cloned().unwrap_or_default())
    }

    async fn replace_table(&self, table: Table, rows: Vec<Value>) -> Result<(), StoreError> {
        self.tables.lock().await.insert(table, rows);
        Ok(())
    }
}
