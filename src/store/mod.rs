//! Whole-table persistence.
//!
//! Every table is one JSON array, read and replaced as a unit. There are no
//! partial updates; the last write of a table wins.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::info;
use crate::domain::aggregates::{PlateId, PrintingPlate, Product, Purchase, Reservation, Sale};

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table { Products, PrintingPlates, Purchases, Sales, Reservations }

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::PrintingPlates => "printing_plates",
            Table::Purchases => "purchases",
            Table::Sales => "sales",
            Table::Reservations => "reservations",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to prepare data directory {}: {source}", .path.display())]
    Root { path: PathBuf, source: std::io::Error },

    #[error("failed to access table {table}: {source}")]
    Io { table: Table, source: std::io::Error },

    #[error("table {table} holds invalid rows: {source}")]
    Decode { table: Table, source: serde_json::Error },

    #[error("failed to encode table {table}: {source}")]
    Encode { table: Table, source: serde_json::Error },
}

/// Backing key-value store, one JSON array per table.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every row of `table`. A table that was never written reads as empty.
    async fn load_table(&self, table: Table) -> Result<Vec<Value>, StoreError>;

    /// Replaces the whole table in one write.
    async fn replace_table(&self, table: Table, rows: Vec<Value>) -> Result<(), StoreError>;
}

/// Typed access to the shop tables over any [`CatalogStore`].
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn CatalogStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self { Self { store } }

    async fn load<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, StoreError> {
        self.store
            .load_table(table)
            .await?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|source| StoreError::Decode { table, source })
    }

    async fn replace<T: Serialize + Sync>(&self, table: Table, rows: &[T]) -> Result<(), StoreError> {
        let rows = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Encode { table, source })?;
        self.store.replace_table(table, rows).await
    }

    pub async fn load_catalog(&self) -> Result<Vec<Product>, StoreError> { self.load(Table::Products).await }
    pub async fn save_catalog(&self, catalog: &[Product]) -> Result<(), StoreError> { self.replace(Table::Products, catalog).await }

    pub async fn load_plates(&self) -> Result<Vec<PrintingPlate>, StoreError> {
        let mut plates: Vec<PrintingPlate> = self.load(Table::PrintingPlates).await?;
        plates.iter_mut().for_each(PrintingPlate::sync_legacy_quantities);
        Ok(plates)
    }

    pub async fn save_plates(&self, plates: &[PrintingPlate]) -> Result<(), StoreError> { self.replace(Table::PrintingPlates, plates).await }

    pub async fn load_plate(&self, id: PlateId) -> Result<Option<PrintingPlate>, StoreError> {
        Ok(self.load_plates().await?.into_iter().find(|p| p.id == id))
    }

    /// Inserts or replaces `plate`, rewriting the plates table.
    pub async fn save_plate(&self, plate: &PrintingPlate) -> Result<(), StoreError> {
        let mut plates = self.load_plates().await?;
        match plates.iter_mut().find(|p| p.id == plate.id) {
            Some(existing) => *existing = plate.clone(),
            None => plates.push(plate.clone()),
        }
        self.save_plates(&plates).await
    }

    pub async fn load_purchases(&self) -> Result<Vec<Purchase>, StoreError> { self.load(Table::Purchases).await }
    pub async fn save_purchases(&self, rows: &[Purchase]) -> Result<(), StoreError> { self.replace(Table::Purchases, rows).await }

    pub async fn load_sales(&self) -> Result<Vec<Sale>, StoreError> { self.load(Table::Sales).await }
    pub async fn save_sales(&self, rows: &[Sale]) -> Result<(), StoreError> { self.replace(Table::Sales, rows).await }

    pub async fn load_reservations(&self) -> Result<Vec<Reservation>, StoreError> { self.load(Table::Reservations).await }
    pub async fn save_reservations(&self, rows: &[Reservation]) -> Result<(), StoreError> { self.replace(Table::Reservations, rows).await }

    /// Writes the default catalog when the products table is empty.
    pub async fn seed_catalog_if_empty(&self) -> Result<bool, StoreError> {
        if !self.load_catalog().await?.is_empty() { return Ok(false); }
        let seed = Product::seed_catalog();
        self.save_catalog(&seed).await?;
        info!(products = seed.len(), "seeded default catalog");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::domain::value_objects::SizeKey;

    fn repo() -> Repository { Repository::new(Arc::new(MemoryStore::new())) }

    #[tokio::test]
    async fn test_seed_only_once() {
        let repo = repo();
        assert!(repo.seed_catalog_if_empty().await.unwrap());
        assert!(!repo.seed_catalog_if_empty().await.unwrap());
        assert_eq!(repo.load_catalog().await.unwrap(), Product::seed_catalog());
    }

    #[tokio::test]
    async fn test_save_plate_upserts() {
        let repo = repo();
        let quantities = [(SizeKey::small(), 5)].into_iter().collect();
        let mut plate = PrintingPlate::create(1, "A", 100.0, quantities, Utc::now());
        repo.save_plate(&plate).await.unwrap();
        plate.mark_printed(Utc::now()).unwrap();
        repo.save_plate(&plate).await.unwrap();

        let plates = repo.load_plates().await.unwrap();
        assert_eq!(plates.len(), 1);
        assert!(plates[0].is_printed);
        assert_eq!(repo.load_plate(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_rows_are_reported() {
        let store = Arc::new(MemoryStore::new());
        store.replace_table(Table::Products, vec![serde_json::json!({"id": "nope"})]).await.unwrap();
        let err = Repository::new(store).load_catalog().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { table: Table::Products, .. }));
    }
}
