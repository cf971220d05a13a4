use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::debug;
use super::{CatalogStore, StoreError, Table};

/// One `<table>.json` file per table under a data directory.
///
/// Writes land in a sibling temp file which is then renamed over the table,
/// so readers never see a half-written array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|source| StoreError::Root { path: root.clone(), source })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn table_path(&self, table: Table) -> PathBuf { self.root.join(format!("{}.json", table.name())) }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn load_table(&self, table: Table) -> Result<Vec<Value>, StoreError> {
        let bytes = match fs::read(self.table_path(table)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { table, source }),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) { return Ok(Vec::new()); }
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode { table, source })
    }

    async fn replace_table(&self, table: Table, rows: Vec<Value>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(&rows).map_err(|source| StoreError::Encode { table, source })?;
        let path = self.table_path(table);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, body).await.map_err(|source| StoreError::Io { table, source })?;
        fs::rename(&staging, &path).await.map_err(|source| StoreError::Io { table, source })?;
        debug!(%table, rows = rows.len(), "replaced table");
        Ok(())
    }
}
