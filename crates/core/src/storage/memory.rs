use crate::domain::record::Record;
use crate::error::StoreError;
use crate::storage::CatalogAccess;
use tokio::sync::RwLock;

/// In-process catalog. Keeps insertion order so listings are reproducible.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: RwLock<Vec<Record>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut out: Vec<Record> = Vec::new();
        for record in records {
            if !out.iter().any(|r| r.ticker == record.ticker) {
                out.push(record);
            }
        }
        Self {
            records: RwLock::new(out),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl CatalogAccess for MemoryCatalog {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn upsert(&self, record: &Record) -> Result<bool, StoreError> {
        let mut guard = self.records.write().await;
        if guard.iter().any(|r| r.ticker == record.ticker) {
            return Ok(false);
        }
        guard.push(record.clone());
        Ok(true)
    }
}
