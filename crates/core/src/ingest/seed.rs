use crate::error::SeedError;
use crate::ingest::feed::DataFeed;
use crate::storage::CatalogAccess;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub fetched: usize,
    pub inserted: usize,
}

/// Pulls every record from `feed` and stores the ones whose ticker is not already cataloged.
pub async fn seed_catalog(
    feed: &dyn DataFeed,
    catalog: &dyn CatalogAccess,
) -> Result<SeedSummary, SeedError> {
    let records = feed.fetch().await?;
    tracing::info!(source = feed.source_name(), fetched = records.len(), "data feed fetched");

    let mut inserted: usize = 0;
    for record in &records {
        let written = catalog
            .upsert(record)
            .await
            .map_err(|source| SeedError::Store {
                ticker: record.ticker.clone(),
                source,
            })?;
        if written {
            inserted += 1;
        }
    }

    Ok(SeedSummary {
        fetched: records.len(),
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Record;
    use crate::error::{FetchError, StoreError};
    use crate::storage::memory::MemoryCatalog;

    struct StaticFeed(Vec<Record>);

    #[async_trait::async_trait]
    impl DataFeed for StaticFeed {
        fn source_name(&self) -> &'static str {
            "static"
        }

        async fn fetch(&self) -> Result<Vec<Record>, FetchError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenFeed;

    #[async_trait::async_trait]
    impl DataFeed for BrokenFeed {
        fn source_name(&self) -> &'static str {
            "broken"
        }

        async fn fetch(&self) -> Result<Vec<Record>, FetchError> {
            Err(FetchError::Malformed("boom".into()))
        }
    }

    struct ReadOnlyCatalog;

    #[async_trait::async_trait]
    impl CatalogAccess for ReadOnlyCatalog {
        async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
            Ok(Vec::new())
        }

        async fn upsert(&self, _record: &Record) -> Result<bool, StoreError> {
            Err(StoreError::Backend("read-only".into()))
        }
    }

    fn rec(ticker: &str) -> Record {
        Record {
            ticker: ticker.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn inserts_each_ticker_once() {
        let feed = StaticFeed(vec![rec("AAPL"), rec("TSLA"), rec("AAPL")]);
        let catalog = MemoryCatalog::new();

        let summary = seed_catalog(&feed, &catalog).await.unwrap();
        assert_eq!(summary, SeedSummary { fetched: 3, inserted: 2 });

        let again = seed_catalog(&feed, &catalog).await.unwrap();
        assert_eq!(again, SeedSummary { fetched: 3, inserted: 0 });
        assert_eq!(catalog.len().await, 2);
    }

    #[tokio::test]
    async fn fetch_failure_is_surfaced() {
        let catalog = MemoryCatalog::new();
        let err = seed_catalog(&BrokenFeed, &catalog).await.unwrap_err();
        assert!(matches!(err, SeedError::Fetch(_)));
        assert!(catalog.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_names_the_ticker() {
        let feed = StaticFeed(vec![rec("NVDA")]);
        let err = seed_catalog(&feed, &ReadOnlyCatalog).await.unwrap_err();
        match err {
            SeedError::Store { ticker, .. } => assert_eq!(ticker, "NVDA"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
