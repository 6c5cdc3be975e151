use crate::domain::ranking::{self, DEFAULT_LIMIT};
use crate::domain::record::{Record, ScoredRecord};
use crate::error::CatalogUnavailable;
use crate::storage::CatalogAccess;
use std::sync::Arc;

/// Read-side queries over the catalog: raw listing and scored recommendations.
#[derive(Clone)]
pub struct ScoreQueryService {
    catalog: Arc<dyn CatalogAccess>,
}

impl ScoreQueryService {
    pub fn new(catalog: Arc<dyn CatalogAccess>) -> Self {
        Self { catalog }
    }

    pub async fn get_all_records(&self) -> Result<Vec<Record>, CatalogUnavailable> {
        Ok(self.catalog.list_all().await?)
    }

    pub async fn get_recommendations(&self) -> Result<Vec<ScoredRecord>, CatalogUnavailable> {
        let records = self.catalog.list_all().await?;
        Ok(ranking::rank(records, DEFAULT_LIMIT))
    }
}

impl std::fmt::Debug for ScoreQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreQueryService").finish_non_exhaustive()
    }
}
