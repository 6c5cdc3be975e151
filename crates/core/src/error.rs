use thiserror::Error;

/// Failure talking to the remote rating-action feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("data feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("data feed HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("data feed returned malformed data: {0}")]
    Malformed(String),
}

/// Failure reading from or writing to the catalog.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// The catalog could not be read while serving a query.
#[derive(Debug, Error)]
#[error("catalog unavailable")]
pub struct CatalogUnavailable {
    #[source]
    pub source: StoreError,
}

impl From<StoreError> for CatalogUnavailable {
    fn from(source: StoreError) -> Self {
        Self { source }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to store record {ticker}")]
    Store {
        ticker: String,
        #[source]
        source: StoreError,
    },
}
