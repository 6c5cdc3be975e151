use serde::{Deserialize, Serialize};

/// One analyst rating action for a ticker, as published by the feed and stored in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub ticker: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub brokerage: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub rating_from: String,
    #[serde(default)]
    pub rating_to: String,
    #[serde(default)]
    pub target_from: String,
    #[serde(default)]
    pub target_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(rename = "stock")]
    pub record: Record,
    pub score: f64,
}
