use crate::domain::record::Record;
use serde::{Deserialize, Serialize};

/// One page of the rating-action list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<Record>,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl FeedPage {
    /// Cursor for the following page, if the feed reported one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
