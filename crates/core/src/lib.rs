pub mod domain;
pub mod error;
pub mod ingest;
pub mod service;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub data_feed_url: Option<String>,
        pub data_feed_token: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                data_feed_url: non_empty_var("DATA_FEED_URL"),
                data_feed_token: non_empty_var("DATA_FEED_TOKEN"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_data_feed_url(&self) -> anyhow::Result<&str> {
            self.data_feed_url
                .as_deref()
                .context("DATA_FEED_URL is required")
        }
    }

    /// Parses an optional env knob, falling back to `default` when unset or malformed.
    pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
        std::env::var(key)
            .ok()
            .and_then(|s| s.trim().parse::<T>().ok())
            .unwrap_or(default)
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }
}
