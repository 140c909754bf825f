use crate::prelude::*;
use multiverse_core::batch::DEFAULT_BATCH_SIZE;
use std::time::Duration;

/// Catalog configuration from environment variables
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Per-request timeout handed to the transport
    pub timeout: Duration,
    /// Maximum ids joined into one batch request
    pub batch_size: usize,
    /// Upper bound on a whole operation; `None` waits indefinitely
    pub deadline: Option<Duration>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            deadline: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| eyre!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(None),
    }
}

impl CatalogConfig {
    /// Default Rick and Morty API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://rickandmortyapi.com/api";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Load configuration from environment variables
    /// Uses MULTIVERSE_BASE_URL, MULTIVERSE_TIMEOUT (seconds), MULTIVERSE_BATCH_SIZE and
    /// MULTIVERSE_DEADLINE (seconds), falling back to defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            base_url: std::env::var("MULTIVERSE_BASE_URL").unwrap_or(defaults.base_url),
            timeout: parse_env::<u64>("MULTIVERSE_TIMEOUT")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            batch_size: parse_env::<usize>("MULTIVERSE_BATCH_SIZE")?
                .unwrap_or(defaults.batch_size),
            deadline: parse_env::<u64>("MULTIVERSE_DEADLINE")?.map(Duration::from_secs),
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, global: &crate::Global) -> Self {
        if let Some(url) = &global.base_url {
            self.base_url = url.clone();
        }
        if let Some(timeout) = global.timeout {
            self.timeout = Duration::from_secs(timeout);
        }
        if let Some(batch_size) = global.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(deadline) = global.deadline {
            self.deadline = Some(Duration::from_secs(deadline));
        }
        self
    }
}
