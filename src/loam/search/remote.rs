//! Remote search driver.
//!
//! The remote service is authoritative: nothing is persisted locally beyond
//! ephemeral query results. The concrete SDK lives behind the
//! [`SearchClient`] trait; any client failure or timeout surfaces as the
//! recoverable [`LoamError::SearchUnavailable`] so callers can fall back to
//! an unfiltered listing instead of aborting the whole request.

use super::{DriverConfig, SearchHit, SearchIndex, SearchItem};
use crate::error::{LoamError, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Seam to the external search service. Implementations are expected to
/// honor the timeout passed to `search`; exceeding it is reported like any
/// other transport failure.
pub trait SearchClient {
    fn upsert(&self, index: &str, item: &SearchItem) -> Result<()>;
    fn delete(&self, index: &str, id: &str) -> Result<()>;
    fn clear(&self, index: &str) -> Result<()>;
    fn exists(&self, index: &str) -> Result<bool>;
    fn search(&self, index: &str, query: &str, timeout: Duration) -> Result<Vec<SearchHit>>;
}

pub struct RemoteIndex {
    name: String,
    timeout: Duration,
    client: Arc<dyn SearchClient>,
}

impl RemoteIndex {
    /// Recognized config key: `timeout_ms` (default 5000).
    pub fn new(name: &str, config: &DriverConfig, client: Arc<dyn SearchClient>) -> Self {
        let timeout_ms = config
            .get("timeout_ms")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            name: name.to_string(),
            timeout: Duration::from_millis(timeout_ms),
            client,
        }
    }

    fn unavailable(&self, error: LoamError) -> LoamError {
        match error {
            already @ LoamError::SearchUnavailable(_) => already,
            other => LoamError::SearchUnavailable(format!(
                "index [{}]: {other}",
                self.name
            )),
        }
    }
}

impl SearchIndex for RemoteIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.client.exists(&self.name).unwrap_or(false)
    }

    fn clear(&mut self) -> Result<()> {
        self.client
            .clear(&self.name)
            .map_err(|e| self.unavailable(e))
    }

    fn update(&mut self, item: &SearchItem) -> Result<()> {
        self.client
            .upsert(&self.name, item)
            .map_err(|e| self.unavailable(e))
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.client
            .delete(&self.name, id)
            .map_err(|e| self.unavailable(e))
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.client
            .search(&self.name, query, self.timeout)
            .map_err(|e| self.unavailable(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    struct FlakyClient {
        available: bool,
        seen_timeout: RefCell<Option<Duration>>,
    }

    impl SearchClient for FlakyClient {
        fn upsert(&self, _index: &str, _item: &SearchItem) -> Result<()> {
            Ok(())
        }
        fn delete(&self, _index: &str, _id: &str) -> Result<()> {
            Ok(())
        }
        fn clear(&self, _index: &str) -> Result<()> {
            Ok(())
        }
        fn exists(&self, _index: &str) -> Result<bool> {
            if self.available {
                Ok(true)
            } else {
                Err(LoamError::Store("connection refused".to_string()))
            }
        }
        fn search(&self, _index: &str, _query: &str, timeout: Duration) -> Result<Vec<SearchHit>> {
            *self.seen_timeout.borrow_mut() = Some(timeout);
            if self.available {
                Ok(vec![SearchHit {
                    id: "one".to_string(),
                    score: 1.0,
                }])
            } else {
                Err(LoamError::SearchUnavailable("timed out".to_string()))
            }
        }
    }

    fn remote(available: bool, config: &DriverConfig) -> (Arc<FlakyClient>, RemoteIndex) {
        let client = Arc::new(FlakyClient {
            available,
            seen_timeout: RefCell::new(None),
        });
        let index = RemoteIndex::new("remote", config, Arc::clone(&client) as Arc<dyn SearchClient>);
        (client, index)
    }

    #[test]
    fn search_passes_the_configured_timeout() {
        let mut config = DriverConfig::new();
        config.insert("timeout_ms".to_string(), json!(250));
        let (client, index) = remote(true, &config);

        let hits = index.search("anything").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(
            *client.seen_timeout.borrow(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn failures_surface_as_search_unavailable() {
        let (_, index) = remote(false, &DriverConfig::new());
        let err = index.search("anything").unwrap_err();
        assert!(matches!(err, LoamError::SearchUnavailable(_)));
    }

    #[test]
    fn exists_degrades_to_false_when_unreachable() {
        let (_, index) = remote(false, &DriverConfig::new());
        assert!(!index.exists());
    }
}
