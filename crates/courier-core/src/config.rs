//! Relay configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::RelayError;
use crate::domain::payload::ELLIPSIS;
use crate::ports::MAX_PAGE_SIZE;

/// Upper bound applied to `dedup_ttl_secs` (one year).
const MAX_DEDUP_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// How the coordinator serializes polls against mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockDiscipline {
    /// One exclusive region per destination; different destinations run concurrently.
    #[default]
    PerDestination,
    /// One exclusive region for every destination.
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Pause between two poll cycles of a worker.
    pub poll_interval_secs: u64,
    /// Page size of each search.
    pub search_limit: usize,
    /// Lifetime of a DeliveredItem record.
    pub dedup_ttl_secs: u64,
    /// Period of the expired-record sweep.
    pub sweep_interval_secs: u64,
    /// Platform display limit for item titles, in characters.
    pub title_limit: usize,
    /// Site root used to build item and author links.
    pub content_base_url: String,
    pub lock_discipline: LockDiscipline,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            search_limit: MAX_PAGE_SIZE,
            dedup_ttl_secs: 60 * 60,
            sweep_interval_secs: 60,
            title_limit: 256,
            content_base_url: "https://www.reddit.com".to_string(),
            lock_discipline: LockDiscipline::PerDestination,
        }
    }
}

impl RelayConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, RelayError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| RelayError::Config(format!("json decode: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.poll_interval_secs == 0 {
            return Err(RelayError::Config("poll_interval_secs must be > 0".into()));
        }
        if self.sweep_interval_secs == 0 {
            return Err(RelayError::Config("sweep_interval_secs must be > 0".into()));
        }
        if self.dedup_ttl_secs == 0 {
            return Err(RelayError::Config("dedup_ttl_secs must be > 0".into()));
        }
        if self.search_limit == 0 || self.search_limit > MAX_PAGE_SIZE {
            return Err(RelayError::Config(format!(
                "search_limit must be within 1..={MAX_PAGE_SIZE}"
            )));
        }
        if self.title_limit <= ELLIPSIS.len() {
            return Err(RelayError::Config(format!(
                "title_limit must be larger than {}",
                ELLIPSIS.len()
            )));
        }
        if self.content_base_url.is_empty() {
            return Err(RelayError::Config("content_base_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn dedup_ttl(&self) -> chrono::Duration {
        let secs = self.dedup_ttl_secs.min(MAX_DEDUP_TTL_SECS) as i64;
        chrono::Duration::seconds(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = RelayConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.dedup_ttl(), chrono::Duration::minutes(60));
        assert_eq!(config.search_limit, 100);
        assert_eq!(config.title_limit, 256);
        assert_eq!(config.lock_discipline, LockDiscipline::PerDestination);
        config.validate().unwrap();
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(RelayConfig::from_json("{}").unwrap(), RelayConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            RelayConfig::from_json(r#"{"poll_interval_secs": 5, "lock_discipline": "global"}"#)
                .unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.lock_discipline, LockDiscipline::Global);
        assert_eq!(config.dedup_ttl_secs, 3600);
    }

    #[rstest]
    #[case::zero_interval(r#"{"poll_interval_secs": 0}"#)]
    #[case::zero_ttl(r#"{"dedup_ttl_secs": 0}"#)]
    #[case::zero_sweep(r#"{"sweep_interval_secs": 0}"#)]
    #[case::limit_too_large(r#"{"search_limit": 101}"#)]
    #[case::title_limit_too_small(r#"{"title_limit": 3}"#)]
    #[case::not_json("poll_interval_secs = 5")]
    fn invalid_configs_are_rejected(#[case] raw: &str) {
        let err = RelayConfig::from_json(raw).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
