//! Media source trait and test double

use crate::error::{ArenaError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

/// Trait for the external media API
///
/// One probe of `random_file_in_category` corresponds to one request against
/// the source's random-page endpoint: `Ok(Some(title))` when the page
/// resolved to a qualifying file, `Ok(None)` when it landed elsewhere (a
/// category page, an unsupported file type). The caller owns the bounded
/// retry loop.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Probe the category for one random qualifying file title
    async fn random_file_in_category(&self, category: &str) -> Result<Option<String>>;

    /// Fetch the raw Structured Data statements response for a file
    async fn file_statements(&self, file_name: &str) -> Result<serde_json::Value>;
}

/// Mock media source for testing
///
/// Serves a scripted queue of probe results; an exhausted queue behaves like
/// a category that never yields a qualifying file.
#[derive(Debug, Default)]
pub struct MockMediaSource {
    probes: Mutex<VecDeque<Option<String>>>,
    statements: RwLock<HashMap<String, serde_json::Value>>,
    probe_calls: Mutex<u32>,
    fail_probes: Mutex<bool>,
}

impl MockMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a probe result resolving to the given file title
    pub fn push_file(&self, title: &str) {
        if let Ok(mut probes) = self.probes.lock() {
            probes.push_back(Some(title.to_string()));
        }
    }

    /// Queue a probe result that does not resolve to a qualifying file
    pub fn push_miss(&self) {
        if let Ok(mut probes) = self.probes.lock() {
            probes.push_back(None);
        }
    }

    /// Preset the statements response for a file title
    pub fn set_statements(&self, title: &str, raw: serde_json::Value) {
        if let Ok(mut statements) = self.statements.write() {
            statements.insert(title.to_string(), raw);
        }
    }

    /// Make every probe fail with a media source error
    pub fn fail_all_probes(&self) {
        if let Ok(mut fail) = self.fail_probes.lock() {
            *fail = true;
        }
    }

    /// Number of probes made (for testing retry bounds)
    pub fn probe_count(&self) -> u32 {
        self.probe_calls.lock().map(|calls| *calls).unwrap_or(0)
    }
}

#[async_trait]
impl MediaSource for MockMediaSource {
    async fn random_file_in_category(&self, _category: &str) -> Result<Option<String>> {
        if let Ok(mut calls) = self.probe_calls.lock() {
            *calls += 1;
        }

        if self.fail_probes.lock().map(|fail| *fail).unwrap_or(false) {
            return Err(ArenaError::MediaSourceFailed {
                message: "mock probe failure".to_string(),
            }
            .into());
        }

        let mut probes = self.probes.lock().map_err(|_| ArenaError::InternalError {
            message: "Failed to acquire mock probes lock".to_string(),
        })?;
        Ok(probes.pop_front().flatten())
    }

    async fn file_statements(&self, file_name: &str) -> Result<serde_json::Value> {
        let statements = self
            .statements
            .read()
            .map_err(|_| ArenaError::InternalError {
                message: "Failed to acquire mock statements lock".to_string(),
            })?;
        Ok(statements
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({ "entities": {} })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_scripted_probes_in_order() {
        let source = MockMediaSource::new();
        source.push_miss();
        source.push_file("Plate 7.jpg");

        assert_eq!(source.random_file_in_category("cat").await.unwrap(), None);
        assert_eq!(
            source.random_file_in_category("cat").await.unwrap(),
            Some("Plate 7.jpg".to_string())
        );
        // Exhausted queue behaves like a miss
        assert_eq!(source.random_file_in_category("cat").await.unwrap(), None);
        assert_eq!(source.probe_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_probe_failure() {
        let source = MockMediaSource::new();
        source.fail_all_probes();
        assert!(source.random_file_in_category("cat").await.is_err());
    }
}
