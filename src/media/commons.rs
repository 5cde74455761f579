//! Wikimedia Commons client
//!
//! Talks to the live Commons endpoints: `Special:RandomInCategory` for
//! random file discovery (the redirect target tells us what we landed on)
//! and the action API's `wbgetentities` for Structured Data statements.
//! Requests are blocking ureq calls run on the blocking thread pool.

use crate::config::MediaSettings;
use crate::error::{ArenaError, Result};
use crate::media::source::MediaSource;
use crate::utils::has_accepted_extension;
use async_trait::async_trait;
use tracing::debug;
use ureq::{Agent, ResponseExt};

/// Media source implementation backed by Wikimedia Commons
#[derive(Clone)]
pub struct CommonsClient {
    agent: Agent,
    settings: MediaSettings,
}

impl CommonsClient {
    pub fn new(settings: MediaSettings) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(settings.request_timeout()))
            .build()
            .into();

        Self { agent, settings }
    }

    fn random_file_blocking(&self, category: &str) -> Result<Option<String>> {
        let url = format!("{}/Special:RandomInCategory", self.settings.wiki_base_url);
        let response = self
            .agent
            .get(&url)
            .query("wpcategory", category)
            .call()
            .map_err(|e| ArenaError::MediaSourceFailed {
                message: format!("random page request failed: {e}"),
            })?;

        // Redirects are followed; the response uri is the page we landed on
        let final_url = response.get_uri().to_string();

        let Some(title) = parse_file_title(&final_url) else {
            debug!("Random result is not a file page: {}", final_url);
            return Ok(None);
        };

        if !has_accepted_extension(&title, &self.settings.accepted_extensions) {
            debug!("Random result has unsupported extension: {}", title);
            return Ok(None);
        }

        Ok(Some(title))
    }

    fn statements_blocking(&self, file_name: &str) -> Result<serde_json::Value> {
        let response = self
            .agent
            .get(&self.settings.api_base_url)
            .query("action", "wbgetentities")
            .query("format", "json")
            .query("sites", "commonswiki")
            .query("titles", format!("File:{file_name}"))
            .query("props", "claims")
            .call()
            .map_err(|e| ArenaError::MediaSourceFailed {
                message: format!("statements request failed: {e}"),
            })?;

        response
            .into_body()
            .read_json()
            .map_err(|e| {
                ArenaError::MediaSourceFailed {
                    message: format!("statements response was not valid JSON: {e}"),
                }
                .into()
            })
    }
}

#[async_trait]
impl MediaSource for CommonsClient {
    async fn random_file_in_category(&self, category: &str) -> Result<Option<String>> {
        let client = self.clone();
        let category = category.to_string();

        tokio::task::spawn_blocking(move || client.random_file_blocking(&category))
            .await
            .map_err(|e| ArenaError::InternalError {
                message: format!("random file task panicked: {e}"),
            })?
    }

    async fn file_statements(&self, file_name: &str) -> Result<serde_json::Value> {
        let client = self.clone();
        let file_name = file_name.to_string();

        tokio::task::spawn_blocking(move || client.statements_blocking(&file_name))
            .await
            .map_err(|e| ArenaError::InternalError {
                message: format!("statements task panicked: {e}"),
            })?
    }
}

/// Extract the file title from a resolved page URL.
///
/// A random page that landed on a file renders as
/// `...?title=File:Some_name.jpg&...`; anything else (category pages,
/// project pages) yields None. Underscores are the URL form of spaces.
fn parse_file_title(final_url: &str) -> Option<String> {
    let (_, rest) = final_url.split_once("?title=File:")?;
    let title = rest.split('&').next().unwrap_or(rest);
    if title.is_empty() {
        return None;
    }
    Some(title.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_title_from_file_page() {
        let url = "https://commons.wikimedia.org/w/index.php?title=File:Bird_plate_3.jpg&redirect=no";
        assert_eq!(
            parse_file_title(url),
            Some("Bird plate 3.jpg".to_string())
        );
    }

    #[test]
    fn test_parse_file_title_without_trailing_params() {
        let url = "https://commons.wikimedia.org/w/index.php?title=File:Moth.png";
        assert_eq!(parse_file_title(url), Some("Moth.png".to_string()));
    }

    #[test]
    fn test_parse_file_title_rejects_non_file_pages() {
        assert_eq!(
            parse_file_title("https://commons.wikimedia.org/wiki/Category:Birds"),
            None
        );
        assert_eq!(
            parse_file_title("https://commons.wikimedia.org/w/index.php?title=Commons:Help"),
            None
        );
        assert_eq!(
            parse_file_title("https://commons.wikimedia.org/w/index.php?title=File:"),
            None
        );
    }

    #[test]
    fn test_client_construction() {
        let client = CommonsClient::new(MediaSettings::default());
        assert!(client.settings.api_base_url.contains("api.php"));
    }
}
