//! Saved links and recent-link history.

use serde::{Deserialize, Serialize};
use ad_core::error::AdResult;
use crate::client::{list_params, require_non_empty, ApiClient};
use crate::response::MessageData;
use crate::routes::Endpoint;

/// A link stored in the account, either saved explicitly or from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedLink {
    pub link: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    /// Unix timestamp.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub host: Option<String>,
}

impl SavedLink {
    pub fn saved_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.date, 0)
    }
}

#[derive(Debug, Deserialize)]
struct LinksData {
    #[serde(default)]
    links: Option<Vec<SavedLink>>,
}

impl LinksData {
    fn into_links(self) -> Vec<SavedLink> {
        self.links.unwrap_or_default()
    }
}

impl ApiClient {
    /// Links saved in the account. Empty when none are stored.
    pub async fn saved_links(&self) -> AdResult<Vec<SavedLink>> {
        let data: LinksData = self.call(Endpoint::SavedLinks, &[]).await?;
        Ok(data.into_links())
    }

    /// Save links to the account.
    pub async fn save_links<S: AsRef<str>>(&self, links: &[S]) -> AdResult<String> {
        require_non_empty("links", links)?;
        let data: MessageData = self
            .call(Endpoint::SaveLink, &list_params("links", links))
            .await?;
        Ok(data.message)
    }

    /// Delete saved links.
    pub async fn delete_saved_links<S: AsRef<str>>(&self, links: &[S]) -> AdResult<String> {
        require_non_empty("links", links)?;
        let data: MessageData = self
            .call(Endpoint::DeleteSavedLink, &list_params("links", links))
            .await?;
        Ok(data.message)
    }

    /// Recently unlocked links, when history is enabled on the account.
    pub async fn recent_links(&self) -> AdResult<Vec<SavedLink>> {
        let data: LinksData = self.call(Endpoint::History, &[]).await?;
        Ok(data.into_links())
    }

    /// Clear the recent-link history.
    pub async fn purge_recent_links(&self) -> AdResult<String> {
        let data: MessageData = self.call(Endpoint::PurgeHistory, &[]).await?;
        Ok(data.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_core::config::ApiConfig;
    use ad_core::error::AdError;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client() -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        let config = ApiConfig {
            api_key: "abcdefghij0123456789".into(),
            base_url: format!("{}/v4/", server.uri()),
            ..ApiConfig::default()
        };
        (server, ApiClient::new(&config).unwrap())
    }

    #[test]
    fn test_saved_link_date() {
        let link: SavedLink = serde_json::from_value(serde_json::json!({
            "link": "https://host/f", "filename": "f", "size": 3, "date": 1_600_000_000, "host": "host"
        }))
        .unwrap();
        assert_eq!(link.saved_at().map(|d| d.timestamp()), Some(1_600_000_000));
    }

    #[tokio::test]
    async fn test_no_saved_links_is_empty() {
        let (server, client) = mock_client().await;
        Mock::given(method("GET"))
            .and(path("/v4/user/links"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {}
            })))
            .mount(&server)
            .await;

        assert!(client.saved_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_links_posts_list() {
        let (server, client) = mock_client().await;
        Mock::given(method("POST"))
            .and(path("/v4/user/links/save"))
            .and(body_string_contains("links%5B%5D="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"message": "Links successfully saved"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let msg = client.save_links(&["https://host/a", "https://host/b"]).await.unwrap();
        assert_eq!(msg, "Links successfully saved");
    }

    #[tokio::test]
    async fn test_history_disabled_error() {
        let (server, client) = mock_client().await;
        Mock::given(method("GET"))
            .and(path("/v4/user/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "error": {"code": "USER_LINK_INVALID", "message": "History is disabled"}
            })))
            .mount(&server)
            .await;

        let err = client.recent_links().await.unwrap_err();
        assert_eq!(err.api_code(), Some("USER_LINK_INVALID"));
    }

    #[tokio::test]
    async fn test_delete_requires_links() {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        let none: [&str; 0] = [];
        assert!(matches!(client.delete_saved_links(&none).await, Err(AdError::InvalidInput(_))));
    }
}
