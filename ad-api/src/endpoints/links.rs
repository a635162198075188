//! Link endpoints: unlock, stream request, delayed link status.
//!
//! Some hosts do not hand out a direct link on unlock. The caller picks one
//! of the returned `streams`, requests it with `link/streaming`, and receives
//! a `delayed` job id that is polled through `link/delayed` until the
//! service has generated the file.

use serde::{Deserialize, Serialize};
use ad_core::constants::delayed_status;
use ad_core::error::{AdError, AdResult};
use crate::client::ApiClient;
use crate::endpoints::{opt_string_or_number, string_or_number};
use crate::routes::Endpoint;

/// Result of `link/unlock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockedLink {
    /// Generation id, passed back to `link/streaming`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Direct link, empty for stream-only hosts.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    /// Available stream qualities, best first.
    #[serde(default)]
    pub streams: Vec<StreamQuality>,
    /// Delayed job id when the unlock itself is deferred.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub delayed: Option<String>,
}

/// One stream quality offered by an unlocked link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamQuality {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub ext: Option<String>,
    /// Height in pixels or a host-specific label.
    #[serde(default)]
    pub quality: Option<serde_json::Value>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl StreamQuality {
    /// Printable quality label.
    pub fn label(&self) -> String {
        match &self.quality {
            Some(serde_json::Value::Number(n)) => format!("{n}p"),
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => self.name.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// Result of `link/streaming`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRequest {
    /// Delayed job id to poll.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub delayed: Option<String>,
    /// Direct link, when the stream is available immediately.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
}

/// Result of `link/delayed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayedLink {
    /// 1 = processing, 2 = available, 3 = error.
    pub status: i64,
    /// Estimated seconds remaining.
    #[serde(default)]
    pub time_left: Option<i64>,
    /// Final link once available.
    #[serde(default)]
    pub link: Option<String>,
}

/// Interpreted state of a delayed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelayedState {
    /// Still generating, or a status this client does not know.
    Pending,
    /// Generated; carries the direct URL.
    Ready(String),
    /// The service gave up on the job.
    Failed,
}

impl DelayedLink {
    /// Map the raw status code to a state.
    ///
    /// A "ready" status without a link is treated as pending.
    pub fn state(&self) -> DelayedState {
        match self.status {
            delayed_status::READY => match self.link.as_deref().map(str::trim) {
                Some(link) if !link.is_empty() => DelayedState::Ready(link.to_string()),
                _ => DelayedState::Pending,
            },
            delayed_status::ERROR => DelayedState::Failed,
            _ => DelayedState::Pending,
        }
    }

    /// Whether the status code is one the service documents.
    pub fn is_known_status(&self) -> bool {
        matches!(
            self.status,
            delayed_status::PROCESSING | delayed_status::READY | delayed_status::ERROR
        )
    }
}

fn require(what: &str, value: &str) -> AdResult<()> {
    if value.trim().is_empty() {
        return Err(AdError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(())
}

impl ApiClient {
    /// Unlock a hoster link.
    pub async fn unlock_link(&self, link: &str, password: Option<&str>) -> AdResult<UnlockedLink> {
        require("link", link)?;
        let mut params = vec![("link".to_string(), link.to_string())];
        if let Some(pw) = password.filter(|p| !p.is_empty()) {
            params.push(("password".to_string(), pw.to_string()));
        }
        self.call(Endpoint::LinkUnlock, &params).await
    }

    /// Request a stream quality of an unlocked link.
    ///
    /// `id` is [`UnlockedLink::id`], `stream` one of its [`StreamQuality::id`]s.
    pub async fn streaming_link(&self, link: &str, id: &str, stream: &str) -> AdResult<StreamRequest> {
        require("link", link)?;
        require("id", id)?;
        require("stream", stream)?;
        let params = vec![
            ("link".to_string(), link.to_string()),
            ("id".to_string(), id.to_string()),
            ("stream".to_string(), stream.to_string()),
        ];
        self.call(Endpoint::LinkStreaming, &params).await
    }

    /// Get the status of a delayed job.
    pub async fn delayed_link(&self, delayed_id: &str) -> AdResult<DelayedLink> {
        require("delayed id", delayed_id)?;
        let params = vec![("id".to_string(), delayed_id.to_string())];
        self.call(Endpoint::LinkDelayed, &params).await
    }
}
