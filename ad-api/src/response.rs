//! Server response types.
//!
//! Every AllDebrid response is wrapped in the same envelope:
//! ```json
//! { "status": "success", "data": { ... } }
//! { "status": "error", "error": { "code": "LINK_DOWN", "message": "..." } }
//! ```

use serde::{Deserialize, Serialize};

use ad_core::error::{AdError, AdResult};

/// Standard response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T = serde_json::Value> {
    /// `"success"` or `"error"`.
    pub status: String,
    /// Payload (type varies by endpoint).
    pub data: Option<T>,
    /// Error details (present only on error responses).
    pub error: Option<ApiErrorBody>,
}

/// Error detail of an error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error code, e.g. `AUTH_BAD_APIKEY`.
    #[serde(default)]
    pub code: String,
    /// Error message.
    #[serde(default)]
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Whether the envelope reports success.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Whether the envelope reports an error.
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Convert the envelope into its payload, or the remote error it carries.
    pub fn into_data(self) -> AdResult<T> {
        if self.is_error() {
            let body = self.error.unwrap_or_else(|| ApiErrorBody {
                code: "GENERIC".into(),
                message: format!("unexpected status '{}'", self.status),
            });
            return Err(AdError::api(body.code, body.message));
        }
        self.data
            .ok_or_else(|| AdError::Serialization("success response without data".into()))
    }
}

/// Payload of endpoints that only acknowledge with a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageData {
    #[serde(default)]
    pub message: String,
}
