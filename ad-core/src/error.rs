//! Global error types for the AllDebrid client.
//!
//! Every failure the workspace can produce is a variant of `AdError`: local
//! input and configuration problems, transport failures, structured errors
//! returned by the service, and the terminal outcomes of delayed-link
//! resolution.

use std::time::Duration;

use thiserror::Error;

/// Convenience type alias for Results using AdError.
pub type AdResult<T> = Result<T, AdError>;

/// Unified error type for the AllDebrid client.
#[derive(Error, Debug)]
pub enum AdError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// The API key does not have the shape the service issues.
    #[error("invalid api key: expected 20 alphanumeric characters")]
    InvalidApiKey,

    // -- Caller errors --
    /// Caller input rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -- Network errors --
    /// HTTP request failed.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status without a decodable error envelope.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Authentication rejected at the HTTP level.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    // -- Remote service errors --
    /// The service answered with an `error` envelope.
    #[error("api error {code}: {message}")]
    Api {
        /// Service error code, e.g. `LINK_HOST_NOT_SUPPORTED`.
        code: String,
        /// Message supplied by the service.
        message: String,
    },

    // -- Delayed-link resolution outcomes --
    /// The unlocked link exposes no stream qualities.
    #[error("no streams available for {link}")]
    NoStreamsAvailable {
        /// The link that was unlocked.
        link: String,
    },

    /// The polling wall-clock budget ran out while the job was still pending.
    #[error("delayed link not ready after {:.1}s ({} polls)", .elapsed.as_secs_f64(), .attempts)]
    PollTimeout {
        /// Time spent polling.
        elapsed: Duration,
        /// Number of status polls issued.
        attempts: u32,
    },

    /// The polling attempt budget ran out while the job was still pending.
    #[error("delayed link not ready after {attempts} polls")]
    AttemptsExhausted {
        /// Number of status polls issued.
        attempts: u32,
    },

    /// The service reported the delayed job as failed.
    #[error("delayed link generation failed for job {delayed_id}")]
    DelayedJobFailed {
        /// The delayed job token.
        delayed_id: String,
    },

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdError {
    /// Build an `Api` error from a service code and message.
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        AdError::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The service error code, if this is a remote error.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            AdError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the service rejected the credentials used for the call.
    pub fn is_auth_error(&self) -> bool {
        match self {
            AdError::AuthFailed(_) | AdError::InvalidApiKey => true,
            AdError::Api { code, .. } => code.starts_with("AUTH_"),
            _ => false,
        }
    }

    /// Whether the error is a terminal outcome of delayed-link polling
    /// ("not ready yet, gave up"). Retrying the whole resolution later may succeed.
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            AdError::PollTimeout { .. } | AdError::AttemptsExhausted { .. }
        )
    }

    /// Whether the error is one of the outcomes a link resolution can end in.
    pub fn is_resolver_terminal(&self) -> bool {
        matches!(
            self,
            AdError::InvalidInput(_)
                | AdError::Api { .. }
                | AdError::NoStreamsAvailable { .. }
                | AdError::PollTimeout { .. }
                | AdError::AttemptsExhausted { .. }
                | AdError::DelayedJobFailed { .. }
        )
    }

    /// Human-readable description of the service error code, if known.
    pub fn describe_code(&self) -> Option<&'static str> {
        self.api_code().and_then(error_code_description)
    }
}

impl From<serde_json::Error> for AdError {
    fn from(e: serde_json::Error) -> Self {
        AdError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for AdError {
    fn from(e: toml::de::Error) -> Self {
        AdError::Config(e.to_string())
    }
}

/// Documented service error codes and their meaning.
pub fn error_code_description(code: &str) -> Option<&'static str> {
    let text = match code {
        "GENERIC" => "An error occurred",
        "404" => "Endpoint doesn't exist",

        "AUTH_MISSING_AGENT" => "You must send a meaningful agent parameter",
        "AUTH_BAD_AGENT" => "Bad agent",
        "AUTH_MISSING_APIKEY" => "The auth apikey was not sent",
        "AUTH_BAD_APIKEY" => "The auth apikey is invalid",
        "AUTH_BLOCKED" => "This apikey is geo-blocked or ip-blocked",
        "AUTH_USER_BANNED" => "This account is banned",

        "LINK_IS_MISSING" => "No link was sent",
        "LINK_HOST_NOT_SUPPORTED" => "This host or link is not supported",
        "LINK_DOWN" => "This link is not available on the file hoster website",
        "LINK_PASS_PROTECTED" => "Link is password protected",
        "LINK_HOST_UNAVAILABLE" => "Host under maintenance or not available",
        "LINK_TOO_MANY_DOWNLOADS" => "Too many concurrent downloads for this host",
        "LINK_HOST_FULL" => "All servers are full for this host, please retry later",
        "LINK_HOST_LIMIT_REACHED" => "You have reached the download limit for this host",
        "LINK_ERROR" => "Could not unlock this link",

        "REDIRECTOR_NOT_SUPPORTED" => "Redirector not supported",
        "REDIRECTOR_ERROR" => "Could not extract links",

        "STREAM_INVALID_GEN_ID" => "Invalid generation ID",
        "STREAM_INVALID_STREAM_ID" => "Invalid stream ID",

        "DELAYED_INVALID_ID" => "This delayed link id is invalid",

        "FREE_TRIAL_LIMIT_REACHED" => {
            "You have reached the free trial limit (7 days // 25GB downloaded or host ineligible for free trial)"
        }
        "MUST_BE_PREMIUM" => "You must be premium to process this link",

        "MAGNET_INVALID_ID" => "This magnet ID does not exists or is invalid",
        "MAGNET_INVALID_URI" => "Magnet is not valid",
        "MAGNET_INVALID_FILE" => "File is not a valid torrent",
        "MAGNET_FILE_UPLOAD_FAILED" => "File upload failed",
        "MAGNET_NO_URI" => "No magnet sent",
        "MAGNET_PROCESSING" => "Magnet is processing or completed",
        "MAGNET_TOO_MANY_ACTIVE" => "Already have maximum allowed active magnets (30)",
        "MAGNET_MUST_BE_PREMIUM" => "You must be premium to use this feature",
        "MAGNET_NO_SERVER" | "NO_SERVER" => {
            "Servers are not allowed to use this feature. Visit https://alldebrid.com/vpn if you're using a VPN."
        }
        "MAGNET_TOO_LARGE" => "Magnet files are too large (max 1TB)",

        "PIN_ALREADY_AUTHED" => "You already have a valid auth apikey",
        "PIN_EXPIRED" => "The pin is expired",
        "PIN_INVALID" => "The pin is invalid",

        "USER_LINK_MISSING" => "No link provided",
        "USER_LINK_INVALID" => "Can't save those links",

        "MISSING_NOTIF_ENDPOINT" => "You must provide an endpoint to unsubscribe",

        "VOUCHER_DURATION_INVALID" => "Invalid voucher duration (must be either 15, 30, 90, 180 or 365)",
        "VOUCHER_NB_INVALID" => "Invalid voucher number, must be between 1 and 10",
        "NO_MORE_VOUCHER" => "No voucher of this type available in your account",
        "INSUFFICIENT_BALANCE" => {
            "Your current reseller balance is not enough to generate the requested vouchers"
        }
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = AdError::api("LINK_DOWN", "Link is dead");
        assert_eq!(err.to_string(), "api error LINK_DOWN: Link is dead");
        assert_eq!(err.api_code(), Some("LINK_DOWN"));
    }

    #[test]
    fn test_describe_known_code() {
        let err = AdError::api("MAGNET_TOO_LARGE", "too big");
        assert_eq!(err.describe_code(), Some("Magnet files are too large (max 1TB)"));
        assert_eq!(error_code_description("NOT_A_CODE"), None);
    }

    #[test]
    fn test_auth_error_classification() {
        assert!(AdError::api("AUTH_BAD_APIKEY", "bad").is_auth_error());
        assert!(AdError::InvalidApiKey.is_auth_error());
        assert!(!AdError::api("LINK_DOWN", "dead").is_auth_error());
    }

    #[test]
    fn test_not_ready_classification() {
        assert!(AdError::AttemptsExhausted { attempts: 5 }.is_not_ready());
        assert!(AdError::PollTimeout {
            elapsed: Duration::from_secs(30),
            attempts: 3
        }
        .is_not_ready());
        assert!(!AdError::NoStreamsAvailable { link: "x".into() }.is_not_ready());
        assert!(AdError::NoStreamsAvailable { link: "x".into() }.is_resolver_terminal());
        assert!(AdError::DelayedJobFailed { delayed_id: "1".into() }.is_resolver_terminal());
        assert!(!AdError::Http("reset".into()).is_resolver_terminal());
    }

    #[test]
    fn test_poll_timeout_display() {
        let err = AdError::PollTimeout {
            elapsed: Duration::from_millis(1500),
            attempts: 2,
        };
        assert_eq!(err.to_string(), "delayed link not ready after 1.5s (2 polls)");
    }
}
