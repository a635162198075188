//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "alldebrid";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default base URL of the v4 REST API (trailing slash included).
pub const DEFAULT_API_BASE_URL: &str = "https://api.alldebrid.com/v4/";

/// Default `agent` query parameter sent with every request.
pub const DEFAULT_AGENT: &str = "alldebrid-rs";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ALLDEBRID_API_KEY";

/// Default API request timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

/// Extended timeout multiplier for file uploads.
pub const EXTENDED_TIMEOUT_MULTIPLIER: u64 = 12;

/// Delayed-link polling defaults.
pub mod polling {
    /// Maximum number of status polls per link.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    /// Seconds slept between two polls.
    pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3;
    /// Wall-clock budget of the whole poll phase, in seconds.
    pub const DEFAULT_MAX_DELAY_SECS: u64 = 30;
}

/// Delayed-link status codes returned by `link/delayed`.
pub mod delayed_status {
    /// The link is still being generated.
    pub const PROCESSING: i64 = 1;
    /// The link is available.
    pub const READY: i64 = 2;
    /// Generation failed on the service side.
    pub const ERROR: i64 = 3;
}

/// Seconds between two `pin/check` calls during the pin flow.
pub const PIN_CHECK_INTERVAL_SECS: u64 = 5;

/// Upper bound on how long the pin flow waits, whatever `expires_in` the
/// service announces.
pub const MAX_PIN_WAIT_SECS: u64 = 3600;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_has_trailing_slash() {
        assert!(DEFAULT_API_BASE_URL.ends_with('/'));
    }

    #[test]
    fn test_polling_defaults() {
        assert_eq!(polling::DEFAULT_MAX_ATTEMPTS, 5);
        assert!(polling::DEFAULT_RETRY_DELAY_SECS * u64::from(polling::DEFAULT_MAX_ATTEMPTS)
            <= polling::DEFAULT_MAX_DELAY_SECS);
    }
}
