//! Account endpoints: ping, pin authentication flow, user info.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ad_core::error::{AdError, AdResult};
use crate::client::ApiClient;
use crate::routes::Endpoint;

#[derive(Debug, Deserialize)]
struct PingData {
    #[serde(default)]
    ping: String,
}

/// Pin returned by `pin/get`. The user enters `pin` at `user_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinInfo {
    pub pin: String,
    pub check: String,
    /// Seconds until the pin expires.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub user_url: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub check_url: Option<String>,
}

/// State of a pin returned by `pin/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinStatus {
    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub expires_in: u64,
    /// Present once the pin has been activated.
    #[serde(default)]
    pub apikey: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: UserInfo,
}

/// Account details returned by `user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub email: Option<String>,
    #[serde(rename = "isPremium", default)]
    pub is_premium: bool,
    #[serde(rename = "isSubscribed", default)]
    pub is_subscribed: bool,
    #[serde(rename = "isTrial", default)]
    pub is_trial: bool,
    /// Unix timestamp of the premium end date (0 when not premium).
    #[serde(rename = "premiumUntil", default)]
    pub premium_until: i64,
    pub lang: Option<String>,
    #[serde(rename = "fidelityPoints", default)]
    pub fidelity_points: i64,
    #[serde(rename = "limitedHostersQuotas", default)]
    pub limited_hosters_quotas: HashMap<String, i64>,
}

impl UserInfo {
    /// Premium end date, if the account is premium.
    pub fn premium_end(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        if self.premium_until <= 0 {
            return None;
        }
        chrono::DateTime::from_timestamp(self.premium_until, 0)
    }
}

impl ApiClient {
    /// Ping the API. Returns true if it answers "pong".
    pub async fn ping(&self) -> AdResult<bool> {
        let data: PingData = self.call(Endpoint::Ping, &[]).await?;
        Ok(data.ping == "pong")
    }

    /// Start the pin flow. Does not require an API key.
    pub async fn get_pin(&self) -> AdResult<PinInfo> {
        self.call(Endpoint::PinGet, &[]).await
    }

    /// Check whether a pin has been activated by the user.
    pub async fn check_pin(&self, check: &str, pin: &str) -> AdResult<PinStatus> {
        if check.trim().is_empty() || pin.trim().is_empty() {
            return Err(AdError::InvalidInput("both check and pin must be provided".into()));
        }
        let params = vec![
            ("check".to_string(), check.to_string()),
            ("pin".to_string(), pin.to_string()),
        ];
        self.call(Endpoint::PinCheck, &params).await
    }

    /// Check a pin using the response of [`ApiClient::get_pin`].
    pub async fn check_pin_info(&self, info: &PinInfo) -> AdResult<PinStatus> {
        self.check_pin(&info.check, &info.pin).await
    }

    /// Get account details.
    pub async fn user(&self) -> AdResult<UserInfo> {
        let data: UserData = self.call(Endpoint::User, &[]).await?;
        Ok(data.user)
    }
}
