//! Auth command - obtain an API key through the pin flow.
//!
//! The user opens the activation URL, enters the pin, and the command polls
//! `pin/check` until the pin is activated or expires.

use std::path::Path;
use std::time::Duration;

use console::style;
use dialoguer::Confirm;
use tokio::time::Instant;
use tracing::{debug, info};

use ad_core::config::AppConfig;
use ad_core::constants::{MAX_PIN_WAIT_SECS, PIN_CHECK_INTERVAL_SECS};
use ad_core::error::{AdError, AdResult};
use crate::OutputFormat;

pub async fn run(
    mut config: AppConfig,
    config_path: &Path,
    save: bool,
    format: OutputFormat,
) -> AdResult<()> {
    let api = super::create_api_client(&config)?;
    let pin = api.get_pin().await?;
    let deadline = pin_deadline(Instant::now(), pin.expires_in);

    if let OutputFormat::Text = format {
        println!("  Open {} and enter the pin {}", style(&pin.user_url).cyan(), style(&pin.pin).bold());
        println!("  The pin expires in {} seconds.", pin.expires_in);
    }

    let pb = match format {
        OutputFormat::Text => Some(super::spinner("Waiting for activation...")),
        OutputFormat::Json => None,
    };

    let result = wait_for_key(&api, &pin, deadline).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    api.release();
    let api_key = result?;
    info!("pin {} activated", pin.pin);

    let save = save
        || (matches!(format, OutputFormat::Text)
            && console::user_attended()
            && Confirm::new()
                .with_prompt(format!("Save the API key to {}?", config_path.display()))
                .default(true)
                .interact()
                .map_err(|e| AdError::Internal(e.to_string()))?);

    if save {
        config.api.api_key = api_key.clone();
        config.save_to_file(config_path)?;
    }

    match format {
        OutputFormat::Json => super::print_json(&serde_json::json!({
            "apikey": api_key,
            "saved": save,
            "config": config_path.display().to_string(),
        }))?,
        OutputFormat::Text => {
            println!("  {} API key: {}", style("OK").green().bold(), api_key);
            if save {
                println!("  {} Config saved to {}", style("OK").green(), config_path.display());
            }
        }
    }

    Ok(())
}

/// When to give up on the pin. The announced lifetime is capped at
/// `MAX_PIN_WAIT_SECS`.
fn pin_deadline(now: Instant, expires_in: u64) -> Instant {
    let wait = Duration::from_secs(expires_in.min(MAX_PIN_WAIT_SECS));
    now.checked_add(wait).unwrap_or(now)
}

async fn wait_for_key(
    api: &ad_api::ApiClient,
    pin: &ad_api::PinInfo,
    deadline: Instant,
) -> AdResult<String> {
    loop {
        tokio::time::sleep(Duration::from_secs(PIN_CHECK_INTERVAL_SECS)).await;
        let status = api.check_pin_info(pin).await?;
        debug!("pin {} activated={} expires_in={}", pin.pin, status.activated, status.expires_in);

        if status.activated {
            return status
                .apikey
                .filter(|k| !k.is_empty())
                .ok_or_else(|| AdError::Serialization("activated pin without api key".into()));
        }
        if Instant::now() >= deadline {
            return Err(AdError::api("PIN_EXPIRED", "The pin has expired"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_deadline_follows_expires_in() {
        let now = Instant::now();
        assert_eq!(pin_deadline(now, 600), now + Duration::from_secs(600));
        assert_eq!(pin_deadline(now, 0), now);
    }

    #[test]
    fn test_pin_deadline_caps_huge_expiry() {
        let now = Instant::now();
        let cap = now + Duration::from_secs(MAX_PIN_WAIT_SECS);
        assert_eq!(pin_deadline(now, u64::MAX), cap);
        assert_eq!(pin_deadline(now, MAX_PIN_WAIT_SECS + 1), cap);
    }
}
