//! Ping command - check that the API answers.

use console::style;

use ad_core::config::AppConfig;
use ad_core::error::AdResult;
use crate::OutputFormat;

pub async fn run(config: &AppConfig, format: OutputFormat) -> AdResult<()> {
    let api = super::create_api_client(config)?;
    let result = api.health_check().await;
    api.release();

    match format {
        OutputFormat::Json => {
            let json = match &result {
                Ok(latency) => serde_json::json!({
                    "reachable": true,
                    "base_url": api.base_url(),
                    "latency_ms": latency.as_millis(),
                }),
                Err(e) => serde_json::json!({
                    "reachable": false,
                    "base_url": api.base_url(),
                    "error": e.to_string(),
                }),
            };
            super::print_json(&json)?;
        }
        OutputFormat::Text => match &result {
            Ok(latency) => println!(
                "  {} {} ({}ms)",
                style("OK").green().bold(),
                api.base_url(),
                latency.as_millis()
            ),
            Err(e) => println!(
                "  {} {}: {}",
                style("FAIL").red().bold(),
                api.base_url(),
                super::describe_error(e)
            ),
        },
    }

    result.map(|_| ())
}
