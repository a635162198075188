//! Stream command - resolve links into direct stream URLs.

use std::time::Duration;

use console::style;

use ad_core::config::AppConfig;
use ad_core::error::{AdError, AdResult};
use ad_resolver::{PollPolicy, Resolver};
use crate::OutputFormat;

/// Poll budget overrides given on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyOverrides {
    pub max_attempts: Option<u32>,
    pub retry_delay: Option<u64>,
    pub max_delay: Option<u64>,
}

impl PolicyOverrides {
    fn apply(self, mut policy: PollPolicy) -> PollPolicy {
        if let Some(n) = self.max_attempts {
            policy.max_attempts = n;
        }
        if let Some(secs) = self.retry_delay {
            policy.retry_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = self.max_delay {
            policy.max_delay = Duration::from_secs(secs);
        }
        policy
    }
}

pub async fn run(
    config: &AppConfig,
    links: &[String],
    overrides: PolicyOverrides,
    format: OutputFormat,
) -> AdResult<()> {
    let policy = overrides.apply(PollPolicy::from(&config.resolver));
    let resolver = Resolver::new(super::create_api_client(config)?, policy)?;

    let pb = match format {
        OutputFormat::Text => Some(super::spinner(format!("Resolving {} link(s)...", links.len()))),
        OutputFormat::Json => None,
    };
    let outcomes = resolver.resolve_many(links).await?.into_vec();
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let failed = outcomes.iter().filter(|o| o.is_err()).count();

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = links
                .iter()
                .zip(&outcomes)
                .map(|(link, outcome)| match outcome {
                    Ok(url) => serde_json::json!({"link": link, "url": url}),
                    Err(e) => serde_json::json!({
                        "link": link,
                        "error": e.to_string(),
                        "code": e.api_code(),
                        "transport_error": !e.is_resolver_terminal(),
                    }),
                })
                .collect();
            super::print_json(&json)?;
        }
        OutputFormat::Text => {
            for (link, outcome) in links.iter().zip(&outcomes) {
                match outcome {
                    Ok(url) => println!("  {} {}", style("OK").green().bold(), url),
                    Err(e) => println!(
                        "  {} {}: {}",
                        style("FAIL").red().bold(),
                        link,
                        super::describe_error(e)
                    ),
                }
            }
        }
    }

    if failed > 0 {
        return Err(AdError::Internal(format!(
            "{failed} of {} link(s) could not be resolved",
            outcomes.len()
        )));
    }
    Ok(())
}
