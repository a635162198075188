//! Recent link history commands.

use clap::Subcommand;
use dialoguer::Confirm;

use ad_core::config::AppConfig;
use ad_core::error::{AdError, AdResult};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recently unlocked links.
    List,
    /// Clear the history.
    Purge {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(config: &AppConfig, action: HistoryAction, format: OutputFormat) -> AdResult<()> {
    match action {
        HistoryAction::List => {
            let api = super::create_api_client(config)?;
            let links = api.recent_links().await;
            api.release();
            super::print_link_list(&links?, "History is empty.", format)
        }
        HistoryAction::Purge { yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete the whole link history?")
                    .default(false)
                    .interact()
                    .map_err(|e| AdError::Internal(e.to_string()))?;
                if !confirmed {
                    println!("  Cancelled.");
                    return Ok(());
                }
            }
            let api = super::create_api_client(config)?;
            let message = api.purge_recent_links().await;
            api.release();
            super::print_message(&message?, format)
        }
    }
}
