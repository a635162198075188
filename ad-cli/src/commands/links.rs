//! Saved link commands.

use clap::Subcommand;

use ad_api::ApiClient;
use ad_core::config::AppConfig;
use ad_core::error::AdResult;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum LinksAction {
    /// List saved links.
    Saved,
    /// Save links to the account.
    Save {
        #[arg(required = true)]
        links: Vec<String>,
    },
    /// Delete saved links.
    Delete {
        #[arg(required = true)]
        links: Vec<String>,
    },
}

pub async fn run(config: &AppConfig, action: LinksAction, format: OutputFormat) -> AdResult<()> {
    let api = super::create_api_client(config)?;
    let result = dispatch(&api, action, format).await;
    api.release();
    result
}

async fn dispatch(api: &ApiClient, action: LinksAction, format: OutputFormat) -> AdResult<()> {
    match action {
        LinksAction::Saved => {
            let links = api.saved_links().await?;
            super::print_link_list(&links, "No saved links.", format)
        }
        LinksAction::Save { links } => {
            let message = api.save_links(&links).await?;
            super::print_message(&message, format)
        }
        LinksAction::Delete { links } => {
            let message = api.delete_saved_links(&links).await?;
            super::print_message(&message, format)
        }
    }
}
