//! Unlock command - unlock a hoster link and list its streams.

use console::style;

use ad_core::config::AppConfig;
use ad_core::error::AdResult;
use crate::OutputFormat;

pub async fn run(
    config: &AppConfig,
    link: &str,
    password: Option<&str>,
    format: OutputFormat,
) -> AdResult<()> {
    let api = super::create_api_client(config)?;
    let unlocked = api.unlock_link(link, password).await;
    api.release();
    let unlocked = unlocked?;

    match format {
        OutputFormat::Json => super::print_json(&unlocked)?,
        OutputFormat::Text => {
            println!(
                "  File:  {} ({})",
                unlocked.filename.as_deref().unwrap_or("unknown"),
                unlocked.filesize.map(super::format_bytes).unwrap_or_else(|| "?".into())
            );
            if let Some(ref host) = unlocked.host {
                println!("  Host:  {host}");
            }
            match unlocked.link.as_deref().filter(|l| !l.is_empty()) {
                Some(url) => println!("  Link:  {}", style(url).green()),
                None => println!(
                    "  Link:  {}",
                    style("none (stream only, use `alldebrid stream`)").yellow()
                ),
            }
            if let Some(ref delayed) = unlocked.delayed {
                println!("  Delayed job: {delayed}");
            }

            if !unlocked.streams.is_empty() {
                println!();
                let mut table = super::new_table(&["Stream", "Quality", "Ext", "Size"]);
                for s in &unlocked.streams {
                    table.add_row(vec![
                        s.id.clone(),
                        s.label(),
                        s.ext.clone().unwrap_or_default(),
                        s.filesize.map(super::format_bytes).unwrap_or_default(),
                    ]);
                }
                println!("{table}");
            }
        }
    }

    Ok(())
}
