//! Magnet commands.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;

use ad_api::{ApiClient, MagnetStatus};
use ad_core::config::AppConfig;
use ad_core::error::AdResult;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum MagnetsAction {
    /// Upload magnet URIs or info hashes.
    Upload {
        #[arg(required = true)]
        magnets: Vec<String>,
    },
    /// Upload .torrent files.
    UploadFile {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the status of one magnet, or of all magnets.
    Status {
        /// Magnet id.
        id: Option<u64>,
    },
    /// Delete a magnet.
    Delete {
        /// Magnet id.
        id: u64,
    },
    /// Restart failed magnets.
    Restart {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Check whether magnets are instantly available.
    Instant {
        #[arg(required = true)]
        magnets: Vec<String>,
    },
}

pub async fn run(config: &AppConfig, action: MagnetsAction, format: OutputFormat) -> AdResult<()> {
    let api = super::create_api_client(config)?;
    let result = dispatch(&api, action, format).await;
    api.release();
    result
}

async fn dispatch(api: &ApiClient, action: MagnetsAction, format: OutputFormat) -> AdResult<()> {
    match action {
        MagnetsAction::Upload { magnets } => {
            let uploaded = api.upload_magnets(&magnets).await?;
            match format {
                OutputFormat::Json => super::print_json(&uploaded)?,
                OutputFormat::Text => {
                    for m in &uploaded {
                        match (&m.error, m.id) {
                            (Some(err), _) => println!(
                                "  {} {}: {} {}",
                                style("FAIL").red().bold(),
                                super::truncate(&m.magnet, 60),
                                err.code,
                                err.message
                            ),
                            (None, id) => println!(
                                "  {} {} (id {}){}",
                                style("OK").green().bold(),
                                m.name.as_deref().unwrap_or(&m.magnet),
                                id.map(|i| i.to_string()).unwrap_or_else(|| "?".into()),
                                if m.ready { ", ready" } else { "" }
                            ),
                        }
                    }
                }
            }
        }
        MagnetsAction::UploadFile { files } => {
            let pb = match format {
                OutputFormat::Text => Some(super::spinner(format!("Uploading {} file(s)...", files.len()))),
                OutputFormat::Json => None,
            };
            let uploaded = api.upload_torrent_files(&files).await;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            let uploaded = uploaded?;

            match format {
                OutputFormat::Json => super::print_json(&uploaded)?,
                OutputFormat::Text => {
                    for f in &uploaded {
                        match &f.error {
                            Some(err) => println!(
                                "  {} {}: {} {}",
                                style("FAIL").red().bold(),
                                f.file,
                                err.code,
                                err.message
                            ),
                            None => println!(
                                "  {} {} (id {})",
                                style("OK").green().bold(),
                                f.name.as_deref().unwrap_or(&f.file),
                                f.id.map(|i| i.to_string()).unwrap_or_else(|| "?".into())
                            ),
                        }
                    }
                }
            }
        }
        MagnetsAction::Status { id: Some(id) } => {
            let status = api.magnet_status(id).await?;
            match format {
                OutputFormat::Json => super::print_json(&status)?,
                OutputFormat::Text => print_status_detail(&status),
            }
        }
        MagnetsAction::Status { id: None } => {
            let magnets = api.magnets().await?;
            match format {
                OutputFormat::Json => super::print_json(&magnets)?,
                OutputFormat::Text => {
                    if magnets.is_empty() {
                        println!("  {}", style("No magnets.").dim());
                        return Ok(());
                    }
                    let mut table = super::new_table(&["ID", "Name", "Size", "Status", "Progress"]);
                    for m in &magnets {
                        table.add_row(vec![
                            m.id.to_string(),
                            super::truncate(&m.filename, 50),
                            super::format_bytes(m.size),
                            m.status.clone(),
                            format!("{:.0}%", m.progress()),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        MagnetsAction::Delete { id } => {
            let message = api.delete_magnet(id).await?;
            super::print_message(&message, format)?;
        }
        MagnetsAction::Restart { ids } => {
            let result = api.restart_magnets(&ids).await?;
            match format {
                OutputFormat::Json => super::print_json(&result)?,
                OutputFormat::Text => {
                    if let Some(ref message) = result.message {
                        println!("  {} {message}", style("OK").green().bold());
                    }
                    for m in &result.magnets {
                        match &m.error {
                            Some(err) => println!("  {} {}: {}", style("FAIL").red().bold(), m.magnet, err.message),
                            None => println!(
                                "  {} {}: {}",
                                style("OK").green().bold(),
                                m.magnet,
                                m.message.as_deref().unwrap_or("restarted")
                            ),
                        }
                    }
                }
            }
        }
        MagnetsAction::Instant { magnets } => {
            let availability = api.check_magnet_instant(&magnets).await?;
            match format {
                OutputFormat::Json => super::print_json(&availability)?,
                OutputFormat::Text => {
                    let mut table = super::new_table(&["Magnet", "Instant"]);
                    for a in &availability {
                        let instant = match (&a.error, a.instant) {
                            (Some(err), _) => err.code.clone(),
                            (None, true) => "yes".into(),
                            (None, false) => "no".into(),
                        };
                        table.add_row(vec![super::truncate(&a.magnet, 60), instant]);
                    }
                    println!("{table}");
                }
            }
        }
    }

    Ok(())
}

fn print_status_detail(m: &MagnetStatus) {
    println!("{}", style(&m.filename).bold().underlined());
    println!("  ID:        {}", m.id);
    println!("  Status:    {} ({})", m.status, m.status_code);
    println!("  Size:      {}", super::format_bytes(m.size));
    println!("  Progress:  {:.1}%", m.progress());
    if !m.is_ready() && !m.is_error() {
        println!("  Speed:     {}/s", super::format_bytes(m.download_speed));
        println!("  Seeders:   {}", m.seeders);
    }
    if !m.links.is_empty() {
        println!();
        let mut table = super::new_table(&["File", "Size", "Link"]);
        for l in &m.links {
            table.add_row(vec![
                super::truncate(&l.filename, 50),
                super::format_bytes(l.size),
                l.link.clone(),
            ]);
        }
        println!("{table}");
    }
}
