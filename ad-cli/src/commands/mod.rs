//! CLI command implementations.

pub mod auth;
pub mod history;
pub mod links;
pub mod magnets;
pub mod ping;
pub mod stream;
pub mod unlock;
pub mod user;

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use ad_api::{ApiClient, SavedLink};
use ad_core::config::AppConfig;
use ad_core::error::{AdError, AdResult};
use crate::OutputFormat;

/// Helper to create an API client from config.
pub fn create_api_client(config: &AppConfig) -> AdResult<ApiClient> {
    ApiClient::new(&config.api)
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> AdResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A steady spinner on stderr.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.into());
    pb
}

/// Describe an error for terminal output, including the meaning of the
/// service error code when known.
pub fn describe_error(err: &AdError) -> String {
    let mut text = match err.describe_code() {
        Some(meaning) => format!("{err} ({meaning})"),
        None => err.to_string(),
    };
    if err.is_auth_error() {
        text.push_str("; run `alldebrid auth` to obtain a new API key");
    } else if err.is_not_ready() {
        text.push_str("; the link may still be generating, try again later or raise --max-delay");
    }
    text
}

/// Print a confirmation message returned by the service.
pub fn print_message(message: &str, format: OutputFormat) -> AdResult<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "message": message })),
        OutputFormat::Text => {
            println!("  {} {message}", style("OK").green().bold());
            Ok(())
        }
    }
}

/// Print a list of saved or recent links.
pub fn print_link_list(links: &[SavedLink], empty: &str, format: OutputFormat) -> AdResult<()> {
    match format {
        OutputFormat::Json => print_json(links),
        OutputFormat::Text => {
            if links.is_empty() {
                println!("  {}", style(empty).dim());
                return Ok(());
            }
            let mut table = new_table(&["Filename", "Size", "Date", "Link"]);
            for l in links {
                let date = l
                    .saved_at()
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                table.add_row(vec![
                    truncate(&l.filename, 40),
                    format_bytes(l.size),
                    date,
                    l.link.clone(),
                ]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

/// Table with the CLI's common look.
pub fn new_table(header: &[&str]) -> comfy_table::Table {
    use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Truncate a string to at most `max_len` characters, appending an ellipsis
/// if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("épisode-final.mkv", 8), "épiso...");
    }

    #[test]
    fn test_describe_error_adds_code_meaning() {
        let err = AdError::api("LINK_DOWN", "dead");
        assert!(describe_error(&err).starts_with("api error LINK_DOWN: dead ("));
        assert!(describe_error(&AdError::InvalidApiKey).contains("alldebrid auth"));
        assert!(describe_error(&AdError::AttemptsExhausted { attempts: 5 }).contains("--max-delay"));
        assert_eq!(describe_error(&AdError::Http("reset".into())), "http error: reset");
    }
}
