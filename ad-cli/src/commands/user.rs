//! User command - show account details.

use console::style;

use ad_core::config::AppConfig;
use ad_core::error::AdResult;
use crate::OutputFormat;

pub async fn run(config: &AppConfig, format: OutputFormat) -> AdResult<()> {
    let api = super::create_api_client(config)?;
    let user = api.user().await;
    api.release();
    let user = user?;

    match format {
        OutputFormat::Json => super::print_json(&user)?,
        OutputFormat::Text => {
            println!("{}", style("Account").bold().underlined());
            println!("  Username:  {}", user.username);
            if let Some(ref email) = user.email {
                println!("  Email:     {email}");
            }
            println!(
                "  Premium:   {}",
                match user.premium_end() {
                    Some(end) if user.is_premium => {
                        format!("{} until {}", style("yes").green(), end.format("%Y-%m-%d"))
                    }
                    _ => style("no").yellow().to_string(),
                }
            );
            if user.is_trial {
                println!("  Trial:     yes");
            }
            println!("  Fidelity:  {} points", user.fidelity_points);

            if !user.limited_hosters_quotas.is_empty() {
                println!();
                let mut table = super::new_table(&["Host", "Quota left"]);
                let mut quotas: Vec<_> = user.limited_hosters_quotas.iter().collect();
                quotas.sort_by(|a, b| a.0.cmp(b.0));
                for (host, left) in quotas {
                    table.add_row(vec![host.clone(), left.to_string()]);
                }
                println!("{table}");
            }
        }
    }

    Ok(())
}
