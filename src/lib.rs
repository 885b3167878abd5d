pub mod analyzers;
pub mod calculator;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod http_client;
pub mod models;
pub mod page_analyzer;
pub mod reporter;

use anyhow::{Context, Result};
use cli::Cli;
use colored::*;
use config::Config;
use page_analyzer::PageAnalyzer;
use reporter::Reporter;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub async fn run(args: Cli) -> Result<()> {
    // Validate URL
    if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
        anyhow::bail!("URL must start with http:// or https://");
    }
    url::Url::parse(&args.url).with_context(|| format!("Invalid URL: {}", args.url))?;

    let file_config = Config::load(args.config.as_deref())?;
    let args = file_config.merge_with_cli(&args);
    let tracker_config = file_config.tracker_config(&args);
    let text_output = args.output != "json";

    if text_output {
        println!(
            "{}",
            "Carbonscout - Page Carbon Footprint".bright_cyan().bold()
        );
        println!("{}", "=".repeat(50).bright_blue());
        println!();
        println!("{} {}", "Analyzing:".bright_white().bold(), args.url);
        println!(
            "{} {} g CO₂/kWh{}",
            "Grid intensity:".bright_white().bold(),
            tracker_config.grid_intensity,
            if tracker_config.green_hosting {
                " (green hosting)"
            } else {
                ""
            }
        );
        println!();
    }

    let mut analyzer = PageAnalyzer::new(&tracker_config)?;
    if text_output {
        analyzer.enable_progress_bar();
    }

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling analysis");
                cancel.cancel();
            }
        })
    };

    let content_id = args.content_id.unwrap_or_else(Uuid::new_v4);
    let report = Reporter::generate_report(&analyzer, &args.url, content_id, &cancel).await;
    ctrl_c.abort();
    let report = report?;

    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        _ => {
            Reporter::print_text_report(&report);
        }
    }

    if let Some(filename) = args.save {
        Reporter::save_json_report(&report, &filename)?;
    }

    Ok(())
}
