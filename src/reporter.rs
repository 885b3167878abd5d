use crate::analyzers::format_bytes;
use crate::calculator::CarbonCalculator;
use crate::error::{CarbonError, Result};
use crate::models::{
    AssetBreakdown, AssetCategory, DiscoveredResource, GreenScore, OptimizationSuggestion,
    PageAnalysisResult, PageCarbonReport, SuggestionSeverity,
};
use crate::page_analyzer::PageAnalyzer;
use colored::*;
use std::cmp::Ordering;
use std::fs::File;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub struct Reporter;

impl Reporter {
    /// Analyzes `page_url` and turns the result into a report.
    ///
    /// A failed analysis is an error here, so callers never confuse
    /// "no data" with a zero footprint.
    pub async fn generate_report(
        analyzer: &PageAnalyzer,
        page_url: &str,
        content_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<PageCarbonReport> {
        tracing::info!(url = %page_url, content_id = %content_id, "Generating carbon report");

        let analysis = analyzer.analyze_page(page_url, cancel).await;
        Self::assemble_report(&analysis, content_id, analyzer.calculator())
    }

    pub fn assemble_report(
        analysis: &PageAnalysisResult,
        content_id: Uuid,
        calculator: &CarbonCalculator,
    ) -> Result<PageCarbonReport> {
        if !analysis.success {
            return Err(CarbonError::AnalysisFailed(
                analysis
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let total = analysis.total_transfer_size_bytes;
        let co2_grams = calculator.co2_grams(total, false);
        let score = calculator.green_score(co2_grams);

        let report = PageCarbonReport {
            content_id,
            page_url: analysis.page_url.clone(),
            analyzed_at: analysis.analyzed_at,
            total_transfer_size_bytes: total,
            estimated_co2_grams: co2_grams,
            returning_visit_co2_grams: calculator.co2_grams(total, true),
            score,
            resource_count: analysis.resources.len(),
            assets: Self::asset_breakdowns(&analysis.resources, total, calculator),
            suggestions: Self::sort_suggestions(analysis.suggestions.clone()),
        };

        tracing::info!(
            url = %report.page_url,
            score = %score,
            co2_grams = co2_grams,
            "Report generated"
        );

        Ok(report)
    }

    /// One entry per category present, largest first; categories keep their
    /// discovery order on equal sizes. Empty when the page total is zero.
    pub fn asset_breakdowns(
        resources: &[DiscoveredResource],
        total_bytes: f64,
        calculator: &CarbonCalculator,
    ) -> Vec<AssetBreakdown> {
        if total_bytes <= 0.0 {
            return vec![];
        }

        let mut groups: Vec<(AssetCategory, f64, usize)> = Vec::new();
        for resource in resources {
            match groups
                .iter_mut()
                .find(|(category, _, _)| *category == resource.category)
            {
                Some(group) => {
                    group.1 += resource.transfer_size_bytes;
                    group.2 += 1;
                }
                None => groups.push((resource.category, resource.transfer_size_bytes, 1)),
            }
        }

        let mut breakdowns: Vec<AssetBreakdown> = groups
            .into_iter()
            .map(|(category, bytes, count)| AssetBreakdown {
                category,
                transfer_size_bytes: bytes,
                percentage: bytes / total_bytes * 100.0,
                estimated_co2_grams: calculator.category_co2_grams(bytes),
                resource_count: count,
            })
            .collect();

        breakdowns.sort_by(|a, b| {
            b.transfer_size_bytes
                .partial_cmp(&a.transfer_size_bytes)
                .unwrap_or(Ordering::Equal)
        });

        breakdowns
    }

    /// Descending potential CO₂ savings; ties keep their order
    pub fn sort_suggestions(
        mut suggestions: Vec<OptimizationSuggestion>,
    ) -> Vec<OptimizationSuggestion> {
        suggestions.sort_by(|a, b| {
            b.potential_co2_savings_grams
                .partial_cmp(&a.potential_co2_savings_grams)
                .unwrap_or(Ordering::Equal)
        });
        suggestions
    }

    pub fn print_text_report(report: &PageCarbonReport) {
        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "Carbonscout - Page Carbon Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();

        println!("{}: {}", "Page URL".bright_white().bold(), report.page_url);
        println!("{}: {}", "Content ID".bright_white().bold(), report.content_id);
        println!(
            "{}: {}",
            "Analyzed At".bright_white().bold(),
            report.analyzed_at.to_rfc3339()
        );
        println!();

        println!("{}", "Summary".bright_yellow().bold().underline());
        println!("  Green Score:          {}", colored_score(report.score));
        println!(
            "  CO₂ per view:         {}",
            format!("{:.3} g", report.estimated_co2_grams).bright_green()
        );
        println!(
            "  CO₂ returning visit:  {}",
            format!("{:.3} g", report.returning_visit_co2_grams).bright_green()
        );
        println!(
            "  Total Transfer Size:  {}",
            format_bytes(report.total_transfer_size_bytes).bright_green()
        );
        println!(
            "  Resources:            {}",
            report.resource_count.to_string().bright_green()
        );
        println!();

        if !report.assets.is_empty() {
            println!("{}", "Asset Breakdown".bright_yellow().bold().underline());
            for asset in &report.assets {
                println!(
                    "  {:<12} {:>10} {:>6.1}% {:>9.3} g  ({} resources)",
                    asset.category.to_string().bright_white(),
                    format_bytes(asset.transfer_size_bytes),
                    asset.percentage,
                    asset.estimated_co2_grams,
                    asset.resource_count
                );
            }
            println!();
        }

        if report.suggestions.is_empty() {
            println!("{}", "No optimization suggestions found!".bright_green());
        } else {
            println!("{}", "Suggestions".bright_yellow().bold().underline());
            for suggestion in &report.suggestions {
                println!();
                println!(
                    "  {} {}",
                    colored_severity(suggestion.severity),
                    suggestion.title.bright_white().bold()
                );
                println!("    {}", suggestion.description);
                if suggestion.potential_savings_bytes > 0.0 {
                    println!(
                        "    Potential savings: {} ({:.3} g CO₂)",
                        format_bytes(suggestion.potential_savings_bytes),
                        suggestion.potential_co2_savings_grams
                    );
                }
                if let Some(url) = &suggestion.affected_asset_url {
                    println!("    Affected asset: {}", url.dimmed());
                }
            }
        }

        println!();
        println!("{}", "=".repeat(80).bright_blue());
    }

    pub fn save_json_report(report: &PageCarbonReport, filename: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(filename)?;
        file.write_all(json.as_bytes())?;
        // stderr, so `--output json` stays parseable on stdout
        eprintln!(
            "\n{} {}",
            "Report saved to:".bright_green().bold(),
            filename
        );
        Ok(())
    }
}

fn colored_score(score: GreenScore) -> ColoredString {
    let grade = score.to_string().bold();
    match score {
        GreenScore::A | GreenScore::B => grade.bright_green(),
        GreenScore::C => grade.yellow(),
        GreenScore::D | GreenScore::F => grade.bright_red(),
    }
}

fn colored_severity(severity: SuggestionSeverity) -> ColoredString {
    let label = format!("[{}]", severity);
    match severity {
        SuggestionSeverity::Critical => label.bright_red().bold(),
        SuggestionSeverity::High => label.red(),
        SuggestionSeverity::Medium => label.yellow(),
        SuggestionSeverity::Low => label.bright_cyan(),
    }
}
