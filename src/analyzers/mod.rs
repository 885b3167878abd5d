//! Heuristic rules that turn the discovered resources of one category into
//! optimization suggestions.
//!
//! The savings percentages are fixed estimates, not measurements.

pub mod image;
pub mod script;
pub mod video;

use crate::calculator::CarbonCalculator;
use crate::models::{AssetCategory, DiscoveredResource, OptimizationSuggestion, SuggestionSeverity};
use scraper::Html;

/// The closed set of category analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetAnalyzer {
    Image,
    Script,
    Video,
}

impl AssetAnalyzer {
    /// Every analyzer, in the order their suggestions are concatenated
    pub const ALL: [AssetAnalyzer; 3] = [
        AssetAnalyzer::Image,
        AssetAnalyzer::Script,
        AssetAnalyzer::Video,
    ];

    pub fn category(&self) -> AssetCategory {
        match self {
            AssetAnalyzer::Image => AssetCategory::Images,
            AssetAnalyzer::Script => AssetCategory::JavaScript,
            AssetAnalyzer::Video => AssetCategory::Video,
        }
    }

    pub fn analyze(
        &self,
        resources: &[DiscoveredResource],
        document: &Html,
        calculator: &CarbonCalculator,
    ) -> Vec<OptimizationSuggestion> {
        let own: Vec<&DiscoveredResource> = resources
            .iter()
            .filter(|r| r.category == self.category())
            .collect();

        if own.is_empty() {
            return vec![];
        }

        match self {
            AssetAnalyzer::Image => image::analyze(&own, document, calculator),
            AssetAnalyzer::Script => script::analyze(&own, document, calculator),
            AssetAnalyzer::Video => video::analyze(&own, document, calculator),
        }
    }
}

/// Runs every analyzer and concatenates their suggestions without de-duplication
pub fn analyze_all(
    resources: &[DiscoveredResource],
    document: &Html,
    calculator: &CarbonCalculator,
) -> Vec<OptimizationSuggestion> {
    AssetAnalyzer::ALL
        .iter()
        .flat_map(|analyzer| analyzer.analyze(resources, document, calculator))
        .collect()
}

/// Human readable size used in suggestion descriptions
pub fn format_bytes(bytes: f64) -> String {
    if bytes < 1024.0 {
        format!("{:.0}B", bytes)
    } else if bytes < 1024.0 * 1024.0 {
        format!("{:.1}KB", bytes / 1024.0)
    } else {
        format!("{:.1}MB", bytes / (1024.0 * 1024.0))
    }
}

pub(crate) fn total_bytes(resources: &[&DiscoveredResource]) -> f64 {
    resources.iter().map(|r| r.transfer_size_bytes).sum()
}

/// URL of the largest resource; the earliest one wins a tie
pub(crate) fn largest_url(resources: &[&DiscoveredResource]) -> Option<String> {
    resources
        .iter()
        .copied()
        .fold(None::<&DiscoveredResource>, |largest, r| match largest {
            Some(l) if l.transfer_size_bytes >= r.transfer_size_bytes => Some(l),
            _ => Some(r),
        })
        .map(|r| r.url.clone())
}

pub(crate) fn suggestion(
    calculator: &CarbonCalculator,
    severity: SuggestionSeverity,
    title: &str,
    description: String,
    savings_bytes: f64,
    affected_asset_url: Option<String>,
) -> OptimizationSuggestion {
    let potential_co2_savings_grams = if savings_bytes > 0.0 {
        calculator.co2_grams(savings_bytes, false)
    } else {
        0.0
    };

    OptimizationSuggestion {
        severity,
        title: title.to_string(),
        description,
        potential_savings_bytes: savings_bytes,
        potential_co2_savings_grams,
        affected_asset_url,
    }
}
