use super::{format_bytes, largest_url, suggestion, total_bytes};
use crate::calculator::CarbonCalculator;
use crate::models::{DiscoveredResource, OptimizationSuggestion, SuggestionSeverity};
use scraper::Html;

pub const RENDER_BLOCKING_TITLE: &str = "Add async or defer to script tags";
pub const LARGE_BUNDLES_TITLE: &str = "Split large JavaScript bundles";
pub const THIRD_PARTY_TITLE: &str = "Review third-party scripts";

const CODE_SPLITTING_SAVINGS: f64 = 0.3;
const THIRD_PARTY_SAVINGS: f64 = 0.5;

/// 100 KiB
pub const LARGE_BUNDLE_THRESHOLD: f64 = 100.0 * 1024.0;

pub const THIRD_PARTY_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "facebook.net",
    "doubleclick.net",
    "googlesyndication.com",
    "amazon-adsystem.com",
];

pub fn analyze(
    scripts: &[&DiscoveredResource],
    _document: &Html,
    calculator: &CarbonCalculator,
) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();

    let render_blocking = scripts
        .iter()
        .filter(|s| s.attribute("async").is_none() && s.attribute("defer").is_none())
        .count();
    if render_blocking > 0 {
        // Load-order fix: no bytes saved
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::High,
            RENDER_BLOCKING_TITLE,
            format!(
                "{} scripts are render-blocking. Adding async or defer attributes can improve page load performance.",
                render_blocking
            ),
            0.0,
            None,
        ));
    }

    let large: Vec<_> = scripts
        .iter()
        .copied()
        .filter(|s| s.transfer_size_bytes > LARGE_BUNDLE_THRESHOLD)
        .collect();
    if !large.is_empty() {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::High,
            LARGE_BUNDLES_TITLE,
            format!(
                "{} scripts are larger than 100KB. Consider code splitting and lazy loading.",
                large.len()
            ),
            total_bytes(&large) * CODE_SPLITTING_SAVINGS,
            largest_url(&large),
        ));
    }

    let third_party: Vec<_> = scripts
        .iter()
        .copied()
        .filter(|s| is_third_party(&s.url))
        .collect();
    if !third_party.is_empty() {
        let size = total_bytes(&third_party);
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::Medium,
            THIRD_PARTY_TITLE,
            format!(
                "{} third-party scripts detected ({}). Consider if all are necessary.",
                third_party.len(),
                format_bytes(size)
            ),
            size * THIRD_PARTY_SAVINGS,
            None,
        ));
    }

    suggestions
}

fn is_third_party(url: &str) -> bool {
    let url = url.to_lowercase();
    THIRD_PARTY_DOMAINS.iter().any(|domain| url.contains(domain))
}
