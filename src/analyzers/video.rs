use super::{format_bytes, suggestion, total_bytes};
use crate::calculator::CarbonCalculator;
use crate::models::{DiscoveredResource, OptimizationSuggestion, SuggestionSeverity};
use scraper::Html;

pub const AUTOPLAY_TITLE: &str = "Remove autoplay from videos";
pub const PRELOAD_TITLE: &str = "Change video preload to metadata or none";
pub const VIDEO_SIZE_TITLE: &str = "Consider video file size optimization";

const AUTOPLAY_SAVINGS: f64 = 0.8;
const PRELOAD_SAVINGS: f64 = 0.7;
const VIDEO_SIZE_SAVINGS: f64 = 0.3;

/// 1 MiB, inclusive
pub const VIDEO_SIZE_THRESHOLD: f64 = 1024.0 * 1024.0;

pub fn analyze(
    videos: &[&DiscoveredResource],
    _document: &Html,
    calculator: &CarbonCalculator,
) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();

    let autoplay: Vec<_> = videos
        .iter()
        .copied()
        .filter(|v| v.attribute("autoplay").is_some())
        .collect();
    if let Some(first) = autoplay.first() {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::Critical,
            AUTOPLAY_TITLE,
            format!(
                "{} videos are set to autoplay, forcing all users to download them. This significantly increases carbon footprint.",
                autoplay.len()
            ),
            total_bytes(&autoplay) * AUTOPLAY_SAVINGS,
            Some(first.url.clone()),
        ));
    }

    let preload_auto: Vec<_> = videos
        .iter()
        .copied()
        .filter(|v| v.attribute("preload") == Some("auto"))
        .collect();
    if !preload_auto.is_empty() {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::High,
            PRELOAD_TITLE,
            format!(
                "{} videos use preload=\"auto\". Use preload=\"metadata\" or preload=\"none\" to reduce initial page load.",
                preload_auto.len()
            ),
            total_bytes(&preload_auto) * PRELOAD_SAVINGS,
            None,
        ));
    }

    let total = total_bytes(videos);
    if total >= VIDEO_SIZE_THRESHOLD {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::Medium,
            VIDEO_SIZE_TITLE,
            format!(
                "Total video content: {}. Video is carbon-intensive. Consider compression, shorter clips, or poster images with click-to-play.",
                format_bytes(total)
            ),
            total * VIDEO_SIZE_SAVINGS,
            None,
        ));
    }

    suggestions
}
