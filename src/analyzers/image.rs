use super::{largest_url, suggestion, total_bytes};
use crate::calculator::CarbonCalculator;
use crate::models::{DiscoveredResource, OptimizationSuggestion, SuggestionSeverity};
use scraper::Html;

pub const LAZY_LOADING_TITLE: &str = "Enable lazy loading for images";
pub const RESPONSIVE_IMAGES_TITLE: &str = "Use responsive images with srcset";
pub const MODERN_FORMATS_TITLE: &str = "Convert images to modern formats (WebP/AVIF)";
pub const LARGE_IMAGES_TITLE: &str = "Optimize large images";

const LAZY_LOADING_SAVINGS: f64 = 0.5;
const RESPONSIVE_SAVINGS: f64 = 0.3;
const MODERN_FORMAT_SAVINGS: f64 = 0.4;
const LARGE_IMAGE_SAVINGS: f64 = 0.5;

/// 200 KiB
pub const LARGE_IMAGE_THRESHOLD: f64 = 200.0 * 1024.0;

const LEGACY_EXTENSIONS: &[&str] = &[".jpeg", ".jpg", ".png", ".gif"];

pub fn analyze(
    images: &[&DiscoveredResource],
    _document: &Html,
    calculator: &CarbonCalculator,
) -> Vec<OptimizationSuggestion> {
    let mut suggestions = Vec::new();

    let without_lazy: Vec<_> = images
        .iter()
        .copied()
        .filter(|img| img.attribute("loading").is_none())
        .collect();
    if !without_lazy.is_empty() {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::Medium,
            LAZY_LOADING_TITLE,
            format!(
                "{} images found without loading=\"lazy\" attribute. Lazy loading can defer loading of off-screen images.",
                without_lazy.len()
            ),
            total_bytes(&without_lazy) * LAZY_LOADING_SAVINGS,
            None,
        ));
    }

    let without_srcset: Vec<_> = images
        .iter()
        .copied()
        .filter(|img| img.attribute("srcset").is_none())
        .collect();
    if !without_srcset.is_empty() {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::Medium,
            RESPONSIVE_IMAGES_TITLE,
            format!(
                "{} images found without srcset attribute. Responsive images can reduce transfer size on smaller screens.",
                without_srcset.len()
            ),
            total_bytes(&without_srcset) * RESPONSIVE_SAVINGS,
            None,
        ));
    }

    let legacy: Vec<_> = images
        .iter()
        .copied()
        .filter(|img| is_legacy_format(&img.url))
        .collect();
    if !legacy.is_empty() {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::High,
            MODERN_FORMATS_TITLE,
            format!(
                "{} images are using legacy formats (JPEG/PNG/GIF). Modern formats like WebP or AVIF can reduce file size by 25-50%.",
                legacy.len()
            ),
            total_bytes(&legacy) * MODERN_FORMAT_SAVINGS,
            None,
        ));
    }

    let large: Vec<_> = images
        .iter()
        .copied()
        .filter(|img| img.transfer_size_bytes > LARGE_IMAGE_THRESHOLD)
        .collect();
    if !large.is_empty() {
        suggestions.push(suggestion(
            calculator,
            SuggestionSeverity::High,
            LARGE_IMAGES_TITLE,
            format!(
                "{} images are larger than 200KB. Consider compressing or resizing these images.",
                large.len()
            ),
            total_bytes(&large) * LARGE_IMAGE_SAVINGS,
            largest_url(&large),
        ));
    }

    suggestions
}

/// Substring match, so `photo.jpg?w=400` and `/img.png/raw` both count
fn is_legacy_format(url: &str) -> bool {
    let url = url.to_lowercase();
    LEGACY_EXTENSIONS.iter().any(|ext| url.contains(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_legacy_format() {
        assert!(is_legacy_format("https://example.com/hero.JPG"));
        assert!(is_legacy_format("https://example.com/a.jpeg?w=100"));
        assert!(is_legacy_format("https://example.com/logo.png"));
        assert!(!is_legacy_format("https://example.com/hero.webp"));
        assert!(!is_legacy_format("https://example.com/hero.avif"));
    }
}
