use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Categories of web assets tracked in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "CSS")]
    Css,
    JavaScript,
    Images,
    Fonts,
    Video,
    Other,
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetCategory::Html => "HTML",
            AssetCategory::Css => "CSS",
            AssetCategory::JavaScript => "JavaScript",
            AssetCategory::Images => "Images",
            AssetCategory::Fonts => "Fonts",
            AssetCategory::Video => "Video",
            AssetCategory::Other => "Other",
        };
        f.write_str(name)
    }
}

/// A single asset fetched (or inferred) while analyzing a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredResource {
    pub url: String,
    pub category: AssetCategory,
    pub transfer_size_bytes: f64,
    pub content_type: Option<String>,
    pub loaded_successfully: bool,
    /// Markup attributes consumed by the analyzers (`loading`, `srcset`, `async`, ...).
    /// A key is only present when the element carried the attribute.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl DiscoveredResource {
    pub fn new(url: impl Into<String>, category: AssetCategory, transfer_size_bytes: f64) -> Self {
        Self {
            url: url.into(),
            category,
            transfer_size_bytes,
            content_type: None,
            loaded_successfully: true,
            attributes: HashMap::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns the attribute value when it is present and non-empty
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Output of one page crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAnalysisResult {
    pub page_url: String,
    pub analyzed_at: DateTime<Utc>,
    pub resources: Vec<DiscoveredResource>,
    pub total_transfer_size_bytes: f64,
    pub suggestions: Vec<OptimizationSuggestion>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl PageAnalysisResult {
    pub fn succeeded(
        page_url: impl Into<String>,
        analyzed_at: DateTime<Utc>,
        resources: Vec<DiscoveredResource>,
        suggestions: Vec<OptimizationSuggestion>,
    ) -> Self {
        let total_transfer_size_bytes = resources.iter().map(|r| r.transfer_size_bytes).sum();
        Self {
            page_url: page_url.into(),
            analyzed_at,
            resources,
            total_transfer_size_bytes,
            suggestions,
            success: true,
            error_message: None,
        }
    }

    pub fn failed(
        page_url: impl Into<String>,
        analyzed_at: DateTime<Utc>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            page_url: page_url.into(),
            analyzed_at,
            resources: vec![],
            total_transfer_size_bytes: 0.0,
            suggestions: vec![],
            success: false,
            error_message: Some(error_message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SuggestionSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for SuggestionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuggestionSeverity::Low => "Low",
            SuggestionSeverity::Medium => "Medium",
            SuggestionSeverity::High => "High",
            SuggestionSeverity::Critical => "Critical",
        };
        f.write_str(name)
    }
}

/// An actionable finding produced by one of the category analyzers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub severity: SuggestionSeverity,
    pub title: String,
    pub description: String,
    pub potential_savings_bytes: f64,
    pub potential_co2_savings_grams: f64,
    pub affected_asset_url: Option<String>,
}

/// Rollup of one asset category's contribution to the page footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBreakdown {
    pub category: AssetCategory,
    pub transfer_size_bytes: f64,
    pub percentage: f64,
    pub estimated_co2_grams: f64,
    pub resource_count: usize,
}

/// Letter grade derived from the grams of CO₂ emitted per page view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GreenScore {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for GreenScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grade = match self {
            GreenScore::A => "A",
            GreenScore::B => "B",
            GreenScore::C => "C",
            GreenScore::D => "D",
            GreenScore::F => "F",
        };
        f.write_str(grade)
    }
}

/// Complete carbon footprint report for a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCarbonReport {
    pub content_id: Uuid,
    pub page_url: String,
    pub analyzed_at: DateTime<Utc>,
    pub total_transfer_size_bytes: f64,
    pub estimated_co2_grams: f64,
    pub returning_visit_co2_grams: f64,
    pub score: GreenScore,
    pub resource_count: usize,
    pub assets: Vec<AssetBreakdown>,
    pub suggestions: Vec<OptimizationSuggestion>,
}
