use thiserror::Error;

/// Errors raised by the analysis pipeline.
///
/// Only page-level problems show up here. A resource that cannot be
/// fetched is logged and left out of the report instead.
#[derive(Debug, Error)]
pub enum CarbonError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Page {url} returned HTTP {status}")]
    PageStatus { url: String, status: u16 },

    #[error("Page analysis timed out after {0}s")]
    PageTimeout(u64),

    #[error("Analysis cancelled")]
    Cancelled,

    /// Report generation was attempted on top of a failed analysis
    #[error("Failed to analyze page: {0}")]
    AnalysisFailed(String),
}

pub type Result<T> = std::result::Result<T, CarbonError>;
