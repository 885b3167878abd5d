use crate::analyzers;
use crate::calculator::CarbonCalculator;
use crate::config::TrackerConfig;
use crate::error::{CarbonError, Result};
use crate::extractor::{CandidateSource, ResourceCandidate, ResourceExtractor};
use crate::fetcher::ResourceFetcher;
use crate::http_client::build_http_client;
use crate::models::{
    AssetCategory, DiscoveredResource, OptimizationSuggestion, PageAnalysisResult,
};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fetches a page, discovers everything it loads and measures it
pub struct PageAnalyzer {
    client: reqwest::Client,
    fetcher: ResourceFetcher,
    calculator: CarbonCalculator,
    concurrency: usize,
    page_timeout: Duration,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    progress_bar: Option<ProgressBar>,
}

impl PageAnalyzer {
    pub fn new(config: &TrackerConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let client = build_http_client(&config.http_client_config())?;
        let fetcher = ResourceFetcher::new(
            client.clone(),
            Duration::from_secs(config.resource_timeout_secs),
        );

        let rate_limiter = config
            .requests_per_second
            .and_then(|rps| NonZeroU32::new(rps.ceil() as u32))
            .map(|per_second| RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            client,
            fetcher,
            calculator: CarbonCalculator::from_config(config),
            concurrency: config.concurrency.max(1),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            rate_limiter,
            progress_bar: None,
        })
    }

    /// Enable a progress bar for resource fetching
    pub fn enable_progress_bar(&mut self) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:30.green} {pos}/{len} resources measured")
                .expect("Progress bar template should be valid"),
        );
        self.progress_bar = Some(pb);
    }

    pub fn calculator(&self) -> &CarbonCalculator {
        &self.calculator
    }

    /// Analyzes one page. Never returns an error: failures are reported through
    /// `success = false` and `error_message`.
    ///
    /// Cancelling `cancel` (or exceeding the page timeout) aborts in-flight
    /// resource fetches and fails the whole run; no partial result is kept.
    pub async fn analyze_page(
        &self,
        page_url: &str,
        cancel: &CancellationToken,
    ) -> PageAnalysisResult {
        let analyzed_at = Utc::now();
        tracing::info!(url = %page_url, "Starting page analysis");

        let page_token = cancel.child_token();
        let outcome = tokio::select! {
            _ = page_token.cancelled() => Err(CarbonError::Cancelled),
            outcome = tokio::time::timeout(self.page_timeout, self.run(page_url, &page_token)) => {
                outcome.unwrap_or_else(|_| {
                    page_token.cancel();
                    Err(CarbonError::PageTimeout(self.page_timeout.as_secs()))
                })
            }
        };

        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }

        match outcome {
            Ok((resources, suggestions)) => {
                let result =
                    PageAnalysisResult::succeeded(page_url, analyzed_at, resources, suggestions);
                tracing::info!(
                    url = %page_url,
                    total_bytes = result.total_transfer_size_bytes,
                    resources = result.resources.len(),
                    "Analysis completed"
                );
                result
            }
            Err(e) => {
                tracing::error!(url = %page_url, error = %e, "Error analyzing page");
                PageAnalysisResult::failed(page_url, analyzed_at, e.to_string())
            }
        }
    }

    async fn run(
        &self,
        page_url: &str,
        cancel: &CancellationToken,
    ) -> Result<(Vec<DiscoveredResource>, Vec<OptimizationSuggestion>)> {
        let base_url = Url::parse(page_url)
            .map_err(|e| CarbonError::InvalidUrl(format!("{}: {}", page_url, e)))?;

        let html = self.fetch_html(page_url).await?;

        // Same normalised form the synthetic #inline-* entries are built from
        let mut resources = vec![
            DiscoveredResource::new(
                base_url.as_str(),
                AssetCategory::Html,
                html.chars().count() as f64,
            )
            .with_content_type("text/html"),
        ];

        // scraper::Html is not Send, so it must not live across an await
        let candidates = {
            let document = Html::parse_document(&html);
            ResourceExtractor::extract(&document, &base_url)
        };
        tracing::debug!(
            url = %page_url,
            candidates = candidates.len(),
            "Extracted resource candidates"
        );

        resources.extend(self.measure_all(candidates, cancel).await);

        if cancel.is_cancelled() {
            return Err(CarbonError::Cancelled);
        }

        let document = Html::parse_document(&html);
        let suggestions = analyzers::analyze_all(&resources, &document, &self.calculator);

        Ok((resources, suggestions))
    }

    async fn fetch_html(&self, page_url: &str) -> Result<String> {
        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .map_err(|source| CarbonError::PageFetch {
                url: page_url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarbonError::PageStatus {
                url: page_url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(ct) = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
        {
            let ct_lower = ct.to_lowercase();
            if !ct_lower.contains("text/html") && !ct_lower.contains("application/xhtml") {
                tracing::warn!(
                    url = %page_url,
                    content_type = %ct,
                    "Non-HTML content type detected, parsing may fail"
                );
            }
        }

        response
            .text()
            .await
            .map_err(|source| CarbonError::PageFetch {
                url: page_url.to_string(),
                source,
            })
    }

    /// Measures candidates concurrently and returns them in discovery order,
    /// whatever order the fetches complete in
    async fn measure_all(
        &self,
        candidates: Vec<ResourceCandidate>,
        cancel: &CancellationToken,
    ) -> Vec<DiscoveredResource> {
        if let Some(ref pb) = self.progress_bar {
            pb.set_length(candidates.len() as u64);
            pb.set_position(0);
        }

        let mut results = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| async move { (index, self.measure(candidate, cancel).await) })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        results.sort_by_key(|(index, _)| *index);
        results
            .into_iter()
            .filter_map(|(_, resource)| resource)
            .collect()
    }

    async fn measure(
        &self,
        candidate: ResourceCandidate,
        cancel: &CancellationToken,
    ) -> Option<DiscoveredResource> {
        let ResourceCandidate {
            url,
            category,
            source,
            attributes,
        } = candidate;

        let resource = match source {
            CandidateSource::Known {
                size_bytes,
                content_type,
            } => Some(
                DiscoveredResource::new(url, category, size_bytes).with_content_type(content_type),
            ),
            CandidateSource::Remote => {
                if let Some(limiter) = &self.rate_limiter {
                    limiter.until_ready().await;
                }
                self.fetcher.fetch(&url, category, cancel).await
            }
        };

        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }

        resource.map(|resource| DiscoveredResource {
            attributes,
            ..resource
        })
    }
}
