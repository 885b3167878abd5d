use crate::models::{AssetCategory, DiscoveredResource};
use reqwest::{Client, Response, header};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Measures the transfer size of individual resources.
///
/// A failed or timed out fetch is logged and yields `None`; one broken asset
/// never aborts the page analysis.
#[derive(Clone)]
pub struct ResourceFetcher {
    client: Client,
    timeout: Duration,
}

impl ResourceFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches one resource under its own timeout. The timeout is linked to
    /// `cancel`, so cancelling the page aborts the fetch as well.
    pub async fn fetch(
        &self,
        url: &str,
        category: AssetCategory,
        cancel: &CancellationToken,
    ) -> Option<DiscoveredResource> {
        let token = cancel.child_token();

        let outcome = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(url = %url, "Resource fetch cancelled");
                return None;
            }
            outcome = tokio::time::timeout(self.timeout, self.measure(url, category)) => outcome,
        };

        match outcome {
            Ok(Ok(resource)) => resource,
            Ok(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "Error fetching resource");
                None
            }
            Err(_) => {
                tracing::warn!(
                    url = %url,
                    timeout_secs = self.timeout.as_secs(),
                    "Timeout fetching resource"
                );
                None
            }
        }
    }

    /// HEAD first; fall back to downloading the body when the probe fails or
    /// does not report a length
    async fn measure(
        &self,
        url: &str,
        category: AssetCategory,
    ) -> reqwest::Result<Option<DiscoveredResource>> {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => {
                if let Some(length) = declared_length(&response) {
                    return Ok(Some(Self::resource(
                        url,
                        category,
                        length as f64,
                        content_type(&response),
                    )));
                }
            }
            Ok(response) => {
                tracing::debug!(url = %url, status = response.status().as_u16(), "HEAD probe rejected");
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "HEAD probe failed");
            }
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Resource returned error status");
            return Ok(None);
        }

        let content_type = content_type(&response);
        let body = response.bytes().await?;

        Ok(Some(Self::resource(
            url,
            category,
            body.len() as f64,
            content_type,
        )))
    }

    fn resource(
        url: &str,
        category: AssetCategory,
        size: f64,
        content_type: Option<String>,
    ) -> DiscoveredResource {
        DiscoveredResource {
            content_type,
            ..DiscoveredResource::new(url, category, size)
        }
    }
}

// Read the header itself: reqwest reports the (empty) body size for HEAD
fn declared_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Media type without parameters, e.g. `text/css` for `text/css; charset=utf-8`
fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
