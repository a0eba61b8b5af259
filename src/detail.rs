//! Paced detail page fetch with one retry.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::dispatcher::{FetchResponse, Transport};
use crate::error::FetchError;
use crate::extractor::{Field, FieldExtractor};
use crate::models::JobRecord;
use crate::progress::SharedSink;
use crate::utils::{jittered_delay, seconds};

/// Timing policy for detail requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub base_delay_seconds: f64,
    pub jitter_seconds: f64,
    pub retry_backoff_seconds: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base_delay_seconds: 15.0,
            jitter_seconds: 5.0,
            retry_backoff_seconds: 60.0,
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            base_delay_seconds: 0.0,
            jitter_seconds: 0.0,
            retry_backoff_seconds: 0.0,
        }
    }

    pub fn next_delay(&self) -> Duration {
        jittered_delay(self.base_delay_seconds, self.jitter_seconds)
    }

    pub fn retry_backoff(&self) -> Duration {
        seconds(self.retry_backoff_seconds)
    }
}

pub struct DetailFetcher<T: Transport> {
    transport: Arc<T>,
    endpoint: String,
    extractor: FieldExtractor,
    pacing: Pacing,
    progress: SharedSink,
}

impl<T: Transport> DetailFetcher<T> {
    pub fn new(
        transport: Arc<T>,
        endpoint: impl Into<String>,
        extractor: FieldExtractor,
        pacing: Pacing,
        progress: SharedSink,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            extractor,
            pacing,
            progress,
        }
    }

    pub fn detail_url(&self, identifier: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), identifier)
    }

    /// Always yields a record for `identifier`; failures end up in `fetch_error`.
    pub async fn fetch_detail(&self, identifier: &str) -> JobRecord {
        let delay = self.pacing.next_delay();
        self.progress.info(&format!(
            "Waiting {:.1} seconds before next request...",
            delay.as_secs_f64()
        ));
        sleep(delay).await;

        let url = self.detail_url(identifier);

        match self.fetch_with_retry(&url).await {
            Ok(response) => {
                let fields = self.extractor.extract(&response.body);
                for field in Field::ALL {
                    match fields.get(field) {
                        Some(value) => self
                            .progress
                            .debug(&format!("Found {}: {}", field.label(), value)),
                        None => self
                            .progress
                            .debug(&format!("No {} found for job ID {}", field.label(), identifier)),
                    }
                }
                fields.into_record(identifier)
            }
            Err(e) => {
                self.progress.error(&format!(
                    "Error fetching job details for job ID {}: {}",
                    identifier, e
                ));
                JobRecord::failed(identifier, e.to_string())
            }
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<FetchResponse, FetchError> {
        match self.attempt(url, "Response").await {
            Ok(response) => Ok(response),
            Err(e) => {
                let backoff = self.pacing.retry_backoff();
                self.progress.warn(&format!(
                    "{}, waiting {:.0} seconds and retrying...",
                    e,
                    backoff.as_secs_f64()
                ));
                sleep(backoff).await;
                self.attempt(url, "Retry response").await
            }
        }
    }

    async fn attempt(&self, url: &str, label: &str) -> Result<FetchResponse, FetchError> {
        let response = self.transport.fetch(url).await?;
        self.progress
            .info(&format!("{} status: {}", label, response.status));
        response.into_success()
    }
}
