//! Drives queries through listing resolution and detail fetching.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use crate::config::ScraperConfig;
use crate::detail::{DetailFetcher, Pacing};
use crate::dispatcher::Transport;
use crate::error::ScrapeError;
use crate::extractor::FieldExtractor;
use crate::listing::ListingResolver;
use crate::models::{CombinedTable, JobTable, Query};
use crate::output::TableSink;
use crate::progress::SharedSink;

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub queries: usize,
    pub tables: Vec<JobTable>,
    pub combined: CombinedTable,
    pub records_total: usize,
    pub records_failed: usize,
    pub write_errors: Vec<String>,
}

pub struct ScrapeOrchestrator<T: Transport> {
    resolver: ListingResolver<T>,
    fetcher: DetailFetcher<T>,
    start_offset: u32,
    progress: SharedSink,
}

impl<T: Transport> ScrapeOrchestrator<T> {
    pub fn new(config: &ScraperConfig, transport: Arc<T>, progress: SharedSink) -> Result<Self> {
        let extractor = FieldExtractor::new(&config.field_rules())?;
        let pacing = Pacing {
            base_delay_seconds: config.base_delay_seconds,
            jitter_seconds: config.jitter_seconds,
            retry_backoff_seconds: config.retry_backoff_seconds,
        };

        Ok(Self {
            resolver: ListingResolver::new(
                transport.clone(),
                config.listing_endpoint.clone(),
                progress.clone(),
            ),
            fetcher: DetailFetcher::new(
                transport,
                config.detail_endpoint.clone(),
                extractor,
                pacing,
                progress.clone(),
            ),
            start_offset: config.start_offset,
            progress,
        })
    }

    /// One query end to end. Records come back in identifier order, at most `max_jobs`.
    pub async fn run_query(&self, query: &Query, max_jobs: usize) -> JobTable {
        self.progress.info(&format!(
            "Searching for '{}' jobs in '{}'",
            query.title, query.location
        ));

        let mut table = JobTable::new(query.title.clone());
        let mut ids = self.resolver.resolve(query).await;
        self.progress.info(&format!("Found {} job IDs", ids.len()));

        if ids.is_empty() {
            self.progress.warn(
                "No jobs found! The search might be blocked or returned no results.",
            );
            return table;
        }

        ids.truncate(max_jobs);
        self.progress.info(&format!("Will process {} jobs", ids.len()));

        let total = ids.len();
        for (index, id) in ids.iter().enumerate() {
            self.progress
                .info(&format!("Processing job {}/{}: {}", index + 1, total, id));
            table.records.push(self.fetcher.fetch_detail(id).await);
        }

        self.progress.info(&format!(
            "Scraped {} jobs ({} failed)",
            table.len(),
            table.failed_count()
        ));
        table
    }

    /// Run every title against `location`, persisting each table as soon as it is done.
    pub async fn run_all(
        &self,
        titles: &[String],
        location: &str,
        max_jobs: usize,
        sink: &mut dyn TableSink,
    ) -> Result<RunSummary, ScrapeError> {
        let titles: Vec<&String> = titles.iter().filter(|t| !t.trim().is_empty()).collect();
        if titles.is_empty() {
            return Err(ScrapeError::NoQueries);
        }

        self.progress.info(&format!(
            "Searching for {} job titles in {}",
            titles.len(),
            location
        ));

        let mut summary = RunSummary {
            queries: titles.len(),
            ..RunSummary::default()
        };

        for title in titles {
            self.progress
                .info(&format!("===== SEARCHING FOR: {} =====", title));

            let query = Query::new(title.as_str(), location).with_offset(self.start_offset);
            let table = self.run_query(&query, max_jobs).await;

            if table.is_empty() {
                self.progress.warn(&format!("No results found for {}", title));
                summary.tables.push(table);
                continue;
            }

            match sink.write_table(&table, location) {
                Ok(path) => self
                    .progress
                    .info(&format!("Data saved to {}", path.display())),
                Err(e) => {
                    let message = format!("Error saving data for {}: {:#}", title, e);
                    self.progress.error(&message);
                    summary.write_errors.push(message);
                }
            }

            summary.records_total += table.len();
            summary.records_failed += table.failed_count();
            summary.combined.push_table(&table);
            summary.tables.push(table);
        }

        if summary.combined.is_empty() {
            self.progress.warn("No data collected for any job title!");
            return Ok(summary);
        }

        match sink.write_combined(&summary.combined, location) {
            Ok(path) => self
                .progress
                .info(&format!("Combined data saved to {}", path.display())),
            Err(e) => {
                let message = format!("Error creating combined file: {:#}", e);
                self.progress.error(&message);
                summary.write_errors.push(message);
            }
        }

        Ok(summary)
    }
}
