use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ScrapeError;
use crate::extractor::FieldRules;

pub const DEFAULT_LISTING_ENDPOINT: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
pub const DEFAULT_DETAIL_ENDPOINT: &str = "https://www.linkedin.com/jobs-guest/jobs/api/jobPosting";

/// Upper bound for any configured delay, one day
pub const MAX_DELAY_SECONDS: f64 = 86_400.0;

/// Run parameters and request pacing policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Pacing before every detail fetch
    pub base_delay_seconds: f64,
    /// Half-width of the uniform jitter added to the pacing delay
    pub jitter_seconds: f64,
    /// Wait before the single retry of a failed detail fetch
    pub retry_backoff_seconds: f64,
    pub max_jobs: usize,
    pub start_offset: u32,
    pub request_timeout_secs: u64,
    pub listing_endpoint: String,
    pub detail_endpoint: String,
    pub titles: Vec<String>,
    pub location: String,
    pub output_root: PathBuf,
    pub selectors: Option<FieldRules>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_delay_seconds: 15.0,
            jitter_seconds: 5.0,
            retry_backoff_seconds: 60.0,
            max_jobs: 10,
            start_offset: 0,
            request_timeout_secs: 30,
            listing_endpoint: DEFAULT_LISTING_ENDPOINT.to_string(),
            detail_endpoint: DEFAULT_DETAIL_ENDPOINT.to_string(),
            titles: vec![
                "Software Intern".to_string(),
                "Software Engineering Intern".to_string(),
                "Data Analyst Intern".to_string(),
            ],
            location: "Ireland".to_string(),
            output_root: PathBuf::from("."),
            selectors: None,
        }
    }
}

impl ScraperConfig {
    /// Load from a `.json` file, anything else is read as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw)
                .with_context(|| format!("Invalid JSON config {}", path.display()))?,
            _ => toml::from_str(&raw)
                .with_context(|| format!("Invalid TOML config {}", path.display()))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Zero pacing, for tests and dry runs against local fixtures
    pub fn without_delays() -> Self {
        Self {
            base_delay_seconds: 0.0,
            jitter_seconds: 0.0,
            retry_backoff_seconds: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ScrapeError> {
        let delays = [
            ("base_delay_seconds", self.base_delay_seconds),
            ("jitter_seconds", self.jitter_seconds),
            ("retry_backoff_seconds", self.retry_backoff_seconds),
        ];
        for (name, value) in delays {
            if !value.is_finite() || value < 0.0 {
                return Err(ScrapeError::config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
            if value > MAX_DELAY_SECONDS {
                return Err(ScrapeError::config(format!(
                    "{} must be at most {} seconds, got {}",
                    name, MAX_DELAY_SECONDS, value
                )));
            }
        }

        if self.titles.iter().all(|t| t.trim().is_empty()) {
            return Err(ScrapeError::NoQueries);
        }

        if self.location.trim().is_empty() {
            return Err(ScrapeError::config("location must not be empty"));
        }

        Ok(())
    }

    pub fn field_rules(&self) -> FieldRules {
        self.selectors.clone().unwrap_or_default()
    }
}
