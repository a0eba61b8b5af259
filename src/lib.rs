// LinkedIn Job Scraper Library
//
// Resolves job identifiers from search listings, then fetches each posting
// with paced, retried requests and extracts its fields through fallback rules.

pub mod config;
pub mod detail;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod listing;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod utils;

// Re-export main types for convenience
pub use config::ScraperConfig;
pub use detail::{DetailFetcher, Pacing};
pub use dispatcher::{FetchResponse, HttpDispatcher, Transport};
pub use error::{FetchError, ScrapeError};
pub use extractor::{ClassRule, ExtractedFields, Field, FieldExtractor, FieldRules};
pub use listing::{ListingResolver, extract_job_ids};
pub use models::{CombinedRow, CombinedTable, JobId, JobRecord, JobTable, Query};
pub use orchestrator::{RunSummary, ScrapeOrchestrator};
pub use output::{CsvTableWriter, TableSink};
pub use progress::{FanOut, LineSink, LogSink, SharedSink, WriterSink};
