use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{Level, LevelFilter};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use linkedin_job_scraper::output::create_run_dir;
use linkedin_job_scraper::{
    CsvTableWriter, FanOut, HttpDispatcher, LineSink, LogSink, RunSummary, ScrapeOrchestrator,
    ScraperConfig, SharedSink, WriterSink,
};

#[derive(Parser, Debug)]
#[command(name = "linkedin-job-scraper", version, about = "Scrape public job postings into CSV tables")]
struct Cli {
    /// Job title to search for (repeatable)
    #[arg(short, long = "title")]
    titles: Vec<String>,

    /// Location shared by every search
    #[arg(short, long)]
    location: Option<String>,

    /// Maximum postings fetched per title
    #[arg(short, long)]
    max_jobs: Option<usize>,

    /// Result offset for the listing page
    #[arg(long)]
    start: Option<u32>,

    /// Seconds to wait before every detail request
    #[arg(long)]
    base_delay: Option<f64>,

    /// Random jitter (+/- seconds) added to the base delay
    #[arg(long)]
    jitter: Option<f64>,

    /// Seconds to wait before retrying a failed detail request
    #[arg(long)]
    retry_backoff: Option<f64>,

    /// Directory that receives the timestamped run folder
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML or JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log per-field extraction details
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::load(path)?,
            None => ScraperConfig::default(),
        };

        if !self.titles.is_empty() {
            config.titles = self.titles;
        }
        if let Some(location) = self.location {
            config.location = location;
        }
        if let Some(max_jobs) = self.max_jobs {
            config.max_jobs = max_jobs;
        }
        if let Some(start) = self.start {
            config.start_offset = start;
        }
        if let Some(delay) = self.base_delay {
            config.base_delay_seconds = delay;
        }
        if let Some(jitter) = self.jitter {
            config.jitter_seconds = jitter;
        }
        if let Some(backoff) = self.retry_backoff {
            config.retry_backoff_seconds = backoff;
        }
        if let Some(output) = self.output {
            config.output_root = output;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Log file mirrors whatever level the console logger ended up with
fn file_level(console: LevelFilter) -> Level {
    console.to_level().unwrap_or(Level::Error)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logger(verbose);

    let config = cli.into_config()?;

    let run_dir = create_run_dir(&config.output_root)?;
    let log_path = run_dir.join("scraper_log.txt");
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    let file_level = file_level(log::max_level());
    let progress: SharedSink = Arc::new(
        FanOut::new()
            .with(Arc::new(LogSink))
            .with(Arc::new(WriterSink::new(log_file).with_max_level(file_level))),
    );

    progress.info(&format!("Files will be saved to: {}", run_dir.display()));
    progress.info(&format!("LinkedIn Job Scraper started at {}", Local::now()));

    let transport = Arc::new(HttpDispatcher::new(config.request_timeout_secs)?);
    let orchestrator = ScrapeOrchestrator::new(&config, transport, progress.clone())?;
    let mut tables = CsvTableWriter::new(&run_dir);

    let summary = orchestrator
        .run_all(&config.titles, &config.location, config.max_jobs, &mut tables)
        .await?;

    write_summary(&summary, &run_dir)?;
    progress.info(&format!(
        "{} queries, {} records ({} failed), {} write errors",
        summary.queries,
        summary.records_total,
        summary.records_failed,
        summary.write_errors.len()
    ));
    progress.info(&format!("All operations completed at {}", Local::now()));

    Ok(())
}

fn write_summary(summary: &RunSummary, run_dir: &std::path::Path) -> Result<()> {
    let path = run_dir.join("run_summary.json");
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
