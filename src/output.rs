//! CSV persistence for per-query and combined tables.

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

use crate::models::{CombinedTable, JobRecord, JobTable};
use crate::utils::file_slug;

pub const COLUMNS: [&str; 7] = [
    "job_id",
    "job_title",
    "company_name",
    "location",
    "time_posted",
    "num_applicants",
    "error",
];

pub const QUERY_COLUMN: &str = "search_query";

/// Where finished tables go
pub trait TableSink {
    fn write_table(&mut self, table: &JobTable, location: &str) -> Result<PathBuf>;

    fn write_combined(&mut self, combined: &CombinedTable, location: &str) -> Result<PathBuf>;
}

/// `<root>/LinkedInJobs_<YYYYmmdd_HHMMSS>`, created if missing
pub fn create_run_dir(root: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let dir = root.join(format!("LinkedInJobs_{}", timestamp));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    Ok(dir)
}

pub fn table_file_name(query: &str, location: &str) -> String {
    format!("{}_{}.csv", file_slug(query), file_slug(location))
}

pub fn combined_file_name(location: &str) -> String {
    format!("All_{}_Jobs.csv", file_slug(location))
}

fn record_fields(record: &JobRecord) -> [&str; 7] {
    [
        record.identifier.as_str(),
        record.title.as_deref().unwrap_or(""),
        record.company.as_deref().unwrap_or(""),
        record.location.as_deref().unwrap_or(""),
        record.time_posted.as_deref().unwrap_or(""),
        record.applicant_count.as_deref().unwrap_or(""),
        record.fetch_error.as_deref().unwrap_or(""),
    ]
}

pub struct CsvTableWriter {
    dir: PathBuf,
}

impl CsvTableWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableSink for CsvTableWriter {
    fn write_table(&mut self, table: &JobTable, location: &str) -> Result<PathBuf> {
        let path = self.dir.join(table_file_name(&table.query, location));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        writer.write_record(COLUMNS)?;
        for record in &table.records {
            writer.write_record(record_fields(record))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;

        Ok(path)
    }

    fn write_combined(&mut self, combined: &CombinedTable, location: &str) -> Result<PathBuf> {
        let path = self.dir.join(combined_file_name(location));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut header = COLUMNS.to_vec();
        header.push(QUERY_COLUMN);
        writer.write_record(&header)?;

        for row in &combined.rows {
            let mut fields = record_fields(&row.record).to_vec();
            fields.push(row.search_query.as_str());
            writer.write_record(&fields)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> JobTable {
        let mut table = JobTable::new("Data Analyst Intern");
        table.records.push(JobRecord {
            identifier: "111".into(),
            title: Some("Data Analyst Intern".into()),
            company: Some("Acme, Inc.".into()),
            ..Default::default()
        });
        table.records.push(JobRecord::failed("222", "HTTP status 429"));
        table
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            table_file_name("Software Engineering Intern", "Ireland"),
            "Software_Engineering_Intern_Ireland.csv"
        );
        assert_eq!(combined_file_name("New York"), "All_New_York_Jobs.csv");
    }

    #[test]
    fn test_create_run_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_run_dir(root.path()).unwrap();
        assert!(dir.is_dir());
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("LinkedInJobs_"));
        assert_eq!(name.len(), "LinkedInJobs_".len() + 15);
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvTableWriter::new(dir.path());
        let path = writer.write_table(&sample_table(), "Ireland").unwrap();

        assert_eq!(path, dir.path().join("Data_Analyst_Intern_Ireland.csv"));
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "111");
        assert_eq!(&rows[0][2], "Acme, Inc.");
        assert_eq!(&rows[0][6], "");
        assert_eq!(&rows[1][0], "222");
        assert_eq!(&rows[1][1], "");
        assert_eq!(&rows[1][6], "HTTP status 429");
    }

    #[test]
    fn test_write_combined() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvTableWriter::new(dir.path());

        let mut other = JobTable::new("Software Intern");
        other.records.push(JobRecord { identifier: "333".into(), ..Default::default() });

        let mut combined = CombinedTable::default();
        combined.push_table(&sample_table());
        combined.push_table(&other);

        let path = writer.write_combined(&combined, "Ireland").unwrap();
        assert_eq!(path.file_name().unwrap(), "All_Ireland_Jobs.csv");

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(&reader.headers().unwrap()[7], QUERY_COLUMN);
        let queries: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[7].to_string())
            .collect();
        assert_eq!(queries, ["Data Analyst Intern", "Data Analyst Intern", "Software Intern"]);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = CsvTableWriter::new(dir.path().join("gone"));
        assert!(writer.write_table(&sample_table(), "Ireland").is_err());
    }
}
