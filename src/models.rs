use serde::{Deserialize, Serialize};

/// One search against the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub start_offset: u32,
}

impl Query {
    pub fn new(title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            start_offset: 0,
        }
    }

    pub fn with_offset(mut self, start_offset: u32) -> Self {
        self.start_offset = start_offset;
        self
    }
}

/// Opaque posting identifier taken from a listing page
pub type JobId = String;

/// Best-effort view of one posting.
///
/// Either the content fields are filled to whatever the markup allowed, or
/// `fetch_error` is set and every content field is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "job_id")]
    pub identifier: JobId,
    #[serde(rename = "job_title")]
    pub title: Option<String>,
    #[serde(rename = "company_name")]
    pub company: Option<String>,
    pub location: Option<String>,
    pub time_posted: Option<String>,
    #[serde(rename = "num_applicants")]
    pub applicant_count: Option<String>,
    #[serde(rename = "error")]
    pub fetch_error: Option<String>,
}

impl JobRecord {
    pub fn failed(identifier: impl Into<JobId>, error: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fetch_error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.fetch_error.is_some()
    }
}

/// Records produced by a single query, in identifier order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobTable {
    pub query: String,
    pub records: Vec<JobRecord>,
}

impl JobTable {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRow {
    #[serde(flatten)]
    pub record: JobRecord,
    pub search_query: String,
}

/// All per-query tables concatenated in submission order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedTable {
    pub rows: Vec<CombinedRow>,
}

impl CombinedTable {
    pub fn push_table(&mut self, table: &JobTable) {
        self.rows.extend(table.records.iter().map(|record| CombinedRow {
            record: record.clone(),
            search_query: table.query.clone(),
        }));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
