use std::time::Duration;

/// One result record: column name to value, in column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Per-query settings, fixed for the lifetime of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Parse `key=value` dumps found in string columns into `<column>__parsed` fields.
    pub expand: bool,
    /// Coerce `""`, `"null"`, `"true"` and `"false"` strings into typed values.
    pub normalize: bool,
    /// Minimum delay between two polls that returned no rows.
    pub poll_interval: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            expand: true,
            normalize: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl QueryOptions {
    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Execution state reported by the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Queued,
    Running,
    Finished,
    Failed,
    Cancelled,
    TimedOut,
    Unknown(String),
}

/// One page of results as returned by a `get_query_results` call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub status: QueryStatus,
    pub error_message: Option<String>,
    pub rows: Vec<Row>,
    /// `None` once there are no more pages to fetch.
    pub next_token: Option<String>,
    pub total_results: Option<u64>,
}

impl QueryPage {
    pub fn new(status: QueryStatus) -> Self {
        Self {
            status,
            error_message: None,
            rows: Vec::new(),
            next_token: None,
            total_results: None,
        }
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn with_total_results(mut self, total: u64) -> Self {
        self.total_results = Some(total);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}
