/// Client-side state of one submitted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExecution {
    pub query_id: String,
    pub next_token: Option<String>,
    pub processed: u64,
    pub total: Option<u64>,
}

impl QueryExecution {
    pub fn new(query_id: String) -> Self {
        Self {
            query_id,
            next_token: None,
            processed: 0,
            total: None,
        }
    }

    /// The first positive total wins; later pages cannot change it.
    pub fn observe_total(&mut self, total: Option<u64>) {
        if self.total.is_none() {
            self.total = total.filter(|&t| t > 0);
        }
    }

    pub fn record_row(&mut self) {
        self.processed += 1;
    }

    pub fn progress(&self) -> String {
        match self.total {
            Some(total) => format!(
                "{}/{} ({:.2}%)",
                self.processed,
                total,
                self.processed as f64 / total as f64 * 100.0
            ),
            None => format!("{}/? (?%)", self.processed),
        }
    }
}
