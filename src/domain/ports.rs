use crate::domain::model::{QueryPage, Row};
use async_trait::async_trait;

pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Remote query service: submits a statement and hands back result pages.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn start_query(&self, query: &str) -> Result<String, ServiceError>;

    async fn get_query_results(
        &self,
        query_id: &str,
        max_results: i32,
        next_token: Option<&str>,
    ) -> Result<QueryPage, ServiceError>;
}

/// Receives transformed rows one at a time, in result order.
pub trait RowSink: Send {
    fn accept(&mut self, row: Row) -> Result<(), SinkError>;
}

impl<F> RowSink for F
where
    F: FnMut(Row) -> Result<(), SinkError> + Send,
{
    fn accept(&mut self, row: Row) -> Result<(), SinkError> {
        self(row)
    }
}
