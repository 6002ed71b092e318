use crate::domain::model::{QueryPage, QueryStatus, Row};
use crate::domain::ports::{QueryService, ServiceError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudtrail::config::Region;
use aws_sdk_cloudtrail::types::QueryStatus as WireStatus;
use aws_sdk_cloudtrail::Client;
use serde_json::Value;
use std::collections::HashMap;

/// [`QueryService`] backed by CloudTrail Lake.
#[derive(Debug, Clone)]
pub struct CloudTrailService {
    client: Client,
}

impl CloudTrailService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the shared AWS config of the named profile.
    pub async fn from_profile(profile: &str, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).profile_name(profile);
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        tracing::debug!(
            "loaded AWS config for profile '{}' (region: {:?})",
            profile,
            config.region()
        );
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl QueryService for CloudTrailService {
    async fn start_query(&self, query: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .start_query()
            .query_statement(query)
            .send()
            .await?;
        output
            .query_id
            .ok_or_else(|| "StartQuery response did not include a query id".into())
    }

    async fn get_query_results(
        &self,
        query_id: &str,
        max_results: i32,
        next_token: Option<&str>,
    ) -> Result<QueryPage, ServiceError> {
        let output = self
            .client
            .get_query_results()
            .query_id(query_id)
            .max_query_results(max_results)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await?;

        Ok(QueryPage {
            status: output
                .query_status
                .as_ref()
                .map(status_from_wire)
                .unwrap_or_else(|| QueryStatus::Unknown("missing".to_string())),
            error_message: output.error_message,
            rows: output
                .query_result_rows
                .unwrap_or_default()
                .into_iter()
                .map(row_from_entries)
                .collect(),
            next_token: output.next_token,
            total_results: output
                .query_statistics
                .and_then(|stats| stats.total_results_count)
                .and_then(|total| u64::try_from(total).ok()),
        })
    }
}

fn status_from_wire(status: &WireStatus) -> QueryStatus {
    match status {
        WireStatus::Queued => QueryStatus::Queued,
        WireStatus::Running => QueryStatus::Running,
        WireStatus::Finished => QueryStatus::Finished,
        WireStatus::Failed => QueryStatus::Failed,
        WireStatus::Cancelled => QueryStatus::Cancelled,
        WireStatus::TimedOut => QueryStatus::TimedOut,
        other => QueryStatus::Unknown(other.as_str().to_string()),
    }
}

// Each wire row is a list of single-column maps, in select order.
fn row_from_entries(entries: Vec<HashMap<String, String>>) -> Row {
    entries
        .into_iter()
        .flat_map(|entry| entry.into_iter())
        .map(|(column, value)| (column, Value::String(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_from_entries_preserves_column_order() {
        let entries = ["eventTime", "eventName", "awsRegion"]
            .iter()
            .enumerate()
            .map(|(i, column)| HashMap::from([(column.to_string(), i.to_string())]))
            .collect();

        let row = row_from_entries(entries);

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["eventTime", "eventName", "awsRegion"]);
        assert_eq!(row["awsRegion"], Value::String("2".to_string()));
    }

    #[test]
    fn test_status_from_wire() {
        assert_eq!(status_from_wire(&WireStatus::Failed), QueryStatus::Failed);
        assert_eq!(status_from_wire(&WireStatus::TimedOut), QueryStatus::TimedOut);
        assert_eq!(
            status_from_wire(&WireStatus::from("SOMETHING_NEW")),
            QueryStatus::Unknown("SOMETHING_NEW".to_string())
        );
    }
}
