#![cfg(feature = "aws")]

use anyhow::Result;
use aws_sdk_cloudtrail::config::{BehaviorVersion, Credentials, Region};
use cloudtrail_query::{CloudTrailService, QueryError, QueryExecutor, QueryOptions};
use httpmock::prelude::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn service_for(server: &MockServer) -> CloudTrailService {
    let config = aws_sdk_cloudtrail::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .endpoint_url(server.base_url())
        .build();
    CloudTrailService::new(aws_sdk_cloudtrail::Client::from_conf(config))
}

#[tokio::test]
async fn test_query_against_mock_cloudtrail() -> Result<()> {
    let server = MockServer::start();

    let start_mock = server.mock(|when, then| {
        when.method(POST).path("/").body_contains("QueryStatement");
        then.status(200)
            .header("Content-Type", "application/x-amz-json-1.1")
            .json_body(json!({"QueryId": "q-123"}));
    });

    let results_mock = server.mock(|when, then| {
        when.method(POST).path("/").body_contains("MaxQueryResults");
        then.status(200)
            .header("Content-Type", "application/x-amz-json-1.1")
            .json_body(json!({
                "QueryStatus": "FINISHED",
                "QueryStatistics": {"ResultsCount": 1, "TotalResultsCount": 1, "BytesScanned": 512},
                "QueryResultRows": [[
                    {"eventName": "ConsoleLogin"},
                    {"readOnly": "false"},
                    {"additionalEventData": "{MFAUsed=Yes, LoginTo=https://console.aws.amazon.com}"}
                ]]
            }));
    });

    let executor = QueryExecutor::new(service_for(&server));
    let rows = executor
        .query_all(
            "SELECT eventName, readOnly, additionalEventData FROM eds",
            &QueryOptions::default(),
            &CancellationToken::new(),
        )
        .await?;

    start_mock.assert();
    results_mock.assert();
    assert_eq!(rows.len(), 1);

    let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(
        columns,
        vec![
            "eventName",
            "readOnly",
            "additionalEventData",
            "additionalEventData__parsed"
        ]
    );
    assert_eq!(rows[0]["readOnly"], json!(false));
    assert_eq!(
        rows[0]["additionalEventData__parsed"],
        json!({"MFAUsed": "Yes", "LoginTo": "https://console.aws.amazon.com"})
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_status_from_cloudtrail() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/").body_contains("QueryStatement");
        then.status(200)
            .header("Content-Type", "application/x-amz-json-1.1")
            .json_body(json!({"QueryId": "q-456"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/").body_contains("MaxQueryResults");
        then.status(200)
            .header("Content-Type", "application/x-amz-json-1.1")
            .json_body(json!({
                "QueryStatus": "FAILED",
                "ErrorMessage": "Column eventNam does not exist"
            }));
    });

    let executor = QueryExecutor::new(service_for(&server));
    let err = executor
        .query_all(
            "SELECT eventNam FROM eds",
            &QueryOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        QueryError::QueryFailed { message } => {
            assert_eq!(message, "Column eventNam does not exist")
        }
        other => panic!("expected QueryFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_query_is_a_submission_error() {
    let server = MockServer::start();

    let start_mock = server.mock(|when, then| {
        when.method(POST).path("/").body_contains("QueryStatement");
        then.status(400)
            .header("Content-Type", "application/x-amz-json-1.1")
            .json_body(json!({
                "__type": "InvalidQueryStatementException",
                "Message": "Query statement is invalid"
            }));
    });

    let executor = QueryExecutor::new(service_for(&server));
    let err = executor
        .query_all("SELEC nope", &QueryOptions::default(), &CancellationToken::new())
        .await
        .unwrap_err();

    start_mock.assert();
    assert!(matches!(err, QueryError::Submission(_)), "{:?}", err);
}
