use crate::adapters::sink::{CollectSink, JsonLinesSink};
use crate::core::execution::QueryExecution;
use crate::core::transform::RowTransformer;
use crate::domain::model::{QueryOptions, QueryPage, QueryStatus, Row};
use crate::domain::ports::{QueryService, RowSink};
use crate::utils::error::{QueryError, Result};
use crate::utils::validation::validate_non_empty_string;
use std::future::Future;
use std::io::Write;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Rows requested per `get_query_results` call.
pub const PAGE_SIZE: i32 = 1000;

/// Runs queries against a [`QueryService`], paging through results until the
/// service stops handing out continuation tokens.
pub struct QueryExecutor<S: QueryService> {
    service: S,
}

impl<S: QueryService> QueryExecutor<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Submits `query` and delivers every transformed row to `sink`.
    ///
    /// Returns once the last page was consumed. Remote terminal states, service
    /// failures, sink failures and cancellation all end the execution with an
    /// error; nothing is retried.
    ///
    /// Cancellation is raced against every remote call. If it lands while
    /// `start_query` is in flight, the service may already have accepted the
    /// query and keep running it; its id is then unknown to the caller.
    pub async fn execute<K: RowSink + ?Sized>(
        &self,
        query: &str,
        options: &QueryOptions,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<()> {
        validate_non_empty_string("query", query)?;
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }

        let transformer = RowTransformer::new(options);

        tracing::info!("running query: {}", query);
        tracing::debug!("submitting query");
        let query_id = match cancellable(cancel, self.service.start_query(query)).await {
            Ok(submitted) => submitted.map_err(QueryError::Submission)?,
            Err(err) => {
                tracing::warn!(
                    "cancelled during submission; the query may still be running on the service side"
                );
                return Err(err);
            }
        };
        tracing::info!("query id: {}", query_id);

        let mut execution = QueryExecution::new(query_id);

        loop {
            if cancel.is_cancelled() {
                return Err(QueryError::Cancelled);
            }

            let started = Instant::now();
            let page = cancellable(
                cancel,
                self.service.get_query_results(
                    &execution.query_id,
                    PAGE_SIZE,
                    execution.next_token.as_deref(),
                ),
            )
            .await?
            .map_err(QueryError::Transport)?;

            check_status(&page)?;

            let QueryPage {
                rows,
                next_token,
                total_results,
                ..
            } = page;
            let page_len = rows.len();
            tracing::debug!(
                "query {}: fetched page with {} rows",
                execution.query_id,
                page_len
            );

            for mut row in rows {
                transformer.apply(&mut row);
                sink.accept(row).map_err(QueryError::Sink)?;
                execution.record_row();
            }

            execution.observe_total(total_results);
            if page_len > 0 {
                tracing::info!("progress: {}", execution.progress());
            }

            execution.next_token = next_token;
            if execution.next_token.is_none() {
                break;
            }

            // The service hands out tokens while the query is still running;
            // empty pages mean nothing is ready yet.
            if page_len == 0 {
                let wait = options.poll_interval.saturating_sub(started.elapsed());
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(QueryError::Cancelled),
                    _ = tokio::time::sleep(wait) => {}
                }
            }
        }

        tracing::info!(
            "query {} finished, {} rows processed",
            execution.query_id,
            execution.processed
        );
        Ok(())
    }

    /// Runs `query` and returns every row in result order.
    pub async fn query_all(
        &self,
        query: &str,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Row>> {
        let mut sink = CollectSink::new();
        self.execute(query, options, &mut sink, cancel).await?;
        Ok(sink.into_rows())
    }

    /// Runs `query`, writing each row to `writer` as one JSON document per line.
    /// Returns the number of rows written.
    pub async fn query_stream<W: Write + Send>(
        &self,
        query: &str,
        options: &QueryOptions,
        writer: W,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let mut sink = JsonLinesSink::new(writer);
        self.execute(query, options, &mut sink, cancel).await?;
        Ok(sink.written())
    }
}

fn check_status(page: &QueryPage) -> Result<()> {
    match page.status {
        QueryStatus::Cancelled => Err(QueryError::QueryCancelled),
        QueryStatus::Failed => Err(QueryError::QueryFailed {
            message: page
                .error_message
                .clone()
                .unwrap_or_else(|| "no error message reported".to_string()),
        }),
        QueryStatus::TimedOut => Err(QueryError::QueryTimedOut),
        QueryStatus::Queued
        | QueryStatus::Running
        | QueryStatus::Finished
        | QueryStatus::Unknown(_) => Ok(()),
    }
}

async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(QueryError::Cancelled),
        output = fut => Ok(output),
    }
}
