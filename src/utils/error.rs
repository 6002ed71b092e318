use crate::domain::ports::{ServiceError, SinkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Failed to submit query: {0}")]
    Submission(#[source] ServiceError),

    #[error("Query cancelled")]
    QueryCancelled,

    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    #[error("Query timed out")]
    QueryTimedOut,

    #[error("Failed to fetch query results: {0}")]
    Transport(#[source] ServiceError),

    #[error(transparent)]
    Sink(SinkError),

    #[error("Operation cancelled by caller")]
    Cancelled,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    RemoteQuery,
    Service,
    Output,
    Cancellation,
}

impl QueryError {
    pub fn invalid_argument(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } | Self::ConfigError { .. } => ErrorCategory::Input,
            Self::QueryCancelled | Self::QueryFailed { .. } | Self::QueryTimedOut => {
                ErrorCategory::RemoteQuery
            }
            Self::Submission(_) | Self::Transport(_) => ErrorCategory::Service,
            Self::Sink(_) | Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Output,
            Self::Cancelled => ErrorCategory::Cancellation,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "Check the query text and command line arguments",
            Self::ConfigError { .. } => "Check the configuration file and referenced environment variables",
            Self::Submission(_) => {
                "Check the query syntax, the event data store id and your AWS credentials"
            }
            Self::QueryCancelled => "The query was cancelled on the service side, run it again",
            Self::QueryFailed { .. } => "Fix the query according to the reported message",
            Self::QueryTimedOut => "Narrow the query time range or select fewer columns",
            Self::Transport(_) => "Check network connectivity and retry the query",
            Self::Sink(_) | Self::IoError(_) | Self::SerializationError(_) => {
                "Check that the output destination is writable"
            }
            Self::Cancelled => "The query was interrupted before completion",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::RemoteQuery => 2,
            ErrorCategory::Service => 3,
            ErrorCategory::Output => 4,
            ErrorCategory::Cancellation => 130,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
