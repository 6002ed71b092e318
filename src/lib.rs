pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "aws")]
pub use adapters::cloudtrail::CloudTrailService;
pub use adapters::sink::{CollectSink, JsonLinesSink};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::FileConfig;

pub use core::executor::QueryExecutor;
pub use domain::model::{QueryOptions, QueryPage, QueryStatus, Row};
pub use domain::ports::{QueryService, RowSink};
pub use utils::error::{QueryError, Result};
