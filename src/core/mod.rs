pub mod executor;
pub mod execution;
pub mod expand;
pub mod normalize;
pub mod transform;

pub use crate::domain::model::{QueryOptions, QueryPage, QueryStatus, Row};
pub use crate::domain::ports::{QueryService, RowSink};
pub use crate::utils::error::Result;
