pub mod batch;
pub mod dedup;
pub mod duplicate_sink;
pub mod etl;
pub mod normalizer;
pub mod pipeline;
pub mod reader;

pub use crate::domain::model::{RawRecord, RunStatistics, TransformedRow};
pub use crate::domain::ports::{BulkLoader, ConfigProvider};
pub use crate::utils::error::Result;
