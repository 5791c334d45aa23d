use crate::domain::model::TransformedRow;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono_tz::Tz;

/// Batch persistence. One call persists one batch as a unit or fails as a unit.
#[async_trait]
pub trait BulkLoader: Send {
    /// Returns the number of rows persisted. An empty batch is a no-op returning 0.
    async fn load(&mut self, batch: &[TransformedRow]) -> Result<u64>;
}

pub trait ConfigProvider: Send + Sync {
    fn batch_size(&self) -> usize;
    fn source_time_zone(&self) -> Tz;
}
