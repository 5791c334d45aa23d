use crate::domain::model::TransformedRow;
use crate::domain::ports::BulkLoader;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Stands in for the database on `--dry-run`: counts what would be loaded.
#[derive(Debug, Default)]
pub struct DryRunLoader {
    pub batches: u64,
    pub rows: u64,
}

#[async_trait]
impl BulkLoader for DryRunLoader {
    async fn load(&mut self, batch: &[TransformedRow]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }
        self.batches += 1;
        self.rows += batch.len() as u64;
        tracing::info!("🔍 [dry run] would load batch of {} rows", batch.len());
        Ok(batch.len() as u64)
    }
}
