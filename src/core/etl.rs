use crate::core::pipeline::TripPipeline;
use crate::core::BulkLoader;
use crate::domain::model::RunStatistics;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::Path;
use std::time::Instant;

pub struct EtlEngine<L: BulkLoader> {
    pipeline: TripPipeline<L>,
}

impl<L: BulkLoader> EtlEngine<L> {
    pub fn new(pipeline: TripPipeline<L>) -> Self {
        Self { pipeline }
    }

    pub fn new_with_monitoring(pipeline: TripPipeline<L>, monitor_enabled: bool) -> Self {
        Self {
            pipeline: pipeline.with_monitor(SystemMonitor::new(monitor_enabled)),
        }
    }

    pub async fn run(&mut self, input: &Path, duplicates: &Path) -> Result<RunStatistics> {
        let started = Instant::now();
        self.pipeline.monitor_mut().log_stats("start");

        let result = self.pipeline.run(input, duplicates).await;

        let monitor = self.pipeline.monitor_mut();
        if monitor.is_enabled() {
            monitor.log_final_stats();
        }

        let stats = result?;
        tracing::info!(
            "ETL finished in {:.1}s ({} rows read, {} skipped, {} batches)",
            started.elapsed().as_secs_f64(),
            stats.rows_read,
            stats.rows_skipped,
            stats.batches_flushed
        );
        Ok(stats)
    }

    pub fn pipeline(&self) -> &TripPipeline<L> {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> TripPipeline<L> {
        self.pipeline
    }
}
