use crate::core::batch::BatchBuffer;
use crate::core::dedup::{Admission, Deduplicator};
use crate::core::duplicate_sink::DuplicateSink;
use crate::core::normalizer;
use crate::core::reader::TripReader;
use crate::domain::model::{RawRecord, RunStatistics, TransformedRow};
use crate::domain::ports::{BulkLoader, ConfigProvider};
use crate::utils::error::{EtlError, Result};
use crate::utils::monitor::SystemMonitor;
use chrono_tz::Tz;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    Streaming,
    Flushing,
    FinalFlush,
    Completed,
    Failed,
}

/// Admission gate: pickup, dropoff and passenger count must all be present and
/// parse, otherwise the row is dropped. Optional fields default instead.
pub fn admit_row(raw: &RawRecord, zone: Tz) -> Option<TransformedRow> {
    let passenger_count = normalizer::parse_passenger_count(raw.passenger_count.as_deref())?;
    let pickup_utc = normalizer::parse_timestamp(raw.pickup_datetime.as_deref(), zone)?;
    let dropoff_utc = normalizer::parse_timestamp(raw.dropoff_datetime.as_deref(), zone)?;

    Some(TransformedRow {
        pickup_utc,
        dropoff_utc,
        passenger_count,
        trip_distance: normalizer::parse_decimal_or_zero(raw.trip_distance.as_deref()),
        store_and_fwd_flag: normalizer::normalize_store_and_fwd(raw.store_and_fwd_flag.as_deref()),
        pu_location_id: normalizer::parse_location_id(raw.pu_location_id.as_deref()),
        do_location_id: normalizer::parse_location_id(raw.do_location_id.as_deref()),
        fare_amount: normalizer::parse_decimal_or_zero(raw.fare_amount.as_deref()),
        tip_amount: normalizer::parse_decimal_or_zero(raw.tip_amount.as_deref()),
    })
}

/// Streams trips from a CSV file into a [`BulkLoader`], one record at a time.
///
/// Admitted rows are buffered and loaded every `batch_size` rows plus once more
/// for the remainder; duplicates go to the audit file. Any read, write or load
/// error aborts the run.
pub struct TripPipeline<L: BulkLoader> {
    loader: L,
    zone: Tz,
    batch_size: usize,
    state: PipelineState,
    monitor: SystemMonitor,
}

impl<L: BulkLoader> TripPipeline<L> {
    pub fn new<C: ConfigProvider>(loader: L, config: &C) -> Self {
        Self {
            loader,
            zone: config.source_time_zone(),
            batch_size: config.batch_size(),
            state: PipelineState::Initializing,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_monitor(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn into_loader(self) -> L {
        self.loader
    }

    pub(crate) fn monitor_mut(&mut self) -> &mut SystemMonitor {
        &mut self.monitor
    }

    /// Opens `input`, truncates `duplicates` and processes the whole file.
    pub async fn run(&mut self, input: &Path, duplicates: &Path) -> Result<RunStatistics> {
        self.state = PipelineState::Initializing;

        let opened = TripReader::open(input).and_then(|reader| {
            let sink = DuplicateSink::create(duplicates)?;
            Ok((reader, sink))
        });
        let (reader, sink) = match opened {
            Ok(pair) => pair,
            Err(e) => {
                self.state = PipelineState::Failed;
                tracing::error!("❌ Failed to open input/output: {}", e);
                return Err(e);
            }
        };

        tracing::info!("🚀 Starting ETL: {}", input.display());
        let (stats, _) = self.run_streams(reader, sink).await?;
        Ok(stats)
    }

    /// Processes an already opened reader and sink. The sink's inner writer is
    /// returned flushed.
    pub async fn run_streams<R: Read, W: Write>(
        &mut self,
        reader: TripReader<R>,
        sink: DuplicateSink<W>,
    ) -> Result<(RunStatistics, W)> {
        match self.drive(reader, sink).await {
            Ok(done) => Ok(done),
            Err(e) => {
                tracing::error!("❌ ETL failed in state {:?}: {}", self.state, e);
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    async fn drive<R: Read, W: Write>(
        &mut self,
        mut reader: TripReader<R>,
        mut sink: DuplicateSink<W>,
    ) -> Result<(RunStatistics, W)> {
        let mut buffer = BatchBuffer::new(self.batch_size);
        let mut dedup = Deduplicator::new();
        let mut stats = RunStatistics::default();

        self.transition(PipelineState::Streaming);
        loop {
            match self.state {
                PipelineState::Streaming => {
                    let Some(raw) = reader.next_record()? else {
                        self.transition(PipelineState::FinalFlush);
                        continue;
                    };
                    stats.rows_read += 1;

                    let Some(row) = admit_row(&raw, self.zone) else {
                        stats.rows_skipped += 1;
                        tracing::trace!(line = stats.rows_read, "row dropped by admission gate");
                        continue;
                    };

                    match dedup.admit(&row) {
                        Admission::Duplicate => {
                            sink.write(&raw, &row)?;
                            stats.total_duplicates += 1;
                        }
                        Admission::Admitted => {
                            buffer.add(row);
                            if buffer.is_full() {
                                self.transition(PipelineState::Flushing);
                            }
                        }
                    }
                }
                PipelineState::Flushing => {
                    self.flush(&mut buffer, &mut stats).await?;
                    sink.flush()?;
                    tracing::info!(
                        "Inserted batch. Total inserted: {}. Duplicates: {}",
                        stats.total_inserted,
                        stats.total_duplicates
                    );
                    self.monitor.log_stats("batch");
                    self.transition(PipelineState::Streaming);
                }
                PipelineState::FinalFlush => {
                    if !buffer.is_empty() {
                        self.flush(&mut buffer, &mut stats).await?;
                    }
                    self.transition(PipelineState::Completed);
                }
                PipelineState::Completed => break,
                PipelineState::Initializing | PipelineState::Failed => {
                    return Err(EtlError::ProcessingError {
                        message: format!("pipeline loop entered in state {:?}", self.state),
                    });
                }
            }
        }

        let inner = sink.into_inner()?;
        tracing::info!(
            "✅ Total inserted: {}. Total duplicates: {}.",
            stats.total_inserted,
            stats.total_duplicates
        );
        tracing::debug!(
            rows_read = stats.rows_read,
            rows_skipped = stats.rows_skipped,
            batches = stats.batches_flushed,
            distinct_trips = dedup.seen_count(),
            "run summary"
        );
        Ok((stats, inner))
    }

    async fn flush(&mut self, buffer: &mut BatchBuffer, stats: &mut RunStatistics) -> Result<()> {
        let batch = buffer.drain();
        tracing::debug!("Loading batch of {} rows", batch.len());
        let inserted = self.loader.load(&batch).await?;
        stats.total_inserted += inserted;
        stats.batches_flushed += 1;
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::trace!("pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
