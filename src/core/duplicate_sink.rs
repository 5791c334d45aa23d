use crate::domain::model::{format_utc, input_columns, RawRecord, TransformedRow};
use crate::utils::error::{EtlError, Result};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Audit file of rejected duplicate rows, in input column order.
///
/// Timestamps are written as UTC ISO-8601 and the store-and-forward flag in
/// normalized form; the remaining fields are passed through as read.
pub struct DuplicateSink<W: Write> {
    writer: Writer<W>,
    rows_written: u64,
}

impl DuplicateSink<File> {
    /// Creates or truncates the file at `path` and writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        tracing::debug!("Duplicates will be written to {}", path.as_ref().display());
        Self::from_writer(file)
    }
}

impl<W: Write> DuplicateSink<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(input_columns::ALL)?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn write(&mut self, raw: &RawRecord, row: &TransformedRow) -> Result<()> {
        let passthrough = |field: &Option<String>| field.as_deref().unwrap_or("").to_string();

        self.writer.write_record([
            format_utc(&row.pickup_utc),
            format_utc(&row.dropoff_utc),
            row.passenger_count.to_string(),
            passthrough(&raw.trip_distance),
            row.store_and_fwd_flag.clone(),
            passthrough(&raw.pu_location_id),
            passthrough(&raw.do_location_id),
            passthrough(&raw.fare_amount),
            passthrough(&raw.tip_amount),
        ])?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| EtlError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string())))
    }
}
