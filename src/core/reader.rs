use crate::domain::model::{input_columns, RawRecord};
use crate::utils::error::{EtlError, Result};
use csv::{ByteRecord, Reader, ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header positions of the known columns, resolved once per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    positions: [Option<usize>; 9],
}

impl ColumnLayout {
    /// Fails when any required column is absent; optional columns may be missing.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = [None; 9];
        for (slot, name) in positions.iter_mut().zip(input_columns::ALL) {
            *slot = headers
                .iter()
                .position(|h| clean_header(h).eq_ignore_ascii_case(name));
        }

        let missing: Vec<String> = input_columns::ALL
            .iter()
            .zip(positions.iter())
            .filter(|(name, pos)| pos.is_none() && input_columns::REQUIRED.contains(*name))
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EtlError::MissingColumnsError { columns: missing });
        }

        for (name, pos) in input_columns::ALL.iter().zip(positions.iter()) {
            if pos.is_none() {
                tracing::warn!("⚠️ Optional column '{}' not in header, values will default", name);
            }
        }

        Ok(Self { positions })
    }

    /// 非 UTF-8 位元組以替換字元解碼，該列照常走欄位規則
    fn extract(&self, record: &ByteRecord) -> RawRecord {
        let field = |i: usize| {
            self.positions[i]
                .and_then(|pos| record.get(pos))
                .map(|v| String::from_utf8_lossy(v).trim().to_string())
        };

        RawRecord {
            pickup_datetime: field(0),
            dropoff_datetime: field(1),
            passenger_count: field(2),
            trip_distance: field(3),
            store_and_fwd_flag: field(4),
            pu_location_id: field(5),
            do_location_id: field(6),
            fare_amount: field(7),
            tip_amount: field(8),
        }
    }
}

fn clean_header(raw: &str) -> &str {
    raw.trim().trim_start_matches('\u{feff}').trim()
}

/// Streams trip records one at a time. Empty lines are skipped and every field
/// is trimmed.
pub struct TripReader<R: Read> {
    reader: Reader<R>,
    layout: ColumnLayout,
    record: ByteRecord,
}

impl TripReader<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }
}

impl<R: Read> TripReader<R> {
    pub fn from_reader(inner: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(inner);

        let layout = ColumnLayout::from_headers(reader.headers()?)?;

        Ok(Self {
            reader,
            layout,
            record: ByteRecord::new(),
        })
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Returns `Ok(None)` at end of stream.
    pub fn next_record(&mut self) -> Result<Option<RawRecord>> {
        if self.reader.read_byte_record(&mut self.record)? {
            Ok(Some(self.layout.extract(&self.record)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "tpep_pickup_datetime,tpep_dropoff_datetime,passenger_count,trip_distance,\
store_and_fwd_flag,PULocationID,DOLocationID,fare_amount,tip_amount";

    #[test]
    fn test_reads_and_trims_fields() {
        let input = format!(
            "{}\n 2024-01-01 08:00:00 , 2024-01-01 08:10:00 ,1, 1.5 ,N,132,48,10.0,2\n",
            HEADER
        );
        let mut reader = TripReader::from_reader(input.as_bytes()).unwrap();
        let record = reader.next_record().unwrap().unwrap();

        assert_eq!(record.pickup_datetime.as_deref(), Some("2024-01-01 08:00:00"));
        assert_eq!(record.trip_distance.as_deref(), Some("1.5"));
        assert_eq!(record.tip_amount.as_deref(), Some("2"));
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let input = format!(
            "{}\n\n2024-01-01 08:00:00,2024-01-01 08:10:00,1,1,N,1,2,3,4\n\n",
            HEADER
        );
        let mut reader = TripReader::from_reader(input.as_bytes()).unwrap();
        assert!(reader.next_record().unwrap().is_some());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_columns_resolved_by_name_not_position() {
        let input = "passenger_count,tpep_dropoff_datetime,tpep_pickup_datetime\n\
2,2024-01-01 08:10:00,2024-01-01 08:00:00\n";
        let mut reader = TripReader::from_reader(input.as_bytes()).unwrap();
        let record = reader.next_record().unwrap().unwrap();

        assert_eq!(record.passenger_count.as_deref(), Some("2"));
        assert_eq!(record.pickup_datetime.as_deref(), Some("2024-01-01 08:00:00"));
        assert_eq!(record.fare_amount, None);
    }

    #[test]
    fn test_missing_required_column_fails_fast() {
        let input = "tpep_pickup_datetime,passenger_count\n2024-01-01 08:00:00,1\n";
        match TripReader::from_reader(input.as_bytes()) {
            Err(EtlError::MissingColumnsError { columns }) => {
                assert_eq!(columns, vec!["tpep_dropoff_datetime".to_string()]);
            }
            other => panic!("expected missing column error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let input = format!("\u{feff}{}\n", HEADER);
        assert!(TripReader::from_reader(input.as_bytes()).is_ok());
    }

    #[test]
    fn test_short_rows_leave_trailing_fields_empty() {
        let input = format!("{}\n2024-01-01 08:00:00,2024-01-01 08:10:00\n", HEADER);
        let mut reader = TripReader::from_reader(input.as_bytes()).unwrap();
        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.passenger_count, None);
    }

    #[test]
    fn test_invalid_utf8_field_is_decoded_lossily() {
        let mut input = format!("{}
", HEADER).into_bytes();
        input.extend_from_slice(b"2024-01-01 08:00:00,2024-01-01 08:10:00,1,1.5,\xff,132,48,10,2\n");
        input.extend_from_slice(b"2024-01-01 09:00:00,2024-01-01 09:10:00,2,1,N,1,1,1,1\n");
        let mut reader = TripReader::from_reader(input.as_slice()).unwrap();

        let record = reader.next_record().unwrap().unwrap();
        assert_eq!(record.store_and_fwd_flag.as_deref(), Some("\u{fffd}"));
        assert_eq!(record.passenger_count.as_deref(), Some("1"));
        assert_eq!(record.fare_amount.as_deref(), Some("10"));

        let next = reader.next_record().unwrap().unwrap();
        assert_eq!(next.passenger_count.as_deref(), Some("2"));
        assert!(reader.next_record().unwrap().is_none());
    }
}
