use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Column names as they appear in the input header, in input order.
pub mod input_columns {
    pub const PICKUP_DATETIME: &str = "tpep_pickup_datetime";
    pub const DROPOFF_DATETIME: &str = "tpep_dropoff_datetime";
    pub const PASSENGER_COUNT: &str = "passenger_count";
    pub const TRIP_DISTANCE: &str = "trip_distance";
    pub const STORE_AND_FWD_FLAG: &str = "store_and_fwd_flag";
    pub const PU_LOCATION_ID: &str = "PULocationID";
    pub const DO_LOCATION_ID: &str = "DOLocationID";
    pub const FARE_AMOUNT: &str = "fare_amount";
    pub const TIP_AMOUNT: &str = "tip_amount";

    pub const ALL: [&str; 9] = [
        PICKUP_DATETIME,
        DROPOFF_DATETIME,
        PASSENGER_COUNT,
        TRIP_DISTANCE,
        STORE_AND_FWD_FLAG,
        PU_LOCATION_ID,
        DO_LOCATION_ID,
        FARE_AMOUNT,
        TIP_AMOUNT,
    ];

    pub const REQUIRED: [&str; 3] = [PICKUP_DATETIME, DROPOFF_DATETIME, PASSENGER_COUNT];
}

/// Column names of the target table.
pub mod table_columns {
    pub const PICKUP_DATETIME: &str = "TpepPickupDatetime";
    pub const DROPOFF_DATETIME: &str = "TpepDropoffDatetime";
    pub const PASSENGER_COUNT: &str = "PassengerCount";
    pub const TRIP_DISTANCE: &str = "TripDistance";
    pub const STORE_AND_FWD_FLAG: &str = "StoreAndFwdFlag";
    pub const PU_LOCATION_ID: &str = "PULocationID";
    pub const DO_LOCATION_ID: &str = "DOLocationID";
    pub const FARE_AMOUNT: &str = "FareAmount";
    pub const TIP_AMOUNT: &str = "TipAmount";

    pub const ALL: [&str; 9] = [
        PICKUP_DATETIME,
        DROPOFF_DATETIME,
        PASSENGER_COUNT,
        TRIP_DISTANCE,
        STORE_AND_FWD_FLAG,
        PU_LOCATION_ID,
        DO_LOCATION_ID,
        FARE_AMOUNT,
        TIP_AMOUNT,
    ];
}

/// One input line, trimmed, keyed by position. Absent columns are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub pickup_datetime: Option<String>,
    pub dropoff_datetime: Option<String>,
    pub passenger_count: Option<String>,
    pub trip_distance: Option<String>,
    pub store_and_fwd_flag: Option<String>,
    pub pu_location_id: Option<String>,
    pub do_location_id: Option<String>,
    pub fare_amount: Option<String>,
    pub tip_amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedRow {
    pub pickup_utc: DateTime<Utc>,
    pub dropoff_utc: DateTime<Utc>,
    pub passenger_count: u8,
    pub trip_distance: Decimal,
    pub store_and_fwd_flag: String,
    pub pu_location_id: i32,
    pub do_location_id: i32,
    pub fare_amount: Decimal,
    pub tip_amount: Decimal,
}

impl TransformedRow {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            pickup_utc: self.pickup_utc,
            dropoff_utc: self.dropoff_utc,
            passenger_count: self.passenger_count,
        }
    }
}

/// Trip identity: two rows with the same key are the same logical trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub pickup_utc: DateTime<Utc>,
    pub dropoff_utc: DateTime<Utc>,
    pub passenger_count: u8,
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            format_utc(&self.pickup_utc),
            format_utc(&self.dropoff_utc),
            self.passenger_count
        )
    }
}

/// Round-trip ISO-8601 form, e.g. `2024-01-01T13:00:00Z`. Sub-second digits are
/// kept when present.
pub fn format_utc(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub rows_read: u64,
    pub rows_skipped: u64,
    pub total_inserted: u64,
    pub total_duplicates: u64,
    pub batches_flushed: u64,
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total inserted: {}. Total duplicates: {}. Skipped: {} of {} rows read in {} batches.",
            self.total_inserted,
            self.total_duplicates,
            self.rows_skipped,
            self.rows_read,
            self.batches_flushed
        )
    }
}
