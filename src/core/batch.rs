use crate::domain::model::TransformedRow;

pub const DEFAULT_BATCH_SIZE: usize = 5000;

#[derive(Debug)]
pub struct BatchBuffer {
    rows: Vec<TransformedRow>,
    capacity: usize,
}

impl BatchBuffer {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, row: TransformedRow) {
        self.rows.push(row);
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hands over every buffered row and leaves the buffer empty.
    pub fn drain(&mut self) -> Vec<TransformedRow> {
        std::mem::replace(&mut self.rows, Vec::with_capacity(self.capacity))
    }
}

impl Default for BatchBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn row(minute: u32) -> TransformedRow {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap();
        TransformedRow {
            pickup_utc: at,
            dropoff_utc: at,
            passenger_count: 1,
            trip_distance: Decimal::ZERO,
            store_and_fwd_flag: "No".to_string(),
            pu_location_id: 0,
            do_location_id: 0,
            fare_amount: Decimal::ZERO,
            tip_amount: Decimal::ZERO,
        }
    }

    #[test]
    fn test_fills_at_capacity() {
        let mut buffer = BatchBuffer::new(2);
        buffer.add(row(0));
        assert!(!buffer.is_full());
        buffer.add(row(1));
        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_drain_empties_and_preserves_order() {
        let mut buffer = BatchBuffer::new(3);
        buffer.add(row(0));
        buffer.add(row(1));

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], row(0));
        assert_eq!(drained[1], row(1));
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_drain_when_empty() {
        let mut buffer = BatchBuffer::default();
        assert_eq!(buffer.capacity(), DEFAULT_BATCH_SIZE);
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = BatchBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.add(row(0));
        assert!(buffer.is_full());
    }
}
