use crate::domain::model::{table_columns, TransformedRow};
use crate::domain::ports::BulkLoader;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};

pub const DEFAULT_TABLE: &str = "trips";

/// Postgres allows 65535 bind parameters per statement; nine per row.
const MAX_ROWS_PER_STATEMENT: usize = 7000;

/// Loads each batch inside a single transaction: either every row of the
/// batch is committed or none is.
pub struct PostgresBulkLoader {
    pool: PgPool,
    table: String,
}

impl PostgresBulkLoader {
    pub async fn connect(connection_string: &str, table: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(connection_string)
            .await?;
        tracing::debug!("Connected to database, target table {}", table);
        Ok(Self::with_pool(pool, table))
    }

    pub fn with_pool(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
        }
    }

    /// Checks once, before any row is loaded, that the target table exists and
    /// has every mapped column.
    pub async fn verify_schema(&self) -> Result<()> {
        let (schema, table) = split_table(&self.table);
        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_schema = COALESCE($1::text, current_schema()::text) AND table_name = $2::text",
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        if existing.is_empty() {
            return Err(EtlError::ConfigValidationError {
                field: "database.table".to_string(),
                message: format!("table {} does not exist", self.table),
            });
        }

        let missing = missing_columns(&existing);
        if !missing.is_empty() {
            return Err(EtlError::ConfigValidationError {
                field: "database.table".to_string(),
                message: format!(
                    "table {} has no column(s): {}",
                    self.table,
                    missing.join(", ")
                ),
            });
        }

        tracing::debug!("✅ Target table {} matches the row layout", self.table);
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl BulkLoader for PostgresBulkLoader {
    async fn load(&mut self, batch: &[TransformedRow]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let to_load_error = |e: sqlx::Error| EtlError::LoadError {
            rows: batch.len(),
            message: e.to_string(),
        };

        let mut tx = self.pool.begin().await.map_err(to_load_error)?;
        for chunk in batch.chunks(MAX_ROWS_PER_STATEMENT) {
            insert_query(&self.table, chunk)
                .build()
                .execute(&mut *tx)
                .await
                .map_err(to_load_error)?;
        }
        tx.commit().await.map_err(to_load_error)?;

        Ok(batch.len() as u64)
    }
}

/// `INSERT INTO "table" ("TpepPickupDatetime", ...) VALUES (...), (...)`.
///
/// Bind order must follow `table_columns::ALL`.
pub fn insert_query<'a>(table: &str, rows: &'a [TransformedRow]) -> QueryBuilder<'a, Postgres> {
    let columns = table_columns::ALL
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut query = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        quote_table(table),
        columns
    ));
    query.push_values(rows, |mut b, row| {
        b.push_bind(row.pickup_utc)
            .push_bind(row.dropoff_utc)
            .push_bind(i16::from(row.passenger_count))
            .push_bind(row.trip_distance)
            .push_bind(&row.store_and_fwd_flag)
            .push_bind(row.pu_location_id)
            .push_bind(row.do_location_id)
            .push_bind(row.fare_amount)
            .push_bind(row.tip_amount);
    });
    query
}

fn split_table(table: &str) -> (Option<&str>, &str) {
    match table.split_once('.') {
        Some((schema, name)) => (Some(schema), name),
        None => (None, table),
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_table(table: &str) -> String {
    match split_table(table) {
        (Some(schema), name) => format!("{}.{}", quote_ident(schema), quote_ident(name)),
        (None, name) => quote_ident(name),
    }
}

fn missing_columns(existing: &[String]) -> Vec<&'static str> {
    table_columns::ALL
        .iter()
        .copied()
        .filter(|col| !existing.iter().any(|e| e == col))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn row() -> TransformedRow {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap();
        TransformedRow {
            pickup_utc: at,
            dropoff_utc: at,
            passenger_count: 2,
            trip_distance: Decimal::ONE,
            store_and_fwd_flag: "No".to_string(),
            pu_location_id: 1,
            do_location_id: 2,
            fare_amount: Decimal::TEN,
            tip_amount: Decimal::ZERO,
        }
    }

    #[test]
    fn test_insert_query_lists_mapped_columns() {
        let rows = vec![row(), row()];
        let query = insert_query("public.trips", &rows);
        let sql = query.sql();

        assert!(sql.starts_with(
            "INSERT INTO \"public\".\"trips\" (\"TpepPickupDatetime\", \"TpepDropoffDatetime\", \
\"PassengerCount\", \"TripDistance\", \"StoreAndFwdFlag\", \"PULocationID\", \"DOLocationID\", \
\"FareAmount\", \"TipAmount\") VALUES "
        ));
        assert!(sql.contains("($1, $2, $3, $4, $5, $6, $7, $8, $9)"));
        assert!(sql.ends_with("($10, $11, $12, $13, $14, $15, $16, $17, $18)"));
    }

    #[test]
    fn test_table_quoting() {
        assert_eq!(quote_table("trips"), "\"trips\"");
        assert_eq!(quote_table("etl.trips"), "\"etl\".\"trips\"");
        assert_eq!(split_table("trips"), (None, "trips"));
    }

    #[test]
    fn test_missing_columns_detected() {
        let mut existing: Vec<String> = table_columns::ALL.iter().map(|c| c.to_string()).collect();
        assert!(missing_columns(&existing).is_empty());

        existing.retain(|c| c != "TipAmount");
        assert_eq!(missing_columns(&existing), vec!["TipAmount"]);
    }
}
