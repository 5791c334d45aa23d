// Adapters layer: concrete BulkLoader implementations.

pub mod dry_run;
pub mod postgres;

pub use dry_run::DryRunLoader;
pub use postgres::PostgresBulkLoader;
