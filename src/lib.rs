pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{DryRunLoader, PostgresBulkLoader};
pub use crate::config::{toml_config::TomlConfig, EtlSettings};
pub use crate::core::{etl::EtlEngine, pipeline::TripPipeline};
pub use crate::domain::model::{RunStatistics, TransformedRow};
pub use crate::domain::ports::BulkLoader;
pub use crate::utils::error::{EtlError, Result};
