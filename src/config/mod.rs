#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use chrono_tz::Tz;
use std::path::PathBuf;
use toml_config::TomlConfig;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Settings for one run, after the config file, command line and environment
/// have been merged.
#[derive(Debug, Clone)]
pub struct EtlSettings {
    pub input: PathBuf,
    pub duplicates: PathBuf,
    pub connection_string: Option<String>,
    pub table: String,
    pub batch_size: usize,
    pub time_zone: Tz,
    pub preflight_schema_check: bool,
    pub monitor: bool,
    pub dry_run: bool,
}

impl EtlSettings {
    /// `DATABASE_URL` takes precedence over the file's connection string.
    pub fn resolve(
        config: &TomlConfig,
        input: PathBuf,
        duplicates: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<Self> {
        let env_url = std::env::var(DATABASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self::resolve_with(config, input, duplicates, dry_run, env_url)
    }

    fn resolve_with(
        config: &TomlConfig,
        input: PathBuf,
        duplicates: Option<PathBuf>,
        dry_run: bool,
        env_url: Option<String>,
    ) -> Result<Self> {
        // 實際使用的連線字串由 Validate for EtlSettings 檢查
        config.validate_pipeline()?;

        Ok(Self {
            input,
            duplicates: duplicates
                .unwrap_or_else(|| PathBuf::from(&config.pipeline.duplicates_file)),
            connection_string: env_url.or_else(|| config.connection_string().map(str::to_string)),
            table: config.database.table.clone(),
            batch_size: config.pipeline.batch_size,
            time_zone: validation::validate_time_zone(&config.pipeline.source_time_zone)?,
            preflight_schema_check: config.database.preflight_schema_check,
            monitor: config.monitoring_enabled(),
            dry_run,
        })
    }

    /// Returns the connection string or the startup error for its absence.
    pub fn require_connection_string(&self) -> Result<&str> {
        self.connection_string
            .as_deref()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "database.connection_string".to_string(),
            })
    }
}

impl Validate for EtlSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input.to_string_lossy())?;
        validation::validate_path("duplicates", &self.duplicates.to_string_lossy())?;

        if !self.input.is_file() {
            return Err(EtlError::ConfigError {
                message: format!("Input file not found: {}", self.input.display()),
            });
        }

        if !self.dry_run {
            let conn = self.require_connection_string()?;
            validation::validate_connection_string("database.connection_string", conn)?;
        }

        Ok(())
    }
}

impl ConfigProvider for EtlSettings {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn source_time_zone(&self) -> Tz {
        self.time_zone
    }
}
