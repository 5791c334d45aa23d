use crate::config::toml_config::{TomlConfig, DEFAULT_CONFIG_FILE};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "trip-etl")]
#[command(about = "Load a trip-record CSV into the database, moving duplicate trips to a side file")]
pub struct CliConfig {
    /// Input CSV file
    pub input: PathBuf,

    /// Where rejected duplicates are written (default: duplicates.csv)
    pub duplicates: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Rows per bulk load call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// IANA time zone the input timestamps were recorded in
    #[arg(long)]
    pub time_zone: Option<String>,

    /// Target table, optionally schema-qualified
    #[arg(long)]
    pub table: Option<String>,

    /// Skip the target table column check before loading
    #[arg(long)]
    pub skip_schema_check: bool,

    /// Read, normalize and deduplicate without touching the database
    #[arg(long)]
    pub dry_run: bool,

    /// Log CPU and memory usage after each batch
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(batch_size) = self.batch_size {
            tracing::info!("🔧 Batch size overridden to: {}", batch_size);
            config.pipeline.batch_size = batch_size;
        }
        if let Some(zone) = &self.time_zone {
            tracing::info!("🔧 Source time zone overridden to: {}", zone);
            config.pipeline.source_time_zone = zone.clone();
        }
        if let Some(table) = &self.table {
            config.database.table = table.clone();
        }
        if self.skip_schema_check {
            config.database.preflight_schema_check = false;
        }
        if self.monitor {
            config.monitoring.get_or_insert_with(Default::default).enabled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = CliConfig::try_parse_from(["trip-etl", "trips.csv"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("trips.csv"));
        assert_eq!(cli.duplicates, None);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));

        let cli = CliConfig::try_parse_from(["trip-etl", "trips.csv", "dups.csv"]).unwrap();
        assert_eq!(cli.duplicates, Some(PathBuf::from("dups.csv")));
    }

    #[test]
    fn test_input_is_required() {
        assert!(CliConfig::try_parse_from(["trip-etl"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_file_config() {
        let cli = CliConfig::try_parse_from([
            "trip-etl",
            "trips.csv",
            "--batch-size",
            "2",
            "--time-zone",
            "UTC",
            "--table",
            "staging.trips",
            "--skip-schema-check",
            "--monitor",
        ])
        .unwrap();

        let mut config = TomlConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.pipeline.batch_size, 2);
        assert_eq!(config.pipeline.source_time_zone, "UTC");
        assert_eq!(config.database.table, "staging.trips");
        assert!(!config.database.preflight_schema_check);
        assert!(config.monitoring_enabled());
    }
}
