use clap::Parser;
use trip_etl::utils::{logger, validation::Validate};
use trip_etl::{
    BulkLoader, CliConfig, DryRunLoader, EtlEngine, EtlError, EtlSettings, PostgresBulkLoader,
    RunStatistics, TomlConfig, TripPipeline,
};

#[tokio::main]
async fn main() {
    let cli = match CliConfig::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // 參數錯誤結束碼為 1，--help / --version 為 0
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting trip-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let exit_code = match run(cli).await {
        Ok(stats) => {
            println!("✅ ETL finished");
            println!("{}", stats);
            0
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: CliConfig) -> Result<RunStatistics, EtlError> {
    // 載入設定並套用命令列覆蓋
    let mut file_config = TomlConfig::load_optional(&cli.config).map_err(as_startup_error)?;
    cli.apply_overrides(&mut file_config);

    let settings =
        EtlSettings::resolve(&file_config, cli.input, cli.duplicates, cli.dry_run)?;
    settings.validate()?;

    tracing::info!(
        "📋 batch size {}, source zone {}, duplicates -> {}",
        settings.batch_size,
        settings.time_zone,
        settings.duplicates.display()
    );

    if settings.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written to the database");
        let stats = execute(DryRunLoader::default(), &settings).await?;
        return Ok(stats);
    }

    let loader =
        PostgresBulkLoader::connect(settings.require_connection_string()?, &settings.table).await?;
    if settings.preflight_schema_check {
        loader.verify_schema().await?;
    }

    let mut engine = EtlEngine::new_with_monitoring(
        TripPipeline::new(loader, &settings),
        settings.monitor,
    );
    let result = engine.run(&settings.input, &settings.duplicates).await;
    engine.into_pipeline().into_loader().close().await;
    result
}

async fn execute<L: BulkLoader>(loader: L, settings: &EtlSettings) -> Result<RunStatistics, EtlError> {
    let mut engine =
        EtlEngine::new_with_monitoring(TripPipeline::new(loader, settings), settings.monitor);
    engine.run(&settings.input, &settings.duplicates).await
}

// A config file that exists but cannot be read is a startup problem, not a
// processing one.
fn as_startup_error(e: EtlError) -> EtlError {
    match e {
        EtlError::IoError(io) => EtlError::ConfigError {
            message: format!("Failed to read config file: {}", io),
        },
        other => other,
    }
}
