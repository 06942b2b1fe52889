use anyhow::Result;
use polymarket_schema::{
    config::{Config, EnvConfig},
    monitoring::logger::CsvLogger,
    records::{demo_records, load_records},
    runner::validate_all,
    schema::RecordValidator,
};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Polymarket snapshot validator starting...");

    // Load configuration
    let env_config = EnvConfig::load()?;
    let mut config = if Path::new(&env_config.config_path).exists() {
        info!("Loading configuration from {}", env_config.config_path);
        Config::load(&env_config.config_path)?
    } else {
        warn!("Config file {} not found, using defaults", env_config.config_path);
        Config::default()
    };
    config.apply_env(&env_config);

    info!("Validation mode: {:?}", config.validation.mode);
    info!("CSV logging: {}", config.monitoring.csv_logging);

    let records = match &config.input.path {
        Some(path) => {
            info!("Loading records from {}", path);
            load_records(path)?
        }
        None => {
            info!("No input configured, validating demo records");
            demo_records()
        }
    };

    let logger = if config.monitoring.csv_logging {
        Some(CsvLogger::new(config.monitoring.csv_log_path.clone())?)
    } else {
        None
    };

    let validator = RecordValidator::new(config.validation.mode);
    let summary = validate_all(&validator, &records, logger.as_ref())?;

    info!(
        "Done: {} validated, {} rejected",
        summary.validated, summary.rejected
    );

    Ok(())
}
