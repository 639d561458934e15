pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::InflationCalculator;
use crate::core::config::AppConfig;
use crate::providers::{CachedRateProvider, EvdsProvider};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Calculate {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        json: bool,
    },
    Range,
    Months,
}

/// Wires the EVDS client, the rate cache and the calculator from configuration.
pub fn build_calculator(config: &AppConfig) -> InflationCalculator {
    let source = EvdsProvider::from_config(&config.providers.evds, config.api_key());
    let cache = store::open_rate_cache(config);
    let provider = CachedRateProvider::new(
        Arc::new(source),
        cache,
        config.fetch_window,
        config.cache.ttl(),
    );
    InflationCalculator::new(Arc::new(provider), config.reference_price)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.providers.evds.base_url,
        series = %config.providers.evds.series,
        persist = config.cache.persist,
        "Loaded config"
    );

    let calculator = build_calculator(&config);

    match command {
        AppCommand::Calculate { start, end, json } => {
            cli::calculate::run(&calculator, start, end, json).await
        }
        AppCommand::Range => {
            info!("Looking up available date range");
            cli::availability::run_range(calculator.provider()).await
        }
        AppCommand::Months => {
            info!("Looking up available months");
            cli::availability::run_months(calculator.provider()).await
        }
    }
}
