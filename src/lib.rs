pub mod cli;
pub mod core;
pub mod providers;

use crate::core::BondSpec;
use crate::core::config::{AppConfig, PortfolioConfig};
use crate::core::price::{LookbackPeriod, SamplingInterval};
use anyhow::{Result, bail};
use tracing::{debug, info};

pub enum AppCommand {
    /// Value a bond and show its cash-flow timeline
    Bond { spec: BondSpec, json: bool },
    /// Review portfolios given on the command line or in the config file
    Portfolio {
        tickers: Option<String>,
        name: Option<String>,
        lookback: Option<LookbackPeriod>,
        interval: Option<SamplingInterval>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Bond { spec, json } => {
            info!("Valuing bond...");
            cli::bond::run(&spec, json)
        }
        AppCommand::Portfolio {
            tickers,
            name,
            lookback,
            interval,
        } => {
            info!("Capital budgeting sandbox starting...");

            let config = AppConfig::load_or_default(config_path)?;
            debug!("Loaded config: {config:#?}");

            let mut request = config.history;
            if let Some(lookback) = lookback {
                request.lookback = lookback;
            }
            if let Some(interval) = interval {
                request.interval = interval;
            }

            let portfolios = match tickers {
                Some(list) => vec![PortfolioConfig {
                    name: name.unwrap_or_else(|| "Portfolio".to_string()),
                    tickers: cli::portfolio::parse_tickers(&list)?,
                }],
                None => config.portfolios.clone(),
            };
            if portfolios.is_empty() {
                bail!("No tickers given and no portfolios configured");
            }

            let provider =
                providers::yahoo_finance::YahooFinanceProvider::new(config.providers.yahoo_base_url());

            cli::portfolio::run(&portfolios, &provider, &request).await
        }
    }
}
