use super::render::TerminalRenderer;
use super::ui;
use crate::core::config::PortfolioConfig;
use crate::core::{
    ChartRenderer, HistoryRequest, Portfolio, PortfolioStatistics, PriceSeries,
    PriceSeriesProvider, SandboxError,
};
use anyhow::{Result, bail};
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Most tickers accepted from the command line at once.
pub const MAX_TICKERS: usize = 10;

type FetchResults = HashMap<String, Result<PriceSeries, SandboxError>>;

/// Splits a comma separated ticker list, ignoring whitespace and empty entries.
pub fn parse_tickers(input: &str) -> Result<Vec<String>> {
    let tickers: Vec<String> = input
        .replace(char::is_whitespace, "")
        .split(',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tickers.is_empty() {
        bail!("No tickers given");
    }
    if tickers.len() > MAX_TICKERS {
        bail!(
            "At most {MAX_TICKERS} tickers can be reviewed at once, got {}",
            tickers.len()
        );
    }
    Ok(tickers)
}

/// Outcome of evaluating one configured portfolio.
pub struct PortfolioReport {
    pub statistics: PortfolioStatistics,
    /// Tickers left out because their prices could not be fetched.
    pub omitted: Vec<(String, SandboxError)>,
}

/// Builds statistics from whichever tickers were fetched successfully.
pub fn evaluate(config: &PortfolioConfig, fetched: &FetchResults) -> Result<PortfolioReport> {
    let mut series = Vec::new();
    let mut omitted = Vec::new();

    for ticker in &config.tickers {
        match fetched.get(ticker) {
            Some(Ok(s)) => series.push(s.clone()),
            Some(Err(e)) => {
                warn!(ticker = %ticker, error = %e, "Omitting ticker");
                omitted.push((ticker.clone(), e.clone()));
            }
            None => {
                let e = SandboxError::data_unavailable(ticker, "not fetched");
                warn!(ticker = %ticker, "Omitting ticker without fetched prices");
                omitted.push((ticker.clone(), e));
            }
        }
    }

    if series.is_empty() {
        bail!("No price data available for portfolio {}", config.name);
    }

    let portfolio = Portfolio::from_series(&config.name, series)?;
    let statistics = PortfolioStatistics::compute(&portfolio)?;
    Ok(PortfolioReport {
        statistics,
        omitted,
    })
}

impl PortfolioReport {
    pub fn display(&self) -> String {
        let mut output = TerminalRenderer.render_statistics(&self.statistics);
        for (ticker, error) in &self.omitted {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(&format!("Omitted {ticker}: {error}"), ui::StyleType::Error)
            ));
        }
        output
    }
}

async fn fetch_all(
    portfolios: &[PortfolioConfig],
    provider: &(dyn PriceSeriesProvider + Send + Sync),
    request: &HistoryRequest,
) -> FetchResults {
    let tickers: BTreeSet<&String> = portfolios.iter().flat_map(|p| &p.tickers).collect();

    let pb = ui::new_progress_bar(tickers.len() as u64, "Fetching prices...");
    let futures = tickers.into_iter().map(|ticker| {
        let pb_clone = pb.clone();
        async move {
            let result = provider.fetch_series(ticker, request).await;
            pb_clone.inc(1);
            (ticker.clone(), result)
        }
    });

    let results = join_all(futures).await.into_iter().collect();
    pb.finish_and_clear();
    results
}

pub async fn run(
    portfolios: &[PortfolioConfig],
    provider: &(dyn PriceSeriesProvider + Send + Sync),
    request: &HistoryRequest,
) -> Result<()> {
    info!(
        portfolios = portfolios.len(),
        lookback = %request.lookback,
        interval = %request.interval,
        "Reviewing portfolios"
    );

    let fetched = fetch_all(portfolios, provider, request).await;

    let mut failures = 0;
    let count = portfolios.len();
    for (i, config) in portfolios.iter().enumerate() {
        match evaluate(config, &fetched) {
            Ok(report) => println!("{}", report.display()),
            Err(e) => {
                failures += 1;
                println!(
                    "Portfolio: {}\n{}",
                    ui::style_text(&config.name, ui::StyleType::Title),
                    ui::style_text(&e.to_string(), ui::StyleType::Error)
                );
            }
        }
        if i < count - 1 {
            ui::print_separator();
        }
    }

    if failures == count {
        bail!("None of the {count} portfolio(s) could be evaluated");
    }
    Ok(())
}
