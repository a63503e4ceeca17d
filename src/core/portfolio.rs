//! Equal-weighted portfolios assembled from aligned price histories.
use crate::core::error::{Result, SandboxError};
use crate::core::price::{HistoryRequest, PriceSeries, PriceSeriesProvider};
use crate::core::validate;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// A named set of tickers whose close prices share one date index.
///
/// Built once by [`Portfolio::assemble`] or [`Portfolio::from_series`] and only
/// read afterwards. Weights always cover exactly the portfolio's tickers and sum
/// to one; [`Portfolio::reweight`] returns a new portfolio instead of mutating.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    name: String,
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: HashMap<String, Vec<f64>>,
    weights: BTreeMap<String, f64>,
}

fn check_tickers<S: AsRef<str>>(tickers: &[S]) -> Result<()> {
    if tickers.is_empty() {
        return Err(SandboxError::invalid_input(
            "a portfolio needs at least one ticker",
        ));
    }
    let mut seen = HashSet::new();
    for ticker in tickers {
        let ticker = ticker.as_ref();
        if ticker.trim().is_empty() {
            return Err(SandboxError::invalid_input("ticker symbols cannot be empty"));
        }
        if !seen.insert(ticker) {
            return Err(SandboxError::invalid_input(format!(
                "ticker {ticker} is listed more than once"
            )));
        }
    }
    Ok(())
}

fn equal_weights(tickers: &[String]) -> BTreeMap<String, f64> {
    let weight = 1.0 / tickers.len() as f64;
    tickers.iter().map(|t| (t.clone(), weight)).collect()
}

impl Portfolio {
    /// Fetches every ticker through `provider` and builds an equal-weighted portfolio.
    ///
    /// A fetch failure aborts the whole assembly and is returned unchanged.
    pub async fn assemble<S: AsRef<str> + Sync>(
        name: &str,
        tickers: &[S],
        provider: &(dyn PriceSeriesProvider + Send + Sync),
        request: &HistoryRequest,
    ) -> Result<Portfolio> {
        check_tickers(tickers)?;

        let mut series = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let ticker = ticker.as_ref();
            let mut fetched = provider.fetch_series(ticker, request).await?;
            fetched.ticker = ticker.to_string();
            series.push(fetched);
        }

        Portfolio::from_series(name, series)
    }

    /// Aligns already-fetched series on their common dates.
    ///
    /// Dates missing from any one series are dropped from all of them.
    pub fn from_series(name: &str, series: Vec<PriceSeries>) -> Result<Portfolio> {
        let tickers: Vec<String> = series.iter().map(|s| s.ticker.clone()).collect();
        check_tickers(&tickers)?;

        let by_date: Vec<BTreeMap<NaiveDate, f64>> = series
            .iter()
            .map(|s| {
                s.points
                    .iter()
                    .filter(|p| p.close.is_finite())
                    .map(|p| (p.date, p.close))
                    .collect()
            })
            .collect();

        let mut common: BTreeSet<NaiveDate> = by_date[0].keys().copied().collect();
        for closes in &by_date[1..] {
            common.retain(|date| closes.contains_key(date));
        }
        let dates: Vec<NaiveDate> = common.into_iter().collect();

        let mut columns = HashMap::with_capacity(tickers.len());
        for (ticker, closes) in tickers.iter().zip(&by_date) {
            let dropped = closes.len() - dates.len();
            if dropped > 0 {
                debug!(ticker = %ticker, dropped, "Dropped unaligned rows");
            }
            let column: Vec<f64> = dates.iter().map(|d| closes[d]).collect();
            columns.insert(ticker.clone(), column);
        }

        info!(
            portfolio = name,
            tickers = tickers.len(),
            rows = dates.len(),
            "Assembled portfolio"
        );

        Ok(Portfolio {
            name: name.to_string(),
            weights: equal_weights(&tickers),
            tickers,
            dates,
            columns,
        })
    }

    /// Returns a copy of this portfolio holding `weights` instead.
    ///
    /// The weights must name exactly this portfolio's tickers, be non-negative
    /// and sum to one.
    pub fn reweight(&self, weights: BTreeMap<String, f64>) -> Result<Portfolio> {
        let expected: BTreeSet<&str> = self.tickers.iter().map(String::as_str).collect();
        let given: BTreeSet<&str> = weights.keys().map(String::as_str).collect();
        if expected != given {
            return Err(SandboxError::invalid_input(format!(
                "weights must cover exactly the tickers {:?}, got {:?}",
                expected, given
            )));
        }
        if let Some((ticker, weight)) = weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(SandboxError::invalid_input(format!(
                "weight for {ticker} must be a non-negative number, got {weight}"
            )));
        }
        let total: f64 = weights.values().sum();
        if !validate::sums_to_one(total) {
            return Err(SandboxError::invalid_input(format!(
                "weights must sum to 1, got {total}"
            )));
        }

        debug!(portfolio = %self.name, ?weights, "Reweighted portfolio");
        Ok(Portfolio {
            weights,
            ..self.clone()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tickers in the order they were supplied.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// The common date index shared by every column.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self, ticker: &str) -> Option<&[f64]> {
        self.columns.get(ticker).map(Vec::as_slice)
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }
}
