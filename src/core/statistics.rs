//! Return and volatility statistics over a portfolio's aligned price table.
//!
//! All figures are per sampling period (monthly with the default history
//! request). Returns are simple returns, `(p_t - p_{t-1}) / p_{t-1}`, and every
//! dispersion measure uses the sample (N - 1) convention.
use crate::core::error::{Result, SandboxError};
use crate::core::portfolio::Portfolio;
use anyhow::anyhow;
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Period-over-period simple returns. The first period has no return.
pub fn simple_returns(closes: &[f64]) -> Result<Vec<f64>> {
    closes
        .windows(2)
        .map(|pair| {
            let (previous, current) = (pair[0], pair[1]);
            if previous <= 0.0 {
                return Err(SandboxError::invalid_input(format!(
                    "cannot compute a return from a non-positive price {previous}"
                )));
            }
            Ok((current - previous) / previous)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let (mean_a, mean_b) = (mean(a), mean(b));
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    sum / (a.len() - 1) as f64
}

fn sample_std_dev(values: &[f64]) -> f64 {
    sample_covariance(values, values).sqrt()
}

fn return_series(portfolio: &Portfolio) -> Result<BTreeMap<String, Vec<f64>>> {
    if portfolio.dates().len() < 2 {
        return Err(SandboxError::invalid_input(format!(
            "portfolio {} needs at least 2 aligned prices to compute returns, found {}",
            portfolio.name(),
            portfolio.dates().len()
        )));
    }

    portfolio
        .tickers()
        .iter()
        .map(|ticker| {
            let closes = portfolio.closes(ticker).ok_or_else(|| {
                SandboxError::invalid_input(format!("no price column for {ticker}"))
            })?;
            Ok((ticker.clone(), simple_returns(closes)?))
        })
        .collect()
}

fn volatility_series(portfolio: &Portfolio) -> Result<BTreeMap<String, Vec<f64>>> {
    let series = return_series(portfolio)?;
    if portfolio.dates().len() < 3 {
        return Err(SandboxError::invalid_input(format!(
            "portfolio {} needs at least 3 aligned prices to compute volatility, found {}",
            portfolio.name(),
            portfolio.dates().len()
        )));
    }
    Ok(series)
}

/// Weighted sum of a per-ticker figure, joined on ticker rather than position.
fn weighted_sum(portfolio: &Portfolio, values: &BTreeMap<String, f64>) -> Result<f64> {
    let weights = portfolio.weights();
    let weight_keys: BTreeSet<&String> = weights.keys().collect();
    let value_keys: BTreeSet<&String> = values.keys().collect();
    if weight_keys != value_keys {
        return Err(SandboxError::invalid_input(format!(
            "weights {:?} and statistics {:?} cover different tickers",
            weight_keys, value_keys
        )));
    }

    Ok(portfolio
        .tickers()
        .iter()
        .map(|ticker| weights[ticker] * values[ticker])
        .sum())
}

/// Mean simple return per ticker.
pub fn per_stock_returns(portfolio: &Portfolio) -> Result<BTreeMap<String, f64>> {
    let returns: BTreeMap<String, f64> = return_series(portfolio)?
        .into_iter()
        .map(|(ticker, series)| (ticker, mean(&series)))
        .collect();
    debug!(portfolio = portfolio.name(), ?returns, "Per-stock returns");
    Ok(returns)
}

/// Sample standard deviation of each ticker's simple returns.
pub fn per_stock_volatility(portfolio: &Portfolio) -> Result<BTreeMap<String, f64>> {
    let volatility: BTreeMap<String, f64> = volatility_series(portfolio)?
        .into_iter()
        .map(|(ticker, series)| (ticker, sample_std_dev(&series)))
        .collect();
    debug!(portfolio = portfolio.name(), ?volatility, "Per-stock volatility");
    Ok(volatility)
}

pub fn portfolio_return(portfolio: &Portfolio) -> Result<f64> {
    weighted_sum(portfolio, &per_stock_returns(portfolio)?)
}

/// Weighted sum of per-stock volatilities.
///
/// This ignores co-movement between assets and so is an upper bound on the
/// true portfolio volatility; see [`portfolio_volatility_covariance`].
pub fn portfolio_volatility(portfolio: &Portfolio) -> Result<f64> {
    weighted_sum(portfolio, &per_stock_volatility(portfolio)?)
}

/// Portfolio volatility from the sample covariance matrix, `sqrt(w' S w)`.
pub fn portfolio_volatility_covariance(portfolio: &Portfolio) -> Result<f64> {
    let series = volatility_series(portfolio)?;
    let weights = portfolio.weights();

    let mut variance = 0.0;
    for a in portfolio.tickers() {
        for b in portfolio.tickers() {
            let (Some(wa), Some(wb)) = (weights.get(a), weights.get(b)) else {
                return Err(SandboxError::invalid_input(format!(
                    "missing weight for {a} or {b}"
                )));
            };
            variance += wa * wb * sample_covariance(&series[a], &series[b]);
        }
    }
    // Rounding can leave a perfectly hedged variance slightly below zero.
    Ok(variance.max(0.0).sqrt())
}

/// Shortest window that is annualised.
const MIN_CAGR_YEARS: f64 = 1.0;
/// Growth factors beyond this (or below its inverse) are not annualised.
const MAX_GROWTH_FACTOR: f64 = 1e12;

/// Compound annual growth rate, in percent, over the aligned window.
///
/// Windows shorter than a year give an empty map. Tickers whose growth cannot
/// be annualised are left out with a warning.
pub fn per_stock_cagr(portfolio: &Portfolio) -> Result<BTreeMap<String, f64>> {
    let dates = portfolio.dates();
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Err(SandboxError::invalid_input(format!(
            "portfolio {} has no aligned prices",
            portfolio.name()
        )));
    };
    let years = (*last - *first).num_days() as f64 / 365.0;
    if years < MIN_CAGR_YEARS {
        debug!(
            portfolio = portfolio.name(),
            years, "Window too short to annualise growth"
        );
        return Ok(BTreeMap::new());
    }

    let mut rates = BTreeMap::new();
    for ticker in portfolio.tickers() {
        let closes = portfolio.closes(ticker).unwrap_or_default();
        let (Some(begin), Some(end)) = (closes.first(), closes.last()) else {
            continue;
        };
        match decimal_cagr(*begin, *end, years) {
            Ok(rate) => {
                rates.insert(ticker.clone(), rate);
            }
            Err(e) => warn!(ticker = %ticker, error = %e, "Skipping growth rate"),
        }
    }
    Ok(rates)
}

fn decimal_cagr(begin: f64, end: f64, years: f64) -> anyhow::Result<f64> {
    if begin <= 0.0 || end <= 0.0 {
        return Err(anyhow!("growth rate needs positive prices"));
    }
    let growth = end / begin;
    if !growth.is_finite() || !(1.0 / MAX_GROWTH_FACTOR..=MAX_GROWTH_FACTOR).contains(&growth) {
        return Err(anyhow!("growth factor {growth} is out of range"));
    }
    let begin_bal = Decimal::from_f64(begin).ok_or_else(|| anyhow!("Invalid begin price"))?;
    let end_bal = Decimal::from_f64(end).ok_or_else(|| anyhow!("Invalid end price"))?;
    let n_years = Decimal::from_f64(years).ok_or_else(|| anyhow!("Invalid duration"))?;

    (cagr(begin_bal, end_bal, n_years) * Decimal::from(100))
        .to_f64()
        .ok_or_else(|| anyhow!("CAGR percentage conversion failed"))
}

/// Every statistic for one portfolio, computed together for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioStatistics {
    pub name: String,
    pub tickers: Vec<String>,
    pub observations: usize,
    pub weights: BTreeMap<String, f64>,
    pub returns: BTreeMap<String, f64>,
    pub volatility: BTreeMap<String, f64>,
    pub cagr: BTreeMap<String, f64>,
    pub portfolio_return: f64,
    pub portfolio_volatility: f64,
    pub covariance_volatility: f64,
}

impl PortfolioStatistics {
    pub fn compute(portfolio: &Portfolio) -> Result<Self> {
        let returns = per_stock_returns(portfolio)?;
        let volatility = per_stock_volatility(portfolio)?;

        Ok(PortfolioStatistics {
            name: portfolio.name().to_string(),
            tickers: portfolio.tickers().to_vec(),
            observations: portfolio.dates().len(),
            weights: portfolio.weights().clone(),
            portfolio_return: weighted_sum(portfolio, &returns)?,
            portfolio_volatility: weighted_sum(portfolio, &volatility)?,
            covariance_volatility: portfolio_volatility_covariance(portfolio)?,
            cagr: per_stock_cagr(portfolio)?,
            returns,
            volatility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::portfolio::tests::series;

    const EPS: f64 = 1e-9;

    fn portfolio(series_list: Vec<crate::core::price::PriceSeries>) -> Portfolio {
        Portfolio::from_series("Test", series_list).unwrap()
    }

    #[test]
    fn test_simple_returns() {
        let returns = simple_returns(&[100.0, 110.0, 99.0]).unwrap();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < EPS);
        assert!((returns[1] + 0.1).abs() < EPS);

        assert!(simple_returns(&[0.0, 10.0]).is_err());
        assert!(simple_returns(&[10.0]).unwrap().is_empty());
    }

    #[test]
    fn test_portfolio_return_two_tickers() {
        let p = portfolio(vec![
            series("A", &[100.0, 110.0]),
            series("B", &[100.0, 120.0]),
        ]);
        let returns = per_stock_returns(&p).unwrap();
        assert!((returns["A"] - 0.10).abs() < EPS);
        assert!((returns["B"] - 0.20).abs() < EPS);
        assert!((portfolio_return(&p).unwrap() - 0.15).abs() < EPS);
    }

    #[test]
    fn test_identical_series_give_identical_statistics() {
        let closes = [100.0, 104.0, 98.0, 101.0, 107.0];
        let p = portfolio(vec![
            series("A", &closes),
            series("B", &closes),
            series("C", &closes),
        ]);

        let returns = per_stock_returns(&p).unwrap();
        let volatility = per_stock_volatility(&p).unwrap();
        for ticker in ["B", "C"] {
            assert_eq!(returns[ticker], returns["A"]);
            assert_eq!(volatility[ticker], volatility["A"]);
        }

        // Perfectly correlated assets: the covariance formula agrees with the weighted sum.
        let naive = portfolio_volatility(&p).unwrap();
        let full = portfolio_volatility_covariance(&p).unwrap();
        assert!((naive - full).abs() < EPS);
        assert!((naive - volatility["A"]).abs() < EPS);
    }

    #[test]
    fn test_sample_volatility() {
        let p = portfolio(vec![series("A", &[100.0, 110.0, 99.0])]);
        let volatility = per_stock_volatility(&p).unwrap();
        // Returns 0.1 and -0.1 with mean 0: sqrt(0.02 / 1).
        assert!((volatility["A"] - 0.02_f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_hedged_pair_covariance_volatility() {
        let p = portfolio(vec![
            series("UP", &[100.0, 110.0, 99.0, 108.9]),
            series("DOWN", &[100.0, 90.0, 99.0, 89.1]),
        ]);

        let naive = portfolio_volatility(&p).unwrap();
        let full = portfolio_volatility_covariance(&p).unwrap();
        assert!((naive - 0.115_470_053_837_925_2).abs() < 1e-6);
        assert!(full < 1e-6);
    }

    #[test]
    fn test_volatility_needs_two_returns() {
        let p = portfolio(vec![series("A", &[100.0, 110.0])]);
        assert!(per_stock_returns(&p).is_ok());
        assert!(matches!(
            per_stock_volatility(&p),
            Err(SandboxError::InvalidInput(_))
        ));
        assert!(portfolio_volatility_covariance(&p).is_err());
    }

    #[test]
    fn test_returns_need_two_prices() {
        let p = portfolio(vec![series("A", &[100.0])]);
        assert!(matches!(
            per_stock_returns(&p),
            Err(SandboxError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_weighted_sum_rejects_mismatched_keys() {
        let p = portfolio(vec![
            series("A", &[100.0, 110.0]),
            series("B", &[100.0, 120.0]),
        ]);
        let values = BTreeMap::from([("A".to_string(), 0.1), ("C".to_string(), 0.2)]);
        assert!(matches!(
            weighted_sum(&p, &values),
            Err(SandboxError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_reweighted_portfolio_return() {
        let p = portfolio(vec![
            series("A", &[100.0, 110.0]),
            series("B", &[100.0, 120.0]),
        ]);
        let weights = BTreeMap::from([("A".to_string(), 0.75), ("B".to_string(), 0.25)]);
        let p = p.reweight(weights).unwrap();
        assert!((portfolio_return(&p).unwrap() - 0.125).abs() < EPS);
    }

    #[test]
    fn test_cagr_over_window() {
        // 12 monthly steps starting 2020-01-01 span 366 days (leap year).
        let mut closes = vec![100.0; 13];
        closes[12] = 110.0;
        let p = portfolio(vec![series("A", &closes)]);
        let rates = per_stock_cagr(&p).unwrap();
        let years = 366.0 / 365.0;
        let expected = (1.1_f64.powf(1.0 / years) - 1.0) * 100.0;
        assert!((rates["A"] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_cagr_skips_short_window() {
        // Two months with a huge move: not annualised, and no overflow.
        let p = portfolio(vec![series("X", &[0.01, 5.0, 1000.0])]);
        assert!(per_stock_cagr(&p).unwrap().is_empty());

        let stats = PortfolioStatistics::compute(&p).unwrap();
        assert!(stats.cagr.is_empty());
        assert!(stats.returns["X"] > 0.0);
    }

    #[test]
    fn test_cagr_skips_extreme_growth() {
        let mut extreme = vec![1.0; 13];
        extreme[0] = 1e-4;
        extreme[12] = 1e9;
        let mut steady = vec![100.0; 13];
        steady[12] = 110.0;
        let p = portfolio(vec![series("WILD", &extreme), series("CALM", &steady)]);

        let rates = per_stock_cagr(&p).unwrap();
        assert!(!rates.contains_key("WILD"));
        assert!(rates.contains_key("CALM"));
        assert!(PortfolioStatistics::compute(&p).is_ok());
    }

    #[test]
    fn test_compute_bundle() {
        let p = portfolio(vec![
            series("A", &[100.0, 110.0, 121.0]),
            series("B", &[50.0, 45.0, 54.0]),
        ]);
        let stats = PortfolioStatistics::compute(&p).unwrap();
        assert_eq!(stats.tickers, vec!["A", "B"]);
        assert_eq!(stats.observations, 3);
        assert!((stats.returns["A"] - 0.1).abs() < EPS);
        assert!((stats.returns["B"] - 0.05).abs() < EPS);
        assert!((stats.portfolio_return - 0.075).abs() < EPS);
        assert!(stats.covariance_volatility <= stats.portfolio_volatility + EPS);
    }
}
