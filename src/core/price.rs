//! Price history abstractions and core types

use crate::core::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// How far back a price history reaches.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LookbackPeriod {
    OneYear,
    TwoYears,
    #[default]
    FiveYears,
    TenYears,
    Max,
}

impl Display for LookbackPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                LookbackPeriod::OneYear => "1Y",
                LookbackPeriod::TwoYears => "2Y",
                LookbackPeriod::FiveYears => "5Y",
                LookbackPeriod::TenYears => "10Y",
                LookbackPeriod::Max => "MAX",
            }
        )
    }
}

impl FromStr for LookbackPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1Y" => Ok(LookbackPeriod::OneYear),
            "2Y" => Ok(LookbackPeriod::TwoYears),
            "5Y" => Ok(LookbackPeriod::FiveYears),
            "10Y" => Ok(LookbackPeriod::TenYears),
            "MAX" => Ok(LookbackPeriod::Max),
            _ => Err(anyhow::anyhow!("Invalid lookback period: {}", s)),
        }
    }
}

/// Spacing between consecutive samples in a price history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingInterval {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl Display for SamplingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SamplingInterval::Daily => "1D",
                SamplingInterval::Weekly => "1W",
                SamplingInterval::Monthly => "1M",
            }
        )
    }
}

impl FromStr for SamplingInterval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1D" | "DAILY" => Ok(SamplingInterval::Daily),
            "1W" | "WEEKLY" => Ok(SamplingInterval::Weekly),
            "1M" | "MONTHLY" => Ok(SamplingInterval::Monthly),
            _ => Err(anyhow::anyhow!("Invalid sampling interval: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRequest {
    #[serde(default)]
    pub lookback: LookbackPeriod,
    #[serde(default)]
    pub interval: SamplingInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Close prices for one ticker, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: &str, points: Vec<PricePoint>) -> Self {
        PriceSeries {
            ticker: ticker.to_string(),
            points,
        }
    }
}

#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Fetches the close-price history of `ticker`.
    ///
    /// Fails with `SandboxError::DataUnavailable` when the ticker cannot be
    /// resolved or has no data.
    async fn fetch_series(&self, ticker: &str, request: &HistoryRequest) -> Result<PriceSeries>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_parse_and_display() {
        for period in [
            LookbackPeriod::OneYear,
            LookbackPeriod::TwoYears,
            LookbackPeriod::FiveYears,
            LookbackPeriod::TenYears,
            LookbackPeriod::Max,
        ] {
            assert_eq!(period.to_string().parse::<LookbackPeriod>().unwrap(), period);
        }
        assert_eq!("5y".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::FiveYears);
        assert!("3M".parse::<LookbackPeriod>().is_err());
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!(
            "monthly".parse::<SamplingInterval>().unwrap(),
            SamplingInterval::Monthly
        );
        assert_eq!("1w".parse::<SamplingInterval>().unwrap(), SamplingInterval::Weekly);
        assert!("hourly".parse::<SamplingInterval>().is_err());
    }

    #[test]
    fn test_default_request() {
        let request = HistoryRequest::default();
        assert_eq!(request.lookback, LookbackPeriod::FiveYears);
        assert_eq!(request.interval, SamplingInterval::Monthly);
    }
}
