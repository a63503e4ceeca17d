use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::error::{Result, SandboxError};
use crate::core::price::{
    HistoryRequest, LookbackPeriod, PricePoint, PriceSeries, PriceSeriesProvider,
    SamplingInterval,
};
use crate::providers::util::with_retry;

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

fn range_param(lookback: LookbackPeriod) -> &'static str {
    match lookback {
        LookbackPeriod::OneYear => "1y",
        LookbackPeriod::TwoYears => "2y",
        LookbackPeriod::FiveYears => "5y",
        LookbackPeriod::TenYears => "10y",
        LookbackPeriod::Max => "max",
    }
}

fn interval_param(interval: SamplingInterval) -> &'static str {
    match interval {
        SamplingInterval::Daily => "1d",
        SamplingInterval::Weekly => "1wk",
        SamplingInterval::Monthly => "1mo",
    }
}

// YahooFinanceProvider implementation for PriceSeriesProvider
pub struct YahooFinanceProvider {
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    description: String,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

/// Pairs timestamps with closes, skipping bars Yahoo reports without a close.
fn extract_points(item: &ChartItem) -> Vec<PricePoint> {
    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let date = Utc.timestamp_opt(*ts, 0).single()?.date_naive();
            close.map(|close| PricePoint { date, close })
        })
        .collect()
}

fn parse_series(ticker: &str, data: YahooChartResponse) -> Result<PriceSeries> {
    if let Some(error) = data.chart.error {
        return Err(SandboxError::data_unavailable(ticker, error.description));
    }

    let item = data
        .chart
        .result
        .as_ref()
        .and_then(|items| items.first())
        .ok_or_else(|| SandboxError::data_unavailable(ticker, "No price data found"))?;

    let points = extract_points(item);
    if points.is_empty() {
        return Err(SandboxError::data_unavailable(ticker, "No close prices found"));
    }

    Ok(PriceSeries::new(ticker, points))
}

#[async_trait]
impl PriceSeriesProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooSeriesFetch",
        skip(self, request),
        fields(ticker = %ticker)
    )]
    async fn fetch_series(&self, ticker: &str, request: &HistoryRequest) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval={}&range={}",
            self.base_url,
            ticker,
            interval_param(request.interval),
            range_param(request.lookback)
        );
        debug!("Requesting price history from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("capsandbox/0.1")
            .build()
            .map_err(|e| SandboxError::data_unavailable(ticker, e))?;
        let response = with_retry(|| client.get(&url).send(), RETRIES, RETRY_DELAY_MS)
            .await
            .map_err(|e| SandboxError::data_unavailable(ticker, format!("Request error: {e}")))?;

        debug!(response = ?response, "Received Yahoo response");

        if !response.status().is_success() {
            return Err(SandboxError::data_unavailable(
                ticker,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SandboxError::data_unavailable(ticker, e))?;
        let data: YahooChartResponse = serde_json::from_str(&text).map_err(|e| {
            SandboxError::data_unavailable(ticker, format!("Failed to parse JSON response: {e}"))
        })?;

        let series = parse_series(ticker, data)?;
        debug!(points = series.points.len(), "Parsed price history");
        Ok(series)
    }
}
