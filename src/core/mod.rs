//! Valuation and portfolio statistics core

pub mod bond;
pub mod chart;
pub mod config;
pub mod error;
pub mod log;
pub mod portfolio;
pub mod price;
pub mod statistics;
pub mod validate;

// Re-export main types for cleaner imports
pub use bond::{BondSpec, Compounding, ValuationResult};
pub use chart::ChartRenderer;
pub use error::SandboxError;
pub use portfolio::Portfolio;
pub use price::{HistoryRequest, PriceSeries, PriceSeriesProvider};
pub use statistics::PortfolioStatistics;
