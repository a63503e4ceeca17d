//! Rendering abstraction for valuation timelines and portfolio statistics.
//!
//! The core only produces data; renderers decide how it looks. Nothing in the
//! core depends on what a renderer returns.

use crate::core::bond::ValuationResult;
use crate::core::statistics::PortfolioStatistics;

pub trait ChartRenderer {
    type Output;

    fn render_timeline(&self, valuation: &ValuationResult) -> Self::Output;

    fn render_statistics(&self, statistics: &PortfolioStatistics) -> Self::Output;
}
