//! Plain-terminal rendering of valuation timelines and portfolio statistics.
use super::ui;
use crate::core::bond::ValuationResult;
use crate::core::chart::ChartRenderer;
use crate::core::statistics::PortfolioStatistics;
use comfy_table::Cell;

/// Draws timelines as a vertical stem chart and statistics as a table.
///
/// Stem length grows with a point's emphasis level, so the start and end of a
/// timeline stand out from the interim cash flows.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalRenderer;

impl ChartRenderer for TerminalRenderer {
    type Output = String;

    fn render_timeline(&self, valuation: &ValuationResult) -> String {
        let mut lines = Vec::new();
        let mut title = valuation.title.lines();
        if let Some(head) = title.next() {
            lines.push(ui::style_text(head, ui::StyleType::Title));
        }
        lines.extend(title.map(|line| ui::style_text(line, ui::StyleType::Subtle)));
        lines.push(String::new());
        lines.push(ui::style_text(
            &valuation.axis.to_string(),
            ui::StyleType::TotalLabel,
        ));

        let width = valuation
            .timeline
            .last()
            .map_or(1, |p| p.period_index.to_string().len());
        for point in &valuation.timeline {
            let marker = if point.emphasis_level == 0 { "○" } else { "●" };
            let stem = "─".repeat(point.emphasis_level as usize * 3);
            let line = format!(
                "{:>width$} │ {marker}{stem} {}",
                point.period_index, point.amount_label
            );
            lines.push(line.trim_end().to_string());
        }

        lines.push(String::new());
        lines.push(format!(
            "{}: {}",
            ui::style_text("Present value", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", valuation.present_value),
                ui::StyleType::TotalValue
            )
        ));
        lines.join("\n")
    }

    fn render_statistics(&self, statistics: &PortfolioStatistics) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Ticker"),
            ui::header_cell("Weight"),
            ui::header_cell("Mean return"),
            ui::header_cell("Volatility"),
            ui::header_cell("CAGR"),
        ]);

        for ticker in &statistics.tickers {
            let weight = statistics.weights.get(ticker).copied().unwrap_or_default();
            let mean_return = statistics
                .returns
                .get(ticker)
                .map_or_else(ui::na_cell, |r| ui::change_cell(r * 100.0));
            let volatility = statistics
                .volatility
                .get(ticker)
                .map_or_else(ui::na_cell, |v| ui::percent_cell(*v));
            let cagr = statistics
                .cagr
                .get(ticker)
                .map_or_else(ui::na_cell, |c| ui::change_cell(*c));

            table.add_row(vec![
                Cell::new(ticker),
                ui::percent_cell(weight),
                mean_return,
                volatility,
                cagr,
            ]);
        }

        let mut output = format!(
            "Portfolio: {} ({} observations)\n\n",
            ui::style_text(&statistics.name, ui::StyleType::Title),
            statistics.observations
        );
        output.push_str(&table.to_string());

        for (label, value) in [
            ("Portfolio return", statistics.portfolio_return),
            ("Portfolio volatility (weighted)", statistics.portfolio_volatility),
            ("Portfolio volatility (covariance)", statistics.covariance_volatility),
        ] {
            output.push_str(&format!(
                "\n{}: {}",
                ui::style_text(label, ui::StyleType::TotalLabel),
                ui::style_text(
                    &format!("{:.2}%", value * 100.0),
                    ui::StyleType::TotalValue
                )
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bond::{value_coupon_bond, value_zero_bond};
    use crate::core::portfolio::{Portfolio, tests::series};

    #[test]
    fn test_render_zero_bond_timeline() {
        let valuation = value_zero_bond(100.0, 0.1, 5).unwrap();
        let output = TerminalRenderer.render_timeline(&valuation);

        assert!(output.contains("Zero bond valuation timeline"));
        assert!(output.contains("Years"));
        assert!(output.contains("0 │ ●─── Present value: 62.09"));
        assert!(output.contains("3 │ ○"));
        assert!(output.contains("5 │ ●────── Face value at maturity: 100.00"));
        assert!(output.contains("62.09"));
    }

    #[test]
    fn test_render_coupon_bond_timeline_alignment() {
        let valuation = value_coupon_bond(100.0, 0.1, 0.1, 5, false).unwrap();
        let output = TerminalRenderer.render_timeline(&valuation);

        assert!(output.contains("Periods"));
        assert!(output.contains(" 1 │ ●─── Coupon: 5.00"));
        assert!(output.contains("10 │ ●───────── Face value + coupon: 105.00"));
    }

    #[test]
    fn test_render_statistics_table() {
        let portfolio = Portfolio::from_series(
            "Tech",
            vec![
                series("MSFT", &[100.0, 110.0, 121.0]),
                series("AAPL", &[50.0, 45.0, 54.0]),
            ],
        )
        .unwrap();
        let statistics = PortfolioStatistics::compute(&portfolio).unwrap();
        let output = TerminalRenderer.render_statistics(&statistics);

        assert!(output.contains("Tech"));
        assert!(output.contains("3 observations"));
        assert!(output.contains("MSFT"));
        assert!(output.contains("AAPL"));
        assert!(output.contains("50.00%"));
        assert!(output.contains("10.00%"));
        assert!(output.contains("Portfolio return"));
        assert!(output.contains("7.50%"));
    }
}
