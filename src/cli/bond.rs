use super::render::TerminalRenderer;
use crate::core::{BondSpec, ChartRenderer};
use anyhow::{Context, Result};
use tracing::info;

/// Values `spec` and renders it either as a terminal timeline or as JSON.
pub fn render(spec: &BondSpec, json: bool) -> Result<String> {
    let valuation = spec.value()?;
    info!(present_value = valuation.present_value, "Bond valued");

    if json {
        serde_json::to_string_pretty(&valuation).context("Failed to serialize valuation")
    } else {
        Ok(TerminalRenderer.render_timeline(&valuation))
    }
}

pub fn run(spec: &BondSpec, json: bool) -> Result<()> {
    println!("{}", render(spec, json)?);
    Ok(())
}
