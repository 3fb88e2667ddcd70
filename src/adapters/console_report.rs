//! Console report writers and the shared display formatting.
//!
//! Percentages are shown as `value * 100` with two decimals and a trailing
//! `%`; prices with two decimals and a `$` prefix.

use std::io::Write;

use crate::domain::assessment::RiskReport;
use crate::domain::error::GoldenStopError;
use crate::ports::report_port::ReportPort;

pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn format_price(price: f64) -> String {
    if price < 0.0 {
        format!("-${:.2}", -price)
    } else {
        format!("${price:.2}")
    }
}

/// Plain-text report, one `Label: value` line per field.
pub struct TextReport;

impl ReportPort for TextReport {
    fn write(&self, report: &RiskReport, out: &mut dyn Write) -> Result<(), GoldenStopError> {
        let r = &report.result;
        writeln!(out, "Stock Name: {}", report.display_name())?;
        writeln!(out, "Current Date: {}", report.as_of.format("%Y-%m-%d"))?;
        writeln!(out, "Current Price: {}", format_price(r.current_price))?;
        writeln!(out, "ATR ({}): {:.2}", r.atr_period, r.atr)?;
        writeln!(
            out,
            "Short Golden Stop Loss Percentage (R): {}",
            format_percent(r.risk_fraction)
        )?;
        writeln!(out, "Stop Loss Price: {}", format_price(r.stop_loss_price))?;
        writeln!(out, "Take Profit Price: {}", format_price(r.take_profit_price))?;
        Ok(())
    }
}

/// Full-precision JSON, for scripting.
pub struct JsonReport;

impl ReportPort for JsonReport {
    fn write(&self, report: &RiskReport, out: &mut dyn Write) -> Result<(), GoldenStopError> {
        serde_json::to_writer_pretty(&mut *out, report)
            .map_err(|e| GoldenStopError::Io(std::io::Error::other(e)))?;
        writeln!(out)?;
        Ok(())
    }
}
