//! HTML templates using Askama.

use askama::Template;

use crate::adapters::console_report::{format_percent, format_price};
use crate::domain::assessment::RiskReport;
use crate::domain::error::{ErrorKind, GoldenStopError};

/// Pre-formatted report fields for display.
pub struct ReportView {
    pub name: String,
    pub symbol: String,
    pub as_of: String,
    pub current_price: String,
    pub average_price: String,
    pub atr_period: usize,
    pub atr: String,
    pub risk_percent: String,
    pub stop_loss: String,
    pub take_profit: String,
}

impl From<&RiskReport> for ReportView {
    fn from(report: &RiskReport) -> Self {
        let r = &report.result;
        Self {
            name: report.display_name().to_string(),
            symbol: report.symbol.clone(),
            as_of: report.as_of.format("%Y-%m-%d").to_string(),
            current_price: format_price(r.current_price),
            average_price: format_price(report.average_price),
            atr_period: r.atr_period,
            atr: format!("{:.2}", r.atr),
            risk_percent: format_percent(r.risk_fraction),
            stop_loss: format_price(r.stop_loss_price),
            take_profit: format_price(r.take_profit_price),
        }
    }
}

pub struct ErrorView {
    pub title: &'static str,
    pub message: String,
}

impl From<&GoldenStopError> for ErrorView {
    fn from(err: &GoldenStopError) -> Self {
        let title = match err.kind() {
            ErrorKind::Credentials => "Credentials problem",
            ErrorKind::SymbolNotFound => "Symbol not found",
            ErrorKind::InsufficientHistory => "Not enough history",
            ErrorKind::InvalidInput => "Invalid input",
            ErrorKind::DataSource => "Data provider unavailable",
            ErrorKind::Config | ErrorKind::Io => "Server error",
        };
        Self {
            title,
            message: err.user_message(),
        }
    }
}

/// The whole page: form plus the latest outcome, if any.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub symbol: String,
    pub average_price: String,
    pub report: Option<ReportView>,
    pub error: Option<ErrorView>,
}

impl IndexTemplate {
    pub fn blank() -> Self {
        Self {
            symbol: String::new(),
            average_price: String::new(),
            report: None,
            error: None,
        }
    }
}

/// The result panel alone, swapped in by HTMX.
#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultTemplate {
    pub report: Option<ReportView>,
    pub error: Option<ErrorView>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
