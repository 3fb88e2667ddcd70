//! One risk assessment: fetch recent bars, compute the levels, wrap them in a
//! report for the presentation layer.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::error::GoldenStopError;
use crate::domain::price_bar::PriceBar;
use crate::domain::request::RiskRequest;
use crate::domain::risk::{RiskParams, RiskResult, compute_risk_with};
use crate::ports::data_port::DataPort;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentSettings {
    /// Calendar days of history requested from the data source.
    pub lookback_days: u32,
    pub params: RiskParams,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            params: RiskParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub symbol: String,
    pub name: Option<String>,
    pub as_of: NaiveDate,
    pub average_price: f64,
    #[serde(flatten)]
    pub result: RiskResult,
}

impl RiskReport {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

pub fn assess(
    data_port: &dyn DataPort,
    request: &RiskRequest,
    as_of: NaiveDate,
    settings: &AssessmentSettings,
) -> Result<RiskReport, GoldenStopError> {
    let from = as_of - Duration::days(i64::from(settings.lookback_days));
    tracing::debug!(symbol = %request.symbol, %from, to = %as_of, "fetching daily bars");

    let mut bars = data_port.fetch_daily_bars(&request.symbol, from, as_of)?;
    if bars.is_empty() {
        return Err(GoldenStopError::NoData {
            symbol: request.symbol.clone(),
        });
    }
    order_bars(&mut bars)?;
    tracing::debug!(symbol = %request.symbol, bars = bars.len(), "bars received");

    let result = compute_risk_with(&bars, request.average_price, &settings.params)?;

    let name = match data_port.fetch_display_name(&request.symbol) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(symbol = %request.symbol, error = %e, "display name lookup failed");
            None
        }
    };

    tracing::info!(
        symbol = %request.symbol,
        atr = result.atr,
        risk_fraction = result.risk_fraction,
        "risk levels computed"
    );

    Ok(RiskReport {
        symbol: request.symbol.clone(),
        name,
        as_of,
        average_price: request.average_price,
        result,
    })
}

/// Sorts oldest first and rejects repeated dates.
fn order_bars(bars: &mut [PriceBar]) -> Result<(), GoldenStopError> {
    bars.sort_by_key(|b| b.date);
    if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(GoldenStopError::invalid_input(format!(
            "duplicate bar for {}",
            pair[0].date
        )));
    }
    Ok(())
}
