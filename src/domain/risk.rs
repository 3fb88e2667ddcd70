//! Golden-ratio stop-loss / take-profit calculator.
//!
//! TR[i] = max(H[i] - L[i], |H[i] - C[i-1]|, |L[i] - C[i-1]|)
//! ATR   = mean of the last `atr_period` TR values
//! R     = multiplier * ATR / C[last]
//! stop  = average_price * (1 - R)
//! take  = average_price * (1 + 2R)

use serde::Serialize;

use crate::domain::error::GoldenStopError;
use crate::domain::price_bar::PriceBar;

pub const DEFAULT_ATR_PERIOD: usize = 14;
pub const GOLDEN_RATIO_MULTIPLIER: f64 = 1.618;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParams {
    pub atr_period: usize,
    pub multiplier: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            atr_period: DEFAULT_ATR_PERIOD,
            multiplier: GOLDEN_RATIO_MULTIPLIER,
        }
    }
}

impl RiskParams {
    /// One previous-close anchor plus one bar per TR sample.
    pub fn min_bars(&self) -> usize {
        self.atr_period + 1
    }

    fn validate(&self) -> Result<(), GoldenStopError> {
        if self.atr_period == 0 {
            return Err(GoldenStopError::invalid_input("ATR period must be at least 1"));
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(GoldenStopError::invalid_input(format!(
                "multiplier must be positive, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

/// Full-precision result of a risk computation. Rounding is left to the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskResult {
    /// Number of true ranges averaged into `atr`.
    pub atr_period: usize,
    pub atr: f64,
    pub risk_fraction: f64,
    pub current_price: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
}

/// Computes the risk levels with the 14-day ATR and the 1.618 multiplier.
pub fn compute_risk(bars: &[PriceBar], average_price: f64) -> Result<RiskResult, GoldenStopError> {
    compute_risk_with(bars, average_price, &RiskParams::default())
}

pub fn compute_risk_with(
    bars: &[PriceBar],
    average_price: f64,
    params: &RiskParams,
) -> Result<RiskResult, GoldenStopError> {
    if !average_price.is_finite() || average_price <= 0.0 {
        return Err(GoldenStopError::invalid_input(format!(
            "average price must be positive, got {average_price}"
        )));
    }
    params.validate()?;

    let atr = average_true_range(bars, params.atr_period)?;

    // average_true_range guarantees a non-empty slice
    let current_price = bars[bars.len() - 1].close;
    if current_price <= 0.0 {
        return Err(GoldenStopError::invalid_input(format!(
            "current price must be positive, got {current_price}"
        )));
    }

    if !atr.is_finite() {
        return Err(GoldenStopError::invalid_input(
            "price ranges are too large to average",
        ));
    }

    let risk_fraction = params.multiplier * atr / current_price;
    let stop_loss_price = average_price * (1.0 - risk_fraction);
    let take_profit_price = average_price * (1.0 + 2.0 * risk_fraction);
    if !(risk_fraction.is_finite() && stop_loss_price.is_finite() && take_profit_price.is_finite()) {
        return Err(GoldenStopError::invalid_input(format!(
            "risk fraction is not finite for current price {current_price}"
        )));
    }

    Ok(RiskResult {
        atr_period: params.atr_period,
        atr,
        risk_fraction,
        current_price,
        stop_loss_price,
        take_profit_price,
    })
}

/// Mean of the most recent `period` true ranges. Needs `period + 1` bars;
/// every bar is validated, not only the ones inside the window.
pub fn average_true_range(bars: &[PriceBar], period: usize) -> Result<f64, GoldenStopError> {
    if period == 0 {
        return Err(GoldenStopError::invalid_input("ATR period must be at least 1"));
    }
    let minimum = period + 1;
    if bars.len() < minimum {
        return Err(GoldenStopError::InsufficientData {
            bars: bars.len(),
            minimum,
        });
    }
    for bar in bars {
        bar.validate()?;
    }

    let start = bars.len() - period;
    let sum: f64 = (start..bars.len())
        .map(|i| bars[i].true_range(bars[i - 1].close))
        .sum();

    Ok(sum / period as f64)
}
