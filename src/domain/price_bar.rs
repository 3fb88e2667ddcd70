//! Daily price bar representation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::GoldenStopError;

/// One trading day of OHLC data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Rejects non-finite or negative prices and inverted ranges.
    pub fn validate(&self) -> Result<(), GoldenStopError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(GoldenStopError::invalid_input(format!(
                    "bar {} has invalid {name} price {value}",
                    self.date
                )));
            }
        }
        if self.high < self.low {
            return Err(GoldenStopError::invalid_input(format!(
                "bar {} has high {} below low {}",
                self.date, self.high, self.low
            )));
        }
        Ok(())
    }
}
