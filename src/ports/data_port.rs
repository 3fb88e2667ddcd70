//! Market data access port.

use crate::domain::error::GoldenStopError;
use crate::domain::price_bar::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` between `from` and `to` inclusive, oldest first.
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, GoldenStopError>;

    /// Human-readable company name, when the source knows one.
    fn fetch_display_name(&self, _symbol: &str) -> Result<Option<String>, GoldenStopError> {
        Ok(None)
    }
}
