//! Validation of user-supplied symbol and average price.
//!
//! Shared by the CLI and the web form so both surfaces reject the same input
//! before any market data is fetched.

use crate::domain::error::GoldenStopError;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskRequest {
    pub symbol: String,
    pub average_price: f64,
}

impl RiskRequest {
    pub fn new(symbol: &str, average_price: f64) -> Result<Self, GoldenStopError> {
        let symbol = parse_symbol(symbol)?;
        if !average_price.is_finite() || average_price <= 0.0 {
            return Err(GoldenStopError::invalid_input(
                "average price must be a positive number",
            ));
        }
        Ok(Self {
            symbol,
            average_price,
        })
    }

    /// Parses raw form text. A leading `$` and thousands separators are
    /// accepted in the price.
    pub fn parse(symbol: &str, average_price: &str) -> Result<Self, GoldenStopError> {
        let cleaned: String = average_price
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if cleaned.is_empty() {
            return Err(GoldenStopError::invalid_input("average price is required"));
        }
        let price: f64 = cleaned.parse().map_err(|_| {
            GoldenStopError::invalid_input(format!(
                "average price '{}' is not a number",
                average_price.trim()
            ))
        })?;
        Self::new(symbol, price)
    }
}

fn parse_symbol(raw: &str) -> Result<String, GoldenStopError> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(GoldenStopError::invalid_input("symbol must not be empty"));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':')))
    {
        return Err(GoldenStopError::invalid_input(format!(
            "symbol contains invalid character '{bad}'"
        )));
    }
    // Keeps the symbol a single URL path segment.
    if !symbol.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(GoldenStopError::invalid_input(
            "symbol must start with a letter or digit",
        ));
    }
    Ok(symbol.to_uppercase())
}
