//! Configuration validation.
//!
//! Every key is optional; these checks only reject values that are present
//! and unusable.

use std::net::SocketAddr;

use crate::domain::error::GoldenStopError;
use crate::ports::config_port::ConfigPort;

pub const SOURCE_POLYGON: &str = "polygon";
pub const SOURCE_CSV: &str = "csv";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), GoldenStopError> {
    validate_data_source(config)?;
    validate_lookback(config)?;
    validate_risk(config)?;
    validate_polygon(config)?;
    validate_listen(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> GoldenStopError {
    GoldenStopError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses an integer key strictly: a present but non-numeric value is an
/// error rather than a silent fallback to the default.
fn int_value(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, GoldenStopError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, "expected an integer")),
    }
}

fn float_value(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, GoldenStopError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(section, key, "expected a number")),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), GoldenStopError> {
    let source = config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| SOURCE_POLYGON.to_string());

    match source.as_str() {
        SOURCE_POLYGON => Ok(()),
        SOURCE_CSV => match config.get_string("data", "csv_dir") {
            Some(dir) if !dir.trim().is_empty() => Ok(()),
            _ => Err(GoldenStopError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_dir".to_string(),
            }),
        },
        _ => Err(invalid("data", "source", "source must be 'polygon' or 'csv'")),
    }
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), GoldenStopError> {
    if let Some(days) = int_value(config, "data", "lookback_days")? {
        if !(1..=3650).contains(&days) {
            return Err(invalid(
                "data",
                "lookback_days",
                "lookback_days must be between 1 and 3650",
            ));
        }
    }
    Ok(())
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), GoldenStopError> {
    if let Some(period) = int_value(config, "risk", "atr_period")? {
        if period < 1 {
            return Err(invalid("risk", "atr_period", "atr_period must be at least 1"));
        }
    }
    if let Some(multiplier) = float_value(config, "risk", "multiplier")? {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(invalid("risk", "multiplier", "multiplier must be positive"));
        }
    }
    Ok(())
}

fn validate_polygon(config: &dyn ConfigPort) -> Result<(), GoldenStopError> {
    if let Some(timeout) = int_value(config, "polygon", "timeout_secs")? {
        if timeout < 1 {
            return Err(invalid("polygon", "timeout_secs", "timeout_secs must be at least 1"));
        }
    }
    if let Some(retries) = int_value(config, "polygon", "max_retries")? {
        if !(0..=10).contains(&retries) {
            return Err(invalid(
                "polygon",
                "max_retries",
                "max_retries must be between 0 and 10",
            ));
        }
    }
    if let Some(url) = config.get_string("polygon", "base_url") {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("polygon", "base_url", "base_url must be an http(s) URL"));
        }
    }
    Ok(())
}

fn validate_listen(config: &dyn ConfigPort) -> Result<(), GoldenStopError> {
    if let Some(listen) = config.get_string("web", "listen") {
        if listen.trim().parse::<SocketAddr>().is_err() {
            return Err(invalid("web", "listen", "listen must be host:port"));
        }
    }
    Ok(())
}
