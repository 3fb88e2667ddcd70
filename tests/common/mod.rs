#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use goldenstop::domain::error::GoldenStopError;
pub use goldenstop::domain::price_bar::PriceBar;
use goldenstop::ports::data_port::DataPort;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub names: HashMap<String, String>,
    pub errors: HashMap<String, fn(&str) -> GoldenStopError>,
    pub requests: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            names: HashMap::new(),
            errors: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_name(mut self, symbol: &str, name: &str) -> Self {
        self.names.insert(symbol.to_string(), name.to_string());
        self
    }

    pub fn with_error(mut self, symbol: &str, make: fn(&str) -> GoldenStopError) -> Self {
        self.errors.insert(symbol.to_string(), make);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, GoldenStopError> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), from, to));
        if let Some(make) = self.errors.get(symbol) {
            return Err(make(symbol));
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn fetch_display_name(&self, symbol: &str) -> Result<Option<String>, GoldenStopError> {
        Ok(self.names.get(symbol).cloned())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, high: f64, low: f64, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close,
        high,
        low,
        close,
    }
}

/// `count` consecutive days with the same high, low and close.
pub fn flat_bars(start: NaiveDate, count: usize, high: f64, low: f64, close: f64) -> Vec<PriceBar> {
    (0..count)
        .map(|i| make_bar(start + Duration::days(i as i64), high, low, close))
        .collect()
}

/// Fifteen bars with high 105, low 95, close 100: ATR 10, R 0.1618.
pub fn golden_scenario_bars() -> Vec<PriceBar> {
    flat_bars(date(2024, 6, 1), 15, 105.0, 95.0, 100.0)
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, bars: &[PriceBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},1000\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
