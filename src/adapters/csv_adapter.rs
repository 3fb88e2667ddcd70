//! CSV file data adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a `date,open,high,low,close[,volume]`
//! header. Useful offline and in tests; it never knows a display name.

use crate::domain::error::GoldenStopError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

fn parse_price(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, GoldenStopError> {
    record
        .get(index)
        .ok_or_else(|| GoldenStopError::data_source(format!("missing {name} column")))?
        .trim()
        .parse()
        .map_err(|e| GoldenStopError::data_source(format!("invalid {name} value: {e}")))
}

impl DataPort for CsvAdapter {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, GoldenStopError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GoldenStopError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            _ => GoldenStopError::data_source(format!("failed to read {}: {e}", path.display())),
        })?;
        tracing::debug!(path = %path.display(), "reading bars from csv");

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| GoldenStopError::data_source(format!("CSV parse error: {e}")))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| GoldenStopError::data_source("missing date column"))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| GoldenStopError::data_source(format!("invalid date format: {e}")))?;

            if date < from || date > to {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: parse_price(&record, 1, "open")?,
                high: parse_price(&record, 2, "high")?,
                low: parse_price(&record, 3, "low")?,
                close: parse_price(&record, 4, "close")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        fs::write(path.join("TSLA.csv"), csv_content).unwrap();
        fs::write(path.join("BAD.csv"), "date,open,high,low,close\n2024-01-15,1,x,1,1\n").unwrap();

        (dir, path)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn fetch_returns_sorted_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_daily_bars("TSLA", date(1), date(31)).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[2].date, date(17));
    }

    #[test]
    fn fetch_filters_by_window() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_daily_bars("TSLA", date(16), date(16)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(16));
    }

    #[test]
    fn missing_file_is_unknown_symbol() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_daily_bars("XYZ", date(1), date(31)).unwrap_err();
        assert!(matches!(err, GoldenStopError::SymbolNotFound { ref symbol } if symbol == "XYZ"));
    }

    #[test]
    fn malformed_price_is_data_source_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_daily_bars("BAD", date(1), date(31)).unwrap_err();
        assert!(matches!(err, GoldenStopError::DataSource { ref reason } if reason.contains("high")));
    }

    #[test]
    fn csv_source_has_no_display_name() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.fetch_display_name("TSLA").unwrap(), None);
    }
}
