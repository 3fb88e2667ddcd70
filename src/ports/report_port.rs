//! Report output port trait.

use std::io::Write;

use crate::domain::assessment::RiskReport;
use crate::domain::error::GoldenStopError;

/// Port for writing a computed risk report.
pub trait ReportPort {
    fn write(&self, report: &RiskReport, out: &mut dyn Write) -> Result<(), GoldenStopError>;
}
