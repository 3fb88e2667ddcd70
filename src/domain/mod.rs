//! Core domain types and logic.

pub mod price_bar;
pub mod risk;
pub mod request;
pub mod assessment;
pub mod config_validation;
pub mod error;
