//! Web server adapter.
//!
//! A single-page form served by axum. The form posts with HTMX and receives
//! an HTML fragment; plain form posts get the whole page back.

mod error;
mod handlers;
mod templates;

pub use error::{WebError, status_from_error};
pub use handlers::*;
pub use templates::*;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::domain::assessment::AssessmentSettings;
use crate::ports::data_port::DataPort;

pub struct AppState {
    pub data_port: Arc<dyn DataPort + Send + Sync>,
    pub settings: AssessmentSettings,
    /// Fixed evaluation date; `None` means the server's local date.
    pub as_of: Option<NaiveDate>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/risk", post(handlers::submit_risk))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
