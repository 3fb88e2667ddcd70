//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::domain::assessment::assess;
use crate::domain::request::RiskRequest;

use super::templates::{ErrorView, IndexTemplate, ReportView, ResultTemplate};
use super::{AppState, WebError, is_htmx_request, status_from_error};

pub async fn index() -> Result<Response, WebError> {
    let html = IndexTemplate::blank()
        .render()
        .map_err(|e| WebError::internal(e.to_string()))?;
    Ok(Html(html).into_response())
}

#[derive(Debug, serde::Deserialize)]
pub struct RiskFormData {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub average_price: String,
}

pub async fn submit_risk(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RiskFormData>,
) -> Result<Response, WebError> {
    let outcome = match RiskRequest::parse(&form.symbol, &form.average_price) {
        Ok(request) => {
            let state = Arc::clone(&state);
            tokio::task::spawn_blocking(move || {
                let as_of = state
                    .as_of
                    .unwrap_or_else(|| chrono::Local::now().date_naive());
                assess(&*state.data_port, &request, as_of, &state.settings)
            })
            .await
            .map_err(|e| WebError::internal(format!("assessment task failed: {e}")))?
        }
        Err(e) => Err(e),
    };

    let (status, report, error) = match outcome {
        Ok(report) => (StatusCode::OK, Some(ReportView::from(&report)), None),
        Err(e) => {
            tracing::warn!(symbol = %form.symbol, error = %e, "risk request failed");
            (status_from_error(&e), None, Some(ErrorView::from(&e)))
        }
    };

    let rendered = if is_htmx_request(&headers) {
        ResultTemplate { report, error }.render()
    } else {
        IndexTemplate {
            symbol: form.symbol,
            average_price: form.average_price,
            report,
            error,
        }
        .render()
    };
    let html = rendered.map_err(|e| WebError::internal(e.to_string()))?;

    Ok((status, Html(html)).into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
