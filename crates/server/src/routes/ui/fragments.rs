use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Html,
};
use serde::{Deserialize, Deserializer};

use crate::{
    routes::analyses::{run_analysis, AnalysisFailure, AnalysisOutcome, AnalyzeRequest},
    templates::{analysis_error, analysis_result, geocode_choices, recent_analyses_rows},
    AppState,
};

const RECENT_LIMIT: u32 = 10;

/// Fired on successful saves so the history table refreshes itself.
const SAVED_EVENT: &str = "analysis-saved";

/// The analyze form as the browser submits it. Number inputs arrive as
/// empty strings when untouched, so they need the lenient deserializer.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub longitude: Option<f64>,
    pub month: u8,
    pub day: u8,
}

impl From<AnalyzeForm> for AnalyzeRequest {
    fn from(form: AnalyzeForm) -> Self {
        AnalyzeRequest {
            location: form.location,
            latitude: form.latitude,
            longitude: form.longitude,
            month: form.month,
            day: form.day,
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Handler for the analyze form (POST /fragments/analyze)
///
/// Always answers 200 with an HTML fragment; failures render an error
/// box with a retry button instead of an HTTP error page.
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AnalyzeForm>,
) -> (HeaderMap, Html<String>) {
    let month = form.month;
    let day = form.day;

    match run_analysis(&state, form.into()).await {
        Ok(AnalysisOutcome::Saved(record)) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                HeaderName::from_static("hx-trigger"),
                HeaderValue::from_static(SAVED_EVENT),
            );
            (headers, Html(analysis_result(&record).into_string()))
        }
        Ok(AnalysisOutcome::Ambiguous { query, candidates }) => (
            HeaderMap::new(),
            Html(geocode_choices(&query, &candidates, month, day).into_string()),
        ),
        Err(AnalysisFailure::Invalid(message)) | Err(AnalysisFailure::Unavailable(message)) => (
            HeaderMap::new(),
            Html(analysis_error(&message).into_string()),
        ),
        Err(AnalysisFailure::Internal(err)) => {
            log::error!("analysis failed: {err:#}");
            (
                HeaderMap::new(),
                Html(analysis_error("something went wrong while storing the result").into_string()),
            )
        }
    }
}

/// Handler for the history table body (GET /fragments/recent)
pub async fn recent_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let recent = state
        .db
        .list_recent(RECENT_LIMIT)
        .await
        .unwrap_or_default();
    Html(recent_analyses_rows(&recent).into_string())
}
