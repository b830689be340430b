use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};
use log::error;
use uuid::Uuid;

use crate::{templates::analysis_page, AppState};

/// Handler for a stored analysis (GET /analyses/{analysis_id})
pub async fn analysis_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(analysis_id): Path<Uuid>,
) -> Result<Html<String>, (StatusCode, String)> {
    let record = state
        .db
        .get(analysis_id)
        .await
        .map_err(|err| {
            error!("error loading analysis {analysis_id}: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to read the analysis".to_string(),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            format!("no analysis with id {analysis_id}"),
        ))?;

    Ok(Html(
        analysis_page(&state.remote_url, &record).into_string(),
    ))
}
