use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
};
use hyper::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    HeaderMap,
};
use log::error;
use std::sync::Arc;
use uuid::Uuid;

use crate::{db::AnalysisRecord, AppState};

#[utoipa::path(
    get,
    path = "/analyses/{analysis_id}/export.csv",
    params(
         ("analysis_id" = Uuid, Path, description = "Id of the stored analysis"),
    ),
    responses(
        (status = OK, description = "Flat table of the analysed years", content_type = "text/csv", body = String),
        (status = NOT_FOUND, description = "No analysis with that id"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the analysis")
    ))]
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Path(analysis_id): Path<Uuid>,
) -> Result<(HeaderMap, String), (StatusCode, String)> {
    let record = state
        .db
        .get(analysis_id)
        .await
        .map_err(|err| {
            error!("error loading analysis {analysis_id} for export: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to read the analysis".to_string(),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            format!("no analysis with id {analysis_id}"),
        ))?;

    let filename = format!(
        "weather_analysis_{}_{}_{}-{}.csv",
        record.latitude, record.longitude, record.month, record.day
    );

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
    {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }

    Ok((headers, analysis_csv(&record)))
}

/// One row per historical year, oldest first - the download twin of the
/// on-screen year table.
fn analysis_csv(record: &AnalysisRecord) -> String {
    let mut ordered: Vec<_> = record.observations.iter().collect();
    ordered.sort_by_key(|o| o.year);

    let mut csv = String::from(
        "date,year,temp_max_f,temp_min_f,temp_mean_f,wind_mph,wind_gust_mph,precip_in\n",
    );
    for observation in ordered {
        let gust = observation
            .wind_gust_mph
            .map(|g| format!("{g:.1}"))
            .unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{:.1},{:.1},{:.1},{:.1},{},{:.2}\n",
            observation.date,
            observation.year,
            observation.temp_max_f,
            observation.temp_min_f,
            observation.temp_mean_f,
            observation.wind_mph,
            gust,
            observation.precip_in,
        ));
    }
    csv
}
