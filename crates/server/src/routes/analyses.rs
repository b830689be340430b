//! The analysis pipeline and its JSON API surface.
//!
//! One user action is one sequential pipeline run: resolve coordinates,
//! fetch the lookback years, score them, persist the record. The UI
//! fragment handler and the JSON handlers below share `run_analysis`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    assessment::assess,
    db::{AnalysisRecord, NewAnalysis},
    geocode::{GeocodeError, Place},
    openmeteo::{valid_month_day, HistoryError, HistoryQuery},
    AppState,
};

/// Parameters for one analysis run. Explicit coordinates win over the
/// free-text location; the location then only names the record.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Target calendar month, 1-12.
    pub month: u8,
    /// Target calendar day, 1-31 (Feb 29 allowed; resolved per year).
    pub day: u8,
}

/// Returned when a location query matches several places; pick one and
/// resubmit with its coordinates.
#[derive(Debug, Serialize, ToSchema)]
pub struct AmbiguousLocation {
    pub query: String,
    pub candidates: Vec<Place>,
}

pub(crate) enum AnalysisOutcome {
    Saved(AnalysisRecord),
    Ambiguous {
        query: String,
        candidates: Vec<Place>,
    },
}

pub(crate) enum AnalysisFailure {
    /// The request itself is unusable; retrying unchanged will not help.
    Invalid(String),
    /// An upstream collaborator failed; worth retrying.
    Unavailable(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AnalysisFailure {
    fn into_response(self) -> Response {
        match self {
            AnalysisFailure::Invalid(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            AnalysisFailure::Unavailable(message) => {
                (StatusCode::BAD_GATEWAY, message).into_response()
            }
            AnalysisFailure::Internal(err) => {
                error!("analysis failed: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to store analysis".to_string(),
                )
                    .into_response()
            }
        }
    }
}

pub(crate) async fn run_analysis(
    state: &Arc<AppState>,
    request: AnalyzeRequest,
) -> Result<AnalysisOutcome, AnalysisFailure> {
    if !valid_month_day(request.month, request.day) {
        return Err(AnalysisFailure::Invalid(format!(
            "{}/{} is not a valid calendar date",
            request.month, request.day
        )));
    }

    let place = match resolve_place(state, &request).await? {
        Resolved::Place(place) => place,
        Resolved::Ambiguous { query, candidates } => {
            return Ok(AnalysisOutcome::Ambiguous { query, candidates })
        }
    };

    let query = HistoryQuery {
        latitude: place.latitude,
        longitude: place.longitude,
        month: request.month,
        day: request.day,
        years: state.lookback_years,
    };

    let observations = match state.history.daily_history(&query).await {
        Ok(observations) => observations,
        Err(HistoryError::Partial(partial)) => {
            for failure in &partial.failures {
                warn!("missing lookback year {}: {}", failure.year, failure.reason);
            }
            partial.observations
        }
        Err(err) => return Err(AnalysisFailure::Unavailable(err.to_string())),
    };

    let assessment = assess(&observations, state.lookback_years, &state.policy)
        .map_err(|err| AnalysisFailure::Unavailable(err.to_string()))?;

    let record = state
        .db
        .save(NewAnalysis {
            location_name: place.name,
            latitude: place.latitude,
            longitude: place.longitude,
            month: request.month,
            day: request.day,
            requested_years: state.lookback_years,
            assessment,
            observations,
        })
        .await
        .map_err(AnalysisFailure::Internal)?;

    Ok(AnalysisOutcome::Saved(record))
}

enum Resolved {
    Place(Place),
    Ambiguous {
        query: String,
        candidates: Vec<Place>,
    },
}

async fn resolve_place(
    state: &Arc<AppState>,
    request: &AnalyzeRequest,
) -> Result<Resolved, AnalysisFailure> {
    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let (Some(latitude), Some(longitude)) = (request.latitude, request.longitude) {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AnalysisFailure::Invalid(format!(
                "{latitude}, {longitude} is not a valid coordinate pair"
            )));
        }
        let name = location
            .map(str::to_string)
            .unwrap_or_else(|| format!("{latitude:.4}, {longitude:.4}"));
        return Ok(Resolved::Place(Place {
            name,
            latitude,
            longitude,
        }));
    }

    let Some(query) = location else {
        return Err(AnalysisFailure::Invalid(
            "provide a location name or an explicit coordinate pair".to_string(),
        ));
    };

    match state.geocoder.resolve(query).await {
        Ok(place) => Ok(Resolved::Place(place)),
        Err(GeocodeError::Ambiguous {
            query, candidates, ..
        }) => Ok(Resolved::Ambiguous { query, candidates }),
        Err(err @ GeocodeError::NotFound(_)) => Err(AnalysisFailure::Invalid(err.to_string())),
        Err(err @ GeocodeError::Network(_)) => Err(AnalysisFailure::Unavailable(err.to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/api/analyses",
    request_body = AnalyzeRequest,
    responses(
        (status = CREATED, description = "Analysis completed and stored", body = AnalysisRecord),
        (status = CONFLICT, description = "Location query matched several places", body = AmbiguousLocation),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid location or calendar date"),
        (status = BAD_GATEWAY, description = "Weather archive or geocoder unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to store the analysis")
    ))]
pub async fn create_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    match run_analysis(&state, request).await {
        Ok(AnalysisOutcome::Saved(record)) => {
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Ok(AnalysisOutcome::Ambiguous { query, candidates }) => (
            StatusCode::CONFLICT,
            Json(AmbiguousLocation { query, candidates }),
        )
            .into_response(),
        Err(failure) => failure.into_response(),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Maximum number of records to return (default 10, cap 100)
    pub limit: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/analyses",
    params(ListParams),
    responses(
        (status = OK, description = "Stored analyses, newest first", body = Vec<AnalysisRecord>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read stored analyses")
    ))]
pub async fn list_analyses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<AnalysisRecord>>, (StatusCode, String)> {
    let limit = params.limit.unwrap_or(10).min(100);
    let records = state.db.list_recent(limit).await.map_err(|err| {
        error!("error listing analyses: {err:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to read stored analyses".to_string(),
        )
    })?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/analyses/{analysis_id}",
    params(
        ("analysis_id" = Uuid, Path, description = "Id of the stored analysis"),
    ),
    responses(
        (status = OK, description = "The stored analysis", body = AnalysisRecord),
        (status = NOT_FOUND, description = "No analysis with that id"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the analysis")
    ))]
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(analysis_id): Path<Uuid>,
) -> Result<Json<AnalysisRecord>, (StatusCode, String)> {
    let record = state.db.get(analysis_id).await.map_err(|err| {
        error!("error loading analysis {analysis_id}: {err:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to read the analysis".to_string(),
        )
    })?;

    record.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        format!("no analysis with id {analysis_id}"),
    ))
}
