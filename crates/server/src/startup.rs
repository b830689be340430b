use crate::{
    analysis_detail_handler, analyze_handler,
    assessment::{self, RiskPolicy},
    create_analysis, dashboard_handler,
    db::Database,
    export_csv,
    geocode::{Geocoder, NominatimClient, Place},
    get_analysis, list_analyses,
    openmeteo::{HistoryProvider, OpenMeteoClient},
    recent_handler, routes, Cli,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub static_dir: String,
    pub remote_url: String,
    pub history: Arc<dyn HistoryProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub db: Arc<Database>,
    pub lookback_years: usize,
    pub policy: RiskPolicy,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::analyses::create_analysis,
        routes::analyses::list_analyses,
        routes::analyses::get_analysis,
        routes::export::export_csv,
    ),
    components(
        schemas(
                routes::analyses::AnalyzeRequest,
                routes::analyses::AmbiguousLocation,
                crate::db::AnalysisRecord,
                assessment::RiskAssessment,
                assessment::MetricSummary,
                assessment::HazardRating,
                assessment::HazardKind,
                assessment::Severity,
                assessment::DailyObservation,
                Place
            )
    ),
    tags(
        (name = "fairweather api", description = "a RESTful api for running and retrieving historical same-date weather analyses")
    )
)]
struct ApiDoc;

pub async fn build_app_state(cli: &Cli) -> Result<AppState, anyhow::Error> {
    let history = Arc::new(
        OpenMeteoClient::new().map_err(|e| anyhow!("error building weather client: {}", e))?,
    );
    let geocoder =
        Arc::new(NominatimClient::new().map_err(|e| anyhow!("error building geocoder: {}", e))?);

    let db = Arc::new(
        Database::new(&cli.data_dir())
            .await
            .map_err(|e| anyhow!("error setting up SQLite database: {}", e))?,
    );
    db.health_check().await?;

    Ok(AppState {
        static_dir: cli.static_dir(),
        remote_url: cli.remote_url(),
        history,
        geocoder,
        db,
        lookback_years: cli.lookback_years(),
        policy: cli.risk_policy(),
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let serve_static = ServeDir::new(&app_state.static_dir);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // UI routes
        .route("/", get(dashboard_handler))
        .route("/analyses/{analysis_id}", get(analysis_detail_handler))
        .route("/analyses/{analysis_id}/export.csv", get(export_csv))
        // HTMX fragment routes
        .route("/fragments/analyze", post(analyze_handler))
        .route("/fragments/recent", get(recent_handler))
        // API routes
        .route("/api/analyses", get(list_analyses).post(create_analysis))
        .route("/api/analyses/{analysis_id}", get(get_analysis))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .nest_service("/static", serve_static)
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    log::info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    log::info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
