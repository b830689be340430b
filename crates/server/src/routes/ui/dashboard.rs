use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::{
    templates::{dashboard_page, DashboardData},
    AppState,
};

const RECENT_LIMIT: u32 = 10;

/// Handler for the dashboard page (GET /)
pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let recent = state
        .db
        .list_recent(RECENT_LIMIT)
        .await
        .unwrap_or_default();

    let data = DashboardData {
        recent,
        lookback_years: state.lookback_years,
    };
    Html(dashboard_page(&state.remote_url, &data).into_string())
}
