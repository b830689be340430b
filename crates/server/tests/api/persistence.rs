use crate::helpers::{mock_observations, spawn_app, unused_geocoder, MockHistoryClient};
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use fairweather::{
    assessment::{assess, RiskPolicy},
    NewAnalysis,
};
use hyper::{header, Method, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

fn seed_analysis() -> NewAnalysis {
    let observations = mock_observations(5);
    let assessment = assess(&observations, 5, &RiskPolicy::default()).unwrap();
    NewAnalysis {
        location_name: "Chicago, Illinois".to_string(),
        latitude: 41.9742,
        longitude: -87.9073,
        month: 7,
        day: 4,
        requested_years: 5,
        assessment,
        observations,
    }
}

async fn get(test_app: &crate::helpers::TestApp, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    test_app.app.clone().oneshot(request).await.unwrap()
}

/// A stored record round-trips through the detail page.
#[tokio::test]
async fn detail_page_renders_stored_analysis() {
    let test_app = spawn_app(Arc::new(MockHistoryClient::new()), unused_geocoder()).await;
    let record = test_app.db.save(seed_analysis()).await.unwrap();

    let response = get(&test_app, &format!("/analyses/{}", record.id)).await;
    assert!(response.status().is_success());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Chicago, Illinois"));
    assert!(html.contains("July 4"));
    assert!(html.contains("Back to dashboard"));
}

/// The CSV export carries one row per analysed year.
#[tokio::test]
async fn csv_export_has_one_row_per_year() {
    let test_app = spawn_app(Arc::new(MockHistoryClient::new()), unused_geocoder()).await;
    let record = test_app.db.save(seed_analysis()).await.unwrap();

    let response = get(&test_app, &format!("/analyses/{}/export.csv", record.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("text/csv")
    );
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .contains("weather_analysis_"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.trim_end().lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("date,year,"));
}

/// Unknown ids come back as 404s, for the page and the export alike.
#[tokio::test]
async fn missing_analysis_is_not_found() {
    let test_app = spawn_app(Arc::new(MockHistoryClient::new()), unused_geocoder()).await;
    let id = uuid::Uuid::now_v7();

    let response = get(&test_app, &format!("/analyses/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&test_app, &format!("/analyses/{id}/export.csv")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&test_app, &format!("/api/analyses/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Listings return the newest record first.
#[tokio::test]
async fn listing_orders_newest_first() {
    let test_app = spawn_app(Arc::new(MockHistoryClient::new()), unused_geocoder()).await;

    let first = test_app.db.save(seed_analysis()).await.unwrap();
    let mut second_analysis = seed_analysis();
    second_analysis.location_name = "Denver, Colorado".to_string();
    let second = test_app.db.save(second_analysis).await.unwrap();

    let response = get(&test_app, "/api/analyses?limit=10").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let listed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.id.to_string(), first.id.to_string()]);
}
