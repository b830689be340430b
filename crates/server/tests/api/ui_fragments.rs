use crate::helpers::{mock_observations, spawn_app, unused_geocoder, MockHistoryClient};
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use fairweather::{GeocodeError, HistoryError, PartialHistory, Place, YearFailure};
use hyper::{header, Method, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, "text/html")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_html(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The dashboard renders the analyze form and an empty history box.
#[tokio::test]
async fn dashboard_renders_form_and_history() {
    let history = MockHistoryClient::new();
    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let html = body_html(response).await;
    assert!(html.contains("Plan Around the Weather"));
    assert!(html.contains("Previous Analyses"));
    assert!(html.contains("No stored analyses yet."));
}

/// A successful form submit renders the result fragment and notifies the
/// history table.
#[tokio::test]
async fn analyze_fragment_returns_result() {
    let mut history = MockHistoryClient::new();
    history
        .expect_daily_history()
        .times(1)
        .returning(|_| Ok(mock_observations(5)));

    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(form_request(
            "/fragments/analyze",
            "location=&latitude=25.7743&longitude=-80.1937&month=7&day=4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("hx-trigger")
            .and_then(|v| v.to_str().ok()),
        Some("analysis-saved")
    );

    let html = body_html(response).await;
    assert!(html.contains("25.7743, -80.1937"));
    assert!(html.contains("Hazard Ratings"));
    assert!(html.contains("Recommendations"));
    assert!(html.contains("Historical Trends"));
    assert!(html.contains("Year by Year"));
}

/// Survivors of a partial fetch render with the sample-size caveat.
#[tokio::test]
async fn analyze_fragment_flags_partial_sample() {
    let mut history = MockHistoryClient::new();
    history.expect_daily_history().times(1).returning(|_| {
        Err(HistoryError::Partial(PartialHistory {
            observations: mock_observations(3),
            failures: vec![
                YearFailure {
                    year: 2021,
                    reason: "request timed out".to_string(),
                },
                YearFailure {
                    year: 2020,
                    reason: "request timed out".to_string(),
                },
            ],
        }))
    });

    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(form_request(
            "/fragments/analyze",
            "location=&latitude=25.7743&longitude=-80.1937&month=7&day=4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_html(response).await;
    assert!(html.contains("Partial record: 3 of 5 years."));
}

/// Adapter failures render the retry affordance instead of an error page.
#[tokio::test]
async fn analyze_fragment_shows_retryable_error() {
    let mut history = MockHistoryClient::new();
    history.expect_daily_history().times(1).returning(|query| {
        Err(HistoryError::NotFound {
            latitude: query.latitude,
            longitude: query.longitude,
            reason: "no daily values for this date".to_string(),
        })
    });

    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(form_request(
            "/fragments/analyze",
            "location=&latitude=0&longitude=0&month=7&day=4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_html(response).await;
    assert!(html.contains("Analysis failed:"));
    assert!(html.contains("Try again"));
}

/// Ambiguous geocoding offers the candidates as one-click choices.
#[tokio::test]
async fn analyze_fragment_offers_geocode_candidates() {
    let history = MockHistoryClient::new();

    let mut geocoder = crate::helpers::MockGeocoderClient::new();
    geocoder.expect_resolve().times(1).returning(|query| {
        Err(GeocodeError::Ambiguous {
            query: query.to_string(),
            candidates: vec![
                Place {
                    name: "Springfield, Illinois".to_string(),
                    latitude: 39.8,
                    longitude: -89.6,
                },
                Place {
                    name: "Springfield, Missouri".to_string(),
                    latitude: 37.2,
                    longitude: -93.3,
                },
            ],
        })
    });

    let test_app = spawn_app(Arc::new(history), Arc::new(geocoder)).await;

    let response = test_app
        .app
        .clone()
        .oneshot(form_request(
            "/fragments/analyze",
            "location=Springfield&latitude=&longitude=&month=7&day=4",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_html(response).await;
    assert!(html.contains("Which location did you mean?"));
    assert!(html.contains("Springfield, Illinois"));
    assert!(html.contains("Springfield, Missouri"));
}

/// The history fragment reflects a saved analysis.
#[tokio::test]
async fn recent_fragment_lists_saved_analyses() {
    let mut history = MockHistoryClient::new();
    history
        .expect_daily_history()
        .times(1)
        .returning(|_| Ok(mock_observations(5)));

    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(form_request(
            "/fragments/analyze",
            "location=Miami%2C+Florida&latitude=25.7743&longitude=-80.1937&month=7&day=4",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/fragments/recent")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();

    let response = test_app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_html(response).await;
    assert!(html.contains("Miami, Florida"));
    assert!(html.contains("July 4"));
    assert!(html.contains("5 of 5"));
}
