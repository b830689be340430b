use crate::helpers::{mock_observations, spawn_app, unused_geocoder, MockHistoryClient};
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use fairweather::{HistoryError, PartialHistory, Place, YearFailure};
use hyper::{header, Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A full run with explicit coordinates is stored and retrievable.
#[tokio::test]
async fn create_analysis_persists_and_lists() {
    let mut history = MockHistoryClient::new();
    history
        .expect_daily_history()
        .withf(|query| {
            query.month == 7 && query.day == 4 && query.years == 5 && query.latitude == 25.7743
        })
        .times(1)
        .returning(|_| Ok(mock_observations(5)));

    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/analyses",
            json!({ "latitude": 25.7743, "longitude": -80.1937, "month": 7, "day": 4 }),
        ))
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::CREATED);
    let record = body_json(response).await;
    assert_eq!(record["assessment"]["sample_years"], 5);
    assert_eq!(record["assessment"]["requested_years"], 5);
    assert_eq!(record["location_name"], "25.7743, -80.1937");
    let id = record["id"].as_str().unwrap().to_string();

    // The record shows up in the listing and by id.
    let response = test_app
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/analyses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());

    let response = test_app
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(format!("/api/analyses/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["id"], id.as_str());
}

/// Surviving years from a partial fetch are accepted and annotated.
#[tokio::test]
async fn partial_history_is_accepted_and_annotated() {
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
                    reason: "no daily values for this date".to_string(),
                },
            ],
        }))
    });

    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/analyses",
            json!({ "latitude": 25.7743, "longitude": -80.1937, "month": 7, "day": 4 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let record = body_json(response).await;
    assert_eq!(record["assessment"]["sample_years"], 3);
    assert_eq!(record["assessment"]["requested_years"], 5);
    assert_eq!(record["observations"].as_array().unwrap().len(), 3);
}

/// Windy years drive the composite rating to High.
#[tokio::test]
async fn composite_reflects_the_worst_hazard() {
    let mut history = MockHistoryClient::new();
    history.expect_daily_history().times(1).returning(|_| {
        let mut observations = mock_observations(5);
        for observation in observations.iter_mut().take(3) {
            observation.wind_mph = 31.0;
        }
        Ok(observations)
    });

    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/analyses",
            json!({ "latitude": 41.9742, "longitude": -87.9073, "month": 7, "day": 4 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let record = body_json(response).await;
    assert_eq!(record["assessment"]["composite"], "High");
    assert_eq!(record["assessment"]["drivers"], json!(["Wind"]));
}

/// Upstream failure with no survivors surfaces as a gateway error.
#[tokio::test]
async fn unavailable_archive_is_a_bad_gateway() {
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
        .oneshot(json_request(
            Method::POST,
            "/api/analyses",
            json!({ "latitude": 0.0, "longitude": 0.0, "month": 7, "day": 4 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

/// An impossible calendar date never reaches the archive.
#[tokio::test]
async fn invalid_date_is_rejected() {
    let history = MockHistoryClient::new();
    let test_app = spawn_app(Arc::new(history), unused_geocoder()).await;

    let response = test_app
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/analyses",
            json!({ "latitude": 25.7743, "longitude": -80.1937, "month": 2, "day": 30 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// An ambiguous location query returns the candidates instead of a record.
#[tokio::test]
async fn ambiguous_location_returns_candidates() {
    let history = MockHistoryClient::new();

    let mut geocoder = crate::helpers::MockGeocoderClient::new();
    geocoder
        .expect_resolve()
        .withf(|query| query == "Springfield")
        .times(1)
        .returning(|query| {
            Err(fairweather::GeocodeError::Ambiguous {
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
        .oneshot(json_request(
            Method::POST,
            "/api/analyses",
            json!({ "location": "Springfield", "month": 7, "day": 4 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["query"], "Springfield");
    assert_eq!(body["candidates"].as_array().unwrap().len(), 2);
}
