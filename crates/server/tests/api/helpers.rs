use std::sync::Arc;

use axum::Router;
use fairweather::{
    app, assessment::DailyObservation, AppState, Database, GeocodeError, Geocoder, HistoryError,
    HistoryProvider, HistoryQuery, Place,
};
use fairweather::assessment::RiskPolicy;
use mockall::mock;

mock! {
    pub HistoryClient {}

    #[async_trait::async_trait]
    impl HistoryProvider for HistoryClient {
        async fn daily_history(
            &self,
            query: &HistoryQuery,
        ) -> Result<Vec<DailyObservation>, HistoryError>;
    }
}

mock! {
    pub GeocoderClient {}

    #[async_trait::async_trait]
    impl Geocoder for GeocoderClient {
        async fn resolve(&self, query: &str) -> Result<Place, GeocodeError>;
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: Arc<Database>,
}

/// Builds the full router against an in-memory database and the given
/// adapter mocks.
pub async fn spawn_app(
    history: Arc<dyn HistoryProvider>,
    geocoder: Arc<dyn Geocoder>,
) -> TestApp {
    let db = Arc::new(
        Database::in_memory()
            .await
            .expect("Failed to open in-memory database"),
    );

    let state = AppState {
        static_dir: "./static".to_string(),
        remote_url: "http://127.0.0.1:9610".to_string(),
        history,
        geocoder,
        db: db.clone(),
        lookback_years: 5,
        policy: RiskPolicy::default(),
    };

    TestApp {
        app: app(state),
        db,
    }
}

/// Calm same-date observations for `count` consecutive years.
pub fn mock_observations(count: usize) -> Vec<DailyObservation> {
    (0..count)
        .map(|i| DailyObservation {
            year: 2024 - i as i32,
            date: format!("{}-07-04", 2024 - i),
            temp_max_f: 88.0 + i as f64,
            temp_min_f: 71.0,
            temp_mean_f: 79.5,
            precip_in: 0.05,
            wind_mph: 9.0,
            wind_gust_mph: Some(14.0),
        })
        .collect()
}

/// A geocoder mock that must never be called (explicit coordinates).
pub fn unused_geocoder() -> Arc<MockGeocoderClient> {
    Arc::new(MockGeocoderClient::new())
}
