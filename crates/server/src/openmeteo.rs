//! Open-Meteo archive client: same-date daily observations across the
//! lookback years.
//!
//! The archive is queried once per lookback year (single-day window), so a
//! slow or failing year degrades that year only. Surviving years are
//! carried inside [`HistoryError::Partial`] and remain usable downstream.

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use std::time::Duration;
use time::{macros::format_description, Date, Month, OffsetDateTime};

use crate::assessment::DailyObservation;

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,temperature_2m_mean,\
precipitation_sum,wind_speed_10m_max,wind_gusts_10m_max";
const USER_AGENT: &str = concat!("fairweather/", env!("CARGO_PKG_VERSION"));

/// Bounded wait per year-request; a year that exceeds it is folded into
/// the partial result rather than stalling the whole analysis.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 2;

/// One analysis worth of history to retrieve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub month: u8,
    pub day: u8,
    /// How many calendar years strictly before the current one to fetch.
    pub years: usize,
}

/// A lookback year that produced no usable observation.
#[derive(Debug, Clone, PartialEq)]
pub struct YearFailure {
    pub year: i32,
    pub reason: String,
}

/// Survivors of a partially failed fetch, plus what went missing.
#[derive(Debug)]
pub struct PartialHistory {
    pub observations: Vec<DailyObservation>,
    pub failures: Vec<YearFailure>,
}

impl std::fmt::Display for PartialHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retrieved {} of {} lookback years",
            self.observations.len(),
            self.observations.len() + self.failures.len()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("weather archive request failed: {0}")]
    Network(#[from] reqwest_middleware::Error),
    #[error("weather archive returned an unreadable response: {0}")]
    Decode(#[from] reqwest::Error),
    #[error("no historical coverage at {latitude:.4}, {longitude:.4}: {reason}")]
    NotFound {
        latitude: f64,
        longitude: f64,
        reason: String,
    },
    /// Some years failed; the survivors still form a valid, short set.
    #[error("{0}")]
    Partial(PartialHistory),
}

/// Narrow interface the analysis pipeline depends on; mocked in the
/// HTTP-level tests.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn daily_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<DailyObservation>, HistoryError>;
}

pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Ok(Self { client })
    }

    async fn fetch_year(
        &self,
        query: &HistoryQuery,
        date: Date,
    ) -> Result<DailyObservation, HistoryError> {
        let day_format = format_description!("[year]-[month]-[day]");
        let date_param = date
            .format(&day_format)
            .unwrap_or_else(|_| date.to_string());

        let response = self
            .client
            .get(ARCHIVE_URL)
            .query(&[
                ("latitude", format!("{:.4}", query.latitude)),
                ("longitude", format!("{:.4}", query.longitude)),
                ("start_date", date_param.clone()),
                ("end_date", date_param),
                ("daily", DAILY_FIELDS.to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("precipitation_unit", "inch".to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let reason = response
                .json::<ArchiveError>()
                .await
                .map(|e| e.reason)
                .unwrap_or_else(|_| format!("status {status}"));
            return Err(HistoryError::NotFound {
                latitude: query.latitude,
                longitude: query.longitude,
                reason,
            });
        }

        let archive: ArchiveResponse = response.json().await?;
        observation_from_daily(&archive.daily).ok_or_else(|| HistoryError::NotFound {
            latitude: query.latitude,
            longitude: query.longitude,
            reason: "no daily values for this date".to_string(),
        })
    }
}

#[async_trait]
impl HistoryProvider for OpenMeteoClient {
    async fn daily_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<DailyObservation>, HistoryError> {
        let current_year = OffsetDateTime::now_utc().year();

        let mut observations = Vec::with_capacity(query.years);
        let mut failures: Vec<YearFailure> = Vec::new();
        let mut first_error: Option<HistoryError> = None;

        for offset in 1..=query.years {
            let year = current_year - offset as i32;
            let Some(date) = target_date(year, query.month, query.day) else {
                // Feb 29 in a non-leap lookback year.
                failures.push(YearFailure {
                    year,
                    reason: "the date does not occur in this year".to_string(),
                });
                continue;
            };

            match self.fetch_year(query, date).await {
                Ok(observation) => observations.push(observation),
                Err(err) => {
                    log::warn!("history fetch failed for {year}: {err}");
                    failures.push(YearFailure {
                        year,
                        reason: err.to_string(),
                    });
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if failures.is_empty() {
            return Ok(observations);
        }
        if observations.is_empty() {
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        Err(HistoryError::Partial(PartialHistory {
            observations,
            failures,
        }))
    }
}

/// Resolves a month/day against a specific year; `None` when the date
/// does not occur (Feb 29 outside leap years).
pub fn target_date(year: i32, month: u8, day: u8) -> Option<Date> {
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Month/day sanity check for user input, independent of any year.
/// Feb 29 is accepted here and resolved per lookback year.
pub fn valid_month_day(month: u8, day: u8) -> bool {
    let max_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => 29,
        _ => return false,
    };
    (1..=max_day).contains(&day)
}

#[derive(Debug, Deserialize)]
struct ArchiveError {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: ArchiveDaily,
}

/// The archive reports each daily variable as a parallel array; a null
/// entry means the value is missing for that day.
#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_gusts_10m_max: Vec<Option<f64>>,
}

/// Maps the single-day archive window onto an observation. Requires every
/// metric except gusts; a year with nulls in the required fields counts
/// as missing.
fn observation_from_daily(daily: &ArchiveDaily) -> Option<DailyObservation> {
    let date = daily.time.first()?.clone();
    let year = date.get(..4)?.parse::<i32>().ok()?;

    let first = |values: &[Option<f64>]| values.first().copied().flatten();

    Some(DailyObservation {
        year,
        date,
        temp_max_f: first(&daily.temperature_2m_max)?,
        temp_min_f: first(&daily.temperature_2m_min)?,
        temp_mean_f: first(&daily.temperature_2m_mean)?,
        precip_in: first(&daily.precipitation_sum)?,
        wind_mph: first(&daily.wind_speed_10m_max)?,
        wind_gust_mph: first(&daily.wind_gusts_10m_max),
    })
}
