//! Aggregation and risk scoring over same-date historical observations.
//!
//! Everything in this module is pure computation: identical inputs always
//! produce bit-identical output, and nothing here performs I/O. The
//! surrounding handlers fetch the observations and decide what to do with
//! the resulting [`RiskAssessment`].

pub mod advice;
mod stats;

pub use stats::{summarize, MetricSummary};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One day's weather reading: the target calendar date in a single
/// historical year. Values are imperial (°F, mph, inches), matching the
/// units requested from the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyObservation {
    pub year: i32,
    /// Calendar date as returned by the archive, `YYYY-MM-DD`.
    pub date: String,
    pub temp_max_f: f64,
    pub temp_min_f: f64,
    pub temp_mean_f: f64,
    pub precip_in: f64,
    pub wind_mph: f64,
    pub wind_gust_mph: Option<f64>,
}

/// Hazard thresholds and the category breakpoint.
///
/// These are policy, not physics: they can be overridden from the
/// `[risk]` section of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// A daily high above this counts as a heat exceedance (°F).
    pub heat_threshold_f: f64,
    /// A daily low below this counts as a cold exceedance (°F).
    pub cold_threshold_f: f64,
    /// A daily max sustained wind above this counts as a wind exceedance (mph).
    pub wind_threshold_mph: f64,
    /// A daily precipitation total above this counts as a wet exceedance (inches).
    pub precip_threshold_in: f64,
    /// Exceedance fractions in `(0, moderate_cutoff]` rate Moderate;
    /// anything above rates High.
    pub moderate_cutoff: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            heat_threshold_f: 90.0,
            cold_threshold_f: 32.0,
            wind_threshold_mph: 25.0,
            precip_threshold_in: 0.5,
            moderate_cutoff: 0.4,
        }
    }
}

/// Risk category for a single hazard, in ascending order of severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::High => "High",
        }
    }
}

/// The four hazards scored for every analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HazardKind {
    Heat,
    Cold,
    Wind,
    Precipitation,
}

impl HazardKind {
    pub fn label(&self) -> &'static str {
        match self {
            HazardKind::Heat => "Heat",
            HazardKind::Cold => "Cold",
            HazardKind::Wind => "Wind",
            HazardKind::Precipitation => "Precipitation",
        }
    }
}

/// Exceedance fraction and resulting category for one hazard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HazardRating {
    pub kind: HazardKind,
    /// Fraction of observed years exceeding the threshold, in `0.0..=1.0`.
    pub exceedance: f64,
    pub severity: Severity,
}

/// The computed output of one analysis. Immutable once produced;
/// serialized as-is into the analysis record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskAssessment {
    /// Statistics over daily mean temperatures (°F).
    pub temperature: MetricSummary,
    /// Statistics over daily max sustained wind speeds (mph).
    pub wind: MetricSummary,
    /// Statistics over daily precipitation totals (inches).
    pub precipitation: MetricSummary,
    /// Coldest daily low seen across the set (°F).
    pub record_low_f: f64,
    /// Hottest daily high seen across the set (°F).
    pub record_high_f: f64,
    /// Precipitation summed across the set (inches).
    pub precip_total_in: f64,
    pub hazards: Vec<HazardRating>,
    /// Highest severity across all hazards.
    pub composite: Severity,
    /// Every hazard rated at the composite severity; ties report all.
    pub drivers: Vec<HazardKind>,
    /// Years actually observed. Fewer than `requested_years` means some
    /// lookback years had no data; consumers show a confidence caveat.
    pub sample_years: usize,
    pub requested_years: usize,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    /// The observation set was empty; there is nothing to compute from.
    #[error("no historical observations available for the requested date")]
    InsufficientData,
}

/// Scores an observation set against the given policy.
///
/// Partial sets (at least one year) succeed and are annotated with the
/// actual sample size; an empty set is the only failure.
pub fn assess(
    observations: &[DailyObservation],
    requested_years: usize,
    policy: &RiskPolicy,
) -> Result<RiskAssessment, AssessmentError> {
    let temperature = summarize(observations.iter().map(|o| o.temp_mean_f))
        .ok_or(AssessmentError::InsufficientData)?;
    let wind = summarize(observations.iter().map(|o| o.wind_mph))
        .ok_or(AssessmentError::InsufficientData)?;
    let precipitation = summarize(observations.iter().map(|o| o.precip_in))
        .ok_or(AssessmentError::InsufficientData)?;

    let record_low_f = observations
        .iter()
        .map(|o| o.temp_min_f)
        .fold(f64::INFINITY, f64::min);
    let record_high_f = observations
        .iter()
        .map(|o| o.temp_max_f)
        .fold(f64::NEG_INFINITY, f64::max);
    let precip_total_in = observations.iter().map(|o| o.precip_in).sum();

    let hazards = vec![
        rate_hazard(
            HazardKind::Heat,
            observations,
            |o| o.temp_max_f > policy.heat_threshold_f,
            policy,
        ),
        rate_hazard(
            HazardKind::Cold,
            observations,
            |o| o.temp_min_f < policy.cold_threshold_f,
            policy,
        ),
        rate_hazard(
            HazardKind::Wind,
            observations,
            |o| o.wind_mph > policy.wind_threshold_mph,
            policy,
        ),
        rate_hazard(
            HazardKind::Precipitation,
            observations,
            |o| o.precip_in > policy.precip_threshold_in,
            policy,
        ),
    ];

    let composite = hazards
        .iter()
        .map(|h| h.severity)
        .max()
        .unwrap_or(Severity::Low);
    let drivers = hazards
        .iter()
        .filter(|h| h.severity == composite)
        .map(|h| h.kind)
        .collect();

    Ok(RiskAssessment {
        temperature,
        wind,
        precipitation,
        record_low_f,
        record_high_f,
        precip_total_in,
        hazards,
        composite,
        drivers,
        sample_years: observations.len(),
        requested_years,
    })
}

fn rate_hazard(
    kind: HazardKind,
    observations: &[DailyObservation],
    exceeds: impl Fn(&DailyObservation) -> bool,
    policy: &RiskPolicy,
) -> HazardRating {
    let hits = observations.iter().filter(|o| exceeds(o)).count();
    let exceedance = hits as f64 / observations.len() as f64;
    HazardRating {
        kind,
        exceedance,
        severity: categorize(exceedance, policy),
    }
}

fn categorize(exceedance: f64, policy: &RiskPolicy) -> Severity {
    if exceedance <= 0.0 {
        Severity::Low
    } else if exceedance <= policy.moderate_cutoff {
        Severity::Moderate
    } else {
        Severity::High
    }
}
