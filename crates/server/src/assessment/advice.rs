//! Event-planning guidance derived from a finished assessment.
//!
//! Pure helpers layered on top of [`RiskAssessment`]; the UI renders
//! their output verbatim.

use super::RiskAssessment;

/// Overall suitability for an outdoor event, 0–100 (higher is better).
///
/// Starts at 100 and deducts for conditions outside the comfortable band:
/// daily mean temperature (ideal 70–80 °F), peak wind (ideal under
/// 10 mph), and total precipitation across the lookback window.
pub fn suitability_score(assessment: &RiskAssessment) -> u8 {
    let mut score: i32 = 100;

    let mean_temp = assessment.temperature.mean;
    if !(60.0..=90.0).contains(&mean_temp) {
        score -= 30;
    } else if !(70.0..=80.0).contains(&mean_temp) {
        score -= 15;
    }

    let peak_wind = assessment.wind.max;
    if peak_wind > 25.0 {
        score -= 25;
    } else if peak_wind > 15.0 {
        score -= 15;
    } else if peak_wind > 10.0 {
        score -= 10;
    }

    let total_precip = assessment.precip_total_in;
    if total_precip > 1.0 {
        score -= 20;
    } else if total_precip > 0.5 {
        score -= 10;
    } else if total_precip > 0.1 {
        score -= 5;
    }

    score.max(0) as u8
}

/// Planning recommendations matching the observed conditions. Always
/// returns at least one line.
pub fn recommendations(assessment: &RiskAssessment) -> Vec<String> {
    let mut notes = Vec::new();

    if assessment.temperature.mean > 85.0 {
        notes.push(
            "High temperatures expected - consider providing shade and hydration stations"
                .to_string(),
        );
    } else if assessment.temperature.mean < 65.0 {
        notes.push("Cool temperatures expected - inform guests to bring warm clothing".to_string());
    }

    if assessment.wind.max > 20.0 {
        notes.push(
            "High wind speeds possible - secure decorations and avoid tall structures".to_string(),
        );
    } else if assessment.wind.max > 10.0 {
        notes.push(
            "Moderate winds expected - ensure tents and displays are properly anchored".to_string(),
        );
    }

    if assessment.precip_total_in > 0.5 {
        notes.push("Significant precipitation likely - have indoor backup plans ready".to_string());
    } else if assessment.precip_total_in > 0.1 {
        notes.push("Some precipitation possible - consider covered areas or umbrellas".to_string());
    }

    if assessment.record_high_f - assessment.record_low_f > 20.0 {
        notes.push(
            "Large temperature variation expected - advise guests on layered clothing".to_string(),
        );
    }

    if notes.is_empty() {
        notes.push("Weather conditions appear favorable for outdoor activities".to_string());
    }

    notes
}
