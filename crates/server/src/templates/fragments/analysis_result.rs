use maud::{html, Markup};

use crate::{
    assessment::{
        advice::{recommendations, suitability_score},
        HazardRating, MetricSummary, Severity,
    },
    db::AnalysisRecord,
    geocode::Place,
    templates::fragments::{format_timestamp, metric_charts, month_day_label, year_table},
};

/// Full result view for one analysis: stat tiles, hazard ratings,
/// recommendations, charts, and the per-year table. Used both as the
/// HTMX fragment after an analysis run and as the body of the stored
/// detail page.
pub fn analysis_result(record: &AnalysisRecord) -> Markup {
    let assessment = &record.assessment;
    let score = suitability_score(assessment);
    let notes = recommendations(assessment);

    html! {
        div class="box" {
            div class="is-flex is-justify-content-space-between is-align-items-center is-flex-wrap-wrap mb-2" {
                div {
                    h2 class="title is-4 mb-1" { (record.location_name) }
                    p class="subtitle is-6 mb-0" {
                        (month_day_label(record.month, record.day))
                        " · "
                        (format!("{:.4}, {:.4}", record.latitude, record.longitude))
                        " · analyzed "
                        span class="local-time" data-utc=(format_timestamp(record.created_at)) {
                            (format_timestamp(record.created_at))
                        }
                    }
                }
                div class="buttons are-small" {
                    a class="button is-link is-light"
                      href=(format!("/analyses/{}/export.csv", record.id)) {
                        "Download CSV"
                    }
                    a class="button is-light" href=(format!("/analyses/{}", record.id)) {
                        "Permalink"
                    }
                }
            }

            @if assessment.sample_years < assessment.requested_years {
                div class="notification is-warning is-light py-3" {
                    strong { (format!("Partial record: {} of {} years.", assessment.sample_years, assessment.requested_years)) }
                    " Some lookback years had no usable data, so treat these figures with extra caution."
                }
            }

            (stat_tiles(record, score))
        }

        div class="mt-4" { (hazard_panel(&assessment.hazards)) }

        div class="box mt-4" {
            h2 class="title is-5 mb-3" { "Recommendations" }
            div class="content" {
                ul class="mb-0" {
                    @for note in &notes {
                        li { (note) }
                    }
                }
            }
        }

        div class="mt-4" { (metric_charts(&record.observations)) }

        div class="mt-4" { (year_table(&record.observations)) }
    }
}

fn stat_tiles(record: &AnalysisRecord, score: u8) -> Markup {
    let assessment = &record.assessment;
    html! {
        div class="columns is-multiline is-mobile" {
            div class="column is-half-mobile is-one-quarter-tablet" {
                div class="stat-card" {
                    div class="stat-value temp-high" {
                        (format!("{:.1}°F", assessment.temperature.mean))
                    }
                    div class="stat-label" { "Avg Temperature" }
                    p class="is-size-7 has-text-grey" {
                        (format!("Range {:.1}° – {:.1}°", assessment.record_low_f, assessment.record_high_f))
                        (std_dev_note(&assessment.temperature))
                    }
                }
            }
            div class="column is-half-mobile is-one-quarter-tablet" {
                div class="stat-card" {
                    div class="stat-value wind" {
                        (format!("{:.1} mph", assessment.wind.mean))
                    }
                    div class="stat-label" { "Avg Peak Wind" }
                    p class="is-size-7 has-text-grey" {
                        (format!("Max {:.1} mph", assessment.wind.max))
                        (std_dev_note(&assessment.wind))
                    }
                }
            }
            div class="column is-half-mobile is-one-quarter-tablet" {
                div class="stat-card" {
                    div class="stat-value precip" {
                        (format!("{:.2} in", assessment.precip_total_in))
                    }
                    div class="stat-label" { "Total Precipitation" }
                    p class="is-size-7 has-text-grey" {
                        (format!("Max daily {:.2} in", assessment.precipitation.max))
                    }
                }
            }
            div class="column is-half-mobile is-one-quarter-tablet" {
                div class="stat-card" {
                    div class="stat-value" { (severity_tag(assessment.composite)) }
                    div class="stat-label" { "Weather Risk" }
                    p class="is-size-7 has-text-grey" {
                        (driver_summary(record))
                        " · Suitability " (score) "/100"
                    }
                }
            }
        }
    }
}

fn driver_summary(record: &AnalysisRecord) -> String {
    let labels: Vec<&str> = record
        .assessment
        .drivers
        .iter()
        .map(|kind| kind.label())
        .collect();
    labels.join(", ")
}

fn std_dev_note(summary: &MetricSummary) -> Markup {
    html! {
        @match summary.std_dev {
            Some(std_dev) => { (format!(" · σ {:.1}", std_dev)) }
            // Undefined for a single sample; make that visible.
            None => { " · σ n/a" }
        }
    }
}

fn hazard_panel(hazards: &[HazardRating]) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5 mb-3" { "Hazard Ratings" }
            div class="table-container" {
                table class="table is-fullwidth is-striped" {
                    thead {
                        tr {
                            th { "Hazard" }
                            th class="has-text-right" { "Years Exceeding" }
                            th { "Risk" }
                        }
                    }
                    tbody {
                        @for hazard in hazards {
                            tr {
                                td { (hazard.kind.label()) }
                                td class="has-text-right" {
                                    (format!("{:.0}%", hazard.exceedance * 100.0))
                                }
                                td { (severity_tag(hazard.severity)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub(crate) fn severity_tag(severity: Severity) -> Markup {
    let class = match severity {
        Severity::Low => "tag is-success",
        Severity::Moderate => "tag is-warning",
        Severity::High => "tag is-danger",
    };
    html! {
        span class=(class) { (severity.label()) }
    }
}

/// Failure notice with a retry affordance; the analyze form stays on the
/// page, so retry re-submits it unchanged.
pub fn analysis_error(message: &str) -> Markup {
    html! {
        div class="notification is-danger is-light" {
            p class="mb-2" { strong { "Analysis failed: " } (message) }
            button class="button is-small is-danger is-outlined"
                   hx-post="/fragments/analyze"
                   hx-include="#analyze-form"
                   hx-target="#analysis-result"
                   hx-swap="innerHTML" {
                "Try again"
            }
        }
    }
}

/// Candidate picker shown when a location query is ambiguous. Each
/// button re-submits the analysis with that candidate's coordinates.
pub fn geocode_choices(query: &str, candidates: &[Place], month: u8, day: u8) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5 mb-2" { "Which location did you mean?" }
            p class="is-size-7 has-text-grey mb-3" {
                (format!("\"{query}\" matched {} places.", candidates.len()))
            }
            div class="buttons" {
                @for place in candidates {
                    button class="button is-small is-link is-light"
                           hx-post="/fragments/analyze"
                           hx-target="#analysis-result"
                           hx-swap="innerHTML"
                           hx-vals=(candidate_vals(place, month, day)) {
                        (place.name)
                    }
                }
            }
        }
    }
}

fn candidate_vals(place: &Place, month: u8, day: u8) -> String {
    format!(
        "{{\"location\": {}, \"latitude\": {}, \"longitude\": {}, \"month\": {}, \"day\": {}}}",
        serde_json::to_string(&place.name).unwrap_or_else(|_| "\"\"".to_string()),
        place.latitude,
        place.longitude,
        month,
        day
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{assess, DailyObservation, RiskPolicy};
    use uuid::Uuid;

    fn sample_record(sample_years: usize) -> AnalysisRecord {
        let observations: Vec<DailyObservation> = (0..sample_years)
            .map(|i| DailyObservation {
                year: 2020 + i as i32,
                date: format!("{}-07-04", 2020 + i),
                temp_max_f: 88.0,
                temp_min_f: 71.0,
                temp_mean_f: 79.5,
                precip_in: 0.05,
                wind_mph: 9.0,
                wind_gust_mph: Some(14.0),
            })
            .collect();
        let assessment = assess(&observations, 5, &RiskPolicy::default()).unwrap();
        AnalysisRecord {
            id: Uuid::now_v7(),
            location_name: "Miami, Florida".to_string(),
            latitude: 25.7743,
            longitude: -80.1937,
            month: 7,
            day: 4,
            requested_years: 5,
            created_at: 1_750_000_000,
            assessment,
            observations,
        }
    }

    #[test]
    fn test_full_record_has_no_partial_warning() {
        let html = analysis_result(&sample_record(5)).into_string();
        assert!(html.contains("Miami, Florida"));
        assert!(html.contains("July 4"));
        assert!(!html.contains("Partial record"));
    }

    #[test]
    fn test_short_record_shows_sample_size_caveat() {
        let html = analysis_result(&sample_record(3)).into_string();
        assert!(html.contains("Partial record: 3 of 5 years."));
    }

    #[test]
    fn test_error_fragment_offers_retry() {
        let html = analysis_error("weather archive request failed").into_string();
        assert!(html.contains("Try again"));
        assert!(html.contains("hx-post=\"/fragments/analyze\""));
    }

    #[test]
    fn test_geocode_choices_list_every_candidate() {
        let candidates = vec![
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
        ];
        let html = geocode_choices("Springfield", &candidates, 7, 4).into_string();
        assert!(html.contains("Springfield, Illinois"));
        assert!(html.contains("Springfield, Missouri"));
        assert!(html.contains("hx-vals"));
    }
}
