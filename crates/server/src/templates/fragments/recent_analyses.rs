use maud::{html, Markup};

use crate::{
    db::AnalysisRecord,
    templates::fragments::{analysis_result::severity_tag, format_timestamp, month_day_label},
};

/// Recent analyses box; the body refreshes over HTMX after each run.
pub fn recent_analyses(records: &[AnalysisRecord]) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5 mb-4" { "Previous Analyses" }
            div id="recent-analyses"
                hx-get="/fragments/recent"
                hx-trigger="analysis-saved from:body"
                hx-swap="innerHTML" {
                (recent_analyses_rows(records))
            }
        }
    }
}

/// Just the table - used for HTMX partial updates.
pub fn recent_analyses_rows(records: &[AnalysisRecord]) -> Markup {
    html! {
        @if records.is_empty() {
            div class="has-text-centered has-text-grey py-4" {
                p { "No stored analyses yet." }
                p class="is-size-7" { "Run an analysis above and it will be saved here." }
            }
        } @else {
            div class="table-container" {
                table class="table is-fullwidth is-striped is-hoverable" {
                    thead {
                        tr {
                            th { "Location" }
                            th { "Date" }
                            th { "Risk" }
                            th class="has-text-right" { "Years" }
                            th { "Analyzed" }
                        }
                    }
                    tbody {
                        @for record in records {
                            tr {
                                td {
                                    a href=(format!("/analyses/{}", record.id)) {
                                        strong { (record.location_name) }
                                    }
                                    br;
                                    span class="is-size-7 has-text-grey" {
                                        (format!("{:.4}, {:.4}", record.latitude, record.longitude))
                                    }
                                }
                                td { (month_day_label(record.month, record.day)) }
                                td { (severity_tag(record.assessment.composite)) }
                                td class="has-text-right" {
                                    (format!("{} of {}", record.assessment.sample_years, record.requested_years))
                                }
                                td {
                                    span class="is-size-7 local-time" data-utc=(format_timestamp(record.created_at)) {
                                        (format_timestamp(record.created_at))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
