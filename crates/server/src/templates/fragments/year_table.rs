use maud::{html, Markup};

use crate::assessment::DailyObservation;

/// One row per historical year, newest first - the on-screen twin of the
/// CSV export.
pub fn year_table(observations: &[DailyObservation]) -> Markup {
    let mut ordered: Vec<&DailyObservation> = observations.iter().collect();
    ordered.sort_by_key(|o| std::cmp::Reverse(o.year));

    html! {
        div class="box" {
            h2 class="title is-5 mb-3" { "Year by Year" }
            div class="table-container" {
                table class="table is-fullwidth is-striped is-hoverable is-narrow" {
                    thead {
                        tr {
                            th { "Date" }
                            th class="has-text-right" { "High (°F)" }
                            th class="has-text-right" { "Low (°F)" }
                            th class="has-text-right" { "Mean (°F)" }
                            th class="has-text-right" { "Wind (mph)" }
                            th class="has-text-right" { "Gusts (mph)" }
                            th class="has-text-right" { "Precip (in)" }
                        }
                    }
                    tbody {
                        @for observation in &ordered {
                            tr {
                                td { strong { (observation.date) } }
                                td class="has-text-right" {
                                    span class="weather-value temp-high" {
                                        (format!("{:.1}", observation.temp_max_f))
                                    }
                                }
                                td class="has-text-right" {
                                    span class="weather-value temp-low" {
                                        (format!("{:.1}", observation.temp_min_f))
                                    }
                                }
                                td class="has-text-right" {
                                    (format!("{:.1}", observation.temp_mean_f))
                                }
                                td class="has-text-right" {
                                    span class="weather-value wind" {
                                        (format!("{:.1}", observation.wind_mph))
                                    }
                                }
                                td class="has-text-right" {
                                    @if let Some(gust) = observation.wind_gust_mph {
                                        (format!("{:.1}", gust))
                                    } @else {
                                        span class="has-text-grey" { "-" }
                                    }
                                }
                                td class="has-text-right" {
                                    span class="weather-value precip" {
                                        (format!("{:.2}", observation.precip_in))
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
