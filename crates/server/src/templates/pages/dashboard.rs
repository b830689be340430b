use maud::{html, Markup};

use crate::{
    db::AnalysisRecord,
    templates::{
        fragments::recent_analyses,
        layouts::{base, CurrentPage, PageConfig},
    },
};

/// Dashboard page data
pub struct DashboardData {
    pub recent: Vec<AnalysisRecord>,
    pub lookback_years: usize,
}

/// Dashboard page - analysis form plus stored history
pub fn dashboard_page(api_base: &str, data: &DashboardData) -> Markup {
    let config = PageConfig {
        title: "Fairweather - Dashboard",
        api_base,
        current_page: CurrentPage::Dashboard,
    };

    base(&config, dashboard_content(data))
}

/// Dashboard content - can be used for full page or HTMX partial
pub fn dashboard_content(data: &DashboardData) -> Markup {
    html! {
        (analyze_form(data.lookback_years))

        div id="analysis-result" class="mt-4" {}

        div class="mt-4" {
            (recent_analyses(&data.recent))
        }
    }
}

fn analyze_form(lookback_years: usize) -> Markup {
    html! {
        div class="box" {
            h2 class="title is-5 mb-2" { "Plan Around the Weather" }
            p class="is-size-7 has-text-grey mb-4" {
                (format!(
                    "Looks back at the last {lookback_years} years of the same calendar date \
                     and scores heat, cold, wind, and rain risk for your event."
                ))
            }

            form id="analyze-form"
                 hx-post="/fragments/analyze"
                 hx-target="#analysis-result"
                 hx-swap="innerHTML"
                 hx-indicator="#analyze-spinner" {
                div class="columns" {
                    div class="column is-two-fifths" {
                        div class="field" {
                            label class="label is-small" for="location" { "Location" }
                            div class="control" {
                                input class="input" type="text" id="location" name="location"
                                      placeholder="e.g., Miami, FL or New York City";
                            }
                            p class="help" { "City or address; leave blank when using coordinates." }
                        }
                    }
                    div class="column" {
                        div class="field" {
                            label class="label is-small" for="latitude" { "Latitude" }
                            div class="control" {
                                input class="input" type="number" id="latitude" name="latitude"
                                      step="0.0001" min="-90" max="90" placeholder="25.7743";
                            }
                        }
                    }
                    div class="column" {
                        div class="field" {
                            label class="label is-small" for="longitude" { "Longitude" }
                            div class="control" {
                                input class="input" type="number" id="longitude" name="longitude"
                                      step="0.0001" min="-180" max="180" placeholder="-80.1937";
                            }
                        }
                    }
                    div class="column is-narrow" {
                        div class="field" {
                            label class="label is-small" for="month" { "Month" }
                            div class="control" {
                                div class="select" {
                                    select id="month" name="month" {
                                        option value="1" { "January" }
                                        option value="2" { "February" }
                                        option value="3" { "March" }
                                        option value="4" { "April" }
                                        option value="5" { "May" }
                                        option value="6" selected { "June" }
                                        option value="7" { "July" }
                                        option value="8" { "August" }
                                        option value="9" { "September" }
                                        option value="10" { "October" }
                                        option value="11" { "November" }
                                        option value="12" { "December" }
                                    }
                                }
                            }
                        }
                    }
                    div class="column is-narrow" {
                        div class="field" {
                            label class="label is-small" for="day" { "Day" }
                            div class="control" {
                                input class="input" type="number" id="day" name="day"
                                      min="1" max="31" value="21" style="width: 5.5rem;";
                            }
                        }
                    }
                }

                div class="field is-grouped is-align-items-center" {
                    div class="control" {
                        button class="button is-primary" type="submit" {
                            "Analyze Weather Data"
                        }
                    }
                    span id="analyze-spinner" class="htmx-indicator is-size-7 has-text-grey" {
                        "Fetching historical weather…"
                    }
                }
            }
        }
    }
}
