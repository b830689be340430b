use maud::{html, Markup};

use crate::{
    db::AnalysisRecord,
    templates::{
        fragments::analysis_result,
        layouts::{base, CurrentPage, PageConfig},
    },
};

/// Stored analysis detail page - the permalink target.
pub fn analysis_page(api_base: &str, record: &AnalysisRecord) -> Markup {
    let title = format!("Fairweather - {}", record.location_name);
    let config = PageConfig {
        title: &title,
        api_base,
        current_page: CurrentPage::Analysis,
    };

    base(
        &config,
        html! {
            (analysis_result(record))
            div class="mt-4" {
                a class="button is-light" href="/" { "Back to dashboard" }
            }
        },
    )
}
