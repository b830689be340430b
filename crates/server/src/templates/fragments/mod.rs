mod analysis_result;
mod metric_charts;
mod recent_analyses;
mod year_table;

pub use analysis_result::{analysis_error, analysis_result, geocode_choices};
pub use metric_charts::metric_charts;
pub use recent_analyses::{recent_analyses, recent_analyses_rows};
pub use year_table::year_table;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// "July 4" style label for a month/day pair.
pub(crate) fn month_day_label(month: u8, day: u8) -> String {
    match MONTH_NAMES.get(month.saturating_sub(1) as usize) {
        Some(name) => format!("{name} {day}"),
        None => format!("{month}/{day}"),
    }
}

/// Unix seconds to RFC 3339; the front-end rewrites these to local time.
pub(crate) fn format_timestamp(unix: i64) -> String {
    OffsetDateTime::from_unix_timestamp(unix)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| unix.to_string())
}
