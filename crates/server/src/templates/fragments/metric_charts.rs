//! Server-rendered SVG time-series charts: one panel per metric across
//! the lookback years. No client-side charting library involved.

use itertools::{Itertools, MinMaxResult};
use maud::{html, Markup};

use crate::assessment::DailyObservation;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 260.0;
const MARGIN_LEFT: f64 = 52.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 18.0;
const MARGIN_BOTTOM: f64 = 34.0;

const TEMP_HIGH_COLOR: &str = "#e5484d";
const TEMP_MEAN_COLOR: &str = "#e8a33d";
const TEMP_LOW_COLOR: &str = "#3e7bfa";
const WIND_COLOR: &str = "#2f9e6e";
const GUST_COLOR: &str = "#1b5e43";
const PRECIP_COLOR: &str = "#5aa7d4";

struct Series<'a> {
    label: &'a str,
    color: &'a str,
    values: Vec<f64>,
}

/// All three metric panels for one analysis, oldest year first.
pub fn metric_charts(observations: &[DailyObservation]) -> Markup {
    let mut ordered: Vec<&DailyObservation> = observations.iter().collect();
    ordered.sort_by_key(|o| o.year);

    html! {
        div class="box" {
            h2 class="title is-5 mb-4" { "Historical Trends" }
            (temperature_chart(&ordered))
            (wind_chart(&ordered))
            (precipitation_chart(&ordered))
        }
    }
}

fn temperature_chart(ordered: &[&DailyObservation]) -> Markup {
    let series = vec![
        Series {
            label: "High",
            color: TEMP_HIGH_COLOR,
            values: ordered.iter().map(|o| o.temp_max_f).collect(),
        },
        Series {
            label: "Mean",
            color: TEMP_MEAN_COLOR,
            values: ordered.iter().map(|o| o.temp_mean_f).collect(),
        },
        Series {
            label: "Low",
            color: TEMP_LOW_COLOR,
            values: ordered.iter().map(|o| o.temp_min_f).collect(),
        },
    ];
    line_chart("Temperature", "°F", ordered, &series)
}

fn wind_chart(ordered: &[&DailyObservation]) -> Markup {
    let mut series = vec![Series {
        label: "Max sustained",
        color: WIND_COLOR,
        values: ordered.iter().map(|o| o.wind_mph).collect(),
    }];
    // Gusts join the panel only when every year reported them.
    if let Some(gusts) = ordered
        .iter()
        .map(|o| o.wind_gust_mph)
        .collect::<Option<Vec<f64>>>()
    {
        series.push(Series {
            label: "Gusts",
            color: GUST_COLOR,
            values: gusts,
        });
    }
    line_chart("Wind Speed", "mph", ordered, &series)
}

fn precipitation_chart(ordered: &[&DailyObservation]) -> Markup {
    let values: Vec<f64> = ordered.iter().map(|o| o.precip_in).collect();
    let top = values.iter().copied().fold(0.0_f64, f64::max).max(0.1);
    let scale = ChartScale::new(0.0, top * 1.1, ordered.len());

    html! {
        div class="chart-panel" {
            h3 class="title is-6 mb-1" { "Precipitation (inches)" }
            svg class="metric-chart" viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) preserveAspectRatio="xMidYMid meet" {
                (scale.axes())
                @for (i, value) in values.iter().enumerate() {
                    @let x = scale.x(i);
                    @let y = scale.y(*value);
                    @let bar_width = (scale.step() * 0.5).min(48.0);
                    rect x=(fmt(x - bar_width / 2.0)) y=(fmt(y))
                         width=(fmt(bar_width)) height=(fmt(HEIGHT - MARGIN_BOTTOM - y))
                         fill=(PRECIP_COLOR) rx="2" {
                        title { (format!("{}: {:.2} in", ordered[i].year, value)) }
                    }
                }
                (scale.year_labels(ordered))
            }
        }
    }
}

fn line_chart(
    title: &str,
    unit: &str,
    ordered: &[&DailyObservation],
    series: &[Series],
) -> Markup {
    let (low, high) = value_range(series);
    let scale = ChartScale::new(low, high, ordered.len());

    html! {
        div class="chart-panel" {
            h3 class="title is-6 mb-1" { (format!("{title} ({unit})")) }
            svg class="metric-chart" viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) preserveAspectRatio="xMidYMid meet" {
                (scale.axes())
                @for line in series {
                    @if line.values.len() > 1 {
                        polyline points=(scale.points(&line.values))
                                 fill="none" stroke=(line.color) stroke-width="2.5" {}
                    }
                    @for (i, value) in line.values.iter().enumerate() {
                        circle cx=(fmt(scale.x(i))) cy=(fmt(scale.y(*value)))
                               r="4" fill=(line.color) {
                            title { (format!("{} {}: {:.1} {}", line.label, ordered[i].year, value, unit)) }
                        }
                    }
                }
                (scale.year_labels(ordered))
            }
            div class="chart-legend is-size-7" {
                @for line in series {
                    span class="legend-entry mr-3" {
                        span class="legend-swatch" style=(format!("background:{}", line.color)) {}
                        " " (line.label)
                    }
                }
            }
        }
    }
}

fn value_range(series: &[Series]) -> (f64, f64) {
    let minmax = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .minmax_by(|a, b| a.total_cmp(b));
    let (low, high) = match minmax {
        MinMaxResult::NoElements => (0.0, 1.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(low, high) => (low, high),
    };
    // Breathing room so points never sit on the frame.
    let pad = ((high - low) * 0.1).max(1.0);
    (low - pad, high + pad)
}

/// Maps sample indices and metric values into the fixed SVG viewport.
struct ChartScale {
    low: f64,
    high: f64,
    count: usize,
}

impl ChartScale {
    fn new(low: f64, high: f64, count: usize) -> Self {
        Self { low, high, count }
    }

    fn plot_width(&self) -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn step(&self) -> f64 {
        self.plot_width() / self.count.max(1) as f64
    }

    fn x(&self, index: usize) -> f64 {
        // Points sit at slot centers so a single year lands mid-chart.
        MARGIN_LEFT + self.step() * (index as f64 + 0.5)
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let span = (self.high - self.low).max(f64::EPSILON);
        MARGIN_TOP + (self.high - value) / span * plot_height
    }

    fn points(&self, values: &[f64]) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{},{}", fmt(self.x(i)), fmt(self.y(*v))))
            .join(" ")
    }

    fn axes(&self) -> Markup {
        let floor = HEIGHT - MARGIN_BOTTOM;
        let mid = (self.low + self.high) / 2.0;
        html! {
            line x1=(fmt(MARGIN_LEFT)) y1=(fmt(MARGIN_TOP)) x2=(fmt(MARGIN_LEFT)) y2=(fmt(floor))
                 class="chart-axis" {}
            line x1=(fmt(MARGIN_LEFT)) y1=(fmt(floor)) x2=(fmt(WIDTH - MARGIN_RIGHT)) y2=(fmt(floor))
                 class="chart-axis" {}
            @for (value, y) in [
                (self.high, self.y(self.high)),
                (mid, self.y(mid)),
                (self.low, self.y(self.low)),
            ] {
                text x=(fmt(MARGIN_LEFT - 6.0)) y=(fmt(y + 4.0))
                     text-anchor="end" class="chart-label" { (format!("{value:.0}")) }
                line x1=(fmt(MARGIN_LEFT)) y1=(fmt(y)) x2=(fmt(WIDTH - MARGIN_RIGHT)) y2=(fmt(y))
                     class="chart-gridline" {}
            }
        }
    }

    fn year_labels(&self, ordered: &[&DailyObservation]) -> Markup {
        html! {
            @for (i, observation) in ordered.iter().enumerate() {
                text x=(fmt(self.x(i))) y=(fmt(HEIGHT - MARGIN_BOTTOM + 18.0))
                     text-anchor="middle" class="chart-label" { (observation.year) }
            }
        }
    }
}

fn fmt(value: f64) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(year: i32, temp: f64) -> DailyObservation {
        DailyObservation {
            year,
            date: format!("{year}-07-04"),
            temp_max_f: temp + 8.0,
            temp_min_f: temp - 8.0,
            temp_mean_f: temp,
            precip_in: 0.2,
            wind_mph: 12.0,
            wind_gust_mph: Some(18.0),
        }
    }

    #[test]
    fn test_charts_render_one_label_per_year() {
        let observations: Vec<DailyObservation> =
            (2020..2025).map(|y| observation(y, 75.0)).collect();
        let html = metric_charts(&observations).into_string();
        for year in 2020..2025 {
            assert!(html.contains(&year.to_string()));
        }
        assert!(html.contains("polyline"));
        assert!(html.contains("Precipitation"));
    }

    #[test]
    fn test_single_year_renders_without_a_line() {
        let observations = vec![observation(2024, 70.0)];
        let html = metric_charts(&observations).into_string();
        assert!(!html.contains("polyline"));
        assert!(html.contains("circle"));
    }

    #[test]
    fn test_missing_gusts_drop_the_gust_series() {
        let mut observations: Vec<DailyObservation> =
            (2020..2025).map(|y| observation(y, 75.0)).collect();
        observations[2].wind_gust_mph = None;
        let html = metric_charts(&observations).into_string();
        assert!(!html.contains("Gusts"));
    }
}
