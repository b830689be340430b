use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Summary statistics for one metric across an observation set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation. `None` when fewer than two samples
    /// exist (undefined, not zero).
    pub std_dev: Option<f64>,
}

/// Computes mean/min/max and the sample standard deviation in a single
/// pass using Welford's recurrence, which keeps the variance numerically
/// stable for values that are large relative to their spread.
///
/// Returns `None` for an empty iterator.
pub fn summarize(values: impl IntoIterator<Item = f64>) -> Option<MetricSummary> {
    let mut count: usize = 0;
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in values {
        count += 1;
        let delta = value - mean;
        mean += delta / count as f64;
        m2 += delta * (value - mean);
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return None;
    }

    let std_dev = if count >= 2 {
        Some((m2 / (count - 1) as f64).sqrt())
    } else {
        None
    };

    Some(MetricSummary {
        mean,
        min,
        max,
        std_dev,
    })
}
