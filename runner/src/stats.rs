//! Experiment statistics: per-episode accumulators and summary rows.

use serde::Serialize;
use std::time::Duration;

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; 0.0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64
}

/// Standard error of the mean: sqrt(variance / n).
pub fn std_error(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (variance(values) / values.len() as f64).sqrt()
}

/// Per-episode results collected at one simulation-budget level and cleared
/// between levels.
#[derive(Debug, Default)]
pub struct Results {
    undiscounted: Vec<f64>,
    discounted: Vec<f64>,
    durations: Vec<f64>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, undiscounted: f64, discounted: f64, duration: Duration) {
        self.undiscounted.push(undiscounted);
        self.discounted.push(discounted);
        self.durations.push(duration.as_secs_f64());
    }

    pub fn clear(&mut self) {
        self.undiscounted.clear();
        self.discounted.clear();
        self.durations.clear();
    }

    pub fn len(&self) -> usize {
        self.undiscounted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undiscounted.is_empty()
    }

    /// Aggregate the collected episodes into one summary row.
    pub fn summarize(&self, simulations: u32) -> SummaryRow {
        SummaryRow {
            simulations,
            runs: self.len() as u32,
            undiscounted_mean: mean(&self.undiscounted),
            undiscounted_se: std_error(&self.undiscounted),
            discounted_mean: mean(&self.discounted),
            discounted_se: std_error(&self.discounted),
            mean_duration_secs: mean(&self.durations),
        }
    }
}

/// One line of the experiment summary: aggregates for a single
/// simulation-budget level.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub simulations: u32,
    pub runs: u32,
    pub undiscounted_mean: f64,
    pub undiscounted_se: f64,
    pub discounted_mean: f64,
    pub discounted_se: f64,
    pub mean_duration_secs: f64,
}
