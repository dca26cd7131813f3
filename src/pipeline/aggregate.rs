//! Cross-run aggregator - reduce per-run series to one summary curve.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Series;
use crate::schema::BootstrapConfig;

/// One aggregated point: the mean metric across runs at one step.
///
/// Confidence bounds are present only when interval computation was
/// requested; a step with a single contributing value carries the point
/// estimate as both bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPoint {
    /// Step value.
    pub step: f64,
    /// Arithmetic mean of the metric values at this step.
    pub mean: f64,
    /// Lower confidence bound.
    pub ci_low: Option<f64>,
    /// Upper confidence bound.
    pub ci_high: Option<f64>,
}

/// Percentile-bootstrap estimator for the mean.
///
/// Seedable so interval computation is reproducible under test.
pub struct Bootstrap {
    resamples: usize,
    confidence: f64,
    rng: StdRng,
}

impl Bootstrap {
    /// Create from configuration, seeding from entropy when no seed is set.
    pub fn new(config: &BootstrapConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            resamples: config.resamples,
            confidence: config.confidence,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Bootstrap confidence interval of the mean.
    ///
    /// Resamples `values` with replacement (same sample count as input),
    /// takes the mean of each resample, and cuts the sorted means at the
    /// `(1 - confidence) / 2` percentiles. Returns `None` below 2 samples.
    pub fn mean_interval(&mut self, values: &[f64]) -> Option<(f64, f64)> {
        if values.len() < 2 || self.resamples == 0 {
            return None;
        }

        let mut means = Vec::with_capacity(self.resamples);
        for _ in 0..self.resamples {
            let sum: f64 = (0..values.len())
                .map(|_| values[self.rng.gen_range(0..values.len())])
                .sum();
            means.push(sum / values.len() as f64);
        }
        means.sort_by(f64::total_cmp);

        let alpha = (1.0 - self.confidence) / 2.0;
        let last = means.len() - 1;
        let low = ((last as f64) * alpha).round() as usize;
        let high = ((last as f64) * (1.0 - alpha)).round() as usize;
        Some((means[low.min(last)], means[high.min(last)]))
    }
}

/// Merge per-run series into one ordered aggregated sequence.
///
/// Metric values are grouped by exact step match; runs whose step grids
/// differ contribute only at shared steps, with no interpolation. The
/// output is unique and strictly ascending in step. Zero runs yield an
/// empty sequence.
pub fn aggregate(
    series: &BTreeMap<String, Series>,
    mut bootstrap: Option<&mut Bootstrap>,
) -> Vec<AggregatedPoint> {
    let mut by_step: BTreeMap<OrderedFloat<f64>, Vec<f64>> = BTreeMap::new();
    for points in series.values() {
        for &(step, metric) in points {
            by_step.entry(OrderedFloat(step)).or_default().push(metric);
        }
    }

    by_step
        .into_iter()
        .map(|(step, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let (ci_low, ci_high) = match bootstrap.as_deref_mut() {
                Some(bootstrap) => match bootstrap.mean_interval(&values) {
                    Some((low, high)) => (Some(low), Some(high)),
                    // Degenerate input: fall back to the point estimate.
                    None => (Some(mean), Some(mean)),
                },
                None => (None, None),
            };

            AggregatedPoint {
                step: step.into_inner(),
                mean,
                ci_low,
                ci_high,
            }
        })
        .collect()
}
