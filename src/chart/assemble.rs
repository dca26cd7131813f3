//! Comparison assembly - turn aggregated points into render-ready curves.

use crate::pipeline::AggregatedPoint;
use crate::schema::ChartConfig;

/// Confidence band as parallel lower/upper bound arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Lower bounds, parallel to the curve's steps.
    pub lows: Vec<f64>,
    /// Upper bounds, parallel to the curve's steps.
    pub highs: Vec<f64>,
}

/// One named curve: parallel arrays of steps and means, with an optional
/// confidence band.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// Legend name.
    pub name: String,
    /// Step values, scaled for plotting.
    pub steps: Vec<f64>,
    /// Mean metric values.
    pub means: Vec<f64>,
    /// Confidence band, present when every point carries bounds.
    pub band: Option<Band>,
}

impl Curve {
    /// Build a curve from an aggregated sequence.
    ///
    /// Step values are multiplied by `step_scale`. The band is attached
    /// only when every point carries bounds, which holds whenever interval
    /// computation was enabled upstream.
    pub fn from_points(name: &str, points: &[AggregatedPoint], step_scale: f64) -> Self {
        let steps: Vec<f64> = points.iter().map(|p| p.step * step_scale).collect();
        let means: Vec<f64> = points.iter().map(|p| p.mean).collect();

        let lows: Vec<f64> = points.iter().filter_map(|p| p.ci_low).collect();
        let highs: Vec<f64> = points.iter().filter_map(|p| p.ci_high).collect();
        let band = (!points.is_empty() && lows.len() == points.len() && highs.len() == points.len())
            .then_some(Band { lows, highs });

        Self {
            name: name.to_string(),
            steps,
            means,
            band,
        }
    }

    /// Number of points in the curve.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The full comparison handed to a renderer: curves in registration order
/// plus chart furnishings.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Chart furnishings and output target.
    pub config: ChartConfig,
    curves: Vec<Curve>,
}

impl Comparison {
    /// Create an empty comparison.
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            curves: Vec::new(),
        }
    }

    /// Register a curve. Registration order determines legend and color
    /// order, so repeated runs produce identical charts.
    pub fn push(&mut self, curve: Curve) {
        self.curves.push(curve);
    }

    /// Curves in registration order.
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }
}
