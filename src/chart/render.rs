//! Chart renderers.

use std::path::PathBuf;

use log::{debug, warn};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use super::{Comparison, Curve};

/// Errors raised while drawing or saving a chart.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to write chart image {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// A sink for assembled comparisons.
pub trait Renderer {
    /// Draw and emit the comparison. Already-computed aggregation is never
    /// rolled back on failure; there is nothing to undo.
    fn render(&self, comparison: &Comparison) -> Result<(), RenderError>;
}

/// Renderer writing a PNG image via the plotters bitmap backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRenderer;

impl Renderer for PngRenderer {
    fn render(&self, comparison: &Comparison) -> Result<(), RenderError> {
        let config = &comparison.config;

        for curve in comparison.curves().iter().filter(|c| c.is_empty()) {
            warn!("skipping empty curve {:?}", curve.name);
        }
        let drawn: Vec<&Curve> = comparison
            .curves()
            .iter()
            .filter(|c| !c.is_empty())
            .collect();
        if drawn.is_empty() {
            warn!("nothing to render: every curve is empty");
            return Ok(());
        }

        if config.show {
            debug!("interactive display is not supported by the PNG renderer");
        }
        let Some(path) = &config.save_path else {
            warn!("no save path configured; skipping render");
            return Ok(());
        };

        let Some(((x_min, x_max), (y_min, y_max))) =
            axis_bounds(&drawn, config.reference_line)
        else {
            warn!("curves contain no finite values; skipping render");
            return Ok(());
        };

        let root =
            BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(config.title.as_str(), ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(config.x_label.as_str())
            .y_desc(config.y_label.as_str())
            .draw()
            .map_err(draw_err)?;

        for (idx, curve) in drawn.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();

            if let Some(band) = &curve.band {
                let mut polygon: Vec<(f64, f64)> = curve
                    .steps
                    .iter()
                    .zip(&band.highs)
                    .map(|(&x, &y)| (x, y))
                    .collect();
                polygon.extend(
                    curve
                        .steps
                        .iter()
                        .zip(&band.lows)
                        .rev()
                        .map(|(&x, &y)| (x, y)),
                );
                chart
                    .draw_series(std::iter::once(Polygon::new(polygon, color.mix(0.2).filled())))
                    .map_err(draw_err)?;
            }

            chart
                .draw_series(LineSeries::new(
                    curve.steps.iter().zip(&curve.means).map(|(&x, &y)| (x, y)),
                    color.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(curve.name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
        }

        if let Some(reference) = config.reference_line {
            chart
                .draw_series(DashedLineSeries::new(
                    vec![(x_min, reference), (x_max, reference)],
                    8,
                    4,
                    RED.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label("reference")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], RED.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(|e| RenderError::Save {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!("wrote chart to {}", path.display());
        Ok(())
    }
}

/// Plot bounds covering every drawn point, band, and the reference line.
///
/// Degenerate ranges are widened so the axes stay non-empty; `None` means
/// no finite value was found at all.
fn axis_bounds(
    curves: &[&Curve],
    reference: Option<f64>,
) -> Option<((f64, f64), (f64, f64))> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    let mut cover_y = |value: f64| {
        if value.is_finite() {
            y_min = y_min.min(value);
            y_max = y_max.max(value);
        }
    };

    for curve in curves {
        for &x in &curve.steps {
            if x.is_finite() {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
            }
        }
        for &y in &curve.means {
            cover_y(y);
        }
        if let Some(band) = &curve.band {
            for &y in band.lows.iter().chain(&band.highs) {
                cover_y(y);
            }
        }
    }
    if let Some(reference) = reference {
        cover_y(reference);
    }

    if !x_min.is_finite() || !y_min.is_finite() {
        return None;
    }

    if x_min == x_max {
        x_min -= 0.5;
        x_max += 0.5;
    }
    let y_pad = if y_min == y_max {
        0.5
    } else {
        (y_max - y_min) * 0.05
    };
    Some(((x_min, x_max), (y_min - y_pad, y_max + y_pad)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AggregatedPoint;
    use crate::schema::ChartConfig;

    fn curve(name: &str, steps: &[f64], means: &[f64]) -> Curve {
        let points: Vec<AggregatedPoint> = steps
            .iter()
            .zip(means)
            .map(|(&step, &mean)| AggregatedPoint {
                step,
                mean,
                ci_low: None,
                ci_high: None,
            })
            .collect();
        Curve::from_points(name, &points, 1.0)
    }

    #[test]
    fn test_render_without_target_is_noop() {
        let mut comparison = Comparison::new(ChartConfig::default());
        comparison.push(curve("baseline", &[0.0, 1.0], &[0.5, 0.6]));
        assert!(PngRenderer.render(&comparison).is_ok());
    }

    #[test]
    fn test_render_all_empty_curves_is_noop() {
        let config = ChartConfig {
            save_path: Some(PathBuf::from("unused.png")),
            ..Default::default()
        };
        let mut comparison = Comparison::new(config);
        comparison.push(Curve::from_points("empty", &[], 1.0));

        assert!(PngRenderer.render(&comparison).is_ok());
        assert!(!std::path::Path::new("unused.png").exists());
    }

    #[test]
    fn test_render_unwritable_path_fails() {
        let config = ChartConfig {
            save_path: Some(PathBuf::from("/nonexistent-dir/out/chart.png")),
            ..Default::default()
        };
        let mut comparison = Comparison::new(config);
        comparison.push(curve("baseline", &[0.0, 1.0, 2.0], &[0.5, 0.6, 0.7]));

        assert!(PngRenderer.render(&comparison).is_err());
    }

    #[test]
    fn test_axis_bounds_cover_bands_and_reference() {
        let points = vec![
            AggregatedPoint {
                step: 0.0,
                mean: 1.0,
                ci_low: Some(0.5),
                ci_high: Some(1.5),
            },
            AggregatedPoint {
                step: 10.0,
                mean: 2.0,
                ci_low: Some(1.4),
                ci_high: Some(2.6),
            },
        ];
        let banded = Curve::from_points("banded", &points, 1.0);

        let ((x_min, x_max), (y_min, y_max)) =
            axis_bounds(&[&banded], Some(4.0)).unwrap();
        assert_eq!(x_min, 0.0);
        assert_eq!(x_max, 10.0);
        assert!(y_min <= 0.5);
        assert!(y_max >= 4.0);
    }

    #[test]
    fn test_axis_bounds_widen_single_point() {
        let single = curve("single", &[5.0], &[10.0]);
        let ((x_min, x_max), (y_min, y_max)) = axis_bounds(&[&single], None).unwrap();
        assert!(x_min < 5.0 && x_max > 5.0);
        assert!(y_min < 10.0 && y_max > 10.0);
    }

    #[test]
    fn test_axis_bounds_empty() {
        assert!(axis_bounds(&[], None).is_none());
    }
}
