//! Report orchestration - one linear pass per collection, one overlay
//! render across all collections.

use log::{debug, warn};

use crate::chart::{Comparison, Curve, PngRenderer, RenderError, Renderer};
use crate::pipeline::{
    Bootstrap, DataAccessError, RecordQuery, RecordSource, SqliteSource, aggregate, build_series,
    decimate,
};
use crate::schema::{ConfigError, ReportConfig};

/// Errors raised while producing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid report configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Record source failure: {0}")]
    Data(#[from] DataAccessError),
    #[error("Chart rendering failure: {0}")]
    Render(#[from] RenderError),
}

/// Accumulates one curve per collection, in registration order.
///
/// Each collection is processed to completion before the next begins; the
/// curve list is write-once per collection and read-only thereafter.
pub struct Report {
    config: ReportConfig,
    bootstrap: Option<Bootstrap>,
    curves: Vec<Curve>,
}

impl Report {
    /// Create a report from a validated configuration.
    pub fn new(config: ReportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bootstrap = config
            .compute_ci
            .then(|| Bootstrap::new(&config.bootstrap));
        Ok(Self {
            config,
            bootstrap,
            curves: Vec::new(),
        })
    }

    /// Extract, aggregate, and decimate one collection's rows into a curve.
    ///
    /// A collection with no rows produces an empty curve, not an error.
    pub fn add_collection(
        &mut self,
        name: &str,
        source: &dyn RecordSource,
    ) -> Result<(), ReportError> {
        let query = RecordQuery {
            table: self.config.table.clone(),
            fields: self.config.fields.clone(),
            filter: self.config.filter.clone(),
            order: self.config.order,
        };

        let records = source.fetch(&query)?;
        if records.is_empty() {
            warn!("collection {:?} has no rows", name);
        }

        let series = build_series(records);
        let points = aggregate(&series, self.bootstrap.as_mut());
        let points = decimate(points, self.config.decimation_stride);
        debug!(
            "collection {:?}: {} runs, {} points after decimation",
            name,
            series.len(),
            points.len()
        );

        self.curves.push(Curve::from_points(
            name,
            &points,
            self.config.chart.step_scale,
        ));
        Ok(())
    }

    /// Finish accumulation and hand the curves to rendering.
    pub fn into_comparison(self) -> Comparison {
        let mut comparison = Comparison::new(self.config.chart);
        for curve in self.curves {
            comparison.push(curve);
        }
        comparison
    }
}

/// One-shot report driver: one SQLite database per configured collection,
/// rendered to a PNG.
///
/// Failures surface immediately; reporting is an offline batch operation
/// and nothing is retried.
pub fn run_report(config: ReportConfig) -> Result<(), ReportError> {
    let collections = config.collections.clone();
    let mut report = Report::new(config)?;

    for spec in &collections {
        let source = SqliteSource::new(&spec.database);
        report.add_collection(&spec.name, &source)?;
    }

    PngRenderer.render(&report.into_comparison())?;
    Ok(())
}
