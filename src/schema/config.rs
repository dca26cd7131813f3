//! Configuration types for report generation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default progress table name.
fn default_table() -> String {
    "progress".to_string()
}

/// Default decimation stride (no decimation).
fn default_stride() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_resamples() -> usize {
    1000
}

fn default_confidence() -> f64 {
    0.95
}

fn default_step_scale() -> f64 {
    1.0
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

/// Top-level report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Collections to compare, in legend order.
    pub collections: Vec<CollectionSpec>,
    /// Table holding the progress records.
    #[serde(default = "default_table")]
    pub table: String,
    /// Column selection for run, metric, and step.
    #[serde(default)]
    pub fields: FieldSpec,
    /// Row filter clauses, combined with AND.
    #[serde(default)]
    pub filter: Vec<FilterClause>,
    /// Source-side ordering by step. The series builder re-sorts either way.
    #[serde(default)]
    pub order: Option<StepOrder>,
    /// Keep every Nth aggregated point.
    #[serde(default = "default_stride")]
    pub decimation_stride: usize,
    /// Compute bootstrap confidence intervals of the per-step mean.
    #[serde(default = "default_true")]
    pub compute_ci: bool,
    /// Bootstrap resampling parameters.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Chart furnishings and output target.
    #[serde(default)]
    pub chart: ChartConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            collections: vec![CollectionSpec {
                name: "baseline".to_string(),
                database: PathBuf::from("baseline.db3"),
            }],
            table: default_table(),
            fields: FieldSpec::default(),
            filter: Vec::new(),
            order: None,
            decimation_stride: default_stride(),
            compute_ci: default_true(),
            bootstrap: BootstrapConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

/// One named collection backed by a result database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Legend name for the collection's curve.
    pub name: String,
    /// Path to the SQLite database file.
    pub database: PathBuf,
}

/// Column selection for record extraction.
///
/// `step` is optional: when absent, each run's record index is used as the
/// step axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Run identifier column.
    pub run: String,
    /// Metric value column.
    pub metric: String,
    /// Step value column, if the table has an explicit step axis.
    #[serde(default)]
    pub step: Option<String>,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            run: "evol_id".to_string(),
            metric: "mean".to_string(),
            step: Some("num_indivs".to_string()),
        }
    }
}

/// Role of a column in the record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    /// The run identifier column.
    Run,
    /// The metric value column.
    Metric,
    /// The step value column.
    Step,
}

/// Comparison operator for a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// SQL operator text.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Evaluate the operator on two values.
    pub fn matches(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

/// One structured row filter. Values are always bound as parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    /// Column the clause applies to.
    pub column: ColumnRole,
    /// Comparison operator.
    pub op: CompareOp,
    /// Comparison value.
    pub value: f64,
}

/// Source-side ordering of rows by step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOrder {
    Ascending,
    Descending,
}

/// Bootstrap confidence-interval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resamples per step.
    #[serde(default = "default_resamples")]
    pub resamples: usize,
    /// Confidence level, strictly between 0 and 1.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Resampling seed. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resamples: default_resamples(),
            confidence: default_confidence(),
            seed: None,
        }
    }
}

/// Chart furnishings and output target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Chart title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Horizontal reference line (e.g. a known upper bound).
    #[serde(default)]
    pub reference_line: Option<f64>,
    /// Multiplier applied to step values before plotting.
    #[serde(default = "default_step_scale")]
    pub step_scale: f64,
    /// Image width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Image height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Output image path. Nothing is written when unset.
    #[serde(default)]
    pub save_path: Option<PathBuf>,
    /// Present the chart interactively, where the renderer supports it.
    #[serde(default)]
    pub show: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Search progress".to_string(),
            x_label: "individuals".to_string(),
            y_label: "mean fitness".to_string(),
            reference_line: None,
            step_scale: default_step_scale(),
            width: default_width(),
            height: default_height(),
            save_path: None,
            show: false,
        }
    }
}

/// Check that a name is a plain SQL identifier.
///
/// Table and column names come from configuration and are interpolated into
/// query text, so anything beyond `[A-Za-z_][A-Za-z0-9_]*` is rejected.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl ReportConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collections.is_empty() {
            return Err(ConfigError::NoCollections);
        }
        if self.decimation_stride == 0 {
            return Err(ConfigError::InvalidStride);
        }
        for name in [&self.table, &self.fields.run, &self.fields.metric]
            .into_iter()
            .chain(self.fields.step.as_ref())
        {
            if !is_identifier(name) {
                return Err(ConfigError::InvalidIdentifier(name.clone()));
            }
        }
        if self.compute_ci {
            if self.bootstrap.resamples == 0 {
                return Err(ConfigError::InvalidResamples);
            }
            if !(self.bootstrap.confidence > 0.0 && self.bootstrap.confidence < 1.0) {
                return Err(ConfigError::InvalidConfidence);
            }
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if !self.chart.step_scale.is_finite() || self.chart.step_scale == 0.0 {
            return Err(ConfigError::InvalidStepScale);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No collections specified")]
    NoCollections,
    #[error("Decimation stride must be at least 1")]
    InvalidStride,
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("Bootstrap resamples must be at least 1")]
    InvalidResamples,
    #[error("Bootstrap confidence must be strictly between 0 and 1")]
    InvalidConfidence,
    #[error("Chart dimensions must be non-zero")]
    InvalidDimensions,
    #[error("Step scale must be finite and non-zero")]
    InvalidStepScale,
}
