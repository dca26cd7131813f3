//! Evoplot - Comparison plots of evolutionary-search progress.
//!
//! This crate turns raw per-run progress records from experiment result
//! databases into averaged, optionally confidence-banded curves and renders
//! them as a single comparison chart.
//!
//! # Architecture
//!
//! The crate is split into three main modules:
//!
//! - `schema`: Configuration types for collections, field selection, and charts
//! - `pipeline`: Record extraction, per-run series building, cross-run
//!   aggregation, and decimation
//! - `chart`: Comparison assembly and rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use evoplot::pipeline::{MemorySource, RawRecord};
//! use evoplot::report::Report;
//! use evoplot::schema::ReportConfig;
//!
//! // Configure the report (normally loaded from JSON)
//! let config = ReportConfig::default();
//!
//! // Any record source works; here an in-memory one
//! let mut source = MemorySource::new();
//! source.insert(
//!     "progress",
//!     vec![
//!         RawRecord { run: "1".into(), metric: 2.0, step: Some(0.0) },
//!         RawRecord { run: "1".into(), metric: 4.0, step: Some(1.0) },
//!     ],
//! );
//!
//! // Run extraction, aggregation, and decimation for one collection
//! let mut report = Report::new(config).unwrap();
//! report.add_collection("baseline", &source).unwrap();
//!
//! let comparison = report.into_comparison();
//! println!("curves: {}", comparison.curves().len());
//! ```

pub mod chart;
pub mod pipeline;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use chart::{Comparison, Curve, PngRenderer, RenderError, Renderer};
pub use pipeline::{MemorySource, RawRecord, RecordSource, SqliteSource};
pub use report::{Report, ReportError, run_report};
pub use schema::ReportConfig;
