//! Pipeline module - Record extraction and data shaping.
//!
//! One collection flows through a single linear pass: record source ->
//! series builder -> cross-run aggregator -> decimator. The decimated
//! points are then assembled into curves by the `chart` module.

mod aggregate;
mod decimate;
mod series;
mod source;

pub use aggregate::*;
pub use decimate::*;
pub use series::*;
pub use source::*;
