//! Schema module - Configuration types for report generation.

mod config;

pub use config::*;
