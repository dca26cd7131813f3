//! Series builder - group raw records into per-run series.

use std::collections::BTreeMap;

use super::RawRecord;

/// An ordered `(step, metric)` sequence for one run.
pub type Series = Vec<(f64, f64)>;

/// Group records by run into step-sorted series.
///
/// Records without an explicit step are assigned their per-run encounter
/// index. Each series is then sorted ascending by step, since source rows
/// may arrive in arbitrary or reverse order. Empty input yields an empty
/// map.
pub fn build_series(records: Vec<RawRecord>) -> BTreeMap<String, Series> {
    let mut by_run: BTreeMap<String, Series> = BTreeMap::new();

    for RawRecord { run, metric, step } in records {
        let series = by_run.entry(run).or_default();
        let step = step.unwrap_or(series.len() as f64);
        series.push((step, metric));
    }

    for series in by_run.values_mut() {
        series.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    by_run
}
