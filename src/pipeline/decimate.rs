//! Decimator - positional subsampling of aggregated sequences.

use super::AggregatedPoint;

/// Keep every `stride`-th point by position, starting at index 0.
///
/// Pure positional subsampling: no reordering, no interpolation. A stride
/// of 1 is the identity. A sequence of length `n` yields `ceil(n / stride)`
/// points. Stride 0 is rejected at configuration validation and treated as
/// 1 here.
pub fn decimate(points: Vec<AggregatedPoint>, stride: usize) -> Vec<AggregatedPoint> {
    if stride <= 1 {
        return points;
    }
    points.into_iter().step_by(stride).collect()
}
