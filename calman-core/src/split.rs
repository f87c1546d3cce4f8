//! Split boundary math.
//!
//! Given an event's span and a split percentage, computes where the
//! first half ends and where the second half starts. The two offsets
//! are computed independently: the first half covers `percent` of the
//! duration from the start, the second half covers the remaining
//! `100 - percent` measured from the end.

use chrono::{DateTime, Duration, Utc};

/// Boundary instants for a split event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitBounds {
    pub first_end: DateTime<Utc>,
    pub second_start: DateTime<Utc>,
}

/// Compute split boundaries.
///
/// `percent` must be in `(0, 100)`. When `rounding` carries a
/// granularity `g` (minutes), each offset is rounded via
/// `g * floor(offset/g - 0.5)`, which biases the boundary earlier by
/// roughly half a granularity unit. That tie-break is kept for
/// compatibility with existing calendars.
pub fn split_bounds(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    percent: f64,
    rounding: Option<i64>,
) -> SplitBounds {
    let duration_minutes = (end - start).num_seconds() as f64 / 60.0;

    let mut first_offset = percent / 100.0 * duration_minutes;
    let mut second_offset = (100.0 - percent) / 100.0 * duration_minutes;

    if let Some(g) = rounding.filter(|g| *g > 0) {
        first_offset = round_down_biased(first_offset, g);
        second_offset = round_down_biased(second_offset, g);
    }

    SplitBounds {
        first_end: start + minutes(first_offset),
        second_start: start + minutes(second_offset),
    }
}

fn round_down_biased(offset_minutes: f64, granularity: i64) -> f64 {
    let g = granularity as f64;
    g * (offset_minutes / g - 0.5).floor()
}

fn minutes(m: f64) -> Duration {
    Duration::seconds((m * 60.0).round() as i64)
}
