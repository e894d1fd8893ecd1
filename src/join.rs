//! Tolerance-bounded nearest-time merge of two sample series
//!
//! The glucose series is the primary timeline; each reading picks up the
//! insulin dose closest to it in time, if one exists within the tolerance
//! window. Both series arrive sorted from the loader, so a single forward
//! pass with a trailing cursor over the dose series keeps the merge linear
//! in the combined input size.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::loader::Sample;

/// A glucose reading with the insulin dose matched to it, if any.
///
/// `dose_units` is `None` when no dose fell inside the tolerance window.
/// A recorded 0-unit dose is `Some(0.0)` - the distinction matters for
/// pattern detection downstream. Records are immutable after the merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub timestamp: NaiveDateTime,
    pub glucose_mg_dl: f64,
    pub dose_units: Option<f64>,
}

/// Merge `secondary` into `primary` by nearest timestamp.
///
/// Both inputs must be sorted ascending. For each primary sample the nearest
/// secondary sample is attached when its absolute time difference is within
/// `tolerance` (inclusive); ties prefer the earlier secondary entry.
pub fn merge_nearest(
    primary: &[Sample],
    secondary: &[Sample],
    tolerance: Duration,
) -> Vec<MergedRecord> {
    let mut merged = Vec::with_capacity(primary.len());
    let mut cursor = 0usize;

    for reading in primary {
        // Advance while the next dose is strictly closer to this reading.
        // On a tie the earlier entry wins, so equality does not advance.
        // Primary timestamps are ascending, so the cursor never moves back.
        while cursor + 1 < secondary.len()
            && distance(secondary[cursor + 1].timestamp, reading.timestamp)
                < distance(secondary[cursor].timestamp, reading.timestamp)
        {
            cursor += 1;
        }

        let dose_units = secondary
            .get(cursor)
            .filter(|dose| distance(dose.timestamp, reading.timestamp) <= tolerance)
            .map(|dose| dose.value);

        merged.push(MergedRecord {
            timestamp: reading.timestamp,
            glucose_mg_dl: reading.value,
            dose_units,
        });
    }

    merged
}

fn distance(a: NaiveDateTime, b: NaiveDateTime) -> Duration {
    (a - b).abs()
}
