//! Summary statistics and dose-response pattern detection
//!
//! Works in the display unit throughout: values are converted through the
//! [`UnitContext`] as they are read, leaving the merged records untouched so
//! the same series can be re-analyzed under the other unit without reloading.

use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;
use crate::join::MergedRecord;
use crate::units::UnitContext;

/// How many records after a dose to look for a glucose spike.
///
/// This is an index lag, not a time lookup: at the usual 5-minute CGM cadence
/// six records is ~30 minutes, but a file sampled at a different rate shifts
/// the effective window. Kept index-based to match the established behavior.
pub const HIGH_AFTER_DOSE_LAG: usize = 6;

/// Computed summary of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Mean glucose in the display unit
    pub average_glucose: f64,
    /// Percentage of readings inside the target range, in [0, 100]
    pub time_in_range_percent: f64,
    pub reading_count: usize,
    pub matched_dose_count: usize,
    pub pattern_detected: bool,
    pub pattern_message: Option<String>,
}

/// Compute the summary for a merged series under the given unit context.
///
/// An empty series is a reported condition, not a crash: the caller gets
/// [`AnalyzerError::EmptyDataset`] and no partial summary.
pub fn summarize(
    records: &[MergedRecord],
    ctx: &UnitContext,
) -> Result<AnalysisSummary, AnalyzerError> {
    if records.is_empty() {
        return Err(AnalyzerError::EmptyDataset);
    }

    let total = records.len();
    let mut sum = 0.0;
    let mut in_range = 0usize;
    let mut matched_doses = 0usize;

    for record in records {
        let glucose = ctx.to_display(record.glucose_mg_dl);
        sum += glucose;
        if ctx.in_range(glucose) {
            in_range += 1;
        }
        if record.dose_units.is_some() {
            matched_doses += 1;
        }
    }

    let flagged = flag_high_after_dose(records, ctx);
    let pattern_detected = !flagged.is_empty();
    let pattern_message = pattern_detected.then(|| {
        format!(
            "High glucose (> {}) detected ~30 minutes after {} insulin dose{}",
            ctx.unit.format(ctx.high_alert_threshold),
            flagged.len(),
            if flagged.len() == 1 { "" } else { "s" },
        )
    });

    Ok(AnalysisSummary {
        average_glucose: sum / total as f64,
        time_in_range_percent: (in_range as f64 / total as f64) * 100.0,
        reading_count: total,
        matched_dose_count: matched_doses,
        pattern_detected,
        pattern_message,
    })
}

/// Indices of dosed records whose reading [`HIGH_AFTER_DOSE_LAG`] positions
/// later exceeds the high-alert threshold.
///
/// Only records with a matched dose participate; an unmatched record is not
/// the same as a 0-unit dose.
pub fn flag_high_after_dose(records: &[MergedRecord], ctx: &UnitContext) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(i, record)| {
            record.dose_units.is_some()
                && records
                    .get(i + HIGH_AFTER_DOSE_LAG)
                    .is_some_and(|later| ctx.to_display(later.glucose_mg_dl) > ctx.high_alert_threshold)
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::GlucoseUnit;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn ts(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn record(minutes: i64, glucose: f64, dose: Option<f64>) -> MergedRecord {
        MergedRecord {
            timestamp: ts(minutes),
            glucose_mg_dl: glucose,
            dose_units: dose,
        }
    }

    fn series(glucose: &[f64]) -> Vec<MergedRecord> {
        glucose
            .iter()
            .enumerate()
            .map(|(i, &g)| record(i as i64 * 5, g, None))
            .collect()
    }

    #[test]
    fn test_empty_dataset_is_reported() {
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);
        let err = summarize(&[], &ctx).unwrap_err();
        assert!(matches!(err, AnalyzerError::EmptyDataset));
    }

    #[test]
    fn test_mean_glucose() {
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);
        let summary = summarize(&series(&[90.0, 110.0, 130.0]), &ctx).unwrap();
        assert!((summary.average_glucose - 110.0).abs() < 1e-9);
        assert_eq!(summary.reading_count, 3);
    }

    #[test]
    fn test_time_in_range_inclusive_bounds() {
        // 70 and 180 count, 181 does not: 2 of 3 -> 66.7%
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);
        let summary = summarize(&series(&[70.0, 180.0, 181.0]), &ctx).unwrap();
        assert!((summary.time_in_range_percent - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_time_in_range_stays_in_percent_bounds() {
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);
        let all_high = summarize(&series(&[300.0, 350.0]), &ctx).unwrap();
        assert_eq!(all_high.time_in_range_percent, 0.0);
        let all_in = summarize(&series(&[100.0, 120.0]), &ctx).unwrap();
        assert_eq!(all_in.time_in_range_percent, 100.0);
    }

    #[test]
    fn test_mmol_classification_after_conversion() {
        // 180 mg/dL displays as 10.0 mmol/L and is still in range
        let ctx = UnitContext::for_unit(GlucoseUnit::MmolL);
        let summary = summarize(&series(&[180.0]), &ctx).unwrap();
        assert_eq!(summary.time_in_range_percent, 100.0);
        assert!((summary.average_glucose - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_fires_exactly_at_lag() {
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);

        // Spike 6 positions after the dose: detected
        let mut records = series(&[100.0; 10]);
        records[2].dose_units = Some(4.0);
        records[8].glucose_mg_dl = 210.0;
        let summary = summarize(&records, &ctx).unwrap();
        assert!(summary.pattern_detected);
        assert_eq!(flag_high_after_dose(&records, &ctx), vec![2]);
        let message = summary.pattern_message.unwrap();
        assert!(message.contains("200 mg/dL"), "message: {}", message);

        // Spike at 5 or 7 positions after: not detected
        for offset in [5usize, 7] {
            let mut records = series(&[100.0; 10]);
            records[2].dose_units = Some(4.0);
            records[2 + offset].glucose_mg_dl = 210.0;
            let summary = summarize(&records, &ctx).unwrap();
            assert!(!summary.pattern_detected, "offset {}", offset);
        }
    }

    #[test]
    fn test_pattern_needs_a_matched_dose() {
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);
        let mut records = series(&[100.0; 10]);
        records[8].glucose_mg_dl = 210.0;
        // No dose anywhere: spike alone is not a pattern
        let summary = summarize(&records, &ctx).unwrap();
        assert!(!summary.pattern_detected);

        // A 0-unit dose still counts as a dose event
        records[2].dose_units = Some(0.0);
        let summary = summarize(&records, &ctx).unwrap();
        assert!(summary.pattern_detected);
    }

    #[test]
    fn test_pattern_lag_beyond_series_end() {
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);
        let mut records = series(&[220.0, 220.0, 220.0]);
        records[1].dose_units = Some(2.0);
        // Record 1 + lag 6 is past the end; nothing to compare against
        let summary = summarize(&records, &ctx).unwrap();
        assert!(!summary.pattern_detected);
    }

    #[test]
    fn test_pattern_threshold_in_mmol() {
        // 210 mg/dL = 11.67 mmol/L > 11.1, so the pattern fires in mmol mode too
        let ctx = UnitContext::for_unit(GlucoseUnit::MmolL);
        let mut records = series(&[100.0; 10]);
        records[0].dose_units = Some(3.0);
        records[6].glucose_mg_dl = 210.0;
        let summary = summarize(&records, &ctx).unwrap();
        assert!(summary.pattern_detected);
        assert!(summary.pattern_message.unwrap().contains("11.1 mmol/L"));
    }

    #[test]
    fn test_matched_dose_count() {
        let ctx = UnitContext::for_unit(GlucoseUnit::MgDl);
        let mut records = series(&[100.0; 5]);
        records[1].dose_units = Some(2.0);
        records[3].dose_units = Some(0.0);
        let summary = summarize(&records, &ctx).unwrap();
        assert_eq!(summary.matched_dose_count, 2);
    }
}
