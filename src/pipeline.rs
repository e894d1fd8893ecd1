//! The analysis pipeline: load, merge, summarize
//!
//! This is the pure core behind both shells. It takes an explicit
//! [`AnalysisConfig`] and returns a report bundle; presentation (console
//! output, charts, dialogs) happens entirely in the caller.

use chrono::Duration;
use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::{summarize, AnalysisSummary};
use crate::config::AnalysisConfig;
use crate::error::AnalyzerError;
use crate::join::{merge_nearest, MergedRecord};
use crate::loader::{load_series, DOSE_COLUMN, GLUCOSE_COLUMN, TIMESTAMP_COLUMN};
use crate::units::{GlucoseUnit, UnitContext};

/// Doses further than this from any glucose reading are left unmatched
pub const MATCH_TOLERANCE_MINUTES: i64 = 15;

/// Everything a presenter needs to render one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    pub series: Vec<MergedRecord>,
    pub unit: GlucoseUnit,
}

/// Run the full pipeline for one configuration.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisReport, AnalyzerError> {
    let readings = load_series(&config.cgm_path, TIMESTAMP_COLUMN, GLUCOSE_COLUMN)?;
    let doses = load_series(&config.insulin_path, TIMESTAMP_COLUMN, DOSE_COLUMN)?;
    info!(
        "Loaded {} glucose readings and {} insulin doses",
        readings.len(),
        doses.len()
    );

    let series = merge_nearest(
        &readings,
        &doses,
        Duration::minutes(MATCH_TOLERANCE_MINUTES),
    );

    let ctx = UnitContext::for_unit(config.unit);
    let summary = summarize(&series, &ctx)?;
    info!(
        "Analysis complete: {} records, {} matched doses, {:.1}% in range",
        summary.reading_count, summary.matched_dose_count, summary.time_in_range_percent
    );

    Ok(AnalysisReport {
        summary,
        series,
        unit: config.unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_end_to_end_analysis() {
        let cgm = write_csv(
            "Timestamp,Glucose (mg/dL)\n\
             2024-03-01 08:00:00,100\n\
             2024-03-01 08:05:00,120\n\
             2024-03-01 08:10:00,140\n\
             2024-03-01 08:15:00,160\n\
             2024-03-01 08:20:00,180\n\
             2024-03-01 08:25:00,195\n\
             2024-03-01 08:30:00,210\n",
        );
        let insulin = write_csv(
            "Timestamp,Dose (units)\n\
             2024-03-01 08:01:00,4\n",
        );

        let config = AnalysisConfig {
            cgm_path: cgm.path().to_path_buf(),
            insulin_path: insulin.path().to_path_buf(),
            unit: GlucoseUnit::MgDl,
        };
        let report = run_analysis(&config).unwrap();

        assert_eq!(report.summary.reading_count, 7);
        // The dose at 08:01 is within tolerance of the first four readings;
        // the 08:20 reading is 19 minutes away and stays unmatched.
        assert_eq!(report.series[0].dose_units, Some(4.0));
        assert_eq!(report.series[3].dose_units, Some(4.0));
        assert!(report.series[4].dose_units.is_none());
        // 210 at index 6 is exactly the lag away from the dosed first record
        assert!(report.summary.pattern_detected);
        // 100..195 are in range (180 inclusive is, 195 is not): 5 of 7
        assert!((report.summary.time_in_range_percent - (5.0 / 7.0 * 100.0)).abs() < 0.01);
    }

    #[test]
    fn test_all_rows_dropped_reports_empty_dataset() {
        let cgm = write_csv(
            "Timestamp,Glucose (mg/dL)\n\
             2024-03-01 08:00:00,\n\
             2024-03-01 08:05:00,\n",
        );
        let insulin = write_csv("Timestamp,Dose (units)\n");

        let config = AnalysisConfig {
            cgm_path: cgm.path().to_path_buf(),
            insulin_path: insulin.path().to_path_buf(),
            unit: GlucoseUnit::MgDl,
        };
        let err = run_analysis(&config).unwrap_err();
        assert!(matches!(err, AnalyzerError::EmptyDataset));
    }

    #[test]
    fn test_unit_selection_flows_through() {
        let cgm = write_csv(
            "Timestamp,Glucose (mg/dL)\n\
             2024-03-01 08:00:00,180\n",
        );
        let insulin = write_csv("Timestamp,Dose (units)\n");

        let config = AnalysisConfig {
            cgm_path: cgm.path().to_path_buf(),
            insulin_path: insulin.path().to_path_buf(),
            unit: GlucoseUnit::MmolL,
        };
        let report = run_analysis(&config).unwrap();
        assert_eq!(report.unit, GlucoseUnit::MmolL);
        assert!((report.summary.average_glucose - 10.0).abs() < 1e-9);
        assert_eq!(report.summary.time_in_range_percent, 100.0);
    }
}
