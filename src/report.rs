//! Console presentation of analysis results
//!
//! The pipeline never prints; this module turns a report bundle into CLI
//! output. Human-readable summary goes to stderr, machine-readable JSON to
//! stdout, so the JSON can be piped without the summary mixed in.

use crate::error::AnalyzerError;
use crate::pipeline::AnalysisReport;
use crate::units::UnitContext;

/// Print the human-readable summary to stderr.
pub fn print_summary(report: &AnalysisReport) {
    let ctx = UnitContext::for_unit(report.unit);
    let summary = &report.summary;

    eprintln!(
        "Average Glucose:   {}",
        report.unit.format(summary.average_glucose)
    );
    eprintln!(
        "Time in Range ({}): {:.1}%",
        ctx.format_range(),
        summary.time_in_range_percent
    );
    eprintln!("Readings analyzed: {}", summary.reading_count);
    eprintln!("Doses matched:     {}", summary.matched_dose_count);
    match &summary.pattern_message {
        Some(message) => eprintln!("Pattern:           {}", message),
        None => eprintln!("Pattern:           none detected"),
    }
}

/// Dump the full report bundle as pretty JSON to stdout.
pub fn print_json(report: &AnalysisReport) -> Result<(), AnalyzerError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
