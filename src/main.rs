//! Diabetes data analyzer
//!
//! Merges CGM glucose exports with insulin dose logs, computes time-in-range
//! statistics, and flags glucose spikes following insulin doses.
//!
//! Usage:
//!   glucolog                                        - Launch GUI
//!   glucolog analyze <cgm.csv> <insulin.csv> [unit] - CLI analysis
//!   glucolog --help                                 - Show help
//!   GLUCOLOG_DBG=1 glucolog analyze ...             - Enable debug output

mod analysis;
mod config;
mod error;
mod gui;
mod join;
mod loader;
mod pipeline;
mod report;
mod units;

use std::env;
use std::path::PathBuf;

use crate::config::{ensure_data_dir, get_data_dir, settings_file_path, AnalysisConfig};
use crate::error::AnalyzerError;
use crate::pipeline::run_analysis;
use crate::units::GlucoseUnit;

fn main() -> Result<(), AnalyzerError> {
    let args: Vec<String> = env::args().collect();

    // Initialize logger when debug mode is requested
    if env::var("GLUCOLOG_DBG").is_ok() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    }

    // Ensure data directory exists (persisted GUI settings live there)
    if let Err(e) = ensure_data_dir() {
        eprintln!("Warning: Could not create data directory: {}", e);
    }

    match args.get(1).map(|s| s.as_str()) {
        Some("analyze") => cmd_analyze(&args[2..]),
        Some("--help") | Some("-h") | Some("help") => {
            print_help();
            Ok(())
        }
        Some("--version") | Some("-V") => {
            println!("glucolog {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some("path") | Some("paths") => {
            cmd_show_paths();
            Ok(())
        }
        _ => {
            // Default: launch GUI
            gui::run_gui().map_err(|e| AnalyzerError::Gui(format!("{}", e)))
        }
    }
}

/// Run analysis from the command line
fn cmd_analyze(args: &[String]) -> Result<(), AnalyzerError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut unit = GlucoseUnit::default();
    let mut json_output = false;

    for arg in args {
        match arg.as_str() {
            "--json" => json_output = true,
            token if token.starts_with("--") => {
                eprintln!("Unknown option '{}'", token);
                print_help();
                return Ok(());
            }
            token => {
                if paths.len() < 2 {
                    paths.push(PathBuf::from(token));
                } else {
                    unit = GlucoseUnit::from_token(token)
                        .ok_or_else(|| AnalyzerError::InvalidUnit(token.to_string()))?;
                }
            }
        }
    }

    if paths.len() != 2 {
        eprintln!("analyze requires a CGM file and an insulin file");
        print_help();
        return Ok(());
    }

    let cgm_path = paths.remove(0);
    let insulin_path = paths.remove(0);
    let config = AnalysisConfig {
        cgm_path,
        insulin_path,
        unit,
    };

    let analysis_report = run_analysis(&config)?;
    report::print_summary(&analysis_report);
    if json_output {
        report::print_json(&analysis_report)?;
    }
    Ok(())
}

/// Show data paths
fn cmd_show_paths() {
    println!("Glucolog Data Paths:");
    println!("  Data directory:  {}", get_data_dir().display());
    println!("  Settings file:   {}", settings_file_path().display());
}

fn print_help() {
    eprintln!("Diabetes Data Analyzer v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  glucolog                                        Launch GUI application");
    eprintln!("  glucolog analyze <cgm.csv> <insulin.csv> [unit] Analyze two CSV exports");
    eprintln!("  glucolog path                                   Show data file locations");
    eprintln!("  glucolog help                                   Show this help");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  [unit]                      Display unit: 'mg/dL' (default) or 'mmol/L'");
    eprintln!("  --json                      Also print the full report bundle as JSON");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("  GLUCOLOG_DBG=1              Enable debug output");
    eprintln!();
    eprintln!("INPUT FORMAT:");
    eprintln!("  CGM file:     CSV with 'Timestamp' and 'Glucose (mg/dL)' columns");
    eprintln!("  Insulin file: CSV with 'Timestamp' and 'Dose (units)' columns");
}
