//! Error types for the glucolog application

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("No analyzable records (every row was dropped or the files were empty)")]
    EmptyDataset,

    #[error("Unknown glucose unit '{0}' (expected 'mg/dL' or 'mmol/L')")]
    InvalidUnit(String),

    #[error("GUI error: {0}")]
    Gui(String),
}
