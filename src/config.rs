//! Analysis configuration and data directory paths

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::units::GlucoseUnit;

/// Everything one analysis run needs, gathered by the CLI or the GUI shell.
///
/// The core pipeline takes this struct and nothing else - no widget state,
/// no globals - so the same entry point serves both shells.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub cgm_path: PathBuf,
    pub insulin_path: PathBuf,
    pub unit: GlucoseUnit,
}

/// OS-specific data directory for glucolog
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glucolog")
}

/// Create the data directory if it doesn't exist
pub fn ensure_data_dir() -> io::Result<()> {
    fs::create_dir_all(get_data_dir())
}

/// Path to the persisted GUI settings file
pub fn settings_file_path() -> PathBuf {
    get_data_dir().join("settings.json")
}
