//! Glucose units, conversion, and range classification
//!
//! CGM exports store glucose in mg/dL only, so the mmol/L view is derived by
//! dividing by the fixed factor of 18 (1 mmol/L = 18 mg/dL). Conversion is a
//! pure function over the stored mg/dL value; records are never rewritten in
//! the other unit.
//!
//! Target ranges and the high-alert threshold are stored per unit, matching
//! the clinically published values rather than converting one set from the
//! other.

use serde::{Deserialize, Serialize};

/// Conversion factor: 1 mmol/L = 18 mg/dL
pub const CONVERSION_FACTOR: f64 = 18.0;

/// User's preferred display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mg/dL")]
    #[default]
    MgDl,
    #[serde(rename = "mmol/L")]
    MmolL,
}

impl GlucoseUnit {
    /// Parse the unit token supplied by the UI or the command line
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("mg/dL") {
            Some(GlucoseUnit::MgDl)
        } else if token.eq_ignore_ascii_case("mmol/L") {
            Some(GlucoseUnit::MmolL)
        } else {
            None
        }
    }

    /// Get the unit label
    pub fn label(self) -> &'static str {
        match self {
            GlucoseUnit::MgDl => "mg/dL",
            GlucoseUnit::MmolL => "mmol/L",
        }
    }

    /// Format a display-unit value with unit suffix
    pub fn format(self, value: f64) -> String {
        match self {
            GlucoseUnit::MgDl => format!("{:.0} mg/dL", value),
            GlucoseUnit::MmolL => format!("{:.1} mmol/L", value),
        }
    }

    /// Format just the value without unit suffix
    pub fn format_value(self, value: f64) -> String {
        match self {
            GlucoseUnit::MgDl => format!("{:.0}", value),
            GlucoseUnit::MmolL => format!("{:.1}", value),
        }
    }
}

/// Per-unit analysis context: conversion target plus clinical thresholds.
/// Derived once per run and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitContext {
    pub unit: GlucoseUnit,
    /// Low end of the target range - 70 mg/dL or 3.9 mmol/L
    pub target_low: f64,
    /// High end of the target range - 180 mg/dL or 10.0 mmol/L
    pub target_high: f64,
    /// Alert threshold for dose-response detection - 200 mg/dL or 11.1 mmol/L
    pub high_alert_threshold: f64,
}

impl UnitContext {
    /// Build the context for the selected display unit
    pub fn for_unit(unit: GlucoseUnit) -> Self {
        match unit {
            GlucoseUnit::MgDl => Self {
                unit,
                target_low: 70.0,
                target_high: 180.0,
                high_alert_threshold: 200.0,
            },
            GlucoseUnit::MmolL => Self {
                unit,
                target_low: 3.9,
                target_high: 10.0,
                high_alert_threshold: 11.1,
            },
        }
    }

    /// Convert a stored mg/dL value into the display unit
    pub fn to_display(&self, mg_dl: f64) -> f64 {
        match self.unit {
            GlucoseUnit::MgDl => mg_dl,
            GlucoseUnit::MmolL => mg_dl / CONVERSION_FACTOR,
        }
    }

    /// Convert a display-unit value back to mg/dL (inverse of [`Self::to_display`])
    #[allow(dead_code)]
    pub fn to_mg_dl(&self, value: f64) -> f64 {
        match self.unit {
            GlucoseUnit::MgDl => value,
            GlucoseUnit::MmolL => value * CONVERSION_FACTOR,
        }
    }

    /// True when a display-unit value falls inside the target range.
    /// Both bounds are inclusive.
    pub fn in_range(&self, value: f64) -> bool {
        value >= self.target_low && value <= self.target_high
    }

    /// Get threshold display string for the user's unit
    pub fn format_range(&self) -> String {
        match self.unit {
            GlucoseUnit::MgDl => format!("{:.0}-{:.0} mg/dL", self.target_low, self.target_high),
            GlucoseUnit::MmolL => format!("{:.1}-{:.1} mmol/L", self.target_low, self.target_high),
        }
    }
}
