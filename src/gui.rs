//! GUI shell for glucolog using egui
//!
//! The shell only gathers an [`AnalysisConfig`] (two file paths and a unit)
//! and renders whatever the pipeline returns. All analysis lives in the core
//! modules so the CLI and the GUI stay in lockstep.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, Points};
use serde::{Deserialize, Serialize};

use crate::analysis::summarize;
use crate::config::{settings_file_path, AnalysisConfig};
use crate::pipeline::{run_analysis, AnalysisReport};
use crate::units::{GlucoseUnit, UnitContext};

/// Persistent user settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    pub unit: GlucoseUnit,
}

impl AppSettings {
    /// Load settings from the settings file
    pub fn load() -> Self {
        let path = settings_file_path();
        if path.exists() {
            if let Ok(contents) = fs::read_to_string(&path) {
                if let Ok(settings) = serde_json::from_str(&contents) {
                    return settings;
                }
            }
        }
        Self::default()
    }

    /// Save settings to the settings file
    pub fn save(&self) {
        let path = settings_file_path();
        if let Ok(json) = serde_json::to_string_pretty(self) {
            if let Ok(mut file) = fs::File::create(&path) {
                let _ = file.write_all(json.as_bytes());
            }
        }
    }
}

#[derive(PartialEq, Clone, Copy)]
enum AnalysisStatus {
    Idle,
    Success,
    Error,
}

/// Main application state
pub struct AnalyzerApp {
    cgm_path: Option<PathBuf>,
    insulin_path: Option<PathBuf>,
    unit: GlucoseUnit,
    report: Option<AnalysisReport>,
    status: AnalysisStatus,
    status_message: String,
}

impl Default for AnalyzerApp {
    fn default() -> Self {
        let settings = AppSettings::load();
        Self {
            cgm_path: None,
            insulin_path: None,
            unit: settings.unit,
            report: None,
            status: AnalysisStatus::Idle,
            status_message: String::new(),
        }
    }
}

impl AnalyzerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::from_gray(220));
        cc.egui_ctx.set_visuals(visuals);

        Self::default()
    }

    fn pick_cgm_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.cgm_path = Some(path);
        }
    }

    fn pick_insulin_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.insulin_path = Some(path);
        }
    }

    fn run_analysis(&mut self) {
        let (Some(cgm), Some(insulin)) = (&self.cgm_path, &self.insulin_path) else {
            self.status = AnalysisStatus::Error;
            self.status_message = "Please import both CGM and insulin data files.".to_string();
            return;
        };

        let config = AnalysisConfig {
            cgm_path: cgm.clone(),
            insulin_path: insulin.clone(),
            unit: self.unit,
        };

        match run_analysis(&config) {
            Ok(report) => {
                self.status = AnalysisStatus::Success;
                self.status_message =
                    format!("✓ Analyzed {} readings", report.summary.reading_count);
                self.report = Some(report);
            }
            Err(e) => {
                self.status = AnalysisStatus::Error;
                self.status_message = format!("✗ {}", e);
            }
        }
    }

    /// Re-derive the summary under the newly selected unit. Merged records
    /// store raw mg/dL, so no file reload is needed.
    fn reapply_unit(&mut self) {
        if let Some(report) = &mut self.report {
            let ctx = UnitContext::for_unit(self.unit);
            if let Ok(summary) = summarize(&report.series, &ctx) {
                report.summary = summary;
                report.unit = self.unit;
            }
        }
    }

    fn file_label(path: &Option<PathBuf>) -> String {
        match path {
            Some(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string()),
            None => "No file selected".to_string(),
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Import CGM Data").clicked() {
                self.pick_cgm_file();
            }
            ui.label(Self::file_label(&self.cgm_path));
        });

        ui.horizontal(|ui| {
            if ui.button("Import Insulin Data").clicked() {
                self.pick_insulin_file();
            }
            ui.label(Self::file_label(&self.insulin_path));
        });

        ui.horizontal(|ui| {
            let previous_unit = self.unit;
            egui::ComboBox::from_label("Units")
                .selected_text(self.unit.label())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.unit, GlucoseUnit::MgDl, GlucoseUnit::MgDl.label());
                    ui.selectable_value(&mut self.unit, GlucoseUnit::MmolL, GlucoseUnit::MmolL.label());
                });
            if self.unit != previous_unit {
                AppSettings { unit: self.unit }.save();
                self.reapply_unit();
            }

            ui.add_space(20.0);
            if ui.button("Analyze Data").clicked() {
                self.run_analysis();
            }
        });

        if !self.status_message.is_empty() {
            let color = match self.status {
                AnalysisStatus::Success => egui::Color32::from_rgb(100, 255, 100),
                AnalysisStatus::Error => egui::Color32::from_rgb(255, 100, 100),
                AnalysisStatus::Idle => egui::Color32::from_gray(180),
            };
            ui.colored_label(color, &self.status_message);
        }
    }

    fn show_summary(&self, ui: &mut egui::Ui, report: &AnalysisReport) {
        let ctx = UnitContext::for_unit(report.unit);
        let summary = &report.summary;

        ui.label(egui::RichText::new("Summary").heading());
        egui::Grid::new("summary_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                ui.label("Average Glucose:");
                ui.label(report.unit.format(summary.average_glucose));
                ui.end_row();

                ui.label(format!("Time in Range ({}):", ctx.format_range()));
                let tir_color = if summary.time_in_range_percent >= 70.0 {
                    egui::Color32::from_rgb(100, 255, 100)
                } else {
                    egui::Color32::from_rgb(255, 180, 100)
                };
                ui.colored_label(tir_color, format!("{:.1}%", summary.time_in_range_percent));
                ui.end_row();

                ui.label("Readings:");
                ui.label(format!("{}", summary.reading_count));
                ui.end_row();

                ui.label("Matched doses:");
                ui.label(format!("{}", summary.matched_dose_count));
                ui.end_row();
            });

        ui.add_space(8.0);
        match &summary.pattern_message {
            Some(message) => {
                ui.colored_label(egui::Color32::from_rgb(255, 180, 100), format!("⚠ {}", message));
            }
            None => {
                ui.colored_label(
                    egui::Color32::from_rgb(100, 255, 100),
                    "No high-after-dose pattern detected.",
                );
            }
        }
    }

    fn show_chart(&self, ui: &mut egui::Ui, report: &AnalysisReport) {
        let ctx = UnitContext::for_unit(report.unit);
        let len = report.series.len();

        ui.label(egui::RichText::new("Glucose Levels and Insulin Doses").heading());

        let glucose_points: PlotPoints = report
            .series
            .iter()
            .enumerate()
            .map(|(i, r)| [i as f64, ctx.to_display(r.glucose_mg_dl)])
            .collect();
        let glucose_line = Line::new("Glucose", glucose_points)
            .color(egui::Color32::from_rgb(100, 150, 255));

        // Dose markers are scaled so small unit counts stay visible against
        // glucose values; unmatched records plot as 0 here (display only).
        let dose_scale = match report.unit {
            GlucoseUnit::MgDl => 10.0,
            GlucoseUnit::MmolL => 0.5,
        };
        let dose_points: PlotPoints = report
            .series
            .iter()
            .enumerate()
            .map(|(i, r)| [i as f64, r.dose_units.unwrap_or(0.0) * dose_scale])
            .collect();
        let doses = Points::new("Insulin Dose (scaled)", dose_points)
            .radius(3.0)
            .color(egui::Color32::from_rgb(255, 100, 100));

        // Reference lines for the target range
        let low_line = Line::new(
            format!("Low ({})", report.unit.format_value(ctx.target_low)),
            PlotPoints::from_iter((0..len).map(|i| [i as f64, ctx.target_low])),
        )
        .color(egui::Color32::from_rgb(100, 200, 100))
        .style(egui_plot::LineStyle::dashed_dense());

        let high_line = Line::new(
            format!("High ({})", report.unit.format_value(ctx.target_high)),
            PlotPoints::from_iter((0..len).map(|i| [i as f64, ctx.target_high])),
        )
        .color(egui::Color32::from_rgb(100, 200, 100))
        .style(egui_plot::LineStyle::dashed_dense());

        Plot::new("glucose_trend")
            .height(280.0)
            .show_axes(true)
            .legend(egui_plot::Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(glucose_line);
                plot_ui.line(low_line);
                plot_ui.line(high_line);
                plot_ui.points(doses);
            });
    }
}

impl eframe::App for AnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Diabetes Data Analyzer");
            ui.add_space(4.0);
            self.show_controls(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(report) = self.report.clone() else {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    ui.label("Import a CGM export and an insulin log, then press Analyze.");
                });
                return;
            };

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.group(|ui| self.show_summary(ui, &report));
                ui.add_space(12.0);
                ui.group(|ui| self.show_chart(ui, &report));
            });
        });
    }
}

/// Run the GUI application
pub fn run_gui() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([800.0, 600.0])
            .with_transparent(false),
        vsync: true,
        multisampling: 0,
        depth_buffer: 0,
        ..Default::default()
    };

    eframe::run_native(
        "Diabetes Data Analyzer",
        options,
        Box::new(|cc| Ok(Box::new(AnalyzerApp::new(cc)))),
    )
}
