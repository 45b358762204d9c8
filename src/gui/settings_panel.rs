/// Settings panel — file list plus every plot configuration field.
///
/// Returns whether anything changed (the app debounces recomposition on
/// that flag) and any file-management action that needs a native dialog.

use crate::config::{LegendPosition, PlotConfiguration, ThresholdPolicy, TickDirection};
use crate::pipeline::compose::PlotEntry;

/// Actions the settings panel can emit back to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    AddFiles,
}

pub fn show_settings_panel(
    ui: &mut egui::Ui,
    files: &mut Vec<PlotEntry>,
    config: &mut PlotConfiguration,
) -> (bool, SettingsAction) {
    let mut changed = false;
    let mut action = SettingsAction::None;

    ui.vertical_centered(|ui| {
        ui.heading("📈 Plot Settings");
    });
    ui.separator();

    // ── Files ──
    ui.collapsing("📁 Scan Files", |ui| {
        if ui.button("➕ Add Files…").clicked() {
            action = SettingsAction::AddFiles;
        }

        let mut remove: Option<usize> = None;
        for (i, entry) in files.iter_mut().enumerate() {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!("{}", i + 1))
                        .size(11.0)
                        .color(egui::Color32::from_rgb(0x88, 0x8C, 0x94)),
                );
                let response = ui.add(
                    egui::TextEdit::singleline(&mut entry.label).desired_width(160.0),
                );
                if response.changed() {
                    changed = true;
                }
                response.on_hover_text(entry.path.display().to_string());
                if ui.small_button("✖").clicked() {
                    remove = Some(i);
                }
            });
        }
        if let Some(i) = remove {
            files.remove(i);
            changed = true;
        }

        if files.is_empty() {
            ui.label(
                egui::RichText::new("Drag & drop .ras files or use Add Files")
                    .size(11.5)
                    .color(egui::Color32::from_rgb(0xAA, 0xAE, 0xB4)),
            );
        }
    });

    // ── Graph ──
    ui.collapsing("📊 Graph", |ui| {
        ui.horizontal(|ui| {
            ui.label("Intensity threshold:");
            changed |= ui
                .add(egui::DragValue::new(&mut config.threshold).speed(1.0))
                .changed();
        });
        egui::ComboBox::from_label("Below threshold")
            .selected_text(config.threshold_policy.label())
            .show_ui(ui, |ui| {
                for policy in [ThresholdPolicy::Hide, ThresholdPolicy::Clip] {
                    changed |= ui
                        .selectable_value(&mut config.threshold_policy, policy, policy.label())
                        .changed();
                }
            });

        ui.separator();

        changed |= option_bound(ui, "X min (°)", &mut config.x_min, 30.0);
        changed |= option_bound(ui, "X max (°)", &mut config.x_max, 130.0);
        if let (Some(min), Some(max)) = (config.x_min, config.x_max) {
            if min >= max {
                ui.colored_label(
                    egui::Color32::from_rgb(0xC0, 0x33, 0x3B),
                    "⚠ X minimum must be below the maximum",
                );
            }
        }

        ui.separator();

        changed |= ui
            .checkbox(&mut config.stacked, "Stack traces vertically")
            .changed();
        if config.stacked {
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.spacing, 0.0..=5.0)
                        .text("Spacing (10^n)")
                        .fixed_decimals(1),
                )
                .changed();
        } else {
            // The legend applies to overlaid traces only; stacked traces
            // are identified by their order.
            changed |= ui.checkbox(&mut config.show_legend, "Show legend").changed();
            if config.show_legend {
                egui::ComboBox::from_label("Legend position")
                    .selected_text(config.legend_position.label())
                    .show_ui(ui, |ui| {
                        for position in LegendPosition::ALL {
                            changed |= ui
                                .selectable_value(
                                    &mut config.legend_position,
                                    position,
                                    position.label(),
                                )
                                .changed();
                        }
                    });
            }
        }
    });

    // ── Processing ──
    ui.collapsing("🔧 Processing", |ui| {
        changed |= ui
            .checkbox(&mut config.background.enabled, "Subtract background")
            .changed();
        if config.background.enabled {
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.background.window, 0..=500)
                        .text("Window (samples)"),
                )
                .changed();
            ui.label(
                egui::RichText::new("Minimum-filter estimate, single pass")
                    .size(11.0)
                    .color(egui::Color32::from_rgb(0x88, 0x8C, 0x94)),
            );
        }

        ui.separator();

        changed |= ui
            .checkbox(&mut config.peaks.enabled, "Detect peaks")
            .changed();
        if config.peaks.enabled {
            ui.horizontal(|ui| {
                ui.label("Min height:");
                changed |= ui
                    .add(egui::DragValue::new(&mut config.peaks.min_height).speed(1.0))
                    .changed();
            });
            ui.horizontal(|ui| {
                ui.label("Min prominence:");
                changed |= ui
                    .add(egui::DragValue::new(&mut config.peaks.min_prominence).speed(1.0))
                    .changed();
            });
            ui.horizontal(|ui| {
                ui.label("Min width (samples):");
                changed |= ui
                    .add(egui::DragValue::new(&mut config.peaks.min_width).speed(0.1))
                    .changed();
            });
        }
    });

    // ── Appearance ──
    ui.collapsing("🎨 Appearance", |ui| {
        ui.horizontal(|ui| {
            ui.label("X label:");
            changed |= ui.text_edit_singleline(&mut config.x_label).changed();
        });
        ui.horizontal(|ui| {
            ui.label("Y label:");
            changed |= ui.text_edit_singleline(&mut config.y_label).changed();
        });
        ui.horizontal(|ui| {
            ui.label("Axis font:");
            changed |= ui
                .add(egui::DragValue::new(&mut config.axis_label_font_size).range(4.0..=72.0))
                .changed();
            ui.label("Tick font:");
            changed |= ui
                .add(egui::DragValue::new(&mut config.tick_label_font_size).range(4.0..=72.0))
                .changed();
            ui.label("Legend font:");
            changed |= ui
                .add(egui::DragValue::new(&mut config.legend_font_size).range(4.0..=72.0))
                .changed();
        });

        ui.separator();

        egui::ComboBox::from_label("Tick direction")
            .selected_text(config.tick_direction.label())
            .show_ui(ui, |ui| {
                for direction in [TickDirection::In, TickDirection::Out] {
                    changed |= ui
                        .selectable_value(&mut config.tick_direction, direction, direction.label())
                        .changed();
                }
            });
        ui.horizontal(|ui| {
            ui.label("Major tick spacing (°):");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut config.x_major_tick_spacing)
                        .speed(0.5)
                        .range(0.1..=90.0),
                )
                .changed();
        });
        changed |= option_bound(ui, "Minor tick spacing (°)", &mut config.x_minor_tick_spacing, 2.0);
        changed |= ui
            .checkbox(&mut config.show_grid, "Grid lines (x axis)")
            .changed();

        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Line width:");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut config.line_width)
                        .speed(0.1)
                        .range(0.1..=10.0),
                )
                .changed();
            ui.label("Y headroom:");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut config.padding_factor)
                        .speed(0.05)
                        .range(1.0..=10.0),
                )
                .changed();
        });
        ui.horizontal(|ui| {
            ui.label("Ref. label offset (°):");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut config.reference_label_offset)
                        .speed(0.05)
                        .range(-5.0..=5.0),
                )
                .changed();
            ui.label("font:");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut config.reference_label_font_size)
                        .range(4.0..=72.0),
                )
                .changed();
        });
    });

    (changed, action)
}

/// Checkbox-gated optional numeric field (`None` = automatic).
fn option_bound(
    ui: &mut egui::Ui,
    label: &str,
    bound: &mut Option<f64>,
    default: f64,
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        let mut set = bound.is_some();
        if ui.checkbox(&mut set, label).changed() {
            *bound = if set { Some(default) } else { None };
            changed = true;
        }
        if let Some(value) = bound.as_mut() {
            changed |= ui
                .add(egui::DragValue::new(value).speed(0.5))
                .changed();
        } else {
            ui.label(
                egui::RichText::new("auto")
                    .size(11.0)
                    .color(egui::Color32::from_rgb(0x88, 0x8C, 0x94)),
            );
        }
    });
    changed
}
