/// Export dialog — figure output settings in a small window.

use crate::export::{ExportFormat, ExportSettings};

/// Actions the export dialog can emit back to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportAction {
    None,
    Export,
}

/// Persistent dialog state
#[derive(Debug, Clone)]
pub struct ExportDialogState {
    pub open: bool,
    pub settings: ExportSettings,
}

impl Default for ExportDialogState {
    fn default() -> Self {
        Self {
            open: false,
            settings: ExportSettings::default(),
        }
    }
}

/// Render the export dialog window. Returns an action when the user
/// confirms the export.
pub fn show_export_dialog(ctx: &egui::Context, state: &mut ExportDialogState) -> ExportAction {
    let mut action = ExportAction::None;
    if !state.open {
        return action;
    }

    let mut open = state.open;
    egui::Window::new("🖼 Export Figure")
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            let settings = &mut state.settings;

            egui::Grid::new("export_settings")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Width (in):");
                    ui.add(
                        egui::DragValue::new(&mut settings.width_in)
                            .speed(0.1)
                            .range(1.0..=30.0),
                    );
                    ui.end_row();

                    ui.label("Height (in):");
                    ui.add(
                        egui::DragValue::new(&mut settings.height_in)
                            .speed(0.1)
                            .range(1.0..=30.0),
                    );
                    ui.end_row();

                    ui.label("Resolution (DPI):");
                    ui.add(
                        egui::DragValue::new(&mut settings.dpi)
                            .speed(10)
                            .range(50..=1200),
                    );
                    ui.end_row();

                    ui.label("Format:");
                    egui::ComboBox::from_id_salt("export_format")
                        .selected_text(settings.format.label())
                        .show_ui(ui, |ui| {
                            for format in ExportFormat::ALL {
                                ui.selectable_value(&mut settings.format, format, format.label());
                            }
                        });
                    ui.end_row();
                });

            ui.label(
                egui::RichText::new(format!(
                    "{} × {} px",
                    settings.pixel_width(),
                    settings.pixel_height()
                ))
                .size(11.0)
                .color(egui::Color32::from_rgb(0x88, 0x8C, 0x94)),
            );

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("💾 Export…").clicked() {
                    action = ExportAction::Export;
                }
                if ui.button("Cancel").clicked() {
                    state.open = false;
                }
            });
        });
    state.open &= open;

    action
}
