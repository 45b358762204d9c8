/// Toolbar — top menu bar with file operations and quick actions

use std::path::PathBuf;

/// Actions that can be triggered from the toolbar
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    None,
    AddFiles,
    ClearFiles,
    SaveReferencePeaks,
    LoadReferencePeaks,
    ExportFigure,
    ResetView,
    ThemeToggle,
    ShowAbout,
}

/// Render the toolbar and return any triggered action
pub fn show_toolbar(ctx: &egui::Context, theme_label: &str) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            // File menu
            ui.menu_button("📁 File", |ui| {
                if ui.button("📂 Add Scan Files…").clicked() {
                    action = ToolbarAction::AddFiles;
                    ui.close_menu();
                }
                if ui.button("🗑 Remove All Files").clicked() {
                    action = ToolbarAction::ClearFiles;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("💾 Save Reference Peaks…").clicked() {
                    action = ToolbarAction::SaveReferencePeaks;
                    ui.close_menu();
                }
                if ui.button("📂 Load Reference Peaks…").clicked() {
                    action = ToolbarAction::LoadReferencePeaks;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("🖼 Export Figure…").clicked() {
                    action = ToolbarAction::ExportFigure;
                    ui.close_menu();
                }
            });

            // View menu
            ui.menu_button("🔍 View", |ui| {
                if ui.button("🔄 Reset View").clicked() {
                    action = ToolbarAction::ResetView;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button(format!("🎨 Theme: {}", theme_label)).clicked() {
                    action = ToolbarAction::ThemeToggle;
                    ui.close_menu();
                }
            });

            // Help menu
            ui.menu_button("❓ Help", |ui| {
                if ui.button("ℹ About").clicked() {
                    action = ToolbarAction::ShowAbout;
                    ui.close_menu();
                }
            });

            // Spacer + quick theme toggle
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(
                        egui::Button::new(egui::RichText::new(theme_label).size(12.0))
                            .corner_radius(12.0),
                    )
                    .clicked()
                {
                    action = ToolbarAction::ThemeToggle;
                }
                ui.separator();
                ui.label(
                    egui::RichText::new("XRD Data Plotter")
                        .color(egui::Color32::from_rgb(0x70, 0x75, 0x80))
                        .size(12.0),
                );
            });
        });
    });

    action
}

/// Multi-select dialog for scan files
pub fn open_scan_files_dialog() -> Option<Vec<PathBuf>> {
    rfd::FileDialog::new()
        .set_title("Select XRD Scan Files")
        .add_filter("RAS files", &["ras"])
        .add_filter("All Files", &["*"])
        .pick_files()
}

/// Save dialog for the exported figure
pub fn save_figure_dialog(extension: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export Figure")
        .add_filter("PNG Image", &["png"])
        .add_filter("SVG Image", &["svg"])
        .set_file_name(format!("xrd_plot.{extension}"))
        .save_file()
}

/// Save dialog for a reference peak list
pub fn save_peaks_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Save Reference Peaks")
        .add_filter("JSON", &["json"])
        .set_file_name("reference_peaks.json")
        .save_file()
}

/// Open dialog for a reference peak list
pub fn load_peaks_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Load Reference Peaks")
        .add_filter("JSON", &["json"])
        .pick_file()
}
