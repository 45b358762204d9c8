/// Main application state and eframe::App implementation
///
/// Ties together the data pipeline, the GUI panels, and figure export.
/// The app owns the mutable configuration; every redraw hands the core an
/// immutable snapshot, so the pipeline itself keeps no session state.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::PlotConfiguration;
use crate::data::reference::{self, ReferencePeak};
use crate::export;
use crate::gui::export_dialog::{self, ExportAction, ExportDialogState};
use crate::gui::plot_view::{self, PlotViewState};
use crate::gui::reference_panel;
use crate::gui::settings_panel::{self, SettingsAction};
use crate::gui::theme::{self, AppTheme, ThemeColors};
use crate::gui::toolbar::{self, ToolbarAction};
use crate::pipeline::compose::{self, ComposedPlot, PlotEntry};

/// Quiet period after an edit before the plot recomposes, so bursts of
/// slider changes coalesce into one re-parse.
const REDRAW_DEBOUNCE: Duration = Duration::from_millis(500);

/// The main application
pub struct XrdApp {
    /// Selected scan files in draw order (order selects palette color and
    /// stacking offset).
    files: Vec<PlotEntry>,
    config: PlotConfiguration,
    reference_peaks: Vec<ReferencePeak>,

    /// Latest composition result; `None` until files are selected.
    composed: Option<ComposedPlot>,
    /// An edit happened; recompose after the debounce interval.
    dirty: bool,
    last_edit: Option<Instant>,

    plot_view_state: PlotViewState,
    export_dialog_state: ExportDialogState,

    status_message: String,
    show_about: bool,

    current_theme: AppTheme,
    theme_colors: ThemeColors,
}

impl XrdApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let default_theme = AppTheme::Light;
        theme::apply_theme(&cc.egui_ctx, default_theme);
        let theme_colors = ThemeColors::from_theme(default_theme);

        // Typography: scale for monitor DPI
        let ppi = cc.egui_ctx.pixels_per_point();
        let base_size = if ppi > 1.5 { 14.0 } else { 13.0 };
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(base_size, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            egui::FontId::new(base_size, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(base_size * 1.25, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            egui::FontId::new(base_size * 0.85, egui::FontFamily::Proportional),
        );
        style.spacing.item_spacing = egui::vec2(8.0, 5.0);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
        cc.egui_ctx.set_style(style);

        Self {
            files: Vec::new(),
            config: PlotConfiguration::default(),
            reference_peaks: reference::preset_peaks(),
            composed: None,
            dirty: false,
            last_edit: None,
            plot_view_state: PlotViewState::default(),
            export_dialog_state: ExportDialogState::default(),
            status_message: "Ready — add XRD scan files to begin".to_string(),
            show_about: false,
            current_theme: default_theme,
            theme_colors,
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.last_edit = Some(Instant::now());
    }

    /// Add scan files, skipping paths already in the list.
    fn add_files(&mut self, paths: Vec<PathBuf>) {
        let mut added = 0;
        for path in paths {
            if self.files.iter().any(|e| e.path == path) {
                continue;
            }
            log::info!("Adding scan file: {}", path.display());
            self.files.push(PlotEntry::new(path));
            added += 1;
        }
        if added > 0 {
            self.status_message = format!("Added {added} file(s)");
            self.mark_dirty();
        }
    }

    /// Re-run the composition pipeline against the current configuration.
    ///
    /// A configuration error leaves the previously displayed plot
    /// untouched; parse failures report alongside the partial render.
    fn recompose(&mut self) {
        self.dirty = false;

        if self.files.is_empty() {
            self.composed = None;
            self.status_message = "Ready — add XRD scan files to begin".to_string();
            return;
        }

        match compose::compose(&self.files, &self.reference_peaks, &self.config) {
            Ok(plot) => {
                self.status_message = match plot.failure_message() {
                    Some(message) => message.replace('\n', " "),
                    None if !plot.has_drawable_series() => {
                        "No data above the current threshold".to_string()
                    }
                    None => format!("Plotted {} series", plot.series.len()),
                };
                self.composed = Some(plot);
                self.plot_view_state.reset_view();
            }
            Err(err) => {
                log::warn!("Invalid configuration: {err}");
                self.status_message = err.to_string();
            }
        }
    }

    /// Run the export dialog's settings against a save-file dialog.
    /// Rendering happens on a fresh surface; the displayed plot state is
    /// never touched.
    fn export_figure(&mut self) {
        let Some(plot) = &self.composed else {
            self.status_message = "Nothing to export — no plot composed".to_string();
            return;
        };
        let settings = self.export_dialog_state.settings;
        let Some(path) = toolbar::save_figure_dialog(settings.format.extension()) else {
            return;
        };
        match export::export_figure(plot, &settings, &path) {
            Ok(()) => {
                log::info!("Exported figure to {}", path.display());
                self.status_message = format!("Exported figure: {}", path.display());
            }
            Err(err) => {
                log::error!("Export failed: {err}");
                self.status_message = format!("Export failed: {err}");
            }
        }
    }

    fn save_reference_peaks(&mut self) {
        let Some(path) = toolbar::save_peaks_dialog() else {
            return;
        };
        match reference::save_peaks(&path, &self.reference_peaks) {
            Ok(()) => self.status_message = format!("Saved reference peaks: {}", path.display()),
            Err(err) => self.status_message = format!("Failed to save reference peaks: {err}"),
        }
    }

    fn load_reference_peaks(&mut self) {
        let Some(path) = toolbar::load_peaks_dialog() else {
            return;
        };
        match reference::load_peaks(&path) {
            Ok(peaks) => {
                self.reference_peaks = peaks;
                self.status_message = format!("Loaded reference peaks: {}", path.display());
                self.mark_dirty();
            }
            Err(err) => self.status_message = format!("Failed to load reference peaks: {err}"),
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::None => {}
            ToolbarAction::AddFiles => {
                if let Some(paths) = toolbar::open_scan_files_dialog() {
                    self.add_files(paths);
                }
            }
            ToolbarAction::ClearFiles => {
                if !self.files.is_empty() {
                    self.files.clear();
                    self.status_message = "Removed all files".to_string();
                    self.mark_dirty();
                }
            }
            ToolbarAction::SaveReferencePeaks => self.save_reference_peaks(),
            ToolbarAction::LoadReferencePeaks => self.load_reference_peaks(),
            ToolbarAction::ExportFigure => self.export_dialog_state.open = true,
            ToolbarAction::ResetView => self.plot_view_state.reset_view(),
            ToolbarAction::ThemeToggle => {
                self.current_theme = self.current_theme.next();
                self.theme_colors = ThemeColors::from_theme(self.current_theme);
            }
            ToolbarAction::ShowAbout => self.show_about = true,
        }
    }
}

impl eframe::App for XrdApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        theme::apply_theme(ctx, self.current_theme);

        // ── Dropped files ──
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.add_files(dropped);
        }

        // ── Toolbar ──
        let action = toolbar::show_toolbar(ctx, self.current_theme.label());
        self.handle_toolbar_action(action);

        // ── Settings panel ──
        let mut changed = false;
        let mut settings_action = SettingsAction::None;
        egui::SidePanel::left("settings_panel")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        let (panel_changed, panel_action) = settings_panel::show_settings_panel(
                            ui,
                            &mut self.files,
                            &mut self.config,
                        );
                        changed |= panel_changed;
                        settings_action = panel_action;

                        ui.add_space(4.0);
                        changed |=
                            reference_panel::show_reference_panel(ui, &mut self.reference_peaks);
                    });
            });
        if settings_action == SettingsAction::AddFiles {
            if let Some(paths) = toolbar::open_scan_files_dialog() {
                self.add_files(paths);
            }
        }
        if changed {
            self.mark_dirty();
        }

        // ── Status bar ──
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(&self.status_message)
                        .size(12.0)
                        .color(self.theme_colors.status_text),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("{} file(s)", self.files.len()))
                            .size(11.5)
                            .color(self.theme_colors.text_muted),
                    );
                });
            });
        });

        // ── Plot ──
        egui::CentralPanel::default().show(ctx, |ui| {
            plot_view::show_plot_view(
                ui,
                self.composed.as_ref(),
                &mut self.plot_view_state,
                &self.theme_colors,
            );
        });

        // ── Export dialog ──
        if export_dialog::show_export_dialog(ctx, &mut self.export_dialog_state)
            == ExportAction::Export
        {
            self.export_dialog_state.open = false;
            self.export_figure();
        }

        // ── About window ──
        if self.show_about {
            egui::Window::new("About")
                .open(&mut self.show_about)
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.heading("XRD Data Plotter");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.separator();
                    ui.label("• Overlay or stack RAS scans on a log intensity axis");
                    ui.label("• Background subtraction and peak detection");
                    ui.label("• Reference peak annotations for known phases");
                    ui.label("• PNG / SVG figure export at print resolution");
                });
        }

        // ── Keyboard shortcuts ──
        let open_shortcut = ctx.input(|i| {
            (i.modifiers.ctrl || i.modifiers.command) && i.key_pressed(egui::Key::O)
        });
        if open_shortcut {
            if let Some(paths) = toolbar::open_scan_files_dialog() {
                self.add_files(paths);
            }
        }

        // ── Debounced recomposition ──
        if self.dirty {
            let quiet = self
                .last_edit
                .map(|t| t.elapsed() >= REDRAW_DEBOUNCE)
                .unwrap_or(true);
            if quiet {
                self.recompose();
            } else {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
        }
    }
}
