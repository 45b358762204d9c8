/// Theme system — switchable light/dark color themes.

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AppTheme {
    Light,
    Dark,
}

impl AppTheme {
    pub fn label(&self) -> &'static str {
        match self {
            AppTheme::Light => "☀ Light",
            AppTheme::Dark => "🌙 Dark",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            AppTheme::Light => AppTheme::Dark,
            AppTheme::Dark => AppTheme::Light,
        }
    }
}

/// Colors the application reads directly (everything else comes from the
/// egui visuals set in `apply_theme`).
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub panel_fill: egui::Color32,
    pub window_fill: egui::Color32,

    pub text_primary: egui::Color32,
    pub text_secondary: egui::Color32,
    pub text_muted: egui::Color32,

    pub accent: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,

    pub peak_label: egui::Color32,
    pub status_bar_bg: egui::Color32,
    pub status_text: egui::Color32,

    pub is_dark: bool,
}

impl ThemeColors {
    pub fn from_theme(theme: AppTheme) -> Self {
        match theme {
            AppTheme::Light => Self::light(),
            AppTheme::Dark => Self::dark(),
        }
    }

    fn light() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0xF7, 0xF7, 0xF8),
            window_fill: egui::Color32::from_rgb(0xFF, 0xFF, 0xFF),
            text_primary: egui::Color32::from_rgb(0x20, 0x22, 0x28),
            text_secondary: egui::Color32::from_rgb(0x55, 0x58, 0x62),
            text_muted: egui::Color32::from_rgb(0x88, 0x8C, 0x94),
            accent: egui::Color32::from_rgb(0x3B, 0x7D, 0xC0),
            warning: egui::Color32::from_rgb(0xC0, 0x8A, 0x1A),
            error: egui::Color32::from_rgb(0xC0, 0x33, 0x3B),
            peak_label: egui::Color32::from_rgb(0x8A, 0x33, 0x20),
            status_bar_bg: egui::Color32::from_rgb(0xEF, 0xF0, 0xF2),
            status_text: egui::Color32::from_rgb(0x55, 0x58, 0x62),
            is_dark: false,
        }
    }

    fn dark() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0x1B, 0x1D, 0x23),
            window_fill: egui::Color32::from_rgb(0x22, 0x25, 0x2C),
            text_primary: egui::Color32::from_rgb(0xE2, 0xE4, 0xE8),
            text_secondary: egui::Color32::from_rgb(0xA8, 0xAC, 0xB4),
            text_muted: egui::Color32::from_rgb(0x70, 0x74, 0x7E),
            accent: egui::Color32::from_rgb(0x5B, 0x9B, 0xD5),
            warning: egui::Color32::from_rgb(0xE0, 0xB0, 0x40),
            error: egui::Color32::from_rgb(0xE0, 0x55, 0x5E),
            peak_label: egui::Color32::from_rgb(0xE0, 0x8A, 0x60),
            status_bar_bg: egui::Color32::from_rgb(0x15, 0x17, 0x1C),
            status_text: egui::Color32::from_rgb(0xA8, 0xAC, 0xB4),
            is_dark: true,
        }
    }
}

/// Apply a theme to the egui context
pub fn apply_theme(ctx: &egui::Context, theme: AppTheme) {
    let c = ThemeColors::from_theme(theme);

    let mut visuals = if c.is_dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.panel_fill = c.panel_fill;
    visuals.window_fill = c.window_fill;
    visuals.selection.bg_fill = c.accent.gamma_multiply(0.35);
    visuals.selection.stroke = egui::Stroke::new(1.5, c.accent);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, c.accent);

    ctx.set_visuals(visuals);
}
