/// Figure export — renders a `ComposedPlot` into an image file at a
/// caller-specified physical size and resolution, on a fresh surface so
/// the interactive view is never touched.

mod png;
mod svg;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::compose::ComposedPlot;

/// Output file format. SVG is the vector option; PNG the raster one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Png, ExportFormat::Svg];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG (raster)",
            ExportFormat::Svg => "SVG (vector)",
        }
    }
}

/// Physical output settings. Pixel dimensions are inches × DPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub width_in: f32,
    pub height_in: f32,
    pub dpi: u32,
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width_in: 8.0,
            height_in: 6.0,
            dpi: 300,
            format: ExportFormat::Png,
        }
    }
}

impl ExportSettings {
    pub fn pixel_width(&self) -> u32 {
        ((self.width_in * self.dpi as f32).round() as u32).max(64)
    }

    pub fn pixel_height(&self) -> u32 {
        ((self.height_in * self.dpi as f32).round() as u32).max(64)
    }
}

/// Export failure, distinct from parse and configuration errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export — the plot has no drawable data")]
    EmptyPlot,
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render the composed plot to `path` in the configured format.
pub fn export_figure(
    plot: &ComposedPlot,
    settings: &ExportSettings,
    path: &Path,
) -> Result<(), ExportError> {
    if !plot.has_drawable_series() {
        return Err(ExportError::EmptyPlot);
    }
    match settings.format {
        ExportFormat::Png => png::render_png(plot, settings, path),
        ExportFormat::Svg => svg::render_svg(plot, settings, path),
    }
}

// =========================================================================
//  Shared Geometry
// =========================================================================

/// Pixel-space layout of the exported figure: margins sized from the
/// canvas so axis labels and the legend are not clipped, plus the data
/// transforms onto the plot rectangle. The y transform works in log10
/// space — the figure's intensity axis is logarithmic.
pub(crate) struct Layout {
    pub width: u32,
    pub height: u32,
    pub margin_left: u32,
    pub margin_top: u32,
    pub plot_w: u32,
    pub plot_h: u32,
    pub x_lo: f64,
    pub x_hi: f64,
    pub log_lo: f64,
    pub log_hi: f64,
}

impl Layout {
    pub fn new(plot: &ComposedPlot, width: u32, height: u32) -> Self {
        let margin_left = ((width as f64 * 0.07).max(60.0) as u32).min(width / 4);
        let margin_right = ((width as f64 * 0.03).max(30.0) as u32).min(width / 4);
        let margin_top = ((height as f64 * 0.05).max(30.0) as u32).min(height / 4);
        let margin_bottom = ((height as f64 * 0.12).max(70.0) as u32).min(height / 4);
        let plot_w = width - margin_left - margin_right;
        let plot_h = height - margin_top - margin_bottom;

        let data_range = plot.x_data_range().unwrap_or((0.0, 100.0));
        let x_lo = plot.config.x_min.unwrap_or(data_range.0);
        let mut x_hi = plot.config.x_max.unwrap_or(data_range.1);
        if x_hi <= x_lo {
            x_hi = x_lo + 1.0;
        }

        let (y_min, y_max) = plot.y_range;
        let log_lo = y_min.max(1e-12).log10();
        let mut log_hi = y_max.max(1e-12).log10();
        if log_hi <= log_lo {
            log_hi = log_lo + 1.0;
        }

        Self {
            width,
            height,
            margin_left,
            margin_top,
            plot_w,
            plot_h,
            x_lo,
            x_hi,
            log_lo,
            log_hi,
        }
    }

    pub fn x_px(&self, angle: f64) -> f64 {
        let frac = (angle - self.x_lo) / (self.x_hi - self.x_lo);
        self.margin_left as f64 + frac * self.plot_w as f64
    }

    /// Map an intensity value (linear space) to a pixel row, clamped to
    /// the plot rectangle.
    pub fn y_px(&self, value: f64) -> f64 {
        let log_v = value.max(1e-12).log10();
        let frac = 1.0 - (log_v - self.log_lo) / (self.log_hi - self.log_lo);
        self.margin_top as f64 + (frac * self.plot_h as f64).clamp(0.0, self.plot_h as f64)
    }

    pub fn contains_x(&self, angle: f64) -> bool {
        angle >= self.x_lo && angle <= self.x_hi
    }

    /// Tick positions at multiples of `step` within the x range.
    pub fn x_ticks(&self, step: f64) -> Vec<f64> {
        if step <= 0.0 {
            return Vec::new();
        }
        let mut ticks = Vec::new();
        let mut tick = (self.x_lo / step).ceil() * step;
        while tick <= self.x_hi + step * 1e-9 {
            ticks.push(tick);
            tick += step;
        }
        ticks
    }
}

/// Tick label precision follows the spacing: whole-degree steps label as
/// integers, finer steps keep one decimal.
pub(crate) fn tick_label(value: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Bitmap font scale approximating a point size at the given resolution
/// (glyphs are 5 px tall at scale 1).
pub(crate) fn font_scale(size_pt: f32, dpi: u32) -> u32 {
    ((size_pt * dpi as f32 / 72.0) / 5.0).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::config::PlotConfiguration;
    use crate::data::reference::{LineStyle, ReferencePeak};
    use crate::pipeline::compose::{self, PlotEntry};

    fn fixture_plot(dir: &str) -> ComposedPlot {
        let base = std::env::temp_dir().join(format!("xrd_gui_test_{dir}"));
        fs::create_dir_all(&base).unwrap();
        let path: PathBuf = base.join("scan.ras");
        fs::write(
            &path,
            "*RAS_INT_START\n30.0 10.0\n40.0 100.0\n50.0 1000.0\n*RAS_INT_END\n",
        )
        .unwrap();

        let peaks = vec![
            ReferencePeak {
                name: "LiTi2O4".to_string(),
                angle: 45.0,
                visible: true,
                color: [139, 0, 0],
                style: LineStyle::Dashed,
            },
            ReferencePeak {
                name: "Hidden".to_string(),
                angle: 35.0,
                visible: false,
                color: [0, 0, 0],
                style: LineStyle::Solid,
            },
        ];
        let config = PlotConfiguration {
            x_min: Some(30.0),
            x_max: Some(50.0),
            ..PlotConfiguration::default()
        };
        compose::compose(&[PlotEntry::new(path)], &peaks, &config).unwrap()
    }

    #[test]
    fn test_layout_transforms() {
        let plot = fixture_plot("layout");
        let layout = Layout::new(&plot, 800, 600);

        // X endpoints land on the plot rectangle edges.
        let left = layout.x_px(30.0);
        let right = layout.x_px(50.0);
        assert!((left - layout.margin_left as f64).abs() < 1e-6);
        assert!((right - (layout.margin_left + layout.plot_w) as f64).abs() < 1e-6);

        // Larger intensities map to smaller pixel rows on the log axis.
        assert!(layout.y_px(1000.0) < layout.y_px(10.0));

        let ticks = layout.x_ticks(10.0);
        assert_eq!(ticks, vec![30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_png_export_writes_file() {
        let plot = fixture_plot("png_export");
        let settings = ExportSettings {
            width_in: 2.0,
            height_in: 1.5,
            dpi: 100,
            format: ExportFormat::Png,
        };
        let out = std::env::temp_dir().join("xrd_gui_test_png_export/figure.png");
        export_figure(&plot, &settings, &out).unwrap();
        let metadata = fs::metadata(&out).unwrap();
        assert!(metadata.len() > 0);
        fs::remove_file(&out).ok();
    }

    #[test]
    fn test_svg_contains_series_and_skips_invisible_peaks() {
        let plot = fixture_plot("svg_export");
        let settings = ExportSettings {
            format: ExportFormat::Svg,
            ..ExportSettings::default()
        };
        let doc = super::svg::svg_document(&plot, &settings);
        assert!(doc.contains("<polyline"));
        assert!(doc.contains("LiTi2O4"));
        assert!(!doc.contains("Hidden"));
        // Physical size is recorded in inches.
        assert!(doc.contains("width='8in'"));
    }

    #[test]
    fn test_empty_plot_is_an_export_error() {
        let config = PlotConfiguration::default();
        let plot = compose::compose(&[], &[], &config).unwrap();
        let settings = ExportSettings::default();
        let out = std::env::temp_dir().join("xrd_gui_test_empty/figure.png");
        assert!(matches!(
            export_figure(&plot, &settings, &out),
            Err(ExportError::EmptyPlot)
        ));
    }
}
