/// Plot composition — turns file paths plus a configuration snapshot into
/// a fully prepared `ComposedPlot` that the interactive view and the file
/// exporters render without re-deriving anything.

use std::path::PathBuf;

use crate::config::{ConfigError, PlotConfiguration};
use crate::data::ras;
use crate::data::reference::ReferencePeak;
use crate::data::scan;
use super::processing::{self, DetectedPeak};
use super::range;

/// Fixed trace palette (matplotlib's default cycle), indexed by drawn
/// series position modulo the palette length. Index order also drives the
/// stacking multiplier, so reordering the file list re-derives both.
pub const SERIES_PALETTE: [[u8; 3]; 10] = [
    [0x1F, 0x77, 0xB4],
    [0xFF, 0x7F, 0x0E],
    [0x2C, 0xA0, 0x2C],
    [0xD6, 0x27, 0x28],
    [0x94, 0x67, 0xBD],
    [0x8C, 0x56, 0x4B],
    [0xE3, 0x77, 0xC2],
    [0x7F, 0x7F, 0x7F],
    [0xBC, 0xBD, 0x22],
    [0x17, 0xBE, 0xCF],
];

/// One requested trace: a file path and its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotEntry {
    pub path: PathBuf,
    pub label: String,
}

impl PlotEntry {
    pub fn new(path: PathBuf) -> Self {
        let label = scan::default_label(&path);
        Self { path, label }
    }
}

/// A series ready to draw: thresholded, background-corrected, stacked and
/// annotated. `values` parallels `angles`; NaN marks a gap.
#[derive(Debug, Clone)]
pub struct ProcessedSeries {
    pub label: String,
    pub angles: Vec<f64>,
    pub values: Vec<f64>,
    /// Stacking multiplier already applied to `values`.
    pub multiplier: f64,
    /// Drawn position, selecting both palette color and stacking offset.
    pub color_index: usize,
    pub peaks: Vec<DetectedPeak>,
}

impl ProcessedSeries {
    pub fn color(&self) -> [u8; 3] {
        SERIES_PALETTE[self.color_index % SERIES_PALETTE.len()]
    }

    /// Contiguous runs of plottable points, split at gap sentinels.
    /// Each point is `[angle, value]`.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        let mut segments = Vec::new();
        let mut current: Vec<[f64; 2]> = Vec::new();
        for (&angle, &value) in self.angles.iter().zip(self.values.iter()) {
            if value.is_finite() {
                current.push([angle, value]);
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// The prepared plot. Parse failures are carried alongside the surviving
/// series: the partial render still happens and the aggregate message is
/// reported in addition to it.
#[derive(Debug, Clone)]
pub struct ComposedPlot {
    pub series: Vec<ProcessedSeries>,
    /// Derived intensity range `(y_min, y_max)`.
    pub y_range: (f64, f64),
    pub reference_peaks: Vec<ReferencePeak>,
    /// File names (not full paths) that could not be read.
    pub parse_failures: Vec<String>,
    pub config: PlotConfiguration,
}

impl ComposedPlot {
    /// Aggregated parse failure message, or `None` when every file loaded.
    pub fn failure_message(&self) -> Option<String> {
        if self.parse_failures.is_empty() {
            None
        } else {
            Some(format!(
                "Failed to read the following files:\n{}",
                self.parse_failures.join("\n")
            ))
        }
    }

    /// Whether anything survived thresholding.
    pub fn has_drawable_series(&self) -> bool {
        !self.series.is_empty()
    }

    /// Reference peaks that actually draw.
    pub fn drawable_reference_peaks(&self) -> impl Iterator<Item = &ReferencePeak> {
        self.reference_peaks.iter().filter(|p| p.is_drawable())
    }

    /// Angle extent across all drawn series, for automatic x bounds.
    pub fn x_data_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for s in &self.series {
            for &a in &s.angles {
                min = min.min(a);
                max = max.max(a);
            }
        }
        if min <= max {
            Some((min, max))
        } else {
            None
        }
    }
}

/// Prepare every requested series for drawing.
///
/// Configuration is validated first; an invalid x range aborts before any
/// parsing. Files that cannot be read are collected by name and do not
/// stop the rest. Series whose points are all filtered out are skipped
/// and consume neither a palette slot nor a stacking step.
pub fn compose(
    entries: &[PlotEntry],
    reference_peaks: &[ReferencePeak],
    config: &PlotConfiguration,
) -> Result<ComposedPlot, ConfigError> {
    config.validate()?;

    let mut parse_failures = Vec::new();
    let mut series: Vec<ProcessedSeries> = Vec::new();

    for entry in entries {
        let parsed = match ras::read_ras_file(&entry.path) {
            Ok(scan) => scan,
            Err(err) => {
                log::warn!("{err}");
                parse_failures.push(scan::default_label(&entry.path));
                continue;
            }
        };

        let intensities = if config.background.enabled {
            processing::subtract_background(&parsed.intensities, config.background.window)
        } else {
            parsed.intensities
        };

        let values =
            processing::apply_threshold(&intensities, config.threshold, config.threshold_policy);
        if values.iter().all(|v| !v.is_finite()) {
            // Entirely filtered out: skipped from drawing, not an error.
            continue;
        }

        let index = series.len();
        let multiplier = config.stack_multiplier(index);
        let scaled: Vec<f64> = values.iter().map(|v| v * multiplier).collect();
        let peaks =
            processing::detect_peaks(&parsed.angles, &scaled, &config.peaks, multiplier);

        series.push(ProcessedSeries {
            label: entry.label.clone(),
            angles: parsed.angles,
            values: scaled,
            multiplier,
            color_index: index,
            peaks,
        });
    }

    let y_range = range::compute_y_range(&series, config.stacked, config.padding_factor);

    Ok(ComposedPlot {
        series,
        y_range,
        reference_peaks: reference_peaks.to_vec(),
        parse_failures,
        config: config.clone(),
    })
}
