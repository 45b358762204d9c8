/// Plot configuration — a snapshot of every rendering parameter for one
/// composition call. The GUI owns a mutable copy and hands the core an
/// immutable snapshot on each redraw; the core keeps no state between calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do with intensities below the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdPolicy {
    /// Drop the point, leaving a visual gap in the trace.
    Hide,
    /// Raise the point to the clip floor so the trace stays continuous
    /// (a log axis cannot render non-positive values).
    Clip,
}

impl ThresholdPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            ThresholdPolicy::Hide => "Hide (gap)",
            ThresholdPolicy::Clip => "Clip to floor",
        }
    }
}

/// Axis tick mark direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickDirection {
    In,
    Out,
}

impl TickDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TickDirection::In => "Inward",
            TickDirection::Out => "Outward",
        }
    }
}

/// Where the legend sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendPosition {
    Auto,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl LegendPosition {
    pub const ALL: [LegendPosition; 5] = [
        LegendPosition::Auto,
        LegendPosition::UpperLeft,
        LegendPosition::UpperRight,
        LegendPosition::LowerLeft,
        LegendPosition::LowerRight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LegendPosition::Auto => "Automatic",
            LegendPosition::UpperLeft => "Upper left",
            LegendPosition::UpperRight => "Upper right",
            LegendPosition::LowerLeft => "Lower left",
            LegendPosition::LowerRight => "Lower right",
        }
    }
}

/// Background estimation settings.
///
/// The background is a sliding-window minimum of the intensity trace —
/// a single-pass approximation of iterative peak-clipping (SNIP) removal,
/// good enough to flatten amorphous humps under sharp diffraction peaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    pub enabled: bool,
    /// Filter window in samples. Zero disables the filter even when enabled.
    pub window: usize,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            window: 50,
        }
    }
}

/// Peak detection criteria. All three must hold for a local maximum to be
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakDetectionSettings {
    pub enabled: bool,
    /// Absolute height floor, in the same (possibly stacked-scaled)
    /// intensity units as the drawn trace.
    pub min_height: f64,
    /// Topographic prominence floor, same units as `min_height`.
    pub min_prominence: f64,
    /// Width floor at half prominence, in sample-index units — NOT degrees.
    /// Sample spacing in angle depends on the scan step, so the same value
    /// means different angular widths for different scans.
    pub min_width: f64,
}

impl Default for PeakDetectionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            min_height: 100.0,
            min_prominence: 50.0,
            min_width: 2.0,
        }
    }
}

/// Rejected configuration. Checked before any composition work happens.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("x-axis minimum ({min}) must be less than maximum ({max})")]
    InvalidXRange { min: f64, max: f64 },
}

/// Everything one redraw needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfiguration {
    /// Intensity threshold; points below it are hidden or clipped.
    pub threshold: f64,
    pub threshold_policy: ThresholdPolicy,

    /// X-axis bounds in degrees 2θ; `None` means automatic.
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,

    /// Stacked display: series i is multiplied by `(10^spacing)^i`.
    pub stacked: bool,
    /// Spacing exponent per stacking step.
    pub spacing: f64,

    pub show_legend: bool,
    pub legend_position: LegendPosition,
    pub legend_font_size: f32,

    pub x_label: String,
    pub y_label: String,
    pub axis_label_font_size: f32,
    pub tick_label_font_size: f32,

    pub tick_direction: TickDirection,
    /// Major x-tick interval in degrees.
    pub x_major_tick_spacing: f64,
    /// Optional minor x-tick interval in degrees.
    pub x_minor_tick_spacing: Option<f64>,
    /// Grid lines are drawn for the x axis only.
    pub show_grid: bool,

    pub line_width: f32,
    /// Headroom multiplier applied to the maximum intensity for the top of
    /// the y range.
    pub padding_factor: f64,

    /// Horizontal offset of reference peak labels from their marker line,
    /// in degrees.
    pub reference_label_offset: f64,
    pub reference_label_font_size: f32,

    pub background: BackgroundSettings,
    pub peaks: PeakDetectionSettings,
}

impl Default for PlotConfiguration {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            threshold_policy: ThresholdPolicy::Hide,
            x_min: Some(30.0),
            x_max: Some(130.0),
            stacked: false,
            spacing: 2.0,
            show_legend: true,
            legend_position: LegendPosition::Auto,
            legend_font_size: 10.0,
            x_label: "2θ/ω (degree)".to_string(),
            y_label: "Log Intensity (arb. Units)".to_string(),
            axis_label_font_size: 20.0,
            tick_label_font_size: 16.0,
            tick_direction: TickDirection::In,
            x_major_tick_spacing: 10.0,
            x_minor_tick_spacing: None,
            show_grid: false,
            line_width: 1.0,
            padding_factor: 1.5,
            reference_label_offset: 0.2,
            reference_label_font_size: 10.0,
            background: BackgroundSettings::default(),
            peaks: PeakDetectionSettings::default(),
        }
    }
}

impl PlotConfiguration {
    /// Reject impossible axis ranges before any drawing happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(min), Some(max)) = (self.x_min, self.x_max) {
            if min >= max {
                return Err(ConfigError::InvalidXRange { min, max });
            }
        }
        Ok(())
    }

    /// Vertical multiplier for the series at drawn position `index`.
    /// Index 0 (the bottom trace) is never scaled.
    pub fn stack_multiplier(&self, index: usize) -> f64 {
        if self.stacked {
            10f64.powf(self.spacing * index as f64)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ranges_pass() {
        let config = PlotConfiguration::default();
        assert!(config.validate().is_ok());

        let open_ended = PlotConfiguration {
            x_min: None,
            x_max: Some(50.0),
            ..PlotConfiguration::default()
        };
        assert!(open_ended.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let config = PlotConfiguration {
            x_min: Some(100.0),
            x_max: Some(50.0),
            ..PlotConfiguration::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidXRange {
                min: 100.0,
                max: 50.0
            })
        );
    }

    #[test]
    fn test_equal_bounds_are_rejected() {
        let config = PlotConfiguration {
            x_min: Some(50.0),
            x_max: Some(50.0),
            ..PlotConfiguration::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stack_multiplier_progression() {
        let config = PlotConfiguration {
            stacked: true,
            spacing: 2.0,
            ..PlotConfiguration::default()
        };
        assert_eq!(config.stack_multiplier(0), 1.0);
        assert!((config.stack_multiplier(1) - 100.0).abs() < 1e-9);
        assert!((config.stack_multiplier(2) - 10_000.0).abs() < 1e-6);

        let overlay = PlotConfiguration::default();
        assert_eq!(overlay.stack_multiplier(3), 1.0);
    }
}
