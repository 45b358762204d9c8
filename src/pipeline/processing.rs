/// Intensity processing operations
///
/// Free functions over intensity slices: background estimation, threshold
/// handling, and peak detection. All of them are pure — the composition
/// step in `compose.rs` decides what to apply and in which order.

use find_peaks::PeakFinder;

use crate::config::{PeakDetectionSettings, ThresholdPolicy};
use super::range::FALLBACK_Y_RANGE;

// =========================================================================
//  Background Subtraction
// =========================================================================

/// Sliding-window minimum over `values`, window centered on each sample.
pub fn minimum_filter(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    if window == 0 || n == 0 {
        return values.to_vec();
    }
    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + (window - half)).min(n);
            values[lo..hi].iter().cloned().fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Remove a slowly-varying background from an intensity trace.
///
/// The background estimate is a single minimum-filter pass of the given
/// window size — an approximation of iterative peak-clipping (SNIP)
/// removal, not the full algorithm. The corrected trace is clamped at
/// zero. A window of zero returns the input unchanged.
pub fn subtract_background(intensities: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || intensities.is_empty() {
        return intensities.to_vec();
    }
    let background = minimum_filter(intensities, window);
    intensities
        .iter()
        .zip(background.iter())
        .map(|(&v, &b)| (v - b).max(0.0))
        .collect()
}

// =========================================================================
//  Threshold Handling
// =========================================================================

/// Floor value used by the clip policy. A non-positive threshold cannot
/// serve as a log-axis floor, so the fallback y-range minimum stands in.
pub fn clip_floor(threshold: f64) -> f64 {
    if threshold > 0.0 {
        threshold
    } else {
        FALLBACK_Y_RANGE.0
    }
}

/// Apply the threshold policy to an intensity trace.
///
/// `Hide` turns sub-threshold and non-positive values into NaN sentinels
/// (the point is skipped when drawing, leaving a gap). `Clip` raises them
/// to the clip floor so the trace stays continuous on a log axis. Point
/// count is preserved in both cases.
pub fn apply_threshold(
    intensities: &[f64],
    threshold: f64,
    policy: ThresholdPolicy,
) -> Vec<f64> {
    match policy {
        ThresholdPolicy::Hide => intensities
            .iter()
            .map(|&v| if v < threshold || v <= 0.0 { f64::NAN } else { v })
            .collect(),
        ThresholdPolicy::Clip => {
            let floor = clip_floor(threshold);
            intensities
                .iter()
                .map(|&v| {
                    let clipped = if v < threshold { floor } else { v };
                    if clipped <= 0.0 {
                        floor
                    } else {
                        clipped
                    }
                })
                .collect()
        }
    }
}

// =========================================================================
//  Peak Detection
// =========================================================================

/// One detected local maximum, reported in plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedPeak {
    /// 2θ position in degrees.
    pub angle: f64,
    /// Drawn (post-threshold, post-stacking-scale) intensity.
    pub intensity: f64,
}

impl DetectedPeak {
    /// Annotation text: the angle to one decimal place with a degree suffix.
    pub fn label(&self) -> String {
        format!("{:.1}°", self.angle)
    }
}

/// Find local maxima satisfying all of the configured criteria.
///
/// `scale` is the stacking multiplier of the series being inspected:
/// detection runs on the same scaled values that are drawn, so the height
/// and prominence floors are scaled by the same factor to keep the
/// criteria meaningful across a stack. The width floor is in sample-index
/// units and is not scaled. Gap sentinels (NaN) are treated as
/// zero-intensity samples.
pub fn detect_peaks(
    angles: &[f64],
    values: &[f64],
    settings: &PeakDetectionSettings,
    scale: f64,
) -> Vec<DetectedPeak> {
    if !settings.enabled || values.len() < 3 || angles.len() != values.len() {
        return Vec::new();
    }

    let clean: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect();

    let mut finder = PeakFinder::new(&clean);
    finder.with_min_height(settings.min_height * scale);
    finder.with_min_prominence(settings.min_prominence * scale);
    let mut found = finder.find_peaks();
    found.sort_by_key(|p| p.middle_position());

    let mut peaks = Vec::new();
    for peak in found {
        let idx = peak.middle_position();
        if idx >= clean.len() {
            continue;
        }
        let prominence = peak
            .prominence
            .unwrap_or_else(|| prominence_at(&clean, idx));
        if width_at_half_prominence(&clean, idx, prominence) < settings.min_width {
            continue;
        }
        peaks.push(DetectedPeak {
            angle: angles[idx],
            intensity: clean[idx],
        });
    }
    peaks
}

/// Topographic prominence of the sample at `idx`: its height above the
/// higher of the two key saddles (the lowest point on each side before a
/// higher sample, or the edge of the signal).
fn prominence_at(values: &[f64], idx: usize) -> f64 {
    let height = values[idx];

    let mut left_base = height;
    for &v in values[..idx].iter().rev() {
        if v > height {
            break;
        }
        left_base = left_base.min(v);
    }

    let mut right_base = height;
    for &v in values[idx + 1..].iter() {
        if v > height {
            break;
        }
        right_base = right_base.min(v);
    }

    height - left_base.max(right_base)
}

/// Width of the peak at half its prominence, in sample-index units, with
/// linear interpolation at the crossings.
fn width_at_half_prominence(values: &[f64], idx: usize, prominence: f64) -> f64 {
    let eval_height = values[idx] - prominence * 0.5;

    let mut left = idx as f64;
    let mut i = idx;
    while i > 0 && values[i - 1] > eval_height {
        i -= 1;
        left = i as f64;
    }
    if i > 0 {
        let (hi, lo) = (values[i], values[i - 1]);
        if hi > lo {
            left = i as f64 - (hi - eval_height) / (hi - lo);
        }
    }

    let mut right = idx as f64;
    let mut j = idx;
    while j + 1 < values.len() && values[j + 1] > eval_height {
        j += 1;
        right = j as f64;
    }
    if j + 1 < values.len() {
        let (hi, lo) = (values[j], values[j + 1]);
        if hi > lo {
            right = j as f64 + (hi - eval_height) / (hi - lo);
        }
    }

    right - left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_removes_constant_offset() {
        let trace = vec![10.0, 10.0, 110.0, 10.0, 10.0];
        let corrected = subtract_background(&trace, 3);
        assert_eq!(corrected, vec![0.0, 0.0, 100.0, 0.0, 0.0]);
    }

    #[test]
    fn test_background_window_zero_is_noop() {
        let trace = vec![5.0, 7.0, 3.0];
        assert_eq!(subtract_background(&trace, 0), trace);
    }

    #[test]
    fn test_background_never_goes_negative() {
        let trace = vec![1.0, -4.0, 2.0];
        let corrected = subtract_background(&trace, 5);
        assert!(corrected.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_hide_policy_leaves_gaps() {
        let values = apply_threshold(&[5.0, 15.0, 25.0], 10.0, ThresholdPolicy::Hide);
        assert_eq!(values.len(), 3);
        assert!(values[0].is_nan());
        assert_eq!(values[1], 15.0);
        assert_eq!(values[2], 25.0);
    }

    #[test]
    fn test_hide_policy_drops_non_positive_values() {
        let values = apply_threshold(&[0.0, -3.0, 2.0], -10.0, ThresholdPolicy::Hide);
        assert!(values[0].is_nan());
        assert!(values[1].is_nan());
        assert_eq!(values[2], 2.0);
    }

    #[test]
    fn test_clip_policy_preserves_point_count() {
        let values = apply_threshold(&[5.0, 15.0, 25.0], 10.0, ThresholdPolicy::Clip);
        assert_eq!(values, vec![10.0, 15.0, 25.0]);
    }

    #[test]
    fn test_clip_floor_for_non_positive_threshold() {
        assert_eq!(clip_floor(0.0), 1.0);
        assert_eq!(clip_floor(-5.0), 1.0);
        assert_eq!(clip_floor(10.0), 10.0);

        let values = apply_threshold(&[-2.0, 0.0, 3.0], 0.0, ThresholdPolicy::Clip);
        assert_eq!(values, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_detect_disabled_is_noop() {
        let settings = PeakDetectionSettings {
            enabled: false,
            ..PeakDetectionSettings::default()
        };
        let angles = [1.0, 2.0, 3.0];
        let values = [0.0, 10.0, 0.0];
        assert!(detect_peaks(&angles, &values, &settings, 1.0).is_empty());
    }

    #[test]
    fn test_detect_single_clear_peak() {
        let settings = PeakDetectionSettings {
            enabled: true,
            min_height: 4.0,
            min_prominence: 3.0,
            min_width: 1.0,
        };
        let angles: Vec<f64> = (0..7).map(|i| 10.0 + i as f64).collect();
        let values = [0.0, 1.0, 2.0, 5.0, 2.0, 1.0, 0.0];
        let peaks = detect_peaks(&angles, &values, &settings, 1.0);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].angle, 13.0);
        assert_eq!(peaks[0].intensity, 5.0);
        assert_eq!(peaks[0].label(), "13.0°");
    }

    #[test]
    fn test_detect_height_floor_scales_with_stack_multiplier() {
        let settings = PeakDetectionSettings {
            enabled: true,
            min_height: 4.0,
            min_prominence: 3.0,
            min_width: 0.5,
        };
        let angles: Vec<f64> = (0..11).map(|i| i as f64).collect();
        // A trace scaled 100x, as a stacked series would be: one real peak
        // plus a noise bump that only clears the UNSCALED height floor.
        let values: Vec<f64> = [0.0, 1.0, 2.0, 5.0, 2.0, 1.0, 0.0, 0.3, 0.5, 0.3, 0.0]
            .iter()
            .map(|v| v * 100.0)
            .collect();

        let peaks = detect_peaks(&angles, &values, &settings, 100.0);
        assert_eq!(peaks.len(), 1, "noise bump must not pass the scaled floor");
        assert_eq!(peaks[0].intensity, 500.0);
    }

    #[test]
    fn test_detect_rejects_narrow_peaks() {
        let settings = PeakDetectionSettings {
            enabled: true,
            min_height: 4.0,
            min_prominence: 3.0,
            min_width: 4.0,
        };
        let angles: Vec<f64> = (0..7).map(|i| i as f64).collect();
        // Width at half prominence is well under four samples.
        let values = [0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0];
        assert!(detect_peaks(&angles, &values, &settings, 1.0).is_empty());
    }

    #[test]
    fn test_width_measurement_interpolates() {
        // Triangle peak: prominence 5, half level 2.5, crossings at
        // 2.167 and 3.833 → width ≈ 1.67 samples.
        let values = [0.0, 1.0, 2.0, 5.0, 2.0, 1.0, 0.0];
        let width = width_at_half_prominence(&values, 3, 5.0);
        assert!((width - 5.0 / 3.0).abs() < 1e-9, "width = {width}");
    }
}
