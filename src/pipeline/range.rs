/// Y-axis range derivation from processed series.

use super::compose::ProcessedSeries;

/// Range used when nothing is plottable, so the log axis never collapses
/// to an empty or degenerate interval.
pub const FALLBACK_Y_RANGE: (f64, f64) = (1.0, 10.0);

/// Compute `(y_min, y_max)` from post-threshold, post-stacking-scale
/// values across all drawn series.
///
/// `y_max` is the global maximum times the padding factor. `y_min` is the
/// global minimum in overlay mode; in stacked mode it is the minimum of
/// the first (bottom, unscaled) series only, so the bottom trace is not
/// pushed off-scale by the offsets of the traces above it.
pub fn compute_y_range(
    series: &[ProcessedSeries],
    stacked: bool,
    padding_factor: f64,
) -> (f64, f64) {
    let mut global_min = f64::INFINITY;
    let mut global_max = f64::NEG_INFINITY;
    for s in series {
        for &v in &s.values {
            if v.is_finite() {
                global_min = global_min.min(v);
                global_max = global_max.max(v);
            }
        }
    }

    if !global_max.is_finite() {
        return FALLBACK_Y_RANGE;
    }

    let y_max = global_max * padding_factor;
    let y_min = if stacked {
        // Bottom series minimum; the global minimum would be the same value
        // anyway unless an upper series dips below it after scaling.
        series
            .first()
            .and_then(|s| {
                s.values
                    .iter()
                    .cloned()
                    .filter(|v| v.is_finite())
                    .fold(None, |acc: Option<f64>, v| {
                        Some(acc.map_or(v, |a| a.min(v)))
                    })
            })
            .unwrap_or(global_min)
    } else {
        global_min
    };

    (y_min, y_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compose::ProcessedSeries;

    fn series(values: Vec<f64>, multiplier: f64) -> ProcessedSeries {
        let angles = (0..values.len()).map(|i| i as f64).collect();
        ProcessedSeries {
            label: "test".to_string(),
            angles,
            values,
            multiplier,
            color_index: 0,
            peaks: Vec::new(),
        }
    }

    #[test]
    fn test_fallback_when_nothing_plottable() {
        assert_eq!(compute_y_range(&[], false, 1.5), FALLBACK_Y_RANGE);
        let all_gaps = series(vec![f64::NAN, f64::NAN], 1.0);
        assert_eq!(compute_y_range(&[all_gaps], false, 1.5), FALLBACK_Y_RANGE);
    }

    #[test]
    fn test_overlay_uses_global_extremes() {
        let a = series(vec![5.0, 50.0, 500.0], 1.0);
        let b = series(vec![8.0, 80.0, 800.0], 1.0);
        let (y_min, y_max) = compute_y_range(&[a, b], false, 1.5);
        assert_eq!(y_min, 5.0);
        assert!((y_max - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_stacked_min_comes_from_bottom_series() {
        // The scaled upper series has a larger minimum; y_min must still be
        // the bottom trace's own minimum.
        let bottom = series(vec![5.0, 50.0, 500.0], 1.0);
        let top = series(vec![80.0, 800.0, 8000.0], 10.0);
        let (y_min, y_max) = compute_y_range(&[bottom, top], true, 1.5);
        assert_eq!(y_min, 5.0);
        assert!((y_max - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_stacked_min_ignores_gaps_in_bottom_series() {
        let bottom = series(vec![f64::NAN, 50.0, 500.0], 1.0);
        let top = series(vec![80.0, 800.0, 8000.0], 10.0);
        let (y_min, _) = compute_y_range(&[bottom, top], true, 1.5);
        assert_eq!(y_min, 50.0);
    }
}
