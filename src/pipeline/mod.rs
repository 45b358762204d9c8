pub mod compose;
pub mod processing;
pub mod range;

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crate::config::{PlotConfiguration, ThresholdPolicy};
    use crate::data::reference::{LineStyle, ReferencePeak};
    use super::compose::{self, PlotEntry};

    /// Write a RAS fixture file with the given angle/intensity rows.
    fn write_ras(dir: &str, name: &str, rows: &[(f64, f64)]) -> PathBuf {
        let base = std::env::temp_dir().join(format!("xrd_gui_test_{dir}"));
        fs::create_dir_all(&base).unwrap();
        let mut content = String::from("*RAS_INT_START\n");
        for (angle, intensity) in rows {
            content.push_str(&format!("{angle} {intensity} 1.0\n"));
        }
        content.push_str("*RAS_INT_END\n");
        let path = base.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn entries(paths: &[PathBuf]) -> Vec<PlotEntry> {
        paths.iter().map(|p| PlotEntry::new(p.clone())).collect()
    }

    #[test]
    fn test_overlay_end_to_end() {
        let a = write_ras("overlay", "a.ras", &[(10.0, 5.0), (20.0, 50.0), (30.0, 500.0)]);
        let b = write_ras("overlay", "b.ras", &[(10.0, 8.0), (20.0, 80.0), (30.0, 800.0)]);
        let config = PlotConfiguration {
            threshold: 0.0,
            stacked: false,
            x_min: None,
            x_max: None,
            ..PlotConfiguration::default()
        };

        let plot = compose::compose(&entries(&[a, b]), &[], &config).unwrap();
        assert_eq!(plot.series.len(), 2);
        assert!(plot.parse_failures.is_empty());
        assert_eq!(plot.series[0].multiplier, 1.0);
        assert_eq!(plot.series[1].multiplier, 1.0);
        assert_eq!(plot.series[1].values, vec![8.0, 80.0, 800.0]);

        let (y_min, y_max) = plot.y_range;
        assert_eq!(y_min, 5.0);
        assert!((y_max - 800.0 * config.padding_factor).abs() < 1e-9);
    }

    #[test]
    fn test_stacked_end_to_end_spacing_one() {
        let a = write_ras("stacked", "a.ras", &[(10.0, 5.0), (20.0, 50.0), (30.0, 500.0)]);
        let b = write_ras("stacked", "b.ras", &[(10.0, 8.0), (20.0, 80.0), (30.0, 800.0)]);
        let config = PlotConfiguration {
            threshold: 0.0,
            stacked: true,
            spacing: 1.0,
            x_min: None,
            x_max: None,
            ..PlotConfiguration::default()
        };

        let plot = compose::compose(&entries(&[a, b]), &[], &config).unwrap();
        assert_eq!(plot.series.len(), 2);
        assert_eq!(plot.series[0].values, vec![5.0, 50.0, 500.0]);
        assert_eq!(plot.series[1].values, vec![80.0, 800.0, 8000.0]);

        // y_min from the unscaled bottom series, padded max from the top.
        let (y_min, y_max) = plot.y_range;
        assert_eq!(y_min, 5.0);
        assert!((y_max - 8000.0 * config.padding_factor).abs() < 1e-9);
    }

    #[test]
    fn test_stacking_multiplier_progression() {
        let rows = [(10.0, 5.0), (20.0, 50.0), (30.0, 500.0)];
        let a = write_ras("multipliers", "a.ras", &rows);
        let b = write_ras("multipliers", "b.ras", &rows);
        let c = write_ras("multipliers", "c.ras", &rows);
        let config = PlotConfiguration {
            stacked: true,
            spacing: 2.0,
            ..PlotConfiguration::default()
        };

        let plot = compose::compose(&entries(&[a, b, c]), &[], &config).unwrap();
        let multipliers: Vec<f64> = plot.series.iter().map(|s| s.multiplier).collect();
        assert_eq!(multipliers[0], 1.0);
        assert!((multipliers[1] / multipliers[0] - 100.0).abs() < 1e-9);
        assert!((multipliers[2] / multipliers[1] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_x_range_rejected_before_parsing() {
        let a = write_ras("reject", "a.ras", &[(10.0, 5.0)]);
        let config = PlotConfiguration {
            x_min: Some(100.0),
            x_max: Some(50.0),
            ..PlotConfiguration::default()
        };
        assert!(compose::compose(&entries(&[a]), &[], &config).is_err());
    }

    #[test]
    fn test_partial_render_with_parse_failures() {
        let good = write_ras("partial", "good.ras", &[(10.0, 5.0), (20.0, 50.0)]);
        let missing = std::env::temp_dir().join("xrd_gui_test_partial/missing.ras");
        let config = PlotConfiguration {
            x_min: None,
            x_max: None,
            ..PlotConfiguration::default()
        };

        let plot =
            compose::compose(&entries(&[missing, good]), &[], &config).unwrap();
        // The good series still draws, at palette/stack index 0.
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].color_index, 0);
        assert_eq!(plot.parse_failures, vec!["missing.ras".to_string()]);
        let message = plot.failure_message().unwrap();
        assert!(message.contains("missing.ras"));
    }

    #[test]
    fn test_fully_filtered_series_is_skipped_not_an_error() {
        let faint = write_ras("filtered", "faint.ras", &[(10.0, 1.0), (20.0, 2.0)]);
        let bright = write_ras("filtered", "bright.ras", &[(10.0, 100.0), (20.0, 200.0)]);
        let config = PlotConfiguration {
            threshold: 50.0,
            threshold_policy: ThresholdPolicy::Hide,
            stacked: true,
            spacing: 1.0,
            ..PlotConfiguration::default()
        };

        let plot = compose::compose(&entries(&[faint, bright]), &[], &config).unwrap();
        assert!(plot.parse_failures.is_empty());
        // The faint series vanished entirely and did not consume a
        // stacking step: the bright one draws unscaled at index 0.
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].color_index, 0);
        assert_eq!(plot.series[0].multiplier, 1.0);
        assert_eq!(plot.series[0].label, "bright.ras");
    }

    #[test]
    fn test_hide_policy_splits_trace_into_segments() {
        let path = write_ras(
            "segments",
            "gap.ras",
            &[(10.0, 5.0), (20.0, 15.0), (30.0, 25.0)],
        );
        let config = PlotConfiguration {
            threshold: 10.0,
            threshold_policy: ThresholdPolicy::Hide,
            ..PlotConfiguration::default()
        };

        let plot = compose::compose(&entries(&[path]), &[], &config).unwrap();
        let segments = plot.series[0].segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], vec![[20.0, 15.0], [30.0, 25.0]]);
    }

    #[test]
    fn test_invisible_reference_peaks_do_not_draw() {
        let path = write_ras("refpeaks", "a.ras", &[(10.0, 5.0)]);
        let peaks = vec![
            ReferencePeak {
                name: "LiTi2O4".to_string(),
                angle: 116.728,
                visible: true,
                color: [139, 0, 0],
                style: LineStyle::Dashed,
            },
            ReferencePeak {
                name: "TiO2".to_string(),
                angle: 25.3,
                visible: false,
                color: [0, 100, 0],
                style: LineStyle::Dotted,
            },
        ];
        let config = PlotConfiguration::default();

        let plot = compose::compose(&entries(&[path]), &peaks, &config).unwrap();
        // Both stay in configuration; only the visible one draws.
        assert_eq!(plot.reference_peaks.len(), 2);
        let drawable: Vec<_> = plot.drawable_reference_peaks().collect();
        assert_eq!(drawable.len(), 1);
        assert_eq!(drawable[0].name, "LiTi2O4");
    }

    #[test]
    fn test_empty_entry_list_is_not_an_error() {
        let config = PlotConfiguration::default();
        let plot = compose::compose(&[], &[], &config).unwrap();
        assert!(!plot.has_drawable_series());
        assert_eq!(plot.y_range, super::range::FALLBACK_Y_RANGE);
    }
}
