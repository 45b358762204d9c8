/// Reference peak annotations — user-maintained markers for expected
/// diffraction angles of known phases, independent of any loaded scan.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of reference peak rows offered by the editor panel.
pub const MAX_REFERENCE_PEAKS: usize = 10;

/// Stroke style for a reference peak marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineStyle {
    pub const ALL: [LineStyle; 4] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::Dotted,
        LineStyle::DashDot,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LineStyle::Solid => "Solid",
            LineStyle::Dashed => "Dashed",
            LineStyle::Dotted => "Dotted",
            LineStyle::DashDot => "Dash-dot",
        }
    }

    /// SVG stroke-dasharray value, or `None` for a solid stroke.
    pub fn dash_array(&self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("6,4"),
            LineStyle::Dotted => Some("1.5,3"),
            LineStyle::DashDot => Some("6,3,1.5,3"),
        }
    }

    /// On/off pixel run lengths for raster dashing.
    pub fn dash_pattern(&self) -> &'static [(u32, u32)] {
        match self {
            LineStyle::Solid => &[(1, 0)],
            LineStyle::Dashed => &[(6, 4)],
            LineStyle::Dotted => &[(2, 3)],
            LineStyle::DashDot => &[(6, 3), (2, 3)],
        }
    }
}

impl std::fmt::Display for LineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One reference peak. An invisible peak draws nothing but keeps its
/// fields, so it can be toggled back on without data loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePeak {
    pub name: String,
    /// 2θ position in degrees.
    pub angle: f64,
    pub visible: bool,
    pub color: [u8; 3],
    pub style: LineStyle,
}

impl Default for ReferencePeak {
    fn default() -> Self {
        Self {
            name: String::new(),
            angle: 0.0,
            visible: false,
            color: [0, 0, 0],
            style: LineStyle::Dashed,
        }
    }
}

impl ReferencePeak {
    /// A peak only draws when toggled visible and actually named.
    pub fn is_drawable(&self) -> bool {
        self.visible && !self.name.trim().is_empty()
    }
}

/// Built-in presets for the lithium titanate phases this tool was
/// originally used with.
pub fn preset_peaks() -> Vec<ReferencePeak> {
    vec![
        ReferencePeak {
            name: "LiTi2O4".to_string(),
            angle: 116.728,
            visible: true,
            color: [0x8B, 0x00, 0x00],
            style: LineStyle::Dashed,
        },
        ReferencePeak {
            name: "Li4Ti5O12".to_string(),
            angle: 117.746,
            visible: true,
            color: [0x00, 0x00, 0x8B],
            style: LineStyle::Dashed,
        },
        ReferencePeak {
            name: "TiO2".to_string(),
            angle: 25.3,
            visible: false,
            color: [0x00, 0x64, 0x00],
            style: LineStyle::Dotted,
        },
    ]
}

/// Save a reference peak list as JSON.
pub fn save_peaks(path: &Path, peaks: &[ReferencePeak]) -> Result<(), String> {
    let json = serde_json::to_string_pretty(peaks).map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| e.to_string())
}

/// Load a reference peak list from JSON, truncated to the editor capacity.
pub fn load_peaks(path: &Path) -> Result<Vec<ReferencePeak>, String> {
    let json = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let mut peaks: Vec<ReferencePeak> =
        serde_json::from_str(&json).map_err(|e| e.to_string())?;
    peaks.truncate(MAX_REFERENCE_PEAKS);
    Ok(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invisible_peak_is_not_drawable() {
        let peak = ReferencePeak {
            name: "TiO2".to_string(),
            angle: 25.3,
            visible: false,
            color: [0, 100, 0],
            style: LineStyle::Dotted,
        };
        assert!(!peak.is_drawable());
    }

    #[test]
    fn test_unnamed_peak_is_not_drawable() {
        let peak = ReferencePeak {
            visible: true,
            ..ReferencePeak::default()
        };
        assert!(!peak.is_drawable());
    }

    #[test]
    fn test_peaks_round_trip_through_json() {
        let dir = std::env::temp_dir().join("xrd_gui_test_ref_peaks");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("peaks.json");

        let peaks = preset_peaks();
        save_peaks(&path, &peaks).unwrap();
        let loaded = load_peaks(&path).unwrap();
        assert_eq!(loaded, peaks);

        std::fs::remove_file(&path).ok();
    }
}
