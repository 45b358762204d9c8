use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One parsed scan file: parallel angle/intensity sequences in acquisition
/// order. Immutable once parsed — reloading a file produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSeries {
    pub source_path: PathBuf,
    /// Display name, user-editable; defaults to the file name.
    pub label: String,
    /// 2θ positions in degrees.
    pub angles: Vec<f64>,
    /// Measured counts. May contain zero or negative values from the
    /// instrument; those are non-plottable and filtered downstream.
    pub intensities: Vec<f64>,
}

impl ScanSeries {
    pub fn new(path: &Path, angles: Vec<f64>, intensities: Vec<f64>) -> Self {
        debug_assert_eq!(angles.len(), intensities.len());
        Self {
            label: default_label(path),
            source_path: path.to_path_buf(),
            angles,
            intensities,
        }
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Angle extent of the scan, if it has any points.
    pub fn angle_range(&self) -> Option<(f64, f64)> {
        if self.angles.is_empty() {
            return None;
        }
        let min = self.angles.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self.angles.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

/// Default display label for a scan: the file name itself.
pub fn default_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
