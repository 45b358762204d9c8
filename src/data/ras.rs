/// Rigaku RAS scan file reader
///
/// RAS files are plain text. The intensity table lies between two marker
/// lines; everything else in the file (header records, axis metadata) is
/// ignored by this reader.
///
/// ```text
/// *RAS_INT_START
/// 30.0000 152.0 1.0
/// 30.0200 149.0 1.0
/// ...
/// *RAS_INT_END
/// ```
///
/// Each table row is whitespace-separated; the first column is the 2θ angle
/// in degrees and the second the measured intensity. Extra columns (the
/// attenuator factor) are ignored. Malformed rows are skipped, not fatal.

use std::path::Path;

use thiserror::Error;

use super::scan::ScanSeries;

/// Line that opens the intensity table.
pub const DATA_START_MARKER: &str = "*RAS_INT_START";
/// Line that closes the intensity table.
pub const DATA_END_MARKER: &str = "*RAS_INT_END";

/// A scan file that could not be read at all. Malformed content inside a
/// readable file is never an error — bad rows are skipped and a file with
/// no marker pair parses to an empty series.
#[derive(Debug, Error)]
pub enum RasError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read and parse one RAS file.
///
/// The byte content is decoded leniently (invalid UTF-8 sequences are
/// replaced, never fatal) — RAS headers from older instruments mix in
/// Shift-JIS comment bytes.
pub fn read_ras_file(path: &Path) -> Result<ScanSeries, RasError> {
    let bytes = std::fs::read(path).map_err(|source| RasError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);
    let (angles, intensities) = parse_ras(&content);
    Ok(ScanSeries::new(path, angles, intensities))
}

/// Parse RAS text content into parallel angle/intensity vectors.
///
/// Rows are only collected strictly between the start and end markers.
/// A row contributes a point only if it has at least two tokens and both
/// parse as finite numbers; anything else is skipped in place.
pub fn parse_ras(content: &str) -> (Vec<f64>, Vec<f64>) {
    let mut angles = Vec::new();
    let mut intensities = Vec::new();
    let mut in_data = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed == DATA_START_MARKER {
            in_data = true;
            continue;
        }
        if trimmed == DATA_END_MARKER {
            break;
        }
        if !in_data {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let (Some(a), Some(i)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        match (a.parse::<f64>(), i.parse::<f64>()) {
            (Ok(angle), Ok(intensity)) => {
                angles.push(angle);
                intensities.push(intensity);
            }
            _ => continue,
        }
    }

    (angles, intensities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_block() {
        let content = "\
*RAS_HEADER_START
*MEAS_COND_AXIS_NAME TwoTheta
*RAS_HEADER_END
*RAS_INT_START
10.0 5.0 1.0
20.0 50.0 1.0
30.0 500.0 1.0
*RAS_INT_END
";
        let (angles, intensities) = parse_ras(content);
        assert_eq!(angles, vec![10.0, 20.0, 30.0]);
        assert_eq!(intensities, vec![5.0, 50.0, 500.0]);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let content = "\
*RAS_INT_START
10.0 5.0
not-a-number 1.0
20.0
20.5 abc
30.0 500.0
*RAS_INT_END
";
        let (angles, intensities) = parse_ras(content);
        assert_eq!(angles, vec![10.0, 30.0]);
        assert_eq!(intensities, vec![5.0, 500.0]);
    }

    #[test]
    fn test_rows_outside_markers_ignored() {
        let content = "\
1.0 2.0
*RAS_INT_START
10.0 5.0
*RAS_INT_END
99.0 99.0
";
        let (angles, intensities) = parse_ras(content);
        assert_eq!(angles, vec![10.0]);
        assert_eq!(intensities, vec![5.0]);
    }

    #[test]
    fn test_missing_markers_yield_empty_series() {
        let (angles, intensities) = parse_ras("10.0 5.0\n20.0 50.0\n");
        assert!(angles.is_empty());
        assert!(intensities.is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = "*RAS_INT_START\n10.0 5.0\n20.0 50.0\n*RAS_INT_END\n";
        let first = parse_ras(content);
        let second = parse_ras(content);
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_missing_file_is_an_error() {
        let result = read_ras_file(Path::new("/nonexistent/scan.ras"));
        assert!(result.is_err());
    }
}
