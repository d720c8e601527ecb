//! CSV elevation loader.
//!
//! # CSV format
//!
//! One sample per row, `lat,lng,alt`, in any order. A header row is optional
//! and recognized by a non-numeric first field. Extra columns are ignored.
//!
//! ```csv
//! lat,lng,alt
//! -45.8254,-67.4587,12.0
//! -45.8254,-67.4580,14.5
//! ```

use crate::{DemError, ElevationGrid, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

impl ElevationGrid {
    /// Load a grid from a `lat,lng,alt` CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let grid = Self::from_csv_reader(file)?;
        info!(
            path = %path.display(),
            lats = grid.num_latitudes(),
            lngs = grid.num_longitudes(),
            min_alt = grid.min_altitude(),
            max_alt = grid.max_altitude(),
            "Loaded elevation grid"
        );
        Ok(grid)
    }

    /// Like [`from_csv_path`](Self::from_csv_path) but accepts any `Read` source.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut lats = Vec::new();
        let mut lngs = Vec::new();
        let mut alts = Vec::new();

        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let line = record.position().map_or(row as u64 + 1, |p| p.line());

            if row == 0 && is_header(&record) {
                continue;
            }
            if record.len() < 3 {
                return Err(DemError::InvalidRecord {
                    line,
                    reason: format!("expected 3 fields, found {}", record.len()),
                });
            }

            lats.push(parse_field(&record, 0, "lat", line)?);
            lngs.push(parse_field(&record, 1, "lng", line)?);
            alts.push(parse_field(&record, 2, "alt", line)?);
        }

        Self::new(&lats, &lngs, &alts)
    }
}

fn is_header(record: &csv::StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|field| field.parse::<f64>().is_err())
}

fn parse_field(record: &csv::StringRecord, idx: usize, name: &str, line: u64) -> Result<f64> {
    let raw = record.get(idx).unwrap_or_default();
    raw.parse::<f64>().map_err(|_| DemError::InvalidRecord {
        line,
        reason: format!("{} is not a number: {:?}", name, raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_with_header() {
        let csv = "lat,lng,alt\n0,0,1\n0,1,2\n1,0,3\n1,1,4\n";
        let grid = ElevationGrid::from_csv_reader(Cursor::new(csv)).unwrap();
        assert_eq!(grid.num_latitudes(), 2);
        assert_eq!(grid.bilinear_interpolation(1.0, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn test_without_header() {
        let csv = "0,0,1\n0,1,2\n\n1,0,3\n1,1,4\n";
        let grid = ElevationGrid::from_csv_reader(Cursor::new(csv)).unwrap();
        assert_eq!(grid.bilinear_interpolation(0.0, 0.0).unwrap(), 1.0);
        assert_eq!(grid.max_altitude(), 4.0);
    }

    #[test]
    fn test_extra_columns_and_whitespace() {
        let csv = "latitude, longitude, elevation, source\n 0, 0, 1, srtm\n0,1,2,srtm\n1,0,3,srtm\n1,1,4,srtm\n";
        let grid = ElevationGrid::from_csv_reader(Cursor::new(csv)).unwrap();
        assert_eq!(grid.min_altitude(), 1.0);
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let csv = "0,0,1\n0,1,abc\n1,0,3\n1,1,4\n";
        let err = ElevationGrid::from_csv_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, DemError::InvalidRecord { line: 2, .. }));
    }

    #[test]
    fn test_short_row_is_an_error() {
        let csv = "0,0,1\n0,1\n";
        let err = ElevationGrid::from_csv_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, DemError::InvalidRecord { .. }));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = ElevationGrid::from_csv_reader(Cursor::new("lat,lng,alt\n")).unwrap_err();
        assert!(matches!(err, DemError::EmptyDataset));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lat,lng,alt").unwrap();
        for (lat, lng, alt) in [(0, 0, 5), (0, 1, 5), (1, 0, 5), (1, 1, 5)] {
            writeln!(file, "{},{},{}", lat, lng, alt).unwrap();
        }
        let grid = ElevationGrid::from_csv_path(file.path()).unwrap();
        assert_eq!(grid.bilinear_interpolation(0.5, 0.5).unwrap(), 5.0);

        assert!(matches!(
            ElevationGrid::from_csv_path("/nonexistent/elevation.csv"),
            Err(DemError::Io(_))
        ));
    }
}
