//! Reference catalog rows and a thin CSV reader.
//!
//! The core treats the catalog as an external collaborator: a read-only
//! sequence of [`CatalogRow`] values. This module supplies the row type
//! and a small CSV adapter; any column source that can produce rows works
//! equally well.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::bands::{Band, MagnitudeSet};

/// One catalog source: true per-band magnitudes, a reference redshift
/// (possibly undefined), and an area-membership flag.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRow {
    /// True (noiseless) magnitudes per band; `None` = undefined.
    pub magnitudes: MagnitudeSet,
    /// Reference (photometric) redshift, `None` when the catalog carries
    /// no estimate.
    pub redshift: Option<f64>,
    /// Whether the source lies in the deep survey area.
    pub in_area: bool,
}

impl CatalogRow {
    /// Row with the given magnitudes and redshift, inside the area.
    pub fn new(magnitudes: MagnitudeSet, redshift: Option<f64>) -> Self {
        Self {
            magnitudes,
            redshift: redshift.filter(|z| z.is_finite()),
            in_area: true,
        }
    }
}

/// On-disk CSV schema: one header row, columns
/// `u,g,r,i,z,redshift,in_area`. Empty or NaN numeric fields mean
/// undefined; `in_area` is 0/1.
#[derive(Debug, Deserialize)]
struct RawRow {
    u: Option<f64>,
    g: Option<f64>,
    r: Option<f64>,
    i: Option<f64>,
    z: Option<f64>,
    redshift: Option<f64>,
    in_area: u8,
}

impl From<RawRow> for CatalogRow {
    fn from(raw: RawRow) -> Self {
        // MagnitudeSet::set drops non-finite values, so NaN text fields
        // land as None just like empty ones.
        let magnitudes = MagnitudeSet::new()
            .with(Band::U, raw.u)
            .with(Band::G, raw.g)
            .with(Band::R, raw.r)
            .with(Band::I, raw.i)
            .with(Band::Z, raw.z);
        Self {
            magnitudes,
            redshift: raw.redshift.filter(|z| z.is_finite()),
            in_area: raw.in_area != 0,
        }
    }
}

/// Read catalog rows from any CSV source.
pub fn read_catalog<R: Read>(reader: R) -> Result<Vec<CatalogRow>, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<RawRow>()
        .map(|row| row.map(CatalogRow::from))
        .collect()
}

/// Read catalog rows from a CSV file on disk.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogRow>, csv::Error> {
    let mut csv_reader = csv::Reader::from_path(path)?;
    csv_reader
        .deserialize::<RawRow>()
        .map(|row| row.map(CatalogRow::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
u,g,r,i,z,redshift,in_area
25.1,24.3,23.9,23.5,23.2,3.1,1
,24.8,24.1,23.7,23.3,NaN,1
26.0,25.2,24.6,24.0,23.8,0.7,0
";

    #[test]
    fn test_read_sample() {
        let rows = read_catalog(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].magnitudes.get(Band::U), Some(25.1));
        assert_eq!(rows[0].redshift, Some(3.1));
        assert!(rows[0].in_area);

        // Empty u column and NaN redshift are undefined, not zero.
        assert_eq!(rows[1].magnitudes.get(Band::U), None);
        assert_eq!(rows[1].redshift, None);

        assert!(!rows[2].in_area);
    }

    #[test]
    fn test_row_constructor_drops_non_finite_redshift() {
        let row = CatalogRow::new(MagnitudeSet::new(), Some(f64::NAN));
        assert_eq!(row.redshift, None);
    }
}
