//! Reader for Kronik persistent-feature output (tab-delimited with a
//! header row).

use serde::{
    Deserialize,
    Serialize,
};
use std::io::Read;
use std::path::Path;

use crate::data_sources::{
    parse_f64,
    parse_u8,
};
use crate::errors::{
    IonlinkError,
    Result,
    SchemaError,
};
use crate::models::Feature;

const COL_MASS: &str = "Monoisotopic Mass";
const COL_CHARGE: &str = "Charge";
const COL_BEST_INT: &str = "Best Intensity";
const COL_SUM_INT: &str = "Summed Intensity";
const COL_FIRST_RT: &str = "First RTime";
const COL_LAST_RT: &str = "Last RTime";
const COL_BEST_RT: &str = "Best RTime";

/// Row filters applied while loading, mirroring the knobs the original
/// feature-browsing workflows exposed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct KronikFilter {
    /// Drop singly-charged features, which are rarely peptides.
    pub remove_charge_one: bool,
    /// Keep only the N features with the highest summed intensity.
    pub top_n: Option<usize>,
    /// Keep features whose apex intensity reaches the threshold.
    pub best_intensity_min: Option<f64>,
    /// Keep features whose summed intensity reaches the threshold.
    pub summed_intensity_min: Option<f64>,
    /// Order the result by summed intensity, highest first.
    pub sort_by_intensity: bool,
}

struct Columns {
    mass: usize,
    charge: usize,
    best_int: usize,
    sum_int: usize,
    first_rt: usize,
    last_rt: usize,
    best_rt: usize,
}

fn find_column(headers: &csv::StringRecord, name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| {
            SchemaError::MissingColumn {
                column: name,
                context: "kronik header",
            }
            .into()
        })
}

fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

pub fn read_kro<P: AsRef<Path>>(path: P, filter: &KronikFilter) -> Result<Vec<Feature>> {
    let file = std::fs::File::open(path.as_ref()).map_err(|source| IonlinkError::Io {
        source,
        path: Some(path.as_ref().to_path_buf()),
    })?;
    read_kro_from(file, filter)
}

pub fn read_kro_from<R: Read>(reader: R, filter: &KronikFilter) -> Result<Vec<Feature>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let cols = Columns {
        mass: find_column(&headers, COL_MASS)?,
        charge: find_column(&headers, COL_CHARGE)?,
        best_int: find_column(&headers, COL_BEST_INT)?,
        sum_int: find_column(&headers, COL_SUM_INT)?,
        first_rt: find_column(&headers, COL_FIRST_RT)?,
        last_rt: find_column(&headers, COL_LAST_RT)?,
        best_rt: find_column(&headers, COL_BEST_RT)?,
    };

    let mut features = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let field = |idx: usize, name: &'static str| -> Result<&str> {
            record.get(idx).ok_or_else(|| {
                SchemaError::MissingColumn {
                    column: name,
                    context: "kronik record",
                }
                .into()
            })
        };
        features.push(Feature::new(
            parse_f64(COL_MASS, field(cols.mass, COL_MASS)?)?,
            parse_u8(COL_CHARGE, field(cols.charge, COL_CHARGE)?)?,
            parse_f64(COL_FIRST_RT, field(cols.first_rt, COL_FIRST_RT)?)?,
            parse_f64(COL_LAST_RT, field(cols.last_rt, COL_LAST_RT)?)?,
            round4(parse_f64(COL_BEST_RT, field(cols.best_rt, COL_BEST_RT)?)?),
            parse_f64(COL_BEST_INT, field(cols.best_int, COL_BEST_INT)?)?,
            parse_f64(COL_SUM_INT, field(cols.sum_int, COL_SUM_INT)?)?,
            None,
        ));
    }

    Ok(apply_filter(features, filter))
}

fn apply_filter(mut features: Vec<Feature>, filter: &KronikFilter) -> Vec<Feature> {
    if filter.remove_charge_one {
        features.retain(|f| f.charge != 1);
    }
    if filter.sort_by_intensity {
        features.sort_by(|a, b| b.summed_intensity.total_cmp(&a.summed_intensity));
    }
    if let Some(n) = filter.top_n {
        if filter.sort_by_intensity {
            features.truncate(n);
        } else {
            // Take the N most intense, then restore elution order.
            features.sort_by(|a, b| b.summed_intensity.total_cmp(&a.summed_intensity));
            features.truncate(n);
            features.sort_by(|a, b| a.best_rt.total_cmp(&b.best_rt));
        }
    }
    if let Some(min) = filter.best_intensity_min {
        features.retain(|f| f.best_intensity >= min);
    }
    if let Some(min) = filter.summed_intensity_min {
        features.retain(|f| f.summed_intensity >= min);
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
File\tFirst Scan\tLast Scan\tNum of Scans\tCharge\tMonoisotopic Mass\tBase Isotope Peak\tBest Intensity\tSummed Intensity\tFirst RTime\tLast RTime\tBest RTime\tBest Correlation\tModifications\n\
a.ms1\t100\t200\t12\t2\t1592.8\t797.4\t500000\t4000000\t10.0\t20.0\t15.12341\t0.95\t_\n\
a.ms1\t110\t130\t4\t1\t900.1\t901.1\t900000\t1000000\t11.0\t13.0\t12.0\t0.90\t_\n\
a.ms1\t300\t400\t20\t3\t2446.2\t816.4\t700000\t9000000\t30.0\t40.0\t35.0\t0.99\t_\n";

    #[test]
    fn test_columns_resolved_by_name() {
        let features = read_kro_from(FIXTURE.as_bytes(), &KronikFilter::default()).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].charge, 2);
        assert_eq!(features[0].rt_start, 10.0);
        assert_eq!(features[0].rt_end, 20.0);
        // best_rt rounded to 4 decimals
        assert_eq!(features[0].best_rt, 15.1234);
        assert!((features[0].mz - (1592.8 + 2.0 * 1.00728) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_header_is_schema_error() {
        let bad = "Charge\tMonoisotopic Mass\n2\t1592.8\n";
        let err = read_kro_from(bad.as_bytes(), &KronikFilter::default()).unwrap_err();
        assert!(matches!(
            err,
            IonlinkError::Schema(SchemaError::MissingColumn {
                column: "Best Intensity",
                ..
            })
        ));
    }

    #[test]
    fn test_charge_one_filter() {
        let filter = KronikFilter {
            remove_charge_one: true,
            ..Default::default()
        };
        let features = read_kro_from(FIXTURE.as_bytes(), &filter).unwrap();
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f.charge != 1));
    }

    #[test]
    fn test_top_n_restores_elution_order() {
        let filter = KronikFilter {
            top_n: Some(2),
            ..Default::default()
        };
        let features = read_kro_from(FIXTURE.as_bytes(), &filter).unwrap();
        // Two highest summed intensities (9e6, 4e6), back in RT order.
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].best_rt, 15.1234);
        assert_eq!(features[1].best_rt, 35.0);
    }

    #[test]
    fn test_intensity_thresholds() {
        let filter = KronikFilter {
            best_intensity_min: Some(600000.0),
            summed_intensity_min: Some(5000000.0),
            ..Default::default()
        };
        let features = read_kro_from(FIXTURE.as_bytes(), &filter).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].charge, 3);
    }
}
