//! Reader for the normalized scan-metadata export.
//!
//! Spectral-file parsing proper (mzML and friends) happens upstream;
//! collaborators hand over a tab-delimited table with one row per scan.
//! Precursor columns are present but empty on MS1 rows.

use std::io::Read;
use std::path::Path;

use crate::data_sources::{
    parse_f64,
    parse_u32,
    parse_u8,
};
use crate::errors::{
    IonlinkError,
    Result,
    SchemaError,
};
use crate::models::{
    PrecursorLink,
    ScanRecord,
    ScanTable,
};

const REQUIRED: [&str; 5] = ["scan_num", "ms_level", "rt", "TIC", "IT"];
const PRECURSOR: [&str; 3] = ["precursor_scan", "precursor_mz", "precursor_intensity"];

pub fn read_scan_table<P: AsRef<Path>>(path: P) -> Result<ScanTable> {
    let file = std::fs::File::open(path.as_ref()).map_err(|source| IonlinkError::Io {
        source,
        path: Some(path.as_ref().to_path_buf()),
    })?;
    read_scan_table_from(file)
}

pub fn read_scan_table_from<R: Read>(reader: R) -> Result<ScanTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column = |name: &'static str| -> Result<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            SchemaError::MissingColumn {
                column: name,
                context: "scan table header",
            }
            .into()
        })
    };
    let scan_col = column(REQUIRED[0])?;
    let level_col = column(REQUIRED[1])?;
    let rt_col = column(REQUIRED[2])?;
    let tic_col = column(REQUIRED[3])?;
    let it_col = column(REQUIRED[4])?;
    let prec_cols: Option<(usize, usize, usize)> = match (
        headers.iter().position(|h| h == PRECURSOR[0]),
        headers.iter().position(|h| h == PRECURSOR[1]),
        headers.iter().position(|h| h == PRECURSOR[2]),
    ) {
        (Some(a), Some(b), Some(c)) => Some((a, b, c)),
        _ => None,
    };

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let precursor = match prec_cols {
            Some((scan_idx, mz_idx, int_idx)) if !field(scan_idx).trim().is_empty() => {
                Some(PrecursorLink {
                    ms1_scan: parse_u32("precursor_scan", field(scan_idx))?,
                    ms1_mz: parse_f64("precursor_mz", field(mz_idx))?,
                    ms1_intensity: parse_f64("precursor_intensity", field(int_idx))?,
                })
            }
            _ => None,
        };
        records.push(ScanRecord {
            scan_num: parse_u32("scan_num", field(scan_col))?,
            ms_level: parse_u8("ms_level", field(level_col))?,
            retention_time: parse_f64("rt", field(rt_col))?,
            total_ion_current: parse_f64("TIC", field(tic_col))?,
            injection_time_ms: parse_f64("IT", field(it_col))?,
            precursor,
        });
    }
    Ok(ScanTable::new(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
scan_num\tms_level\trt\tTIC\tIT\tprecursor_scan\tprecursor_mz\tprecursor_intensity\n\
100\t1\t12.5\t2.5e7\t50.0\t\t\t\n\
101\t2\t12.51\t1.2e5\t20.0\t100\t501.007\t5.0e6\n";

    #[test]
    fn test_precursor_links() {
        let table = read_scan_table_from(FIXTURE.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get(100).unwrap().precursor.is_none());
        let ms2 = table.get(101).unwrap();
        let link = ms2.precursor.unwrap();
        assert_eq!(link.ms1_scan, 100);
        assert_eq!(link.ms1_mz, 501.007);
    }

    #[test]
    fn test_missing_required_column() {
        let bad = "scan_num\trt\tTIC\tIT\n1\t1.0\t2.0\t3.0\n";
        let err = read_scan_table_from(bad.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IonlinkError::Schema(SchemaError::MissingColumn {
                column: "ms_level",
                ..
            })
        ));
    }
}
