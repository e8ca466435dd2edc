//! Reader for Hardklor deconvolution output.
//!
//! The format is line-oriented: `S` lines open a scan (scan number and
//! retention time), every following `P` line is one deconvoluted signal
//! in that scan (monoisotopic mass, charge, intensity, base-peak m/z,
//! then engine diagnostics we do not keep).

use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
};
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
use crate::models::DeconvPeak;

pub fn read_hk<P: AsRef<Path>>(path: P) -> Result<Vec<DeconvPeak>> {
    let file = File::open(path.as_ref()).map_err(|source| IonlinkError::Io {
        source,
        path: Some(path.as_ref().to_path_buf()),
    })?;
    read_hk_from(BufReader::new(file))
}

pub fn read_hk_from<R: BufRead>(reader: R) -> Result<Vec<DeconvPeak>> {
    let mut peaks = Vec::new();
    let mut scan_num: u32 = 0;
    let mut rt: f64 = 0.0;

    for line in reader.lines() {
        let line = line.map_err(|source| IonlinkError::Io { source, path: None })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[0] {
            "S" => {
                if fields.len() < 3 {
                    return Err(SchemaError::MissingColumn {
                        column: "retention time",
                        context: "hardklor scan line",
                    }
                    .into());
                }
                scan_num = parse_u32("scan_num", fields[1])?;
                rt = parse_f64("rt", fields[2])?;
            }
            "P" => {
                if fields.len() < 5 {
                    return Err(SchemaError::MissingColumn {
                        column: "base_peak",
                        context: "hardklor peptide line",
                    }
                    .into());
                }
                peaks.push(DeconvPeak::new(
                    parse_f64("mass", fields[1])?,
                    parse_u8("charge", fields[2])?,
                    parse_f64("intensity", fields[3])?,
                    parse_f64("base_peak", fields[4])?,
                    scan_num,
                    rt,
                ));
            }
            _ => {
                return Err(SchemaError::InvalidValue {
                    column: "line tag",
                    value: fields[0].to_string(),
                }
                .into());
            }
        }
    }
    Ok(peaks)
}
