//! Reader for Percolator output XML (`pout`).
//!
//! Only the PSM section is consumed. The scan number and charge ride
//! inside the `psm_id` attribute as underscore-separated fields
//! (`<run>_<index>_<scan>_<charge>_<rank>`), which is how the original
//! pipeline recovered them.

use quick_xml::Reader;
use quick_xml::events::{
    BytesStart,
    Event,
};
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
    LinkageError,
    Result,
    SchemaError,
};
use crate::models::{
    Identification,
    ScanTable,
};

fn attribute(e: &BytesStart, name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(IonlinkError::Xml)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[derive(Default)]
struct PsmAccumulator {
    psm_id: String,
    peptide_sequence: Option<String>,
    q_value: Option<f64>,
    exp_mass: Option<f64>,
    calc_mass: Option<f64>,
    protein_ids: Vec<String>,
}

impl PsmAccumulator {
    fn finish(self) -> Result<Identification> {
        let parts: Vec<&str> = self.psm_id.split('_').collect();
        if parts.len() < 4 {
            return Err(SchemaError::InvalidValue {
                column: "psm_id",
                value: self.psm_id,
            }
            .into());
        }
        let scan_num = parse_u32("psm_id", parts[2])?;
        let charge = parse_u8("psm_id", parts[3])?;
        let require = |value: Option<f64>, column: &'static str| -> Result<f64> {
            value.ok_or_else(|| {
                SchemaError::MissingColumn {
                    column,
                    context: "percolator psm",
                }
                .into()
            })
        };
        Ok(Identification {
            scan_num,
            peptide_sequence: self.peptide_sequence.ok_or(SchemaError::MissingColumn {
                column: "peptide_seq",
                context: "percolator psm",
            })?,
            charge,
            exp_mass: require(self.exp_mass, "exp_mass")?,
            calc_mass: require(self.calc_mass, "calc_mass")?,
            retention_time: 0.0,
            q_value: require(self.q_value, "q_value")?,
            compensation_voltage: None,
            protein_ids: self.protein_ids,
        })
    }
}

pub fn read_pout<P: AsRef<Path>>(path: P) -> Result<Vec<Identification>> {
    let file = File::open(path.as_ref()).map_err(|source| IonlinkError::Io {
        source,
        path: Some(path.as_ref().to_path_buf()),
    })?;
    read_pout_from(BufReader::new(file))
}

pub fn read_pout_from<R: BufRead>(reader: R) -> Result<Vec<Identification>> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut identifications = Vec::new();
    let mut current: Option<PsmAccumulator> = None;
    let mut text_target: Option<&'static str> = None;
    let mut in_peptides = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                // The peptide section repeats the same element names;
                // only the PSM section is read.
                b"peptides" => in_peptides = true,
                b"psm" if !in_peptides => {
                    let psm_id = attribute(e, "psm_id")?.ok_or(SchemaError::MissingColumn {
                        column: "psm_id",
                        context: "percolator psm",
                    })?;
                    current = Some(PsmAccumulator {
                        psm_id,
                        ..Default::default()
                    });
                }
                b"q_value" if current.is_some() => text_target = Some("q_value"),
                b"exp_mass" if current.is_some() => text_target = Some("exp_mass"),
                b"calc_mass" if current.is_some() => text_target = Some("calc_mass"),
                b"protein_id" if current.is_some() => text_target = Some("protein_id"),
                b"peptide_seq" if current.is_some() => {
                    if let (Some(psm), Some(seq)) = (current.as_mut(), attribute(e, "seq")?) {
                        psm.peptide_sequence = Some(seq);
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => {
                if e.local_name().as_ref() == b"peptide_seq" {
                    if let (Some(psm), Some(seq)) = (current.as_mut(), attribute(e, "seq")?) {
                        psm.peptide_sequence = Some(seq);
                    }
                }
            }
            Event::Text(ref t) => {
                if let (Some(psm), Some(target)) = (current.as_mut(), text_target) {
                    let raw = t.unescape().map_err(IonlinkError::Xml)?;
                    match target {
                        "q_value" => psm.q_value = Some(parse_f64("q_value", &raw)?),
                        "exp_mass" => psm.exp_mass = Some(parse_f64("exp_mass", &raw)?),
                        "calc_mass" => psm.calc_mass = Some(parse_f64("calc_mass", &raw)?),
                        "protein_id" => psm.protein_ids.push(raw.into_owned()),
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"psm" => {
                    if let Some(psm) = current.take() {
                        identifications.push(psm.finish()?);
                    }
                }
                b"peptides" => in_peptides = false,
                _ => text_target = None,
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(identifications)
}

/// Fill each identification's retention time from the scan metadata.
///
/// Percolator output does not carry retention times; they live in the
/// spectral metadata keyed by scan number.
pub fn with_retention_times(
    mut ids: Vec<Identification>,
    scans: &ScanTable,
) -> Result<Vec<Identification>> {
    for id in &mut ids {
        let rec = scans.get(id.scan_num).ok_or(LinkageError::ScanNotFound {
            scan_num: id.scan_num,
        })?;
        id.retention_time = rec.retention_time;
    }
    Ok(ids)
}
