use serde::{
    Deserialize,
    Serialize,
};

/// One precursor entry of a DIA chromatogram library.
///
/// Retention times are in seconds, matching the library convention;
/// detected peaks carry minutes and are converted at the matching seam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaEntry {
    pub precursor_mz: f64,
    pub precursor_charge: u8,
    pub peptide_mod_seq: String,
    pub peptide_seq: String,
    pub rt_seconds: f64,
    pub rt_seconds_start: f64,
    pub rt_seconds_stop: f64,
}
