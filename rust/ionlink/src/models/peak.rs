use crate::models::feature::mz_from_mass;
use serde::{
    Deserialize,
    Serialize,
};

/// A raw centroided peak, the unit of work for binning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Peak {
    pub mz: f64,
    pub rt: f64,
    pub intensity: f64,
}

/// A deconvoluted peptide-like signal observed in a single scan, as
/// reported by an isotope-deconvolution engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeconvPeak {
    pub mass: f64,
    pub charge: u8,
    pub intensity: f64,
    pub base_peak_mz: f64,
    pub scan_num: u32,
    pub rt: f64,
    pub mz: f64,
    pub compensation_voltage: Option<i32>,
}

impl DeconvPeak {
    pub fn new(
        mass: f64,
        charge: u8,
        intensity: f64,
        base_peak_mz: f64,
        scan_num: u32,
        rt: f64,
    ) -> Self {
        Self {
            mass,
            charge,
            intensity,
            base_peak_mz,
            scan_num,
            rt,
            mz: mz_from_mass(mass, charge),
            compensation_voltage: None,
        }
    }

    /// View of the deconvoluted signal as a plain peak on the (m/z, RT)
    /// plane, for binning.
    pub fn as_peak(&self) -> Peak {
        Peak {
            mz: self.mz,
            rt: self.rt,
            intensity: self.intensity,
        }
    }
}

/// Order peaks by descending intensity, the way browse-the-top-signals
/// workflows expect them.
pub fn sort_by_intensity(peaks: &mut [DeconvPeak]) {
    peaks.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
}
