use crate::errors::SchemaError;
use crate::models::PROTON_MASS;
use serde::{
    Deserialize,
    Serialize,
};

/// A chromatographically-resolved, charge-state-resolved ion detected
/// and quantified across multiple scans.
///
/// `mz` is derived from the neutral mass and charge; `rt_start` and
/// `rt_end` bound the feature's elution interval on the axis the loader
/// put them on (cross-source linkage compares them against scan numbers,
/// see [`crate::matching::cross`]), while `best_rt` is the apex retention
/// time in minutes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub mass: f64,
    pub charge: u8,
    pub mz: f64,
    pub rt_start: f64,
    pub rt_end: f64,
    pub best_rt: f64,
    pub best_intensity: f64,
    pub summed_intensity: f64,
    pub compensation_voltage: Option<i32>,
}

/// m/z of an ion of the given neutral mass and charge.
pub fn mz_from_mass(mass: f64, charge: u8) -> f64 {
    (mass + charge as f64 * PROTON_MASS) / charge as f64
}

impl Feature {
    /// Build a feature, deriving its m/z from mass and charge.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mass: f64,
        charge: u8,
        rt_start: f64,
        rt_end: f64,
        best_rt: f64,
        best_intensity: f64,
        summed_intensity: f64,
        compensation_voltage: Option<i32>,
    ) -> Self {
        Self {
            mass,
            charge,
            mz: mz_from_mass(mass, charge),
            rt_start,
            rt_end,
            best_rt,
            best_intensity,
            summed_intensity,
            compensation_voltage,
        }
    }

    /// Apex retention time in seconds.
    pub fn best_rt_seconds(&self) -> f64 {
        self.best_rt * 60.0
    }
}

/// Fail fast on rows that would poison tolerance comparisons further in.
pub fn validate_features(features: &[Feature]) -> Result<(), SchemaError> {
    for (row, f) in features.iter().enumerate() {
        if f.charge < 1 {
            return Err(SchemaError::InvalidCharge {
                row,
                charge: f.charge,
            });
        }
        if !f.mass.is_finite() {
            return Err(SchemaError::InvalidValue {
                column: "mass",
                value: f.mass.to_string(),
            });
        }
    }
    Ok(())
}
