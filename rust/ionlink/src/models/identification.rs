use crate::errors::SchemaError;
use serde::{
    Deserialize,
    Serialize,
};

/// A peptide-spectrum match: an identification event linking an MS2
/// spectrum to a peptide sequence at some confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identification {
    pub scan_num: u32,
    pub peptide_sequence: String,
    pub charge: u8,
    pub exp_mass: f64,
    pub calc_mass: f64,
    pub retention_time: f64,
    pub q_value: f64,
    pub compensation_voltage: Option<i32>,
    /// Protein accessions in report order.
    pub protein_ids: Vec<String>,
}

pub fn validate_identifications(ids: &[Identification]) -> Result<(), SchemaError> {
    for (row, id) in ids.iter().enumerate() {
        if id.charge < 1 {
            return Err(SchemaError::InvalidCharge {
                row,
                charge: id.charge,
            });
        }
        if !id.exp_mass.is_finite() || !id.q_value.is_finite() {
            return Err(SchemaError::InvalidValue {
                column: if id.exp_mass.is_finite() {
                    "q_value"
                } else {
                    "exp_mass"
                },
                value: "non-finite".to_string(),
            });
        }
    }
    Ok(())
}
