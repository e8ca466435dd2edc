//! Readers that turn collaborator file formats into the typed tables
//! the core operates on.
//!
//! Every reader validates at the boundary: a missing header or an
//! unparseable numeric field fails fast with a schema error instead of
//! letting NaNs reach the tolerance comparisons.

pub mod encyclopedia;
pub mod hardklor;
pub mod kronik;
pub mod percolator;
pub mod scan_table;

pub(crate) fn parse_f64(column: &'static str, raw: &str) -> Result<f64, crate::errors::SchemaError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| crate::errors::SchemaError::InvalidValue {
            column,
            value: raw.to_string(),
        })
}

pub(crate) fn parse_u32(column: &'static str, raw: &str) -> Result<u32, crate::errors::SchemaError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| crate::errors::SchemaError::InvalidValue {
            column,
            value: raw.to_string(),
        })
}

pub(crate) fn parse_u8(column: &'static str, raw: &str) -> Result<u8, crate::errors::SchemaError> {
    raw.trim()
        .parse::<u8>()
        .map_err(|_| crate::errors::SchemaError::InvalidValue {
            column,
            value: raw.to_string(),
        })
}
