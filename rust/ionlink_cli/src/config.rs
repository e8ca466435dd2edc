use ionlink::data_sources::kronik::KronikFilter;
use ionlink::matching::{
    CrossMatchParams,
    RedundancyParams,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;

use crate::errors::CliError;

/// Tolerances and filters, overridable per run from a JSON file.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub cross_match: CrossMatchParamsOrDefault,
    #[serde(default)]
    pub redundancy: RedundancyParamsOrDefault,
    #[serde(default)]
    pub kronik: KronikFilter,
}

// Serde needs defaults at the section level so a config file can name
// only the section it changes.

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct CrossMatchParamsOrDefault(pub CrossMatchParams);

impl Default for CrossMatchParamsOrDefault {
    fn default() -> Self {
        Self(CrossMatchParams::default())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct RedundancyParamsOrDefault(pub RedundancyParams);

impl Default for RedundancyParamsOrDefault {
    fn default() -> Self {
        Self(RedundancyParams::default())
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = std::fs::File::open(path).map_err(|e| CliError::Io {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        })?;
        serde_json::from_reader(file).map_err(|e| CliError::ParseError { msg: e.to_string() })
    }
}
