use std::fmt::Display;
use std::path::PathBuf;

/// Contract violations in input tables.
///
/// Every variant is fatal to the call that raised it; no operation
/// returns partial output alongside a schema error.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    MissingColumn {
        column: &'static str,
        context: &'static str,
    },
    InvalidValue {
        column: &'static str,
        value: String,
    },
    InvalidCharge {
        row: usize,
        charge: u8,
    },
    DuplicateScanKey {
        scan_num: u32,
        first_rt: f64,
        second_rt: f64,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn { column, context } => {
                write!(f, "Required column '{}' missing from {}", column, context)
            }
            Self::InvalidValue { column, value } => {
                write!(f, "Could not interpret '{}' in column '{}'", value, column)
            }
            Self::InvalidCharge { row, charge } => {
                write!(f, "Row {} has charge {}, expected >= 1", row, charge)
            }
            Self::DuplicateScanKey {
                scan_num,
                first_rt,
                second_rt,
            } => {
                write!(
                    f,
                    "Scan {} appears with two retention times ({} and {})",
                    scan_num, first_rt, second_rt
                )
            }
        }
    }
}

/// Unresolvable cross-table references.
///
/// Raised instead of silently skipping a row, since a skipped row would
/// corrupt multiplicity counts downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkageError {
    ScanNotFound { scan_num: u32 },
    MissingPrecursor { scan_num: u32 },
}

impl Display for LinkageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScanNotFound { scan_num } => {
                write!(f, "Scan {} is absent from the scan metadata table", scan_num)
            }
            Self::MissingPrecursor { scan_num } => {
                write!(f, "Scan {} carries no precursor link", scan_num)
            }
        }
    }
}

#[derive(Debug)]
pub enum IonlinkError {
    Schema(SchemaError),
    Linkage(LinkageError),
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    Csv(csv::Error),
    Sqlite(rusqlite::Error),
    Xml(quick_xml::Error),
    Other(String),
}

impl Display for IonlinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "Schema error: {}", e),
            Self::Linkage(e) => write!(f, "Linkage error: {}", e),
            Self::Io { source, path } => match path {
                Some(p) => write!(f, "IO error reading {}: {}", p.display(), source),
                None => write!(f, "IO error: {}", source),
            },
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::Sqlite(e) => write!(f, "SQLite error: {}", e),
            Self::Xml(e) => write!(f, "XML error: {}", e),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for IonlinkError {}

impl IonlinkError {
    pub fn custom(msg: impl Display) -> Self {
        Self::Other(msg.to_string())
    }
}

impl From<SchemaError> for IonlinkError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

impl From<LinkageError> for IonlinkError {
    fn from(e: LinkageError) -> Self {
        Self::Linkage(e)
    }
}

impl From<csv::Error> for IonlinkError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<rusqlite::Error> for IonlinkError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

impl From<quick_xml::Error> for IonlinkError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

pub type Result<T> = std::result::Result<T, IonlinkError>;
