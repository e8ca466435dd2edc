//! Cross-referencing of quantified MS1 features with peptide
//! identifications, plus coarse binning of raw signal for QC views.
//!
//! Everything here is a pure table-to-table transform over in-memory
//! snapshots: readers under [`data_sources`] build the typed tables,
//! [`matching`] joins them under mass/RT tolerances, [`binning`] and
//! [`scan_summary`] aggregate signal for downstream visualization.
//! There is no file, network, or CLI surface in this crate beyond the
//! readers; callers own all inputs and receive fresh output tables.

// Re-export main structures
pub use crate::models::{
    DeconvPeak,
    DiaEntry,
    Feature,
    Identification,
    MassTolerance,
    Peak,
    PrecursorLink,
    RtWindow,
    ScanRecord,
    ScanTable,
};

pub use crate::matching::{
    CrossMatchOutput,
    CrossMatchParams,
    MatchResult,
    MatchedFeature,
    MatchedIdentification,
    RedundancyParams,
    cross_match,
    redundancy_counts,
    redundant_count,
};

pub use crate::binning::{
    Bin,
    bin_2d,
    bin_by_mz,
    bin_by_rt,
    generate_edges,
};

pub use crate::scan_summary::{
    ScanIons,
    ScanTotal,
    attach_injection_times,
    identified_scans,
    summarize_scans,
};

// Declare modules
pub mod binning;
pub mod data_sources;
pub mod errors;
pub mod matching;
pub mod models;
pub mod scan_summary;

// Re-export errors
pub use crate::errors::{
    IonlinkError,
    LinkageError,
    Result,
    SchemaError,
};
