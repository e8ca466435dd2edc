//! Tolerance-windowed joins between tabular record sets.
//!
//! Three flavors live here:
//! - [`redundancy`]: a table matched against itself to count duplicate
//!   detections of the same analyte.
//! - [`cross`]: quantified features joined to peptide identifications
//!   through scan metadata.
//! - [`dia`]: detected signals joined to a DIA chromatogram library.
//!
//! All of them take the reference table as an explicit argument and
//! count multiplicities exactly: a full scan of the candidate set per
//! reference row, no early exit.

pub mod cross;
pub mod dia;
pub mod redundancy;

pub use cross::{
    CrossMatchOutput,
    CrossMatchParams,
    MatchedFeature,
    MatchedIdentification,
    cross_match,
};
pub use dia::{
    DiaMatchParams,
    dia_match_counts,
};
pub use redundancy::{
    RedundancyParams,
    redundancy_counts,
    redundant_count,
};

/// Outcome of matching one reference row against a candidate table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Number of candidates that passed every filter.
    pub count: usize,
    /// Indices of the matched candidates in the reference table.
    pub matched_rows: Vec<usize>,
}
