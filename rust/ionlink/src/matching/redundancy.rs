use crate::matching::MatchResult;
use crate::models::tolerance::DEFAULT_REDUNDANCY_RTOL;
use crate::models::{
    Feature,
    MassTolerance,
    RtWindow,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

/// Filters for the self-redundancy match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RedundancyParams {
    pub mass_tolerance: MassTolerance,
    pub rt_window: RtWindow,
}

impl Default for RedundancyParams {
    fn default() -> Self {
        Self {
            mass_tolerance: MassTolerance::Relative(DEFAULT_REDUNDANCY_RTOL),
            rt_window: RtWindow::Unrestricted,
        }
    }
}

/// Match one feature against a candidate table of the same schema.
///
/// Candidates must sit inside the reference's RT window (when one is
/// set), carry exactly the same charge, and agree in mass under the
/// configured tolerance.
pub fn match_feature(row: &Feature, table: &[Feature], params: &RedundancyParams) -> MatchResult {
    let matched_rows: Vec<usize> = table
        .iter()
        .enumerate()
        .filter(|(_, cand)| params.rt_window.contains(row.best_rt, cand.best_rt))
        .filter(|(_, cand)| cand.charge == row.charge)
        .filter(|(_, cand)| params.mass_tolerance.matches(row.mass, cand.mass))
        .map(|(idx, _)| idx)
        .collect();
    MatchResult {
        count: matched_rows.len(),
        matched_rows,
    }
}

/// Number of rows in `table` that duplicate `row`, excluding the row's
/// own match against itself.
///
/// `row` is expected to come from `table`; a row always matches itself,
/// so the raw count is at least 1 and the result at least 0.
pub fn redundant_count(row: &Feature, table: &[Feature], params: &RedundancyParams) -> usize {
    match_feature(row, table, params).count.saturating_sub(1)
}

/// Redundancy count for every row of `table` against the whole table.
///
/// Rows are independent, so they are evaluated in parallel; results
/// come back in row order.
pub fn redundancy_counts(table: &[Feature], params: &RedundancyParams) -> Vec<usize> {
    table
        .par_iter()
        .map(|row| redundant_count(row, table, params))
        .collect()
}
