use crate::models::tolerance::DEFAULT_REDUNDANCY_RTOL;
use crate::models::{
    DeconvPeak,
    DiaEntry,
    MassTolerance,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

/// Filters for matching detected signals against a DIA library.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiaMatchParams {
    pub mz_tolerance: MassTolerance,
}

impl Default for DiaMatchParams {
    fn default() -> Self {
        Self {
            mz_tolerance: MassTolerance::Relative(DEFAULT_REDUNDANCY_RTOL),
        }
    }
}

/// Count the library entries matched by one detected signal.
///
/// A library entry matches when charges are equal, the precursor m/z
/// agrees under the tolerance, and the signal's retention time (minutes,
/// converted to seconds here) falls inside the entry's elution window.
pub fn match_dia(peak: &DeconvPeak, entries: &[DiaEntry], params: &DiaMatchParams) -> usize {
    let rt_seconds = peak.rt * 60.0;
    entries
        .iter()
        .filter(|e| e.precursor_charge == peak.charge)
        .filter(|e| params.mz_tolerance.matches(peak.mz, e.precursor_mz))
        .filter(|e| e.rt_seconds_start <= rt_seconds && rt_seconds <= e.rt_seconds_stop)
        .count()
}

/// Library match count for every detected signal, in row order.
pub fn dia_match_counts(
    peaks: &[DeconvPeak],
    entries: &[DiaEntry],
    params: &DiaMatchParams,
) -> Vec<usize> {
    peaks
        .par_iter()
        .map(|p| match_dia(p, entries, params))
        .collect()
}
