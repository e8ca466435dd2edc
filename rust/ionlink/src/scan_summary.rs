//! Per-scan aggregation of deconvoluted signal intensity.

use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;

use crate::errors::SchemaError;
use crate::models::{
    DeconvPeak,
    Identification,
    ScanTable,
};

/// Total ion current contributed by deconvoluted signals in one scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScanTotal {
    pub scan_num: u32,
    pub retention_time: f64,
    pub compensation_voltage: Option<i32>,
    pub tic: f64,
}

/// A [`ScanTotal`] joined with instrument injection time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScanIons {
    pub scan_num: u32,
    pub retention_time: f64,
    pub compensation_voltage: Option<i32>,
    pub tic: f64,
    pub injection_time_ms: f64,
    /// tic * injection_time / 1000.
    pub ions: f64,
}

/// Group signals by (scan number, retention time, compensation voltage)
/// and sum their intensity into a per-scan TIC.
///
/// A scan number reappearing with a different retention time is a
/// schema violation in the input, not a new group. Output rows are
/// sorted by scan number, then voltage; the row count never exceeds the
/// input row count.
pub fn summarize_scans(peaks: &[DeconvPeak]) -> Result<Vec<ScanTotal>, SchemaError> {
    let mut groups: HashMap<(u32, Option<i32>), (f64, f64)> = HashMap::new();
    for peak in peaks {
        let entry = groups
            .entry((peak.scan_num, peak.compensation_voltage))
            .or_insert((peak.rt, 0.0));
        if entry.0 != peak.rt {
            return Err(SchemaError::DuplicateScanKey {
                scan_num: peak.scan_num,
                first_rt: entry.0,
                second_rt: peak.rt,
            });
        }
        entry.1 += peak.intensity;
    }
    let mut totals: Vec<ScanTotal> = groups
        .into_iter()
        .map(|((scan_num, cv), (rt, tic))| ScanTotal {
            scan_num,
            retention_time: rt,
            compensation_voltage: cv,
            tic,
        })
        .collect();
    totals.sort_by_key(|t| (t.scan_num, t.compensation_voltage));
    Ok(totals)
}

/// Inner-join per-scan totals with scan metadata on scan number,
/// attaching injection time and the derived ion count.
///
/// Totals whose scan number is absent from the metadata are dropped,
/// as an inner join does.
pub fn attach_injection_times(totals: &[ScanTotal], scans: &ScanTable) -> Vec<ScanIons> {
    totals
        .iter()
        .filter_map(|t| {
            scans.get(t.scan_num).map(|rec| ScanIons {
                scan_num: t.scan_num,
                retention_time: t.retention_time,
                compensation_voltage: t.compensation_voltage,
                tic: t.tic,
                injection_time_ms: rec.injection_time_ms,
                ions: t.tic * rec.injection_time_ms / 1000.0,
            })
        })
        .collect()
}

/// Flag, per summary row, whether its scan produced an identification.
///
/// Returned in row order rather than written into the input.
pub fn identified_scans(totals: &[ScanTotal], ids: &[Identification]) -> Vec<bool> {
    let id_scans: std::collections::HashSet<u32> = ids.iter().map(|id| id.scan_num).collect();
    totals
        .iter()
        .map(|t| id_scans.contains(&t.scan_num))
        .collect()
}
