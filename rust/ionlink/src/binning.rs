//! Deterministic bin-edge generation and intensity binning on the
//! (m/z, retention time) plane.
//!
//! Edges are computed by index multiplication rather than repeated
//! addition, so the edge count for fixed inputs never drifts with
//! accumulation order.

use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;

use crate::models::Peak;

/// A half-open interval `[lower, upper)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
}

/// Intensity summed into a retention-time bin, keyed by the exact m/z
/// of the contributing peaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RtBinnedRow {
    pub mz: f64,
    pub rt_bin: Bin,
    pub intensity: f64,
}

/// Intensity summed into an m/z bin, keyed by the exact retention time
/// of the contributing peaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MzBinnedRow {
    pub rt: f64,
    pub mz_bin: Bin,
    pub intensity: f64,
}

/// Intensity summed into a cell of the 2-D (RT, m/z) histogram.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridBinnedRow {
    pub rt_bin: Bin,
    pub mz_bin: Bin,
    pub intensity: f64,
}

/// Build a strictly increasing sequence of bin edges.
///
/// Edges start at `start` and step by `bin_size * bin_mult`, stopping
/// before `ceil(end + (bin_mult - 1) * end + 1)`. The multiplicative
/// correction compensates for proportional calibration drift across the
/// scanned range, so edges near the upper bound intentionally over-cover
/// `end`.
///
/// # Examples
/// ```
/// use ionlink::binning::generate_edges;
///
/// assert_eq!(generate_edges(0.0, 10.0, 2.0, 1.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
/// assert_eq!(generate_edges(399.0, 1005.0, 4.0, 1.0005).len(), 152);
/// ```
pub fn generate_edges(start: f64, end: f64, bin_size: f64, bin_mult: f64) -> Vec<f64> {
    let stop = (end + (bin_mult - 1.0) * end + 1.0).ceil();
    let step = bin_size * bin_mult;
    if !(step > 0.0) || stop <= start {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Index of the half-open interval `[edges[i], edges[i+1])` containing
/// `value`, or `None` when the value sits outside every interval.
fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    if edges.len() < 2 {
        return None;
    }
    let idx = edges.partition_point(|e| *e <= value);
    if idx == 0 || idx == edges.len() {
        return None;
    }
    // partition_point lands one past the containing lower edge.
    Some(idx - 1)
}

fn bin_at(edges: &[f64], idx: usize) -> Bin {
    Bin {
        lower: edges[idx],
        upper: edges[idx + 1],
    }
}

/// Sum peak intensities into retention-time bins, grouped by exact m/z.
///
/// Peaks whose RT falls outside every interval are dropped, not wrapped.
pub fn bin_by_rt(peaks: &[Peak], rt_edges: &[f64]) -> Vec<RtBinnedRow> {
    let mut groups: HashMap<(u64, usize), f64> = HashMap::new();
    for peak in peaks {
        if let Some(idx) = bin_index(rt_edges, peak.rt) {
            *groups.entry((peak.mz.to_bits(), idx)).or_insert(0.0) += peak.intensity;
        }
    }
    let mut rows: Vec<RtBinnedRow> = groups
        .into_iter()
        .map(|((mz_bits, idx), intensity)| RtBinnedRow {
            mz: f64::from_bits(mz_bits),
            rt_bin: bin_at(rt_edges, idx),
            intensity,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.mz.total_cmp(&b.mz)
            .then(a.rt_bin.lower.total_cmp(&b.rt_bin.lower))
    });
    rows
}

/// Sum peak intensities into m/z bins, grouped by exact retention time.
pub fn bin_by_mz(peaks: &[Peak], mz_edges: &[f64]) -> Vec<MzBinnedRow> {
    let mut groups: HashMap<(u64, usize), f64> = HashMap::new();
    for peak in peaks {
        if let Some(idx) = bin_index(mz_edges, peak.mz) {
            *groups.entry((peak.rt.to_bits(), idx)).or_insert(0.0) += peak.intensity;
        }
    }
    let mut rows: Vec<MzBinnedRow> = groups
        .into_iter()
        .map(|((rt_bits, idx), intensity)| MzBinnedRow {
            rt: f64::from_bits(rt_bits),
            mz_bin: bin_at(mz_edges, idx),
            intensity,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.rt.total_cmp(&b.rt)
            .then(a.mz_bin.lower.total_cmp(&b.mz_bin.lower))
    });
    rows
}

/// Sum peak intensities into the 2-D histogram spanned by both edge
/// sequences. A peak lands in a cell only when it falls inside an
/// interval along both dimensions.
pub fn bin_2d(peaks: &[Peak], rt_edges: &[f64], mz_edges: &[f64]) -> Vec<GridBinnedRow> {
    let mut groups: HashMap<(usize, usize), f64> = HashMap::new();
    for peak in peaks {
        if let (Some(rt_idx), Some(mz_idx)) =
            (bin_index(rt_edges, peak.rt), bin_index(mz_edges, peak.mz))
        {
            *groups.entry((rt_idx, mz_idx)).or_insert(0.0) += peak.intensity;
        }
    }
    let mut keyed: Vec<((usize, usize), f64)> = groups.into_iter().collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed
        .into_iter()
        .map(|((rt_idx, mz_idx), intensity)| GridBinnedRow {
            rt_bin: bin_at(rt_edges, rt_idx),
            mz_bin: bin_at(mz_edges, mz_idx),
            intensity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_unit_step() {
        // Stop bound is ceil(10 + 0 + 1) = 11; stepping by 2 from 0 the
        // last edge below the bound is 10.
        assert_eq!(
            generate_edges(0.0, 10.0, 2.0, 1.0),
            vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]
        );
    }

    #[test]
    fn test_edges_with_multiplier() {
        let edges = generate_edges(399.0, 1005.0, 4.0, 1.0005);
        assert_eq!(edges.len(), 152);
        assert_eq!(edges[0], 399.0);
        // Strictly increasing by a constant step.
        assert!(edges.windows(2).all(|w| w[1] > w[0]));
        assert!((edges[1] - edges[0] - 4.0 * 1.0005).abs() < 1e-12);
    }

    #[test]
    fn test_edges_empty_when_degenerate() {
        assert!(generate_edges(10.0, 10.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_bin_index_half_open() {
        let edges = [0.0, 2.0, 4.0];
        assert_eq!(bin_index(&edges, 0.0), Some(0));
        assert_eq!(bin_index(&edges, 1.999), Some(0));
        assert_eq!(bin_index(&edges, 2.0), Some(1));
        assert_eq!(bin_index(&edges, 3.999), Some(1));
        // Upper edge is exclusive, below-range is dropped.
        assert_eq!(bin_index(&edges, 4.0), None);
        assert_eq!(bin_index(&edges, -0.001), None);
    }

    fn peak(mz: f64, rt: f64, intensity: f64) -> Peak {
        Peak { mz, rt, intensity }
    }

    #[test]
    fn test_bin_by_mz_groups_by_rt() {
        let peaks = vec![
            peak(400.5, 1.0, 10.0),
            peak(401.0, 1.0, 5.0),  // same rt, same mz bin
            peak(405.0, 1.0, 2.0),  // same rt, next bin
            peak(400.5, 2.0, 1.0),  // different rt
            peak(9999.0, 1.0, 99.0), // outside all bins, dropped
        ];
        let edges = [400.0, 404.0, 408.0];
        let rows = bin_by_mz(&peaks, &edges);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].rt, 1.0);
        assert_eq!(rows[0].mz_bin.lower, 400.0);
        assert_eq!(rows[0].intensity, 15.0);
        assert_eq!(rows[1].intensity, 2.0);
        assert_eq!(rows[2].rt, 2.0);
        assert_eq!(rows[2].intensity, 1.0);
    }

    #[test]
    fn test_binning_conserves_in_range_intensity() {
        let peaks: Vec<Peak> = (0..100)
            .map(|i| peak(400.0 + i as f64 * 7.3, (i % 10) as f64, 1.0 + i as f64))
            .collect();
        let edges = generate_edges(399.0, 1005.0, 4.0, 1.0005);
        let last = *edges.last().unwrap();
        let expected: f64 = peaks
            .iter()
            .filter(|p| p.mz >= edges[0] && p.mz < last)
            .map(|p| p.intensity)
            .sum();
        let total: f64 = bin_by_mz(&peaks, &edges).iter().map(|r| r.intensity).sum();
        assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bin_2d() {
        let peaks = vec![
            peak(400.5, 1.0, 10.0),
            peak(400.6, 1.5, 5.0), // same cell
            peak(404.5, 1.0, 2.0), // next mz cell
            peak(400.5, 3.0, 1.0), // next rt cell
        ];
        let rt_edges = [0.0, 2.0, 4.0];
        let mz_edges = [400.0, 404.0, 408.0];
        let rows = bin_2d(&peaks, &rt_edges, &mz_edges);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].intensity, 15.0);
        assert_eq!(rows[1].intensity, 2.0);
        assert_eq!(rows[2].rt_bin.lower, 2.0);
        assert_eq!(rows[2].intensity, 1.0);
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let edges = [0.0, 2.0, 4.0];
        assert!(bin_by_rt(&[], &edges).is_empty());
        assert!(bin_2d(&[], &edges, &edges).is_empty());
    }
}
