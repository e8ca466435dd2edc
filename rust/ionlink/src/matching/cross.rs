use crate::errors::{
    LinkageError,
    Result,
};
use crate::models::tolerance::DEFAULT_LINKAGE_TOL;
use crate::models::{
    Feature,
    Identification,
    MassTolerance,
    ScanTable,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

/// Filters for feature-to-identification linkage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrossMatchParams {
    /// Applied to both the m/z pair and the mass pair.
    pub tolerance: MassTolerance,
    /// Require exact equality of FAIMS compensation voltages.
    pub match_compensation_voltage: bool,
}

impl Default for CrossMatchParams {
    fn default() -> Self {
        Self {
            tolerance: MassTolerance::Absolute(DEFAULT_LINKAGE_TOL),
            match_compensation_voltage: false,
        }
    }
}

/// A feature row augmented with how many identifications claimed it.
///
/// `matched_count` is 1 for an unambiguous link and the full candidate
/// multiplicity when an identification could not be disambiguated
/// between several features.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedFeature {
    #[serde(flatten)]
    pub feature: Feature,
    pub matched_count: usize,
}

/// An identification row augmented with its linkage outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedIdentification {
    #[serde(flatten)]
    pub identification: Identification,
    /// Number of candidate features that passed every filter.
    pub matched_count: usize,
    /// Best intensity of the linked feature; maximum across candidates
    /// when ambiguous; 0 when unmatched.
    pub representative_intensity: f64,
    /// TIC of the precursor MS1 scan.
    pub total_ion_current: f64,
    /// Injection time of the precursor MS1 scan, in milliseconds.
    pub injection_time_ms: f64,
    /// representative_intensity * injection_time / 1000.
    pub ion_count: f64,
}

/// Output of [`cross_match`]: two fresh tables, inputs untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMatchOutput {
    pub features: Vec<MatchedFeature>,
    pub identifications: Vec<MatchedIdentification>,
}

struct IdOutcome {
    matched_rows: Vec<usize>,
    representative_intensity: f64,
    total_ion_current: f64,
    injection_time_ms: f64,
}

fn match_one(
    id: &Identification,
    features: &[Feature],
    scans: &ScanTable,
    params: &CrossMatchParams,
) -> Result<IdOutcome> {
    let ms2 = scans
        .get(id.scan_num)
        .ok_or(LinkageError::ScanNotFound {
            scan_num: id.scan_num,
        })?;
    let link = ms2.precursor.ok_or(LinkageError::MissingPrecursor {
        scan_num: id.scan_num,
    })?;
    let ms1 = scans
        .get(link.ms1_scan)
        .ok_or(LinkageError::ScanNotFound {
            scan_num: link.ms1_scan,
        })?;

    // Containment is tested on the scan-number axis rather than the time
    // axis, which tolerates clock drift between independently written
    // feature and spectral files.
    let scan_pos = link.ms1_scan as f64;

    let matched_rows: Vec<usize> = features
        .iter()
        .enumerate()
        .filter(|(_, f)| f.rt_start <= scan_pos && scan_pos <= f.rt_end)
        .filter(|(_, f)| params.tolerance.matches(f.mz, link.ms1_mz))
        .filter(|(_, f)| params.tolerance.matches(f.mass, id.exp_mass))
        .filter(|(_, f)| {
            !params.match_compensation_voltage
                || f.compensation_voltage == id.compensation_voltage
        })
        .map(|(idx, _)| idx)
        .collect();

    let representative_intensity = matched_rows
        .iter()
        .map(|idx| features[*idx].best_intensity)
        .fold(0.0, f64::max);

    Ok(IdOutcome {
        matched_rows,
        representative_intensity,
        total_ion_current: ms1.total_ion_current,
        injection_time_ms: ms1.injection_time_ms,
    })
}

/// Link quantified features to peptide identifications through scan
/// metadata.
///
/// Per identification, the precursor MS1 scan is resolved through
/// `scans` (an unresolvable scan aborts the whole call with a linkage
/// error), candidate features are filtered as described in
/// [`CrossMatchParams`], and multiplicity is resolved:
///
/// - 0 candidates: the identification stays unmatched with
///   representative intensity 0.
/// - 1 candidate: the identification is linked to it and the feature is
///   marked matched once.
/// - more than 1: the identification is recorded as ambiguous with the
///   candidate count, and every candidate feature carries that count,
///   since none of them can be disambiguated.
///
/// An empty feature table is not an error; every identification simply
/// resolves to zero matches.
pub fn cross_match(
    features: &[Feature],
    identifications: &[Identification],
    scans: &ScanTable,
    params: &CrossMatchParams,
) -> Result<CrossMatchOutput> {
    let outcomes: Vec<IdOutcome> = identifications
        .par_iter()
        .map(|id| match_one(id, features, scans, params))
        .collect::<Result<Vec<_>>>()?;

    let mut feature_counts = vec![0usize; features.len()];
    for outcome in &outcomes {
        let count = outcome.matched_rows.len();
        for idx in &outcome.matched_rows {
            // Ambiguous identifications flag every candidate with the
            // full multiplicity; a later unambiguous link must not
            // erase that.
            feature_counts[*idx] = feature_counts[*idx].max(count);
        }
    }

    let identifications_out: Vec<MatchedIdentification> = identifications
        .iter()
        .zip(outcomes)
        .map(|(id, outcome)| MatchedIdentification {
            identification: id.clone(),
            matched_count: outcome.matched_rows.len(),
            representative_intensity: outcome.representative_intensity,
            total_ion_current: outcome.total_ion_current,
            injection_time_ms: outcome.injection_time_ms,
            ion_count: outcome.representative_intensity * outcome.injection_time_ms / 1000.0,
        })
        .collect();

    let features_out: Vec<MatchedFeature> = features
        .iter()
        .zip(feature_counts)
        .map(|(f, matched_count)| MatchedFeature {
            feature: f.clone(),
            matched_count,
        })
        .collect();

    debug!(
        n_features = features_out.len(),
        n_identifications = identifications_out.len(),
        n_linked = identifications_out
            .iter()
            .filter(|i| i.matched_count > 0)
            .count(),
        "cross match complete"
    );

    Ok(CrossMatchOutput {
        features: features_out,
        identifications: identifications_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::IonlinkError;
    use crate::models::{
        PrecursorLink,
        ScanRecord,
    };

    fn ms1(scan_num: u32, rt: f64, tic: f64, it: f64) -> ScanRecord {
        ScanRecord {
            scan_num,
            ms_level: 1,
            retention_time: rt,
            total_ion_current: tic,
            injection_time_ms: it,
            precursor: None,
        }
    }

    fn ms2(scan_num: u32, rt: f64, ms1_scan: u32, ms1_mz: f64) -> ScanRecord {
        ScanRecord {
            scan_num,
            ms_level: 2,
            retention_time: rt,
            total_ion_current: 1e5,
            injection_time_ms: 20.0,
            precursor: Some(PrecursorLink {
                ms1_scan,
                ms1_mz,
                ms1_intensity: 5e6,
            }),
        }
    }

    fn psm(scan_num: u32, charge: u8, exp_mass: f64) -> Identification {
        Identification {
            scan_num,
            peptide_sequence: "PEPTIDEK".to_string(),
            charge,
            exp_mass,
            calc_mass: exp_mass,
            retention_time: 15.0,
            q_value: 0.001,
            compensation_voltage: None,
            protein_ids: vec!["sp|P12345".to_string()],
        }
    }

    // Feature elution interval expressed on the scan-number axis.
    fn feature(mass: f64, charge: u8, scan_start: f64, scan_end: f64, best_int: f64) -> Feature {
        Feature::new(mass, charge, scan_start, scan_end, 15.0, best_int, 1e8, None)
    }

    fn scans_linking(ms1_scan: u32, ms1_mz: f64) -> ScanTable {
        ScanTable::new(vec![
            ms1(ms1_scan, 14.9, 2e7, 50.0),
            ms2(100, 15.0, ms1_scan, ms1_mz),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_match_links_feature() {
        let mz = crate::models::feature::mz_from_mass(1000.0, 2);
        let features = vec![feature(1000.0, 2, 10.0, 20.0, 7.5e6)];
        let ids = vec![psm(100, 2, 1000.3)];
        let scans = scans_linking(15, mz);

        let out = cross_match(&features, &ids, &scans, &CrossMatchParams::default()).unwrap();
        assert_eq!(out.identifications[0].matched_count, 1);
        assert_eq!(out.identifications[0].representative_intensity, 7.5e6);
        assert_eq!(out.features[0].matched_count, 1);
        // ion count = rep intensity * IT / 1000
        assert!((out.identifications[0].ion_count - 7.5e6 * 50.0 / 1000.0).abs() < 1e-6);
        assert_eq!(out.identifications[0].total_ion_current, 2e7);
    }

    #[test]
    fn test_ambiguous_match_flags_every_candidate() {
        let mz = crate::models::feature::mz_from_mass(1000.0, 2);
        let features = vec![
            feature(1000.0, 2, 10.0, 20.0, 1e6),
            feature(1000.5, 2, 12.0, 18.0, 3e6),
            feature(1000.0, 3, 10.0, 20.0, 9e9), // wrong charge state mz, excluded
        ];
        let ids = vec![psm(100, 2, 1000.2)];
        let scans = scans_linking(15, mz);

        let out = cross_match(&features, &ids, &scans, &CrossMatchParams::default()).unwrap();
        assert_eq!(out.identifications[0].matched_count, 2);
        // Representative intensity is the max across candidates.
        assert_eq!(out.identifications[0].representative_intensity, 3e6);
        // Both candidates get the full multiplicity.
        assert_eq!(out.features[0].matched_count, 2);
        assert_eq!(out.features[1].matched_count, 2);
        assert_eq!(out.features[2].matched_count, 0);
    }

    #[test]
    fn test_scan_interval_containment() {
        let mz = crate::models::feature::mz_from_mass(1000.0, 2);
        // Feature elutes over scans 20..30; precursor MS1 scan is 15.
        let features = vec![feature(1000.0, 2, 20.0, 30.0, 1e6)];
        let ids = vec![psm(100, 2, 1000.0)];
        let scans = scans_linking(15, mz);

        let out = cross_match(&features, &ids, &scans, &CrossMatchParams::default()).unwrap();
        assert_eq!(out.identifications[0].matched_count, 0);
        assert_eq!(out.identifications[0].representative_intensity, 0.0);
    }

    #[test]
    fn test_empty_feature_table_is_not_an_error() {
        let ids = vec![psm(100, 2, 1000.0)];
        let scans = scans_linking(15, 500.0);

        let out = cross_match(&[], &ids, &scans, &CrossMatchParams::default()).unwrap();
        assert_eq!(out.identifications[0].matched_count, 0);
        assert_eq!(out.identifications[0].ion_count, 0.0);
        assert!(out.features.is_empty());
    }

    #[test]
    fn test_missing_scan_aborts() {
        let ids = vec![psm(999, 2, 1000.0)];
        let scans = scans_linking(15, 500.0);

        let err = cross_match(&[], &ids, &scans, &CrossMatchParams::default()).unwrap_err();
        assert!(matches!(
            err,
            IonlinkError::Linkage(LinkageError::ScanNotFound { scan_num: 999 })
        ));
    }

    #[test]
    fn test_scan_without_precursor_aborts() {
        let scans = ScanTable::new(vec![ms1(100, 15.0, 2e7, 50.0)]).unwrap();
        let ids = vec![psm(100, 2, 1000.0)];

        let err = cross_match(&[], &ids, &scans, &CrossMatchParams::default()).unwrap_err();
        assert!(matches!(
            err,
            IonlinkError::Linkage(LinkageError::MissingPrecursor { scan_num: 100 })
        ));
    }

    #[test]
    fn test_compensation_voltage_gate() {
        let mz = crate::models::feature::mz_from_mass(1000.0, 2);
        let mut f = feature(1000.0, 2, 10.0, 20.0, 1e6);
        f.compensation_voltage = Some(-40);
        let mut id = psm(100, 2, 1000.0);
        id.compensation_voltage = Some(-60);
        let scans = scans_linking(15, mz);

        let params = CrossMatchParams {
            match_compensation_voltage: true,
            ..Default::default()
        };
        let out = cross_match(&[f.clone()], &[id.clone()], &scans, &params).unwrap();
        assert_eq!(out.identifications[0].matched_count, 0);

        id.compensation_voltage = Some(-40);
        let out = cross_match(&[f], &[id], &scans, &params).unwrap();
        assert_eq!(out.identifications[0].matched_count, 1);
    }
}
