use indicatif::ProgressBar;
use std::path::Path;
use tabled::{
    Table,
    Tabled,
};
use tracing::info;

use ionlink::data_sources::{
    hardklor,
    kronik,
    percolator,
    scan_table,
};
use ionlink::matching::{
    CrossMatchParams,
    RedundancyParams,
};
use ionlink::models::feature::validate_features;
use ionlink::models::identification::validate_identifications;
use ionlink::{
    Peak,
    cross_match,
    redundancy_counts,
};

use crate::cli::BinMode;
use crate::config::Config;
use crate::errors::CliError;

#[derive(Tabled)]
struct MatchSummary {
    table: &'static str,
    rows: usize,
    matched: usize,
    ambiguous: usize,
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, CliError> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(CliError::from)
}

pub fn run_cross_match(
    features_path: &Path,
    psms_path: &Path,
    scans_path: &Path,
    output_dir: &Path,
    config: &Config,
    match_cv: bool,
) -> Result<(), CliError> {
    let features = kronik::read_kro(features_path, &config.kronik)?;
    let scans = scan_table::read_scan_table(scans_path)?;
    let ids = percolator::with_retention_times(percolator::read_pout(psms_path)?, &scans)?;
    validate_features(&features).map_err(ionlink::IonlinkError::from)?;
    validate_identifications(&ids).map_err(ionlink::IonlinkError::from)?;
    info!(
        n_features = features.len(),
        n_psms = ids.len(),
        n_scans = scans.len(),
        "inputs loaded"
    );

    let params = CrossMatchParams {
        match_compensation_voltage: match_cv || config.cross_match.0.match_compensation_voltage,
        ..config.cross_match.0
    };
    let out = cross_match(&features, &ids, &scans, &params)?;

    std::fs::create_dir_all(output_dir)?;

    let mut feature_writer = tsv_writer(&output_dir.join("features_matched.tsv"))?;
    feature_writer.write_record([
        "mass",
        "charge",
        "mz",
        "rt_start",
        "rt_end",
        "best_rt",
        "best_intensity",
        "summed_intensity",
        "matched_count",
    ])?;
    for row in &out.features {
        let f = &row.feature;
        feature_writer.write_record([
            f.mass.to_string(),
            f.charge.to_string(),
            f.mz.to_string(),
            f.rt_start.to_string(),
            f.rt_end.to_string(),
            f.best_rt.to_string(),
            f.best_intensity.to_string(),
            f.summed_intensity.to_string(),
            row.matched_count.to_string(),
        ])?;
    }
    feature_writer.flush()?;

    let mut id_writer = tsv_writer(&output_dir.join("psms_matched.tsv"))?;
    id_writer.write_record([
        "scan_num",
        "peptide",
        "charge",
        "exp_mass",
        "calc_mass",
        "rt",
        "q_value",
        "proteins",
        "matched_count",
        "representative_intensity",
        "TIC",
        "IT",
        "ion_count",
    ])?;
    let progress = ProgressBar::new(out.identifications.len() as u64);
    for row in &out.identifications {
        let id = &row.identification;
        id_writer.write_record([
            id.scan_num.to_string(),
            id.peptide_sequence.clone(),
            id.charge.to_string(),
            id.exp_mass.to_string(),
            id.calc_mass.to_string(),
            id.retention_time.to_string(),
            id.q_value.to_string(),
            id.protein_ids.join(","),
            row.matched_count.to_string(),
            row.representative_intensity.to_string(),
            row.total_ion_current.to_string(),
            row.injection_time_ms.to_string(),
            row.ion_count.to_string(),
        ])?;
        progress.inc(1);
    }
    progress.finish_and_clear();
    id_writer.flush()?;

    let summary = vec![
        MatchSummary {
            table: "features",
            rows: out.features.len(),
            matched: out.features.iter().filter(|f| f.matched_count > 0).count(),
            ambiguous: out.features.iter().filter(|f| f.matched_count > 1).count(),
        },
        MatchSummary {
            table: "psms",
            rows: out.identifications.len(),
            matched: out
                .identifications
                .iter()
                .filter(|i| i.matched_count > 0)
                .count(),
            ambiguous: out
                .identifications
                .iter()
                .filter(|i| i.matched_count > 1)
                .count(),
        },
    ];
    println!("{}", Table::new(summary));
    Ok(())
}

pub fn run_redundancy(
    features_path: &Path,
    rt_window: Option<f64>,
    output: &Path,
    config: &Config,
) -> Result<(), CliError> {
    let features = kronik::read_kro(features_path, &config.kronik)?;
    validate_features(&features).map_err(ionlink::IonlinkError::from)?;

    let params = RedundancyParams {
        rt_window: match rt_window {
            Some(minutes) => ionlink::RtWindow::Minutes(minutes),
            None => config.redundancy.0.rt_window,
        },
        ..config.redundancy.0
    };
    let counts = redundancy_counts(&features, &params);
    info!(
        n_features = features.len(),
        n_redundant = counts.iter().filter(|c| **c > 0).count(),
        "redundancy counted"
    );

    let mut writer = tsv_writer(output)?;
    writer.write_record(["mass", "charge", "best_rt", "redundant_count"])?;
    for (f, count) in features.iter().zip(&counts) {
        writer.write_record([
            f.mass.to_string(),
            f.charge.to_string(),
            f.best_rt.to_string(),
            count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_bin(
    peaks_path: &Path,
    mode: BinMode,
    mz_edges_args: (f64, f64, f64, f64),
    rt_edges_args: (f64, f64, f64, f64),
    output: &Path,
) -> Result<(), CliError> {
    let peaks: Vec<Peak> = hardklor::read_hk(peaks_path)?
        .iter()
        .map(|p| p.as_peak())
        .collect();
    let (mz_start, mz_end, mz_size, mz_mult) = mz_edges_args;
    let (rt_start, rt_end, rt_size, rt_mult) = rt_edges_args;

    let mut writer = tsv_writer(output)?;
    match mode {
        BinMode::Rt => {
            let rt_edges = ionlink::generate_edges(rt_start, rt_end, rt_size, rt_mult);
            writer.write_record(["mz", "rt_bin_lower", "rt_bin_upper", "intensity"])?;
            for row in ionlink::bin_by_rt(&peaks, &rt_edges) {
                writer.write_record([
                    row.mz.to_string(),
                    row.rt_bin.lower.to_string(),
                    row.rt_bin.upper.to_string(),
                    row.intensity.to_string(),
                ])?;
            }
        }
        BinMode::Mz => {
            let mz_edges = ionlink::generate_edges(mz_start, mz_end, mz_size, mz_mult);
            writer.write_record(["rt", "mz_bin_lower", "mz_bin_upper", "intensity"])?;
            for row in ionlink::bin_by_mz(&peaks, &mz_edges) {
                writer.write_record([
                    row.rt.to_string(),
                    row.mz_bin.lower.to_string(),
                    row.mz_bin.upper.to_string(),
                    row.intensity.to_string(),
                ])?;
            }
        }
        BinMode::Both => {
            let rt_edges = ionlink::generate_edges(rt_start, rt_end, rt_size, rt_mult);
            let mz_edges = ionlink::generate_edges(mz_start, mz_end, mz_size, mz_mult);
            writer.write_record([
                "rt_bin_lower",
                "rt_bin_upper",
                "mz_bin_lower",
                "mz_bin_upper",
                "intensity",
            ])?;
            for row in ionlink::bin_2d(&peaks, &rt_edges, &mz_edges) {
                writer.write_record([
                    row.rt_bin.lower.to_string(),
                    row.rt_bin.upper.to_string(),
                    row.mz_bin.lower.to_string(),
                    row.mz_bin.upper.to_string(),
                    row.intensity.to_string(),
                ])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn run_tic(
    peaks_path: &Path,
    scans_path: Option<&Path>,
    psms_path: Option<&Path>,
    output: &Path,
) -> Result<(), CliError> {
    let peaks = hardklor::read_hk(peaks_path)?;
    let totals = ionlink::summarize_scans(&peaks).map_err(ionlink::IonlinkError::from)?;

    let identified = match psms_path {
        Some(path) => {
            let ids = percolator::read_pout(path)?;
            Some(ionlink::identified_scans(&totals, &ids))
        }
        None => None,
    };

    let mut writer = tsv_writer(output)?;
    match scans_path {
        Some(path) => {
            let scans = scan_table::read_scan_table(path)?;
            let joined = ionlink::attach_injection_times(&totals, &scans);
            match &identified {
                Some(flags) => {
                    // The join drops totals without metadata, so flags
                    // are re-keyed by scan number before writing.
                    let flag_by_scan: std::collections::HashMap<u32, bool> = totals
                        .iter()
                        .zip(flags)
                        .map(|(t, flagged)| (t.scan_num, *flagged))
                        .collect();
                    writer
                        .write_record(["scan_num", "rt", "TIC", "IT", "ions", "identified"])?;
                    for row in &joined {
                        let flagged = flag_by_scan.get(&row.scan_num).copied().unwrap_or(false);
                        writer.write_record([
                            row.scan_num.to_string(),
                            row.retention_time.to_string(),
                            row.tic.to_string(),
                            row.injection_time_ms.to_string(),
                            row.ions.to_string(),
                            flagged.to_string(),
                        ])?;
                    }
                }
                None => {
                    writer.write_record(["scan_num", "rt", "TIC", "IT", "ions"])?;
                    for row in &joined {
                        writer.write_record([
                            row.scan_num.to_string(),
                            row.retention_time.to_string(),
                            row.tic.to_string(),
                            row.injection_time_ms.to_string(),
                            row.ions.to_string(),
                        ])?;
                    }
                }
            }
        }
        None => {
            writer.write_record(["scan_num", "rt", "TIC", "identified"])?;
            for (idx, row) in totals.iter().enumerate() {
                let flagged = identified
                    .as_ref()
                    .map(|flags| flags[idx])
                    .unwrap_or(false);
                writer.write_record([
                    row.scan_num.to_string(),
                    row.retention_time.to_string(),
                    row.tic.to_string(),
                    flagged.to_string(),
                ])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn fixture(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const PEAKS: &str = "\
S\t100\t12.5\n\
P\t1592.8\t2\t300\t797.4\n\
S\t101\t12.6\n\
P\t2446.2\t3\t200\t816.4\n";

    const SCANS: &str = "\
scan_num\tms_level\trt\tTIC\tIT\n\
100\t1\t12.5\t2.5e7\t50.0\n\
101\t1\t12.6\t1.0e7\t40.0\n";

    const POUT: &str = r#"<psms><psm psm_id="run_0_101_3_1">
        <q_value>0.001</q_value>
        <exp_mass>2446.5</exp_mass>
        <calc_mass>2446.4</calc_mass>
        <peptide_seq seq="PEPTIDEK"/>
    </psm></psms>"#;

    #[test]
    fn test_tic_joined_output_carries_identified_flags() {
        let peaks = fixture("ionlink_tic_flags_peaks.hk", PEAKS);
        let scans = fixture("ionlink_tic_flags_scans.tsv", SCANS);
        let psms = fixture("ionlink_tic_flags_psms.xml", POUT);
        let out = std::env::temp_dir().join("ionlink_tic_flags_out.tsv");

        run_tic(&peaks, Some(scans.as_path()), Some(psms.as_path()), &out).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("ions"));
        assert!(header.ends_with("identified"));
        let scan_100 = lines.clone().find(|l| l.starts_with("100\t")).unwrap();
        let scan_101 = lines.find(|l| l.starts_with("101\t")).unwrap();
        assert!(scan_100.ends_with("\tfalse"));
        assert!(scan_101.ends_with("\ttrue"));
        // ions = TIC * IT / 1000 on the summed signal
        assert!(scan_101.contains("\t8\t"));
    }

    #[test]
    fn test_tic_without_psms_keeps_plain_join() {
        let peaks = fixture("ionlink_tic_plain_peaks.hk", PEAKS);
        let scans = fixture("ionlink_tic_plain_scans.tsv", SCANS);
        let out = std::env::temp_dir().join("ionlink_tic_plain_out.tsv");

        run_tic(&peaks, Some(scans.as_path()), None, &out).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let header = written.lines().next().unwrap();
        assert!(header.ends_with("ions"));
        assert!(!header.contains("identified"));
    }
}
