use clap::{
    Parser,
    Subcommand,
    ValueEnum,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file (tolerances and filters)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link Kronik features to Percolator identifications through scan metadata
    CrossMatch {
        /// Kronik tab-delimited feature file
        #[arg(long)]
        features: PathBuf,

        /// Percolator output XML (pout)
        #[arg(long)]
        psms: PathBuf,

        /// Tab-delimited scan metadata table
        #[arg(long)]
        scans: PathBuf,

        /// Directory for the two augmented output tables
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Require exact compensation-voltage equality (overrides the config file)
        #[arg(long)]
        match_cv: bool,
    },

    /// Count redundant detections within a Kronik feature table
    Redundancy {
        /// Kronik tab-delimited feature file
        #[arg(long)]
        features: PathBuf,

        /// Retention-time half-width in minutes (overrides the config file)
        #[arg(long)]
        rt_window: Option<f64>,

        /// Output table path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Bin Hardklor signal intensity on the (m/z, RT) plane
    Bin {
        /// Hardklor output file
        #[arg(long)]
        peaks: PathBuf,

        #[arg(long, value_enum, default_value_t = BinMode::Mz)]
        mode: BinMode,

        #[arg(long, default_value_t = 399.0)]
        mz_start: f64,
        #[arg(long, default_value_t = 1005.0)]
        mz_end: f64,
        #[arg(long, default_value_t = 4.0)]
        mz_bin_size: f64,
        #[arg(long, default_value_t = 1.0005)]
        mz_bin_mult: f64,

        #[arg(long, default_value_t = 0.0)]
        rt_start: f64,
        #[arg(long, default_value_t = 90.0)]
        rt_end: f64,
        #[arg(long, default_value_t = 1.0)]
        rt_bin_size: f64,
        #[arg(long, default_value_t = 1.0)]
        rt_bin_mult: f64,

        /// Output table path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Summarize Hardklor signal into per-scan totals
    Tic {
        /// Hardklor output file
        #[arg(long)]
        peaks: PathBuf,

        /// Scan metadata table; attaches injection times and ion counts
        #[arg(long)]
        scans: Option<PathBuf>,

        /// Percolator output XML; flags identified scans
        #[arg(long)]
        psms: Option<PathBuf>,

        /// Output table path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinMode {
    Rt,
    Mz,
    Both,
}
