mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{
    Cli,
    Command,
};
use config::Config;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    // Parse command line arguments
    let args = Cli::parse();

    // Load and parse configuration
    let config = Config::load(args.config.as_deref())?;
    info!("Parsed configuration: {:#?}", config);

    match args.command {
        Command::CrossMatch {
            features,
            psms,
            scans,
            output_dir,
            match_cv,
        } => processing::run_cross_match(&features, &psms, &scans, &output_dir, &config, match_cv),
        Command::Redundancy {
            features,
            rt_window,
            output,
        } => processing::run_redundancy(&features, rt_window, &output, &config),
        Command::Bin {
            peaks,
            mode,
            mz_start,
            mz_end,
            mz_bin_size,
            mz_bin_mult,
            rt_start,
            rt_end,
            rt_bin_size,
            rt_bin_mult,
            output,
        } => processing::run_bin(
            &peaks,
            mode,
            (mz_start, mz_end, mz_bin_size, mz_bin_mult),
            (rt_start, rt_end, rt_bin_size, rt_bin_mult),
            &output,
        ),
        Command::Tic {
            peaks,
            scans,
            psms,
            output,
        } => processing::run_tic(&peaks, scans.as_deref(), psms.as_deref(), &output),
    }
}
