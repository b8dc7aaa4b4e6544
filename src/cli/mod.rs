use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use p3data::config::Config;
use p3data::shot::SignalGroup;

mod batch;
mod check;
mod demo;
mod info;
mod load;
mod process;

/// p3data - Pegasus III diagnostic data loading and analysis
#[derive(Parser)]
#[command(name = "p3data")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Shot archive root (overrides the config file)
    #[arg(long, value_name = "DIR", global = true)]
    archive: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Export file format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Apache Parquet with footer metadata
    #[default]
    Parquet,
    /// Comma-separated values
    Csv,
}

impl FormatArg {
    fn extension(self) -> &'static str {
        match self {
            FormatArg::Parquet => p3data::dataset::keys::PARQUET_EXTENSION,
            FormatArg::Csv => p3data::dataset::keys::CSV_EXTENSION,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Read a shot and print its channel summary
    Load {
        /// Shot number
        #[arg(value_name = "SHOT")]
        shot: u32,

        /// Signal groups to load (fluxloops, bdots, currents); all when omitted
        #[arg(short, long, value_delimiter = ',')]
        groups: Vec<SignalGroup>,
    },

    /// Align and process a shot, optionally exporting the result
    Process {
        /// Shot number
        #[arg(value_name = "SHOT")]
        shot: u32,

        /// Output file (.parquet or .csv); one file per group is written
        /// when several groups are processed
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Signal groups to process; all when omitted
        #[arg(short, long, value_delimiter = ',')]
        groups: Vec<SignalGroup>,

        /// Resample onto a uniform grid at this rate (Hz)
        #[arg(long)]
        rate: Option<f64>,

        /// Fail instead of warning when interior samples are missing
        #[arg(long)]
        strict_gaps: bool,
    },

    /// Process many shots, writing one file per shot and group
    Batch {
        /// Shot numbers
        #[arg(value_name = "SHOTS", required = true)]
        shots: Vec<u32>,

        /// Output directory
        #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Export format
        #[arg(short, long, default_value = "parquet", value_enum)]
        format: FormatArg,

        /// Signal groups to process; all when omitted
        #[arg(short, long, value_delimiter = ',')]
        groups: Vec<SignalGroup>,
    },

    /// Display information about an .ibw wave or an exported .parquet file
    Info {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Validate a shot (number or folder) or an exported .parquet file
    Check {
        /// Shot number, shot folder or exported file
        #[arg(value_name = "TARGET")]
        target: String,
    },

    /// Write a synthetic shot into an archive for testing
    Demo {
        /// Archive root to write into
        #[arg(value_name = "DIR", default_value = "demo_archive")]
        output: PathBuf,

        /// Shot number of the synthetic shot
        #[arg(short, long, default_value_t = 1)]
        shot: u32,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Config file settings with command-line overrides applied
fn load_config(path: Option<&Path>, archive: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(root) = archive {
        config.archive.root = Some(root);
    }
    Ok(config)
}

/// Requested groups, or every group when none were given
fn groups_or_all(groups: Vec<SignalGroup>) -> Vec<SignalGroup> {
    if groups.is_empty() {
        SignalGroup::ALL.to_vec()
    } else {
        groups
    }
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    let archive = cli.archive;
    match cli.command {
        Commands::Load { shot, groups } => {
            let config = load_config(config_path.as_deref(), archive)?;
            load::run(&config, shot, groups_or_all(groups))
        }
        Commands::Process {
            shot,
            output,
            groups,
            rate,
            strict_gaps,
        } => {
            let config = load_config(config_path.as_deref(), archive)?;
            process::run(
                config,
                shot,
                output,
                groups_or_all(groups),
                rate,
                strict_gaps,
            )
        }
        Commands::Batch {
            shots,
            out_dir,
            format,
            groups,
        } => {
            let config = load_config(config_path.as_deref(), archive)?;
            batch::run(config, &shots, out_dir, format, groups_or_all(groups))
        }
        Commands::Info { file } => info::run(file),
        Commands::Check { target } => {
            let config = load_config(config_path.as_deref(), archive)?;
            check::run(&config, &target)
        }
        Commands::Demo { output, shot } => demo::run(output, shot),
    }
}
