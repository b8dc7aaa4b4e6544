//! # p3data
//!
//! Command-line front end for loading, aligning and processing Pegasus III
//! diagnostic shots.
//!
//! ## Usage
//!
//! ```bash
//! # Summarise the channels of a shot
//! p3data --archive /data/pegasus load 109756
//!
//! # Process a shot with the standard chains and export it
//! p3data --archive /data/pegasus process 109756 -o shot.parquet
//!
//! # Process many shots in parallel
//! p3data --config p3data.toml batch 109750 109751 109752 --out-dir results
//!
//! # Generate a synthetic shot to try the tools on
//! p3data demo demo_archive --shot 1
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
