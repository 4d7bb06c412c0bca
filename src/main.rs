//! # pta-viewer
//!
//! Command-line viewer for pressure-transient measurements.
//!
//! ## Usage
//!
//! ```bash
//! # Draw 9 random files from ./data, plot them and look them up in markup_train.csv
//! pta-viewer run
//!
//! # Same, with explicit paths and a fixed seed, loading one file at a time
//! pta-viewer run -d wells/ -a labels.csv --mode sequential --seed 42
//!
//! # Plot a single file
//! pta-viewer show wells/w_017.txt -a labels.csv -o figures/
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
