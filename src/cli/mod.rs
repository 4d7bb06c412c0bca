use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pta_viewer::pipeline::Mode;

mod config;
mod run;
mod show;

use config::ViewerConfig;

/// pta-viewer - Pressure-transient batch viewer
#[derive(Parser)]
#[command(name = "pta-viewer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Execution mode for loading measurement files.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Load files one at a time
    Sequential,
    /// Load all files at once on a worker pool
    Concurrent,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Sequential => Mode::Sequential,
            ModeArg::Concurrent => Mode::Concurrent,
        }
    }
}

/// Arguments of the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory holding the measurement files [default: data]
    #[arg(short = 'd', long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Annotation file with a file_name column [default: markup_train.csv]
    #[arg(short = 'a', long, value_name = "FILE")]
    annotations: Option<PathBuf>,

    /// Output directory for figures and report [default: pta-report]
    #[arg(short = 'o', long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Execution mode (sequential, concurrent) [default: concurrent]
    #[arg(short = 'm', long, value_enum)]
    mode: Option<ModeArg>,

    /// Worker pool size for concurrent mode [default: available parallelism]
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Seed for a reproducible batch
    #[arg(long)]
    seed: Option<u64>,

    /// Annotation field delimiter [default: ,]
    #[arg(long)]
    delimiter: Option<char>,

    /// Skip writing index.html
    #[arg(long)]
    no_html: bool,
}

impl RunArgs {
    fn overrides(&self) -> ViewerConfig {
        ViewerConfig {
            data_dir: self.data_dir.clone(),
            annotations: self.annotations.clone(),
            output_dir: self.output.clone(),
            delimiter: self.delimiter,
            mode: self.mode.map(Mode::from),
            workers: self.workers,
            seed: self.seed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Draw 9 random measurement files, plot them and look up their annotations
    Run(RunArgs),

    /// Plot a single measurement file and look up its annotations
    Show {
        /// Measurement file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Annotation file with a file_name column
        #[arg(short = 'a', long, value_name = "FILE")]
        annotations: Option<PathBuf>,

        /// Annotation field delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Write the figure as SVG into this directory
        #[arg(short = 'o', long, value_name = "DIR")]
        output: Option<PathBuf>,
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

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::run(args),
        Commands::Show {
            file,
            annotations,
            delimiter,
            output,
        } => show::run(file, annotations, delimiter, output),
    }
}
