//! # Sample-and-Render Pipeline
//!
//! One run draws a batch of measurement files, loads each one, builds its
//! log-log [`Figure`] and looks up its annotation rows.
//!
//! ## Execution modes
//!
//! - [`Mode::Sequential`]: files are loaded and assembled one at a time.
//!   A bad annotation file is reported and the batch continues without
//!   annotation lookups.
//! - [`Mode::Concurrent`]: the annotation table is loaded first; if that fails
//!   the batch is aborted. Otherwise every measurement load is dispatched to a
//!   worker pool and the coordinator waits for all of them (join-all). Results
//!   are collected in batch order, so one failed load never affects another.
//!
//! Both modes assemble results sequentially, in batch order, and produce the
//! same per-file outcomes for the same batch.
//!
//! ## Error policy
//!
//! Batch-level problems (missing paths, too few files, unusable annotations in
//! concurrent mode) are returned as [`PipelineError`]. Per-file problems are
//! recorded in the [`BatchReport`] and never stop the batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};

use crate::annotations::{AnnotationError, AnnotationTable};
use crate::measurement::{self, MeasurementError, PressureSeries};
use crate::plot::Figure;
use crate::selection::{self, SelectionBatch, SelectionError};
use crate::LANE_COUNT;

mod concurrent;
mod report;
mod sequential;

pub use report::{AnnotationMatch, BatchReport, FileOutcome, FileReport, FileStatus};

/// Title shown above every report
pub const REPORT_TITLE: &str = "Pressure data analysis";

/// Batch-level errors; any of these means no file of the batch is processed
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The measurement directory does not exist
    #[error("Data directory does not exist: {0}")]
    DirectoryNotFound(String),

    /// The annotation file does not exist
    #[error("Annotation file not found: {0}")]
    AnnotationsNotFound(String),

    /// The batch could not be drawn (listing failed or too few files)
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The annotation table could not be loaded (concurrent mode)
    #[error("Batch aborted, annotation table failed to load: {0}")]
    Annotation(#[from] AnnotationError),

    /// The worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// How measurement files are loaded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One file at a time on the calling thread
    Sequential,
    /// All files at once on a worker pool
    #[default]
    Concurrent,
}

impl Mode {
    /// Returns all available mode names.
    pub fn variants() -> &'static [&'static str] {
        &["sequential", "concurrent"]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Sequential => write!(f, "sequential"),
            Mode::Concurrent => write!(f, "concurrent"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Ok(Mode::Sequential),
            "concurrent" | "parallel" => Ok(Mode::Concurrent),
            _ => Err(format!(
                "Unknown mode '{}'. Valid options: {}",
                s,
                Mode::variants().join(", ")
            )),
        }
    }
}

/// Inputs of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding one measurement file per well test
    pub data_dir: PathBuf,
    /// Delimited annotation file with a `file_name` column
    pub annotations: PathBuf,
    /// Annotation field delimiter
    pub delimiter: u8,
    /// Execution mode
    pub mode: Mode,
    /// Worker pool size for concurrent mode (defaults to available parallelism)
    pub workers: Option<usize>,
    /// Seed for a reproducible batch
    pub seed: Option<u64>,
}

impl PipelineConfig {
    /// Create a config with default delimiter, mode and worker count
    pub fn new(data_dir: impl Into<PathBuf>, annotations: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            annotations: annotations.into(),
            delimiter: b',',
            mode: Mode::default(),
            workers: None,
            seed: None,
        }
    }

    /// Set the execution mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the worker pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    fn load_annotations(&self) -> Result<AnnotationTable, AnnotationError> {
        AnnotationTable::from_file(&self.annotations, self.delimiter)
    }
}

/// Check that the data directory and annotation file both exist
pub fn validate_inputs(config: &PipelineConfig) -> Result<(), PipelineError> {
    if !config.data_dir.is_dir() {
        return Err(PipelineError::DirectoryNotFound(
            config.data_dir.display().to_string(),
        ));
    }
    if !config.annotations.exists() {
        return Err(PipelineError::AnnotationsNotFound(
            config.annotations.display().to_string(),
        ));
    }
    Ok(())
}

/// Validate inputs, draw a batch and process it.
///
/// This is the "load and plot" trigger.
pub fn run(config: &PipelineConfig) -> Result<BatchReport, PipelineError> {
    validate_inputs(config)?;
    let batch = selection::select_batch(&config.data_dir, config.seed)?;
    info!(
        "Selected {} files from {}: {}",
        batch.len(),
        config.data_dir.display(),
        batch.names().join(", ")
    );
    process(config, &batch)
}

/// Process an already-drawn batch with the configured mode
pub fn run_batch(
    config: &PipelineConfig,
    batch: &SelectionBatch,
) -> Result<BatchReport, PipelineError> {
    validate_inputs(config)?;
    process(config, batch)
}

fn process(config: &PipelineConfig, batch: &SelectionBatch) -> Result<BatchReport, PipelineError> {
    let report = match config.mode {
        Mode::Sequential => sequential::run(config, batch),
        Mode::Concurrent => concurrent::run(config, batch)?,
    };
    info!(
        "Batch done: {} rendered, {} failed, {} without annotations",
        report.rendered_count(),
        report.failure_count(),
        report.unmatched_count()
    );
    Ok(report)
}

/// Load and assemble a single measurement file outside of a batch
pub fn inspect_file(path: &Path, annotations: Option<&AnnotationTable>) -> FileReport {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    assemble(0, &name, measurement::load_series(path), annotations)
}

/// Turn one load result into a [`FileReport`].
///
/// A file whose figure cannot be drawn counts as failed. Annotation lookup
/// happens only for files that rendered.
pub(crate) fn assemble(
    index: usize,
    file_name: &str,
    loaded: Result<PressureSeries, MeasurementError>,
    annotations: Option<&AnnotationTable>,
) -> FileReport {
    let lane = index % LANE_COUNT;
    let figure = match loaded {
        Ok(series) => {
            let figure = Figure::from_series(file_name, &series);
            figure.check().map(|()| figure).map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    };
    let figure = match figure {
        Ok(figure) => figure,
        Err(msg) => {
            warn!("Error processing file {}: {}", file_name, msg);
            return FileReport {
                index,
                file_name: file_name.to_string(),
                lane,
                outcome: FileOutcome::Failed(msg),
                annotations: AnnotationMatch::Unavailable,
            };
        }
    };

    let annotations = match annotations {
        None => AnnotationMatch::Unavailable,
        Some(table) => {
            let rows: Vec<_> = table.lookup(file_name).into_iter().cloned().collect();
            if rows.is_empty() {
                warn!("File {} not found in annotations", file_name);
                AnnotationMatch::NotFound
            } else {
                AnnotationMatch::Matched(rows)
            }
        }
    };

    FileReport {
        index,
        file_name: file_name.to_string(),
        lane,
        outcome: FileOutcome::Rendered(figure),
        annotations,
    }
}
