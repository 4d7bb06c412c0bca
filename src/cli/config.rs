//! TOML configuration file support.
//!
//! Instead of passing paths on every run, users can keep them in a config file:
//!
//! ```toml
//! # pta-viewer.toml
//! [viewer]
//! data_dir = "data"
//! annotations = "markup_train.csv"
//! output_dir = "pta-report"
//! delimiter = ","
//! mode = "concurrent"
//! workers = 4
//! seed = 42
//! ```
//!
//! Command-line flags override file values; file values override the defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use pta_viewer::pipeline::{Mode, PipelineConfig};

/// Default measurement directory
pub const DEFAULT_DATA_DIR: &str = "data";
/// Default annotation file
pub const DEFAULT_ANNOTATIONS: &str = "markup_train.csv";
/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "pta-report";

/// Root configuration structure for pta-viewer.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Viewer settings.
    #[serde(default)]
    pub viewer: ViewerConfig,
}

/// Settings for the run command.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ViewerConfig {
    /// Directory holding the measurement files.
    pub data_dir: Option<PathBuf>,

    /// Annotation file with a `file_name` column.
    pub annotations: Option<PathBuf>,

    /// Where figures, summary and HTML page are written.
    pub output_dir: Option<PathBuf>,

    /// Annotation field delimiter (single ASCII character).
    pub delimiter: Option<char>,

    /// Execution mode ("sequential" or "concurrent").
    pub mode: Option<Mode>,

    /// Worker pool size for concurrent mode.
    pub workers: Option<usize>,

    /// Seed for a reproducible batch.
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

impl ViewerConfig {
    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merged_with(self, other: ViewerConfig) -> ViewerConfig {
        ViewerConfig {
            data_dir: other.data_dir.or(self.data_dir),
            annotations: other.annotations.or(self.annotations),
            output_dir: other.output_dir.or(self.output_dir),
            delimiter: other.delimiter.or(self.delimiter),
            mode: other.mode.or(self.mode),
            workers: other.workers.or(self.workers),
            seed: other.seed.or(self.seed),
        }
    }

    /// Fill in defaults and build the pipeline inputs.
    ///
    /// Returns the pipeline config and the output directory.
    pub fn resolve(self) -> Result<(PipelineConfig, PathBuf)> {
        let delimiter = match self.delimiter {
            None => b',',
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => bail!("Delimiter must be a single ASCII character, got '{}'", c),
        };

        let config = PipelineConfig {
            data_dir: self.data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            annotations: self
                .annotations
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ANNOTATIONS)),
            delimiter,
            mode: self.mode.unwrap_or_default(),
            workers: self.workers,
            seed: self.seed,
        };
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok((config, output_dir))
    }
}
