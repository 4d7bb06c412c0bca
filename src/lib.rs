//! # pta-viewer - Pressure-Transient Batch Viewer
//!
//! `pta_viewer` draws a random batch of pressure-transient measurement files,
//! builds a log-log diagnostic plot (pressure and derivative against time) for
//! each one, and cross-references every file against an annotation table by
//! file name.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pta_viewer::pipeline::{self, Mode, PipelineConfig};
//! use pta_viewer::render;
//! use std::path::Path;
//!
//! let config = PipelineConfig::new("data", "markup_train.csv").with_mode(Mode::Concurrent);
//! let report = pipeline::run(&config)?;
//!
//! for file in &report.files {
//!     println!("{} -> lane {}: {:?}", file.file_name, file.lane, file.status());
//! }
//!
//! render::write_report(&report, Path::new("pta-report"), true)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`selection`]: directory listing and random batch selection
//! - [`annotations`]: delimited annotation table and file-name lookup
//! - [`measurement`]: whitespace-delimited numeric measurement loader
//! - [`plot`]: log-log figure artifact and SVG rendering
//! - [`pipeline`]: sequential and concurrent batch runs, structured report
//! - [`render`]: HTML page, SVG files and JSON summary output
//!
//! ## Measurement Format
//!
//! | Column | Meaning |
//! |--------|---------|
//! | 0 | elapsed time |
//! | 1 | pressure |
//! | 2 | pressure derivative |
//! | 3.. | ignored |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod annotations;
pub mod measurement;
pub mod pipeline;
pub mod plot;
pub mod render;
pub mod selection;

/// Number of files drawn per batch
pub const BATCH_SIZE: usize = 9;

/// Number of display lanes; a file goes to lane `index % LANE_COUNT`
pub const LANE_COUNT: usize = 3;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::annotations::{AnnotationError, AnnotationRow, AnnotationTable};
    pub use crate::measurement::{MeasurementError, NumericTable, PressureSeries};
    pub use crate::pipeline::{
        AnnotationMatch, BatchReport, FileOutcome, FileReport, FileStatus, Mode, PipelineConfig,
        PipelineError,
    };
    pub use crate::plot::{Figure, PlotError};
    pub use crate::render::{RenderError, WrittenReport};
    pub use crate::selection::{SelectionBatch, SelectionError};
    pub use crate::{BATCH_SIZE, LANE_COUNT};
}
