//! One file at a time on the calling thread.

use log::{debug, warn};

use crate::measurement;
use crate::selection::SelectionBatch;

use super::{assemble, BatchReport, PipelineConfig};

pub(super) fn run(config: &PipelineConfig, batch: &SelectionBatch) -> BatchReport {
    let mut report = BatchReport::new(config.mode);

    let annotations = match config.load_annotations() {
        Ok(table) => {
            report.annotation_headers = table.headers().to_vec();
            Some(table)
        }
        Err(e) => {
            warn!("Continuing without annotations: {}", e);
            report.add_notice(e.to_string());
            None
        }
    };

    for (index, name) in batch.iter().enumerate() {
        debug!("Loading {} ({}/{})", name, index + 1, batch.len());
        let loaded = measurement::load_series(&config.data_dir.join(name));
        report.add_file(assemble(index, name, loaded, annotations.as_ref()));
    }

    report
}
