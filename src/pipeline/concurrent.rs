//! All measurement loads at once on a bounded worker pool.
//!
//! The annotation table must load before anything is dispatched. Loads are
//! collected with an order-preserving parallel map, so result `i` always
//! belongs to batch entry `i` regardless of completion order.

use std::path::PathBuf;

use log::{debug, info};
use rayon::prelude::*;

use crate::measurement;
use crate::selection::SelectionBatch;

use super::{assemble, BatchReport, PipelineConfig, PipelineError};

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

pub(super) fn run(
    config: &PipelineConfig,
    batch: &SelectionBatch,
) -> Result<BatchReport, PipelineError> {
    let annotations = config.load_annotations()?;

    let workers = config.workers.filter(|&n| n > 0).unwrap_or_else(default_workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("pta-loader-{}", i))
        .build()
        .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

    info!("Dispatching {} loads on {} workers", batch.len(), workers);

    let paths: Vec<PathBuf> = batch.iter().map(|n| config.data_dir.join(n)).collect();
    let loaded: Vec<_> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                debug!("Loading {}", path.display());
                measurement::load_series(path)
            })
            .collect()
    });

    let mut report = BatchReport::new(config.mode);
    report.annotation_headers = annotations.headers().to_vec();
    for (index, (name, result)) in batch.iter().zip(loaded).enumerate() {
        report.add_file(assemble(index, name, result, Some(&annotations)));
    }

    Ok(report)
}
