use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

use pta_viewer::annotations::AnnotationTable;
use pta_viewer::pipeline::{self, FileStatus};
use pta_viewer::plot;
use pta_viewer::render::svg_file_name;

/// Plot a single measurement file
pub fn run(
    file: PathBuf,
    annotations: Option<PathBuf>,
    delimiter: char,
    output: Option<PathBuf>,
) -> Result<()> {
    if !file.exists() {
        bail!("File does not exist: {}", file.display());
    }
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }

    let table = match &annotations {
        Some(path) => Some(
            AnnotationTable::from_file(path, delimiter as u8)
                .with_context(|| format!("Failed to load annotations: {}", path.display()))?,
        ),
        None => None,
    };

    let report = pipeline::inspect_file(&file, table.as_ref());

    println!("File: {}", report.file_name);
    if let Some(figure) = report.figure() {
        println!(
            "  Points: {} plotted, {} masked (non-positive)",
            figure.point_count(),
            figure.masked_points
        );
        println!(
            "  Time range: {:e} .. {:e}",
            figure.x_range.0, figure.x_range.1
        );
    }

    match report.status() {
        FileStatus::Ok => {
            if let Some(table) = &table {
                println!("  Annotations: {}", table.headers().join(" | "));
            }
            for row in report.matched_rows() {
                println!("    {}", row.cells.join(" | "));
            }
        }
        FileStatus::Warning(msg) => println!("  WARNING: {}", msg),
        FileStatus::Failed(msg) => {
            eprintln!("  FAILED: {}", msg);
            std::process::exit(1);
        }
    }

    if let (Some(dir), Some(figure)) = (output, report.figure()) {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(svg_file_name(&report.file_name));
        let svg = plot::render_svg(figure)?;
        fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Figure: {}", path.display());
    }

    Ok(())
}
