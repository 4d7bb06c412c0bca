//! # Report Output
//!
//! Writes a finished [`BatchReport`] to an output directory:
//!
//! ```text
//! pta-report/
//! ├── index.html        # three-column page: figures, annotation tables, notices
//! ├── <file_name>.svg   # one log-log figure per rendered measurement
//! └── summary.json      # per-file outcomes and matched annotation rows
//! ```
//!
//! Each column holds the files whose batch position modulo 3 equals the
//! column number, in batch order.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::pipeline::{AnnotationMatch, BatchReport, FileOutcome, FileReport, FileStatus};
use crate::plot;

/// Name of the HTML page inside the output directory
pub const INDEX_FILE: &str = "index.html";
/// Name of the JSON summary inside the output directory
pub const SUMMARY_FILE: &str = "summary.json";

/// Errors that can occur while writing report output
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// I/O error writing an output file
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Paths written by [`write_report`]
#[derive(Debug, Clone)]
pub struct WrittenReport {
    /// The HTML page, if one was requested
    pub index: Option<PathBuf>,
    /// The JSON summary
    pub summary: PathBuf,
    /// One SVG per rendered file, batch order
    pub figures: Vec<PathBuf>,
    /// Files whose figure could not be drawn
    pub failed: Vec<String>,
}

/// Write figures, summary and (optionally) the HTML page into `out_dir`.
///
/// A figure that fails to draw is recorded as a failure of that file in the
/// summary and the page; the other files are written as usual.
pub fn write_report(
    report: &BatchReport,
    out_dir: &Path,
    html: bool,
) -> Result<WrittenReport, RenderError> {
    fs::create_dir_all(out_dir)?;

    let mut report = report.clone();
    let mut figures = Vec::new();
    let mut failed = Vec::new();
    let mut svgs = Vec::with_capacity(report.files.len());
    for file in &mut report.files {
        let drawn = file.figure().map(plot::render_svg);
        let svg = match drawn {
            Some(Ok(svg)) => {
                let path = out_dir.join(svg_file_name(&file.file_name));
                fs::write(&path, &svg)?;
                figures.push(path);
                Some(svg)
            }
            Some(Err(e)) => {
                warn!("Failed to draw {}: {}", file.file_name, e);
                failed.push(file.file_name.clone());
                file.outcome = FileOutcome::Failed(e.to_string());
                file.annotations = AnnotationMatch::Unavailable;
                None
            }
            None => None,
        };
        svgs.push(svg);
    }

    let summary = out_dir.join(SUMMARY_FILE);
    fs::write(&summary, report.to_summary_json()?)?;

    let index = if html {
        let path = out_dir.join(INDEX_FILE);
        fs::write(&path, html_page(&report, &svgs))?;
        Some(path)
    } else {
        None
    };

    info!("Wrote {} figures to {}", figures.len(), out_dir.display());

    Ok(WrittenReport {
        index,
        summary,
        figures,
        failed,
    })
}

/// SVG file name for a measurement file
pub fn svg_file_name(file_name: &str) -> String {
    format!("{}.svg", file_name)
}

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1.5em; }
.grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5em; }
.file { margin-bottom: 2em; }
.notice { padding: 0.5em; border-radius: 4px; margin: 0.5em 0; }
.warning { background: #fff4d6; border: 1px solid #e0b400; }
.error { background: #fde2e1; border: 1px solid #d93025; }
table { border-collapse: collapse; font-size: 0.85em; }
th, td { border: 1px solid #ccc; padding: 2px 6px; }
";

fn html_page(report: &BatchReport, svgs: &[Option<String>]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&report.title)));
    out.push_str(&format!("<style>\n{}</style></head><body>\n", STYLE));
    out.push_str(&format!("<h1>{}</h1>\n", escape(&report.title)));

    for notice in &report.notices {
        out.push_str(&notice_box("error", notice));
    }

    out.push_str("<div class=\"grid\">\n");
    for lane in report.lanes() {
        out.push_str("<div class=\"column\">\n");
        for file in lane {
            let svg = report
                .files
                .iter()
                .position(|f| f.index == file.index)
                .and_then(|i| svgs.get(i))
                .and_then(|svg| svg.as_deref());
            out.push_str(&file_section(report, file, svg));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n</body></html>\n");
    out
}

fn file_section(report: &BatchReport, file: &FileReport, svg: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"file\">\n");
    out.push_str(&format!("<h3>{}</h3>\n", escape(&file.file_name)));

    if let Some(svg) = svg {
        out.push_str(svg);
        out.push('\n');
    }

    match file.status() {
        FileStatus::Warning(msg) => out.push_str(&notice_box("warning", &msg)),
        FileStatus::Failed(msg) => out.push_str(&notice_box("error", &msg)),
        FileStatus::Ok => {
            out.push_str("<table><tr>");
            for header in &report.annotation_headers {
                out.push_str(&format!("<th>{}</th>", escape(header)));
            }
            out.push_str("</tr>\n");
            for row in file.matched_rows() {
                out.push_str("<tr>");
                for cell in &row.cells {
                    out.push_str(&format!("<td>{}</td>", escape(cell)));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</table>\n");
        }
    }

    out.push_str("</div>\n");
    out
}

fn notice_box(class: &str, message: &str) -> String {
    format!("<div class=\"notice {}\">{}</div>\n", class, escape(message))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Mode;
    use crate::plot::Figure;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(escape("plain"), "plain");
    }

    fn report_with(figures: Vec<Figure>) -> BatchReport {
        let mut report = BatchReport::new(Mode::Sequential);
        for (index, figure) in figures.into_iter().enumerate() {
            report.add_file(FileReport {
                index,
                file_name: figure.title.clone(),
                lane: index % 3,
                outcome: FileOutcome::Rendered(figure),
                annotations: AnnotationMatch::NotFound,
            });
        }
        report
    }

    fn figure(title: &str, x_range: (f64, f64)) -> Figure {
        Figure {
            title: title.to_string(),
            pressure: vec![(1.0, 2.0)],
            derivative: vec![(1.0, 1.0)],
            masked_points: 0,
            x_range,
            y_range: (1.0, 10.0),
        }
    }

    #[test]
    fn test_undrawable_figure_fails_only_its_file() {
        let report = report_with(vec![
            figure("good.txt", (1.0, 10.0)),
            figure("wide.txt", (1e-300, 1e300)),
            figure("also_good.txt", (0.1, 10.0)),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let written = write_report(&report, dir.path(), true).unwrap();

        assert_eq!(written.figures.len(), 2);
        assert_eq!(written.failed, vec!["wide.txt"]);
        assert!(!dir.path().join(svg_file_name("wide.txt")).exists());

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written.summary).unwrap()).unwrap();
        assert_eq!(summary["files"][1]["rendered"], false);
        assert!(summary["files"][1]["error"]
            .as_str()
            .unwrap()
            .contains("decades"));
        assert_eq!(summary["files"][2]["rendered"], true);

        let html = fs::read_to_string(written.index.unwrap()).unwrap();
        assert_eq!(html.matches("<h3>").count(), 3);
        assert!(html.contains("<div class=\"notice error\">error processing file"));
    }

    #[test]
    fn test_svg_file_name() {
        assert_eq!(svg_file_name("well_3.txt"), "well_3.txt.svg");
    }
}
