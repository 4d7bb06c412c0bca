use serde::Serialize;
use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use crate::annotations::AnnotationRow;
use crate::plot::Figure;
use crate::LANE_COUNT;

use super::{Mode, REPORT_TITLE};

/// Result of loading one measurement file
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// The file loaded and its figure was built
    Rendered(Figure),
    /// The file could not be loaded; the message says why
    Failed(String),
}

/// Result of looking a file up in the annotation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationMatch {
    /// One or more rows matched, in file order
    Matched(Vec<AnnotationRow>),
    /// The table has no row for this file
    NotFound,
    /// No lookup was made (load failed, or no annotation table)
    Unavailable,
}

/// Display status of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Rendered and annotated
    Ok,
    /// Rendered, with a notice
    Warning(String),
    /// Not rendered
    Failed(String),
}

impl FileStatus {
    fn is_failed(&self) -> bool {
        matches!(self, FileStatus::Failed(_))
    }
}

/// Everything produced for one file of the batch
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Position in the batch
    pub index: usize,
    /// Measurement file name
    pub file_name: String,
    /// Display lane, `index % 3`
    pub lane: usize,
    /// Figure or failure reason
    pub outcome: FileOutcome,
    /// Annotation lookup result
    pub annotations: AnnotationMatch,
}

impl FileReport {
    /// The figure, if the file rendered
    pub fn figure(&self) -> Option<&Figure> {
        match &self.outcome {
            FileOutcome::Rendered(figure) => Some(figure),
            FileOutcome::Failed(_) => None,
        }
    }

    /// Whether the file rendered
    pub fn is_rendered(&self) -> bool {
        self.figure().is_some()
    }

    /// Matched annotation rows (empty unless [`AnnotationMatch::Matched`])
    pub fn matched_rows(&self) -> &[AnnotationRow] {
        match &self.annotations {
            AnnotationMatch::Matched(rows) => rows,
            _ => &[],
        }
    }

    /// Display status derived from the outcome and the lookup
    pub fn status(&self) -> FileStatus {
        match (&self.outcome, &self.annotations) {
            (FileOutcome::Failed(msg), _) => {
                FileStatus::Failed(format!("error processing file: {}", msg))
            }
            (FileOutcome::Rendered(_), AnnotationMatch::NotFound) => {
                FileStatus::Warning("file not found in annotations".to_string())
            }
            (FileOutcome::Rendered(_), AnnotationMatch::Unavailable) => {
                FileStatus::Warning("annotations unavailable".to_string())
            }
            (FileOutcome::Rendered(_), AnnotationMatch::Matched(_)) => FileStatus::Ok,
        }
    }
}

/// Structured result of one pipeline run
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Report title
    pub title: String,
    /// Mode the batch ran in
    pub mode: Mode,
    /// Annotation column names, empty when no table was loaded
    pub annotation_headers: Vec<String>,
    /// Per-file results in batch order
    pub files: Vec<FileReport>,
    /// Batch-wide notices that did not stop the run
    pub notices: Vec<String>,
}

impl BatchReport {
    /// Create an empty report
    pub fn new(mode: Mode) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            mode,
            annotation_headers: Vec::new(),
            files: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Append a file result
    pub fn add_file(&mut self, file: FileReport) {
        self.files.push(file);
    }

    /// Append a batch-wide notice
    pub fn add_notice(&mut self, notice: impl Into<String>) {
        self.notices.push(notice.into());
    }

    /// Look up a file result by name
    pub fn file(&self, file_name: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    /// Count the files that rendered
    pub fn rendered_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_rendered()).count()
    }

    /// Count the files that failed to load
    pub fn failure_count(&self) -> usize {
        self.files.iter().filter(|f| f.status().is_failed()).count()
    }

    /// Count the rendered files with no annotation row
    pub fn unmatched_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.annotations, AnnotationMatch::NotFound))
            .count()
    }

    /// Files grouped into display lanes by `index % 3`, batch order kept
    pub fn lanes(&self) -> Vec<Vec<&FileReport>> {
        let mut lanes: Vec<Vec<&FileReport>> = vec![Vec::new(); LANE_COUNT];
        for file in &self.files {
            lanes[file.lane % LANE_COUNT].push(file);
        }
        lanes
    }

    /// Serialize a summary of the run (no figure data) as pretty JSON
    pub fn to_summary_json(&self) -> Result<String, serde_json::Error> {
        let files = self
            .files
            .iter()
            .map(|f| FileSummary {
                index: f.index,
                file_name: &f.file_name,
                lane: f.lane,
                rendered: f.is_rendered(),
                error: match &f.outcome {
                    FileOutcome::Failed(msg) => Some(msg.as_str()),
                    FileOutcome::Rendered(_) => None,
                },
                plotted_points: f.figure().map(Figure::point_count),
                masked_points: f.figure().map(|fig| fig.masked_points),
                annotation: match &f.annotations {
                    AnnotationMatch::Matched(_) => "matched",
                    AnnotationMatch::NotFound => "not_found",
                    AnnotationMatch::Unavailable => "unavailable",
                },
                annotation_rows: f.matched_rows(),
            })
            .collect();

        serde_json::to_string_pretty(&Summary {
            title: &self.title,
            mode: self.mode,
            annotation_headers: &self.annotation_headers,
            notices: &self.notices,
            files,
        })
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();

            output.push_str(&format!("{}\n", style(&self.title).bold().cyan()));
            output.push_str(&format!("{}\n", style("=".repeat(self.title.len())).cyan()));
            output.push_str(&format!("{}: {}\n", style("Mode").bold(), self.mode));
            for notice in &self.notices {
                output.push_str(&format!("{}: {}\n", style("NOTICE").yellow().bold(), notice));
            }

            for (lane, files) in self.lanes().iter().enumerate() {
                output.push_str(&format!("\n{}\n", style(format!("Column {}", lane + 1)).bold()));
                for file in files {
                    let status = file.status();
                    let (symbol, color_fn): (_, fn(&str) -> console::StyledObject<&str>) =
                        match &status {
                            FileStatus::Ok => (OK, |s| style(s).green()),
                            FileStatus::Warning(_) => (WARN, |s| style(s).yellow()),
                            FileStatus::Failed(_) => (FAIL, |s| style(s).red()),
                        };

                    output.push_str(&format!("  [{}] {}", symbol, color_fn(&file.file_name)));
                    match &status {
                        FileStatus::Ok => output.push_str(&format!(
                            " ({} annotation rows)\n",
                            file.matched_rows().len()
                        )),
                        FileStatus::Warning(msg) => {
                            output.push_str(&format!(" - {}: {}\n", style("WARNING").yellow().bold(), msg));
                        }
                        FileStatus::Failed(msg) => {
                            output.push_str(&format!(" - {}: {}\n", style("FAILED").red().bold(), msg));
                        }
                    }
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} plotted, {} not in annotations, {} failed\n",
                style("Summary").bold(),
                style(self.rendered_count()).green(),
                style(self.unmatched_count()).yellow(),
                style(self.failure_count()).red()
            ));

            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;
        writeln!(f, "Mode: {}", self.mode)?;
        for notice in &self.notices {
            writeln!(f, "NOTICE: {}", notice)?;
        }

        for (lane, files) in self.lanes().iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Column {}", lane + 1)?;
            for file in files {
                let status = file.status();
                let symbol = match &status {
                    FileStatus::Ok => "✓",
                    FileStatus::Warning(_) => "⚠",
                    FileStatus::Failed(_) => "✗",
                };

                write!(f, "  [{}] {}", symbol, file.file_name)?;

                match &status {
                    FileStatus::Ok => {
                        writeln!(f, " ({} annotation rows)", file.matched_rows().len())?
                    }
                    FileStatus::Warning(msg) => writeln!(f, " - WARNING: {}", msg)?,
                    FileStatus::Failed(msg) => writeln!(f, " - FAILED: {}", msg)?,
                }
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} plotted, {} not in annotations, {} failed",
            self.rendered_count(),
            self.unmatched_count(),
            self.failure_count()
        )?;

        Ok(())
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    title: &'a str,
    mode: Mode,
    annotation_headers: &'a [String],
    notices: &'a [String],
    files: Vec<FileSummary<'a>>,
}

#[derive(Serialize)]
struct FileSummary<'a> {
    index: usize,
    file_name: &'a str,
    lane: usize,
    rendered: bool,
    error: Option<&'a str>,
    plotted_points: Option<usize>,
    masked_points: Option<usize>,
    annotation: &'static str,
    annotation_rows: &'a [AnnotationRow],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::PressureSeries;

    fn rendered(index: usize, name: &str, annotations: AnnotationMatch) -> FileReport {
        let series = PressureSeries {
            time: vec![1.0, 2.0],
            pressure: vec![3.0, 4.0],
            derivative: vec![0.5, 0.6],
        };
        FileReport {
            index,
            file_name: name.to_string(),
            lane: index % LANE_COUNT,
            outcome: FileOutcome::Rendered(Figure::from_series(name, &series)),
            annotations,
        }
    }

    fn sample_report() -> BatchReport {
        let row = AnnotationRow {
            cells: vec!["a.txt".to_string(), "W-1".to_string()],
        };
        let mut report = BatchReport::new(Mode::Sequential);
        report.annotation_headers = vec!["file_name".to_string(), "well".to_string()];
        report.add_file(rendered(0, "a.txt", AnnotationMatch::Matched(vec![row])));
        report.add_file(rendered(1, "b.txt", AnnotationMatch::NotFound));
        report.add_file(FileReport {
            index: 2,
            file_name: "c.txt".to_string(),
            lane: 2,
            outcome: FileOutcome::Failed("File contains no data rows".to_string()),
            annotations: AnnotationMatch::Unavailable,
        });
        report.add_file(rendered(3, "d.txt", AnnotationMatch::NotFound));
        report
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.rendered_count(), 3);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.unmatched_count(), 2);
    }

    #[test]
    fn test_lanes_keep_batch_order() {
        let report = sample_report();
        let lanes = report.lanes();
        assert_eq!(lanes.len(), 3);
        let names: Vec<_> = lanes[0].iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "d.txt"]);
        assert_eq!(lanes[2][0].file_name, "c.txt");
    }

    #[test]
    fn test_status() {
        let report = sample_report();
        assert_eq!(report.files[0].status(), FileStatus::Ok);
        assert!(matches!(report.files[1].status(), FileStatus::Warning(_)));
        assert!(matches!(report.files[2].status(), FileStatus::Failed(_)));
    }

    #[test]
    fn test_display() {
        let text = sample_report().to_string();
        assert!(text.starts_with("Pressure data analysis"));
        assert!(text.contains("[✓] a.txt (1 annotation rows)"));
        assert!(text.contains("b.txt - WARNING: file not found in annotations"));
        assert!(text.contains("c.txt - FAILED: error processing file"));
        assert!(text.contains("Summary: 3 plotted, 2 not in annotations, 1 failed"));
    }

    #[test]
    fn test_summary_json() {
        let json = sample_report().to_summary_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], "sequential");
        assert_eq!(value["files"][0]["annotation"], "matched");
        assert_eq!(value["files"][0]["annotation_rows"][0]["cells"][1], "W-1");
        assert_eq!(value["files"][1]["annotation"], "not_found");
        assert_eq!(value["files"][2]["rendered"], false);
        assert_eq!(value["files"][0]["plotted_points"], 4);
    }
}
