//! # Log-Log Figures
//!
//! Builds the diagnostic plot for one measurement: pressure and its
//! derivative against time, both axes logarithmic.
//!
//! A [`Figure`] is the plot artifact. It holds the plottable points and the
//! axis ranges, and is independent of any drawing backend. [`render_svg`]
//! draws it with `plotters` into an SVG document.
//!
//! Points with a non-positive coordinate have no place on a log axis. They are
//! masked (left out of the series) and counted in [`Figure::masked_points`],
//! as are points outside [`PLOTTABLE_RANGE`]. Axis bounds are whole decades
//! and always finite; a figure spanning more than [`MAX_DECADES`] decades is
//! rejected with [`PlotError::RangeTooWide`] instead of being drawn.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::measurement::PressureSeries;

/// Figure size in pixels (5 x 4 inches at 100 dpi)
pub const FIGURE_SIZE: (u32, u32) = (500, 400);

/// x axis description
pub const X_LABEL: &str = "time (hours)";
/// y axis description
pub const Y_LABEL: &str = "pressure and derivative (atm)";
/// Legend entry of the pressure series
pub const PRESSURE_LABEL: &str = "pressure";
/// Legend entry of the derivative series
pub const DERIVATIVE_LABEL: &str = "pressure derivative";

/// Coordinates outside this range are masked
pub const PLOTTABLE_RANGE: (f64, f64) = (1e-300, 1e300);
/// Widest axis span, in decades, that a figure may have
pub const MAX_DECADES: u32 = 100;

const MARKER_SIZE: i32 = 3;
const EMPTY_RANGE: (f64, f64) = (1.0, 10.0);
const MIN_EXP: f64 = -300.0;
const MAX_EXP: f64 = 300.0;

/// Errors that can occur while rendering a figure
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// The drawing backend reported an error
    #[error("Failed to render figure: {0}")]
    Render(String),

    /// An axis covers too many decades to draw
    #[error("Figure {axis} axis spans {decades} decades, at most {max} can be drawn")]
    RangeTooWide {
        /// "x" or "y"
        axis: &'static str,
        /// Decades covered by the axis
        decades: u32,
        /// Allowed maximum
        max: u32,
    },
}

/// Log-log plot of one measurement
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Caption, normally the measurement file name
    pub title: String,
    /// (time, pressure) points, drawn as circles
    pub pressure: Vec<(f64, f64)>,
    /// (time, derivative) points, drawn as squares
    pub derivative: Vec<(f64, f64)>,
    /// Number of points left out because a coordinate was not plottable
    pub masked_points: usize,
    /// x axis range, whole decades
    pub x_range: (f64, f64),
    /// y axis range, whole decades
    pub y_range: (f64, f64),
}

impl Figure {
    /// Build the figure for `series`
    pub fn from_series(title: impl Into<String>, series: &PressureSeries) -> Self {
        let (pressure, masked_p) = positive_points(&series.time, &series.pressure);
        let (derivative, masked_d) = positive_points(&series.time, &series.derivative);

        let x_range = decade_range(pressure.iter().chain(&derivative).map(|p| p.0));
        let y_range = decade_range(pressure.iter().chain(&derivative).map(|p| p.1));

        Self {
            title: title.into(),
            pressure,
            derivative,
            masked_points: masked_p + masked_d,
            x_range,
            y_range,
        }
    }

    /// Total number of plotted points across both series
    pub fn point_count(&self) -> usize {
        self.pressure.len() + self.derivative.len()
    }

    /// Check that both axes can be drawn
    pub fn check(&self) -> Result<(), PlotError> {
        for (axis, range) in [("x", self.x_range), ("y", self.y_range)] {
            let decades = (range.1.log10() - range.0.log10()).round() as u32;
            if decades > MAX_DECADES {
                return Err(PlotError::RangeTooWide {
                    axis,
                    decades,
                    max: MAX_DECADES,
                });
            }
        }
        Ok(())
    }
}

fn plottable(v: f64) -> bool {
    v >= PLOTTABLE_RANGE.0 && v <= PLOTTABLE_RANGE.1
}

fn positive_points(xs: &[f64], ys: &[f64]) -> (Vec<(f64, f64)>, usize) {
    let mut masked = 0;
    let points = xs
        .iter()
        .zip(ys)
        .filter_map(|(&x, &y)| {
            if plottable(x) && plottable(y) {
                Some((x, y))
            } else {
                masked += 1;
                None
            }
        })
        .collect();
    (points, masked)
}

/// Smallest range of whole decades covering `values`.
///
/// Falls back to 1..10 when there is nothing to cover. Exponents stay within
/// -300..=300 so both bounds are finite and positive.
fn decade_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return EMPTY_RANGE;
    }

    let lo_exp = lo.log10().floor().clamp(MIN_EXP, MAX_EXP - 1.0);
    let hi_exp = hi.log10().ceil().clamp(lo_exp + 1.0, MAX_EXP);
    (10f64.powf(lo_exp), 10f64.powf(hi_exp))
}

/// Render `figure` to an SVG document
pub fn render_svg(figure: &Figure) -> Result<String, PlotError> {
    figure.check()?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, FIGURE_SIZE).into_drawing_area();
        draw(&root, figure).map_err(|e| PlotError::Render(e.to_string()))?;
    }
    Ok(svg)
}

fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    figure: &Figure,
) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (figure.x_range.0..figure.x_range.1).log_scale(),
            (figure.y_range.0..figure.y_range.1).log_scale(),
        )?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .bold_line_style(BLACK.mix(0.25))
        .light_line_style(BLACK.mix(0.08))
        .draw()?;

    chart
        .draw_series(
            figure
                .pressure
                .iter()
                .map(|&p| Circle::new(p, MARKER_SIZE, BLUE.filled())),
        )?
        .label(PRESSURE_LABEL)
        .legend(|(x, y)| Circle::new((x, y), MARKER_SIZE, BLUE.filled()));

    chart
        .draw_series(figure.derivative.iter().map(|&p| {
            EmptyElement::at(p)
                + Rectangle::new(
                    [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)],
                    RED.filled(),
                )
        }))?
        .label(DERIVATIVE_LABEL)
        .legend(|(x, y)| {
            Rectangle::new(
                [(x - MARKER_SIZE, y - MARKER_SIZE), (x + MARKER_SIZE, y + MARKER_SIZE)],
                RED.filled(),
            )
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> PressureSeries {
        PressureSeries {
            time: vec![0.01, 0.1, 1.0, 10.0],
            pressure: vec![2.0, 8.0, 20.0, 35.0],
            derivative: vec![1.5, 3.0, 4.0, 4.2],
        }
    }

    #[test]
    fn test_figure_keeps_all_positive_points() {
        let fig = Figure::from_series("well.txt", &series());
        assert_eq!(fig.title, "well.txt");
        assert_eq!(fig.pressure.len(), 4);
        assert_eq!(fig.derivative.len(), 4);
        assert_eq!(fig.masked_points, 0);
        assert_eq!(fig.pressure[1], (0.1, 8.0));
        assert_eq!(fig.derivative[3], (10.0, 4.2));
    }

    #[test]
    fn test_decade_ranges() {
        let fig = Figure::from_series("w", &series());
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9 * b;
        assert!(close(fig.x_range.0, 0.01));
        assert!(close(fig.x_range.1, 10.0));
        assert!(close(fig.y_range.0, 1.0));
        assert!(close(fig.y_range.1, 100.0));
    }

    #[test]
    fn test_non_positive_points_are_masked() {
        let s = PressureSeries {
            time: vec![0.0, 1.0, 2.0],
            pressure: vec![5.0, -1.0, 6.0],
            derivative: vec![1.0, 1.0, 0.0],
        };
        let fig = Figure::from_series("w", &s);
        assert_eq!(fig.pressure, vec![(2.0, 6.0)]);
        assert_eq!(fig.derivative, vec![(1.0, 1.0)]);
        assert_eq!(fig.masked_points, 4);
    }

    #[test]
    fn test_nothing_plottable_uses_default_range() {
        let s = PressureSeries {
            time: vec![0.0],
            pressure: vec![0.0],
            derivative: vec![0.0],
        };
        let fig = Figure::from_series("w", &s);
        assert_eq!(fig.point_count(), 0);
        assert_eq!(fig.x_range, EMPTY_RANGE);
        assert_eq!(fig.y_range, EMPTY_RANGE);
    }

    #[test]
    fn test_single_value_spans_one_decade() {
        assert_eq!(decade_range([1.0].into_iter()), (1.0, 10.0));
    }

    #[test]
    fn test_huge_values_are_masked() {
        let s = PressureSeries {
            time: vec![1.0, 1.7e308],
            pressure: vec![2.0, 3.0],
            derivative: vec![1.0, f64::MAX],
        };
        let fig = Figure::from_series("w", &s);
        assert_eq!(fig.pressure, vec![(1.0, 2.0)]);
        assert_eq!(fig.masked_points, 2);
        assert!(fig.x_range.1.is_finite());
        assert!(fig.y_range.1.is_finite());
        assert!(render_svg(&fig).is_ok());
    }

    #[test]
    fn test_subnormal_values_are_masked() {
        let s = PressureSeries {
            time: vec![5e-324, 1.0],
            pressure: vec![2.0, 2.0],
            derivative: vec![1.0, 1.0],
        };
        let fig = Figure::from_series("w", &s);
        assert_eq!(fig.masked_points, 2);
        assert!(fig.x_range.0 > 0.0);
        assert!(render_svg(&fig).is_ok());
    }

    #[test]
    fn test_bounds_stay_finite_at_the_edges() {
        let (lo, hi) = decade_range([1e-300, 1e300].into_iter());
        assert!(lo > 0.0 && hi.is_finite());
        let (lo, hi) = decade_range([1e300].into_iter());
        assert!(lo > 0.0 && hi.is_finite() && hi > lo);
    }

    #[test]
    fn test_too_wide_range_is_rejected() {
        let s = PressureSeries {
            time: vec![1e-300, 1e300],
            pressure: vec![1.0, 1.0],
            derivative: vec![1.0, 1.0],
        };
        let fig = Figure::from_series("w", &s);
        assert_eq!(fig.point_count(), 4);
        let err = render_svg(&fig).unwrap_err();
        assert!(matches!(err, PlotError::RangeTooWide { axis: "x", .. }));
    }

    #[test]
    fn test_render_svg_contains_labels() {
        let fig = Figure::from_series("well_07.txt", &series());
        let svg = render_svg(&fig).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("well_07.txt"));
        assert!(svg.contains(X_LABEL));
        assert!(svg.contains(PRESSURE_LABEL));
        assert!(svg.contains(DERIVATIVE_LABEL));
    }
}
