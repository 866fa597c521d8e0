//! Sweep reporting: comparison table, figure and result persistence.
//!
//! - table: fixed-width simulated vs analytical energies on stdout
//! - figure: SVG chart (plotters) of both energies against the
//!   inclination, plus the same data as CSV
//! - results: the full result list as a bincode blob, readable with
//!   [`Reporter::load_results`], and a JSON Lines summary without the
//!   trajectories

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as IoWrite};
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::edd::experiment::ValidationResult;
use crate::edd::regime::Regime;
use crate::error::{SimError, SimResult};
use crate::scenarios::inclined_plane::MAX_ALPHA_S;

/// Version tag written into result blobs.
pub const RESULTS_FORMAT_VERSION: u32 = 1;

/// Which outputs to produce and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportOptions {
    /// Print the comparison table.
    pub plot: bool,
    /// Write `<output_path>.svg` and `<output_path>.csv`.
    pub save_figure: bool,
    /// Write `<output_path>.dat`.
    pub save_results: bool,
    /// Output path without extension.
    pub output_path: PathBuf,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            plot: true,
            save_figure: true,
            save_results: true,
            output_path: PathBuf::from("rolling_friction_on_inclined_plane"),
        }
    }
}

impl ReportOptions {
    /// Output path with the given extension.
    #[must_use]
    pub fn path_with_extension(&self, extension: &str) -> PathBuf {
        self.output_path.with_extension(extension)
    }
}

/// Files written by [`Reporter::report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportArtifacts {
    /// SVG figure.
    pub figure: Option<PathBuf>,
    /// CSV table.
    pub table: Option<PathBuf>,
    /// Bincode result blob.
    pub results: Option<PathBuf>,
    /// JSON Lines summary.
    pub summary: Option<PathBuf>,
}

/// One line of the JSON summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSummary {
    /// Sweep value.
    pub alpha_s: f64,
    /// Classified regime.
    pub regime: Regime,
    /// Friction force needed for rolling.
    pub force_noslip: f64,
    /// Static friction limit.
    pub force_slip: f64,
    /// Simulated and closed-form translational energy.
    pub translational: [f64; 2],
    /// Simulated and closed-form rotational energy.
    pub rotational: [f64; 2],
    /// Relative translational error, absent when the prediction is zero.
    pub translational_error: Option<f64>,
    /// Relative rotational error, absent when the prediction is zero.
    pub rotational_error: Option<f64>,
}

impl From<&ValidationResult> for PointSummary {
    fn from(r: &ValidationResult) -> Self {
        let forces = r.forces();
        Self {
            alpha_s: r.alpha_s(),
            regime: r.regime(),
            force_noslip: forces.force_noslip,
            force_slip: forces.force_slip,
            translational: [r.translational_energy(), r.analytical_translational_energy()],
            rotational: [r.rotational_energy(), r.analytical_rotational_energy()],
            translational_error: r.translational_error(),
            rotational_error: r.rotational_error(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ResultsArchive {
    format_version: u32,
    results: Vec<ValidationResult>,
}

/// Produces the configured outputs for a finished sweep.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    options: ReportOptions,
}

impl Reporter {
    /// Create a reporter.
    #[must_use]
    pub const fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    #[must_use]
    pub const fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Produce every enabled output.
    ///
    /// # Errors
    ///
    /// Returns error if a file cannot be written.
    pub fn report(&self, results: &[ValidationResult]) -> SimResult<ReportArtifacts> {
        let mut artifacts = ReportArtifacts::default();

        if self.options.plot {
            println!("{}", render_table(results));
        }
        if self.options.save_figure {
            let svg = self.options.path_with_extension("svg");
            write_svg(results, &svg)?;
            let csv = self.options.path_with_extension("csv");
            write_csv(results, &csv)?;
            info!(figure = %svg.display(), table = %csv.display(), "figure saved");
            artifacts.figure = Some(svg);
            artifacts.table = Some(csv);
        }
        if self.options.save_results {
            let dat = self.options.path_with_extension("dat");
            Self::save_results(results, &dat)?;
            let jsonl = self.options.path_with_extension("jsonl");
            write_json_summary(results, &jsonl)?;
            info!(path = %dat.display(), points = results.len(), "results saved");
            artifacts.results = Some(dat);
            artifacts.summary = Some(jsonl);
        }

        Ok(artifacts)
    }

    /// Persist results as a bincode blob.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn save_results(results: &[ValidationResult], path: &Path) -> SimResult<()> {
        let file =
            File::create(path).map_err(|e| SimError::io(format!("Failed to create file: {e}")))?;
        let mut writer = BufWriter::new(file);

        let archive = ResultsArchive {
            format_version: RESULTS_FORMAT_VERSION,
            results: results.to_vec(),
        };
        bincode::serialize_into(&mut writer, &archive)
            .map_err(|e| SimError::serialization(format!("Binary serialization failed: {e}")))?;
        writer
            .flush()
            .map_err(|e| SimError::io(format!("Flush failed: {e}")))?;

        Ok(())
    }

    /// Load results written by [`save_results`](Self::save_results).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not a result blob, or
    /// was written with another format version.
    pub fn load_results(path: &Path) -> SimResult<Vec<ValidationResult>> {
        let file =
            File::open(path).map_err(|e| SimError::io(format!("Failed to open file: {e}")))?;
        let reader = BufReader::new(file);

        let archive: ResultsArchive = bincode::deserialize_from(reader)
            .map_err(|e| SimError::serialization(format!("Binary deserialization failed: {e}")))?;
        if archive.format_version != RESULTS_FORMAT_VERSION {
            return Err(SimError::serialization(format!(
                "unsupported results format version {}",
                archive.format_version
            )));
        }
        Ok(archive.results)
    }
}

/// Fixed-width comparison table.
#[must_use]
pub fn render_table(results: &[ValidationResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>8} {:>15} {:>12} {:>12} {:>9} {:>12} {:>12} {:>9}",
        "alpha_s", "regime", "E_t sim", "E_t theory", "err", "E_r sim", "E_r theory", "err"
    );
    let _ = writeln!(out, "{}", "-".repeat(96));
    for r in results {
        let _ = writeln!(
            out,
            "{:>8.3} {:>15} {:>12.5e} {:>12.5e} {:>9} {:>12.5e} {:>12.5e} {:>9}",
            r.alpha_s(),
            r.regime().label(),
            r.translational_energy(),
            r.analytical_translational_energy(),
            percent(r.translational_error()),
            r.rotational_energy(),
            r.analytical_rotational_energy(),
            percent(r.rotational_error()),
        );
    }
    out
}

fn percent(error: Option<f64>) -> String {
    error.map_or_else(|| "-".to_string(), |e| format!("{:.2}%", 100.0 * e))
}

/// Write the energy table as CSV.
///
/// # Errors
///
/// Returns error if file operations fail.
pub fn write_csv(results: &[ValidationResult], path: &Path) -> SimResult<()> {
    let file =
        File::create(path).map_err(|e| SimError::io(format!("Failed to create file: {e}")))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "alpha_s,regime,force_noslip,force_slip,translational_energy,analytical_translational_energy,rotational_energy,analytical_rotational_energy"
    )
    .map_err(|e| SimError::io(format!("Write header failed: {e}")))?;

    for r in results {
        let forces = r.forces();
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            r.alpha_s(),
            r.regime().label(),
            forces.force_noslip,
            forces.force_slip,
            r.translational_energy(),
            r.analytical_translational_energy(),
            r.rotational_energy(),
            r.analytical_rotational_energy(),
        )
        .map_err(|e| SimError::io(format!("Write data failed: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| SimError::io(format!("Flush failed: {e}")))?;

    Ok(())
}

/// Write one [`PointSummary`] per line.
///
/// # Errors
///
/// Returns error if serialization or file operations fail.
pub fn write_json_summary(results: &[ValidationResult], path: &Path) -> SimResult<()> {
    let file =
        File::create(path).map_err(|e| SimError::io(format!("Failed to create file: {e}")))?;
    let mut writer = BufWriter::new(file);

    for r in results {
        let line = serde_json::to_string(&PointSummary::from(r))
            .map_err(|e| SimError::serialization(format!("JSON serialization failed: {e}")))?;
        writeln!(writer, "{line}").map_err(|e| SimError::io(format!("Write failed: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| SimError::io(format!("Flush failed: {e}")))?;

    Ok(())
}

/// Write the SVG figure.
///
/// # Errors
///
/// Returns error if the chart cannot be drawn or the file cannot be
/// written.
pub fn write_svg(results: &[ValidationResult], path: &Path) -> SimResult<()> {
    std::fs::write(path, render_svg(results)?)
        .map_err(|e| SimError::io(format!("Failed to write figure: {e}")))
}

const FIGURE_SIZE: (u32, u32) = (960, 420);

/// Two panels, translational and rotational energy against `alpha_s`:
/// analytical values as a line, simulated values as markers.
///
/// # Errors
///
/// Returns error if plotting fails.
pub fn render_svg(results: &[ValidationResult]) -> SimResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, FIGURE_SIZE).into_drawing_area();
        draw_figure(&root, results)
            .and_then(|()| root.present())
            .map_err(|e| SimError::io(format!("Failed to draw figure: {e}")))?;
    }
    Ok(svg)
}

type PanelSelector = fn(&ValidationResult) -> (f64, f64);

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    results: &[ValidationResult],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let panels: [(&str, PanelSelector); 2] = [
        ("Translational energy (J)", |r| {
            (r.translational_energy(), r.analytical_translational_energy())
        }),
        ("Rotational energy (J)", |r| {
            (r.rotational_energy(), r.analytical_rotational_energy())
        }),
    ];
    for (area, (title, select)) in root.split_evenly((1, 2)).iter().zip(panels) {
        let points: Vec<(f64, f64, f64)> = results
            .iter()
            .map(|r| {
                let (simulated, analytical) = select(r);
                (r.alpha_s(), simulated, analytical)
            })
            .filter(|(x, s, a)| x.is_finite() && s.is_finite() && a.is_finite())
            .collect();
        draw_panel(area, title, &points)?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    points: &[(f64, f64, f64)],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let x_max = points.iter().map(|p| p.0).fold(MAX_ALPHA_S, f64::max);
    let y_max = points
        .iter()
        .flat_map(|p| [p.1, p.2])
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("alpha / pi")
        .y_desc("energy (J)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, _, analytical)| (x, analytical)),
            BLUE.stroke_width(2),
        ))?
        .label("analytical")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(PointSeries::of_element(
            points.iter().map(|&(x, simulated, _)| (x, simulated)),
            4,
            RED.stroke_width(2),
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
        ))?
        .label("simulated")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}
