//! Plot surface: the external collaborator spec.md §6 names for rendering
//! stepped waveforms. `digisim-core` never calls this directly — glue code
//! forward-fills a `RunReport`'s traces into a [`TraceDict`] and hands it
//! to a [`PlotSurface`], matching the hand-off contract spec.md §6
//! describes ("The plotter receives the forward-filled trace dictionary
//! and the netlist name").

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use thiserror::Error;

/// A forward-filled trace, keyed by its human-readable label.
pub type TraceDict = BTreeMap<String, Vec<(f64, u64)>>;

const MAX_SUBPLOTS_PER_FIGURE: usize = 5;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("drawing error: {0}")]
    Draw(String),
    #[error("io error: {0}")]
    Io(String),
}

pub trait PlotSurface {
    /// Render `traces` for the netlist named `name`, returning the paths
    /// of every figure written. A run with more than five plot-enabled
    /// signals spans multiple figures (spec.md §6: "one or more figures
    /// of at most five subplots each").
    fn render(&self, name: &str, traces: &TraceDict) -> Result<Vec<PathBuf>, PlotError>;
}

/// Renders each figure as a stacked column of post-step line charts to a
/// PNG bitmap, one file per figure, under `output/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SteppedPngPlot;

impl PlotSurface for SteppedPngPlot {
    fn render(&self, name: &str, traces: &TraceDict) -> Result<Vec<PathBuf>, PlotError> {
        let dir = Path::new("output");
        std::fs::create_dir_all(dir).map_err(|e| PlotError::Io(e.to_string()))?;

        let labels: Vec<&String> = traces.keys().collect();
        let mut paths = Vec::new();
        for (fig_idx, chunk) in labels.chunks(MAX_SUBPLOTS_PER_FIGURE).enumerate() {
            let path = dir.join(format!("{}_{}.png", name, fig_idx));
            render_figure(&path, chunk, traces)?;
            paths.push(path);
        }
        Ok(paths)
    }
}

fn render_figure(path: &Path, labels: &[&String], traces: &TraceDict) -> Result<(), PlotError> {
    let rows = labels.len().max(1) as u32;
    let root = BitMapBackend::new(path, (1024, 220 * rows)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| PlotError::Draw(e.to_string()))?;
    let areas = root.split_evenly((labels.len(), 1));

    for (area, label) in areas.into_iter().zip(labels.iter()) {
        let samples = traces.get(label.as_str()).map(|s| s.as_slice()).unwrap_or(&[]);
        let (max_t, max_v) = samples
            .iter()
            .fold((1.0f64, 1u64), |(mt, mv), (t, v)| (mt.max(*t), mv.max(*v)));

        let mut chart = ChartBuilder::on(&area)
            .caption(label.as_str(), ("sans-serif", 14))
            .margin(5)
            .x_label_area_size(20)
            .y_label_area_size(30)
            .build_cartesian_2d(0f64..(max_t + 1.0), 0f64..(max_v as f64 + 1.0))
            .map_err(|e| PlotError::Draw(e.to_string()))?;

        chart
            .configure_mesh()
            .draw()
            .map_err(|e| PlotError::Draw(e.to_string()))?;

        let stepped = step_points(samples, max_t + 1.0);
        chart
            .draw_series(LineSeries::new(stepped, &BLUE))
            .map_err(|e| PlotError::Draw(e.to_string()))?;
    }
    root.present().map_err(|e| PlotError::Draw(e.to_string()))?;
    Ok(())
}

/// Expand `(t, v)` samples into a post-step path: the value holds until
/// the next sample's timestamp. Matches the `where='post'` step the
/// original source renders with (`scope.py`'s `plt.step(..., where='post')`).
fn step_points(samples: &[(f64, u64)], end: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(samples.len() * 2);
    for (i, &(t, v)) in samples.iter().enumerate() {
        let next_t = samples.get(i + 1).map(|&(t, _)| t).unwrap_or(end);
        points.push((t, v as f64));
        points.push((next_t, v as f64));
    }
    points
}
