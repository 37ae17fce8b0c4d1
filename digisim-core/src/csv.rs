//! The post-run CSV dump (spec.md §6): one header row naming every block's
//! trace label in creation order, one data row per distinct timestamp seen
//! across the whole run (plus `0` and `max_time + 1`), values forward-filled
//! from each label's previous sample.
//!
//! This is core, not a `digisim-io` collaborator: spec.md §2 places "post-run
//! artifacts" under the netlist builder, and the dump format needs nothing
//! the kernel doesn't already have in a [`RunReport`].

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use ordered_float::OrderedFloat;

use crate::netlist::RunReport;

/// Write `report`'s traces to `output/<name>.csv`, creating the directory
/// if needed. Returns the path written.
pub fn write_dump(report: &RunReport) -> std::io::Result<PathBuf> {
    let dir = Path::new("output");
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", report.name()));
    write_dump_to(report, &path)?;
    Ok(path)
}

/// Same as [`write_dump`], but to an explicit path (used by tests so they
/// don't fight over a shared `output/` directory).
pub fn write_dump_to(report: &RunReport, path: &Path) -> std::io::Result<()> {
    let traces = report.traces();

    let mut times: BTreeSet<OrderedFloat<f64>> = BTreeSet::new();
    times.insert(OrderedFloat(0.0));
    let mut max_t = 0.0f64;
    for trace in traces {
        for (t, _) in trace.samples() {
            let t = t.as_f64();
            times.insert(OrderedFloat(t));
            if t > max_t {
                max_t = t;
            }
        }
    }
    times.insert(OrderedFloat(max_t + 1.0));

    let mut writer = ::csv::Writer::from_path(path)?;
    let mut header = vec!["Time".to_string()];
    header.extend(traces.iter().map(|t| t.label().to_string()));
    writer.write_record(&header).map_err(into_io_error)?;

    let mut cursors = vec![0usize; traces.len()];
    let mut last_values = vec![0u64; traces.len()];
    for t in times {
        let t = t.into_inner();
        let mut row = vec![format_time(t)];
        for (i, trace) in traces.iter().enumerate() {
            let samples = trace.samples();
            while cursors[i] < samples.len() && samples[cursors[i]].0.as_f64() <= t {
                last_values[i] = samples[cursors[i]].1;
                cursors[i] += 1;
            }
            row.push(last_values[i].to_string());
        }
        writer.write_record(&row).map_err(into_io_error)?;
    }
    writer.flush()
}

fn format_time(t: f64) -> String {
    t.to_string()
}

fn into_io_error(e: ::csv::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e)
}
