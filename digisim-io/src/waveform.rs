//! Waveform-file loading: the external collaborator spec.md §6 names but
//! leaves unspecified beyond the contract it must expose to the core — an
//! ordered `(time, value)` schedule.
//!
//! Two historical schemas exist in the source material (spec.md §9 Open
//! Question (c)): a single decimal column (`<time> <value>` per line,
//! whitespace-separated, no header) and a multi-column CSV with a
//! bit-width metadata row. The multi-column schema is canonical; the
//! single-column file is accepted as its degenerate one-field case.

use std::fs;
use std::path::Path;

use crate::error::FormatError;

/// An ordered `(time, value)` schedule, ready to hand to
/// `digisim_core::NetlistBuilder::source`.
pub type Schedule = Vec<(f64, u64)>;

/// Loads a waveform file into an ordered schedule. `digisim-core` only
/// ever consumes the `Schedule` this returns; it never sees the file
/// format or this trait.
pub trait WaveformSource {
    fn load(&self, path: &Path) -> Result<Schedule, FormatError>;
}

/// The canonical multi-column loader, falling back to the single-column
/// degenerate schema when the first line has no commas.
#[derive(Debug, Default, Clone, Copy)]
pub struct MultiColumnWaveform;

impl WaveformSource for MultiColumnWaveform {
    fn load(&self, path: &Path) -> Result<Schedule, FormatError> {
        let path_s = path_str(path);
        let text = fs::read_to_string(path).map_err(|e| FormatError::Io {
            path: path_s.clone(),
            message: e.to_string(),
        })?;

        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let first = match lines.next() {
            Some(l) => l,
            None => return Err(FormatError::Empty { path: path_s }),
        };

        if looks_like_degenerate(first) {
            return load_degenerate(&path_s, first, lines);
        }
        load_multi_column(&path_s, first, lines)
    }
}

fn looks_like_degenerate(first_line: &str) -> bool {
    !first_line.contains(',') && first_line.split_whitespace().count() == 2
}

fn load_degenerate<'a>(
    path: &str,
    first: &'a str,
    rest: impl Iterator<Item = &'a str>,
) -> Result<Schedule, FormatError> {
    let mut schedule = Schedule::new();
    let mut last_time = f64::NEG_INFINITY;
    for (idx, line) in std::iter::once(first).chain(rest).enumerate() {
        let line_no = idx + 1;
        let cells: Vec<&str> = line.split_whitespace().collect();
        if cells.len() != 2 {
            return Err(FormatError::MissingCells {
                path: path.to_string(),
                line: line_no,
                expected: 2,
                found: cells.len(),
            });
        }
        let time = parse_time(path, line_no, cells[0])?;
        check_monotonic(path, line_no, time, &mut last_time)?;
        let value: u64 = cells[1].parse().map_err(|_| FormatError::NonNumericValue {
            path: path.to_string(),
            line: line_no,
            column: "value".to_string(),
            raw: cells[1].to_string(),
        })?;
        schedule.push((time, value));
    }
    if schedule.is_empty() {
        return Err(FormatError::Empty { path: path.to_string() });
    }
    Ok(schedule)
}

fn load_multi_column<'a>(
    path: &str,
    header_line: &'a str,
    mut lines: impl Iterator<Item = &'a str>,
) -> Result<Schedule, FormatError> {
    let header: Vec<&str> = header_line.split(',').map(str::trim).collect();
    let field_names = &header[1..];

    let meta_line = lines
        .next()
        .ok_or_else(|| FormatError::Empty { path: path.to_string() })?;
    let widths: Vec<u32> = meta_line
        .split(',')
        .skip(1)
        .map(|w| w.trim().parse::<u32>().unwrap_or(0))
        .collect();
    if widths.len() != field_names.len() {
        return Err(FormatError::MetadataColumnMismatch {
            path: path.to_string(),
            declared: widths.len(),
            named: field_names.len(),
        });
    }

    let mut schedule = Schedule::new();
    let mut last_time = f64::NEG_INFINITY;
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 3; // 1: header, 2: metadata, data starts at 3
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != header.len() {
            return Err(FormatError::MissingCells {
                path: path.to_string(),
                line: line_no,
                expected: header.len(),
                found: cells.len(),
            });
        }
        let time = parse_time(path, line_no, cells[0])?;
        check_monotonic(path, line_no, time, &mut last_time)?;

        let mut packed: u64 = 0;
        for (i, (&cell, &width)) in cells[1..].iter().zip(widths.iter()).enumerate() {
            let v: u64 = cell.parse().map_err(|_| FormatError::NonNumericValue {
                path: path.to_string(),
                line: line_no,
                column: field_names[i].to_string(),
                raw: cell.to_string(),
            })?;
            if width < 64 && v >= (1u64 << width) {
                return Err(FormatError::ValueTooWide {
                    path: path.to_string(),
                    line: line_no,
                    column: field_names[i].to_string(),
                    value: v,
                    width,
                });
            }
            packed = (packed << width) | v;
        }
        schedule.push((time, packed));
    }

    if schedule.is_empty() {
        return Err(FormatError::Empty { path: path.to_string() });
    }
    Ok(schedule)
}

fn parse_time(path: &str, line: usize, raw: &str) -> Result<f64, FormatError> {
    raw.parse::<f64>().map_err(|_| FormatError::NonNumericTime {
        path: path.to_string(),
        line,
        raw: raw.to_string(),
    })
}

fn check_monotonic(path: &str, line: usize, time: f64, last_time: &mut f64) -> Result<(), FormatError> {
    if time < 0.0 {
        return Err(FormatError::NegativeTime { path: path.to_string(), line, time });
    }
    if time < *last_time {
        return Err(FormatError::TimeWentBackwards {
            path: path.to_string(),
            line,
            time,
            previous: *last_time,
        });
    }
    *last_time = time;
    Ok(())
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}
