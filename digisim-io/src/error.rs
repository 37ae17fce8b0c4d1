//! `FormatError`: the waveform loader's failure taxonomy (spec.md §6).
//!
//! Surfaced independently of `digisim-core` — the core only ever consumes
//! the `Vec<(f64, u64)>` a loader hands back, never this error type.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("{path}: could not open file: {message}")]
    Io { path: String, message: String },

    #[error("{path}:{line}: non-numeric time {raw:?}")]
    NonNumericTime { path: String, line: usize, raw: String },

    #[error("{path}:{line}: negative time {time}")]
    NegativeTime { path: String, line: usize, time: f64 },

    #[error("{path}:{line}: times must be non-decreasing, got {time} after {previous}")]
    TimeWentBackwards { path: String, line: usize, time: f64, previous: f64 },

    #[error("{path}:{line}: expected {expected} cell(s), found {found}")]
    MissingCells { path: String, line: usize, expected: usize, found: usize },

    #[error("{path}:{line}: column `{column}`: value {value} does not fit in its declared width of {width} bit(s)")]
    ValueTooWide { path: String, line: usize, column: String, value: u64, width: u32 },

    #[error("{path}:{line}: cell {raw:?} in column `{column}` is not a non-negative integer")]
    NonNumericValue { path: String, line: usize, column: String, raw: String },

    #[error("{path}: metadata row declares {declared} column(s) but the header names {named}")]
    MetadataColumnMismatch { path: String, declared: usize, named: usize },

    #[error("{path}: file has no data rows")]
    Empty { path: String },
}
