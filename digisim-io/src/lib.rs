//! `digisim-io`: the two external collaborators spec.md §6 names —
//! waveform-file loading and stepped-waveform plotting — kept out of
//! `digisim-core` because neither is part of the simulation kernel.
//!
//! This crate depends on nothing from `digisim-core`. It only produces
//! (`waveform`) and consumes (`plot`) the plain `Vec<(f64, u64)>` /
//! trace-dictionary shapes spec.md §6 specifies as the hand-off contract,
//! so glue code can sit between the two without either crate knowing
//! about the other's types.

pub mod error;
pub mod plot;
pub mod waveform;

pub use error::FormatError;
pub use plot::{PlotError, PlotSurface, SteppedPngPlot, TraceDict};
pub use waveform::{MultiColumnWaveform, Schedule, WaveformSource};
