//! Per-block trace buffer: a time-stamped sample list for one signal.

use crate::bus::Value;
use crate::time::SimTime;

#[derive(Debug, Clone)]
pub struct Trace {
    label: String,
    plot: bool,
    samples: Vec<(SimTime, Value)>,
}

impl Trace {
    pub fn new(label: impl Into<String>, plot: bool) -> Self {
        Trace { label: label.into(), plot, samples: Vec::new() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn plot_enabled(&self) -> bool {
        self.plot
    }

    pub fn record(&mut self, t: SimTime, v: Value) {
        self.samples.push((t, v));
    }

    pub fn samples(&self) -> &[(SimTime, Value)] {
        &self.samples
    }
}
