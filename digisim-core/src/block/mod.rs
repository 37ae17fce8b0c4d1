//! The five block variants and the runtime state each carries between
//! scheduler events.

pub mod clock;
pub mod combinational;
pub mod machine;
pub mod sink;
pub mod source;

use crate::bus::Value;
use crate::scheduler::BlockId;
use crate::time::SimTime;
use crate::trace::Trace;

pub use clock::ClockState;
pub use combinational::CombinationalState;
pub use machine::{MachineKind, MachineState};
pub use sink::SinkState;
pub use source::SourceState;

/// Fields common to every block, independent of its kind.
#[derive(Debug)]
pub struct BlockMeta {
    pub id: BlockId,
    pub label: String,
    pub plot: bool,
}

/// Per-kind runtime state. A block's current bus value and trace buffer
/// are tracked on the enclosing `Block`, not here, since all kinds but
/// `Sink` publish one.
#[derive(Debug)]
pub enum BlockState {
    Source(SourceState),
    Clock(ClockState),
    Combinational(CombinationalState),
    Machine(MachineState),
    Sink(SinkState),
}

/// The ordered, fixed set of labeled trace buffers a block of `state`'s
/// kind produces over a run (spec.md §3's trace-buffer label templates),
/// pre-created at construction so every label is a CSV column even if the
/// process that would record to it never fires during the run.
fn trace_labels(label: &str, state: &BlockState) -> Vec<String> {
    match state {
        BlockState::Source(_) => vec![format!("Input to {label}")],
        BlockState::Clock(_) => vec![format!("Clock {label}")],
        BlockState::Combinational(_) => vec![format!("{label} output")],
        BlockState::Machine(_) => vec![
            format!("Input to {label}"),
            format!("NS of {label}"),
            format!("PS of {label}"),
            format!("output of {label}"),
        ],
        BlockState::Sink(_) => vec![format!("Final Output from {label}")],
    }
}

#[derive(Debug)]
pub struct Block {
    pub meta: BlockMeta,
    pub state: BlockState,
    pub bus_value: u64,
    pub width: u32,
    /// One entry per labeled signal this block's kind records (§3), in
    /// the fixed order `trace_labels` assigns: a single entry for
    /// Source/Clock/Combinational/Sink, four for Moore/Mealy machines
    /// (`Input to`, `NS of`, `PS of`, `output of`).
    traces: Vec<Trace>,
}

impl Block {
    pub fn new(id: BlockId, label: String, plot: bool, state: BlockState, initial: Value, width: u32) -> Self {
        let traces = trace_labels(&label, &state)
            .into_iter()
            .map(|l| Trace::new(l, plot))
            .collect();
        Block {
            meta: BlockMeta { id, label, plot },
            state,
            bus_value: initial,
            width,
            traces,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.state {
            BlockState::Source(_) => "source",
            BlockState::Clock(_) => "clock",
            BlockState::Combinational(_) => "combinational",
            BlockState::Machine(_) => "machine",
            BlockState::Sink(_) => "sink",
        }
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Record into the block's only trace: Source's `"Input to <id>"`,
    /// Clock's `"Clock <id>"`, Combinational's `"<id> output"`, or Sink's
    /// `"Final Output from <id>"`.
    pub fn record_primary(&mut self, t: SimTime, v: Value) {
        debug_assert_eq!(self.traces.len(), 1, "record_primary on a block with more than one trace");
        self.traces[0].record(t, v);
    }

    /// Record a machine's `"Input to <id>"` sample: the packed input
    /// value an NSL cycle observed when it started.
    pub fn record_input(&mut self, t: SimTime, v: Value) {
        self.traces[0].record(t, v);
    }

    /// Record a machine's `"NS of <id>"` sample at NSL commit.
    pub fn record_ns(&mut self, t: SimTime, v: Value) {
        self.traces[1].record(t, v);
    }

    /// Record a machine's `"PS of <id>"` sample at register commit.
    pub fn record_ps(&mut self, t: SimTime, v: Value) {
        self.traces[2].record(t, v);
    }

    /// Record the published output sample: Combinational's `"<id>
    /// output"`, or a machine's `"output of <id>"` at OL commit.
    pub fn record_output(&mut self, t: SimTime, v: Value) {
        let idx = match &self.state {
            BlockState::Combinational(_) => 0,
            BlockState::Machine(_) => 3,
            _ => unreachable!("record_output on a block kind with no output trace"),
        };
        self.traces[idx].record(t, v);
    }
}
