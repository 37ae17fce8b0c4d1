//! Combinational: a pure function of its packed input, published after a
//! fixed propagation delay. Overlapping re-triggers coalesce via a
//! single-slot `TriggerGate`.

use crate::bus::{InputPort, Value};
use crate::gate::TriggerGate;

pub struct CombinationalState {
    f: Box<dyn Fn(Value) -> Value + Send>,
    delay: f64,
    pub input: InputPort,
    gate: TriggerGate,
    pending: Option<Value>,
}

impl std::fmt::Debug for CombinationalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinationalState")
            .field("delay", &self.delay)
            .field("input", &self.input)
            .field("gate", &self.gate)
            .field("pending", &self.pending)
            .finish()
    }
}

impl CombinationalState {
    pub fn new(f: Box<dyn Fn(Value) -> Value + Send>, delay: f64, input: InputPort) -> Self {
        CombinationalState { f, delay, input, gate: TriggerGate::new(), pending: None }
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// A fan-in notification arrived. If this starts a new compute/delay
    /// cycle, evaluate `f` now (over the input as observed at trigger time)
    /// and return the value to publish once `delay` elapses.
    pub fn on_notify(&mut self, bus_value: impl Fn(crate::scheduler::BlockId) -> Value) -> Option<Value> {
        if self.gate.notify() {
            let v = (self.f)(self.input.pack(bus_value));
            self.pending = Some(v);
            Some(v)
        } else {
            None
        }
    }

    /// The pending value's delay has elapsed; take it to publish.
    pub fn take_pending(&mut self) -> Value {
        self.pending.take().expect("eval fired with no pending value")
    }

    /// The in-flight cycle has committed. Returns the next value to
    /// schedule if a coalesced trigger arrived meanwhile.
    pub fn on_complete(&mut self, bus_value: impl Fn(crate::scheduler::BlockId) -> Value) -> Option<Value> {
        if self.gate.complete() {
            let v = (self.f)(self.input.pack(bus_value));
            self.pending = Some(v);
            Some(v)
        } else {
            None
        }
    }
}
