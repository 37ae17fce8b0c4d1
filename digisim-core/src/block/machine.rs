//! Register-backed Moore/Mealy machine: three independently triggered
//! sub-processes (next-state logic, output logic, register commit) that
//! share the machine's present/next state.

use crate::bus::{InputPort, Value};
use crate::gate::TriggerGate;
use crate::scheduler::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineKind {
    Moore,
    Mealy,
}

type NslFn = Box<dyn Fn(Value, Value) -> Value + Send>;
type MooreOlFn = Box<dyn Fn(Value) -> Value + Send>;
type MealyOlFn = Box<dyn Fn(Value, Value) -> Value + Send>;

enum OlFn {
    Moore(MooreOlFn),
    Mealy(MealyOlFn),
}

pub struct MachineState {
    nsl: NslFn,
    ol: OlFn,
    ps: Value,
    ns: Value,
    rising: bool,
    nsl_delay: f64,
    ol_delay: f64,
    register_delay: f64,
    pub input: InputPort,
    pub clock: Option<BlockId>,

    nsl_gate: TriggerGate,
    pending_ns: Option<Value>,

    ol_gate: TriggerGate,
    pending_ol: Option<Value>,

    // The register process is gated like the others but additionally
    // guarded by "ps != ns": an edge with nothing to commit never starts
    // a cycle at all, matching §4.4.4's "if ps != ns" precondition.
    register_busy: bool,
    register_pending: bool,
}

impl std::fmt::Debug for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineState")
            .field("ps", &self.ps)
            .field("ns", &self.ns)
            .field("rising", &self.rising)
            .field("clock", &self.clock)
            .finish()
    }
}

impl MachineState {
    pub fn new_moore(
        nsl: NslFn,
        ol: MooreOlFn,
        start: Value,
        rising: bool,
        nsl_delay: f64,
        ol_delay: f64,
        register_delay: f64,
        input: InputPort,
    ) -> Self {
        MachineState {
            nsl,
            ol: OlFn::Moore(ol),
            ps: start,
            ns: start,
            rising,
            nsl_delay,
            ol_delay,
            register_delay,
            input,
            clock: None,
            nsl_gate: TriggerGate::new(),
            pending_ns: None,
            ol_gate: TriggerGate::new(),
            pending_ol: None,
            register_busy: false,
            register_pending: false,
        }
    }

    pub fn new_mealy(
        nsl: NslFn,
        ol: MealyOlFn,
        start: Value,
        rising: bool,
        nsl_delay: f64,
        ol_delay: f64,
        register_delay: f64,
        input: InputPort,
    ) -> Self {
        MachineState {
            nsl,
            ol: OlFn::Mealy(ol),
            ps: start,
            ns: start,
            rising,
            nsl_delay,
            ol_delay,
            register_delay,
            input,
            clock: None,
            nsl_gate: TriggerGate::new(),
            pending_ns: None,
            ol_gate: TriggerGate::new(),
            pending_ol: None,
            register_busy: false,
            register_pending: false,
        }
    }

    pub fn bind_clock(&mut self, clock: BlockId) {
        self.clock = Some(clock);
    }

    pub fn is_mealy(&self) -> bool {
        matches!(self.ol, OlFn::Mealy(_))
    }

    pub fn ps(&self) -> Value {
        self.ps
    }

    pub fn nsl_delay(&self) -> f64 {
        self.nsl_delay
    }

    pub fn ol_delay(&self) -> f64 {
        self.ol_delay
    }

    pub fn register_delay(&self) -> f64 {
        self.register_delay
    }

    fn compute_ol(&self, bus_value: &impl Fn(BlockId) -> Value) -> Value {
        match &self.ol {
            OlFn::Moore(f) => f(self.ps),
            OlFn::Mealy(f) => f(self.ps, self.input.pack(bus_value)),
        }
    }

    /// Data input (or present-state) changed: start an NSL cycle if one
    /// isn't already in flight. Returns the packed input value the
    /// cycle observed (for the caller to record as `"Input to <id>"`);
    /// the computed next-state is staged internally for commit after
    /// `nsl_delay`.
    pub fn start_nsl(&mut self, bus_value: impl Fn(BlockId) -> Value) -> Option<Value> {
        if self.nsl_gate.notify() {
            let packed = self.input.pack(&bus_value);
            self.pending_ns = Some((self.nsl)(self.ps, packed));
            Some(packed)
        } else {
            None
        }
    }

    /// NSL's delay has elapsed: commit the staged next-state.
    pub fn commit_nsl(&mut self) -> Value {
        let ns = self.pending_ns.take().expect("NSL commit with no pending value");
        self.ns = ns;
        ns
    }

    /// Same as [`start_nsl`](Self::start_nsl), but for a coalesced
    /// trigger that arrived while the previous cycle was in flight.
    pub fn complete_nsl(&mut self, bus_value: impl Fn(BlockId) -> Value) -> Option<Value> {
        if self.nsl_gate.complete() {
            let packed = self.input.pack(&bus_value);
            self.pending_ns = Some((self.nsl)(self.ps, packed));
            Some(packed)
        } else {
            None
        }
    }

    pub fn start_ol(&mut self, bus_value: impl Fn(BlockId) -> Value) -> Option<Value> {
        if self.ol_gate.notify() {
            let y = self.compute_ol(&bus_value);
            self.pending_ol = Some(y);
            Some(y)
        } else {
            None
        }
    }

    pub fn commit_ol(&mut self) -> Value {
        self.pending_ol.take().expect("OL commit with no pending value")
    }

    pub fn complete_ol(&mut self, bus_value: impl Fn(BlockId) -> Value) -> Option<Value> {
        if self.ol_gate.complete() {
            let y = self.compute_ol(&bus_value);
            self.pending_ol = Some(y);
            Some(y)
        } else {
            None
        }
    }

    /// A clock post arrived at `level`. Returns `true` if this is a
    /// selected edge with a pending state change, i.e. a register wake
    /// should be scheduled `register_delay` from now.
    pub fn clock_edge(&mut self, level: u64) -> bool {
        let is_selected_edge = if self.rising { level == 1 } else { level == 0 };
        if !is_selected_edge || self.ps == self.ns {
            return false;
        }
        if self.register_busy {
            self.register_pending = true;
            false
        } else {
            self.register_busy = true;
            true
        }
    }

    /// The register's delay has elapsed: commit `ps := ns`. Returns the
    /// new present-state and whether a coalesced edge (still pending a
    /// real state change) should immediately start another cycle.
    pub fn commit_register(&mut self) -> (Value, bool) {
        self.ps = self.ns;
        let restart = if self.register_pending {
            self.register_pending = false;
            self.ps != self.ns
        } else {
            false
        };
        if !restart {
            self.register_busy = false;
        }
        (self.ps, restart)
    }
}
