//! The netlist builder: constructs blocks, wires them together, validates
//! the result, and drives the scheduler's dispatch loop for `run()`.

use std::collections::{HashMap, HashSet};

use crate::block::{
    Block, BlockState, ClockState, CombinationalState, MachineState, SinkState, SourceState,
};
use crate::bus::{Connection, Endpoint, InputPort, Value};
use crate::error::{ConfigError, DigisimError, NetlistError, SchedulerMisuse};
use crate::scheduler::{BlockId, Phase, Scheduler};
use crate::time::SimTime;
use crate::trace::Trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeKind {
    Data,
    Clock,
}

#[derive(Debug, Clone, Copy)]
struct FanoutEdge {
    consumer: BlockId,
    kind: EdgeKind,
}

/// Accumulated trace data and metadata for one completed run.
pub struct RunReport {
    name: String,
    until: f64,
    traces: Vec<Trace>,
    /// `[start, end)` range into `traces` contributed by each block, in
    /// block-creation order. A Source/Clock/Combinational/Sink block
    /// contributes one trace; a Moore/Mealy machine contributes four
    /// (`"Input to"`, `"NS of"`, `"PS of"`, `"output of"`, in that order).
    block_ranges: Vec<(usize, usize)>,
    any_plot: bool,
    csv_path: Option<std::path::PathBuf>,
}

impl RunReport {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn until(&self) -> f64 {
        self.until
    }

    /// Every recorded trace across every block, in block-creation order
    /// and (within a block) the order `spec.md` §3/§4.4 names its labels —
    /// the column order the CSV dump (§6) writes.
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// The traces contributed by one block, in the order its kind's
    /// process catalog (§4.4) records them.
    pub fn traces_for_block(&self, id: BlockId) -> &[Trace] {
        let (start, end) = self.block_ranges[id.0];
        &self.traces[start..end]
    }

    /// The trace carrying the value a downstream block would observe on
    /// `id`'s bus: the sole trace for Source/Clock/Combinational/Sink, or
    /// `"output of <id>"` for a Moore/Mealy machine.
    pub fn output_trace(&self, id: BlockId) -> &Trace {
        self.traces_for_block(id).last().expect("every block has at least one trace")
    }

    /// Look up a trace by its exact recorded label (e.g. `"PS of Counter"`).
    pub fn trace_labeled(&self, label: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.label() == label)
    }

    pub fn any_plot_enabled(&self) -> bool {
        self.any_plot
    }

    /// Path the CSV dump was written to, if `NetlistBuilder::generate_csv`
    /// was called before `run`.
    pub fn csv_path(&self) -> Option<&std::path::Path> {
        self.csv_path.as_deref()
    }
}

/// Builds and runs a synchronous digital-logic netlist.
pub struct NetlistBuilder {
    name: String,
    blocks: Vec<Block>,
    fanout: Vec<Vec<FanoutEdge>>,
    used_ids: HashSet<String>,
    counters: HashMap<&'static str, usize>,
    ran: bool,
    dump_csv: bool,
}

impl NetlistBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        NetlistBuilder {
            name: name.into(),
            blocks: Vec::new(),
            fanout: Vec::new(),
            used_ids: HashSet::new(),
            counters: HashMap::new(),
            ran: false,
            dump_csv: false,
        }
    }

    /// Request that `run` write a CSV dump of every trace to
    /// `output/<name>.csv` (spec.md §6). Mirrors the original `pydig`
    /// API's opt-in `generateCSV()`: the dump is not written unless asked
    /// for.
    pub fn generate_csv(&mut self) -> &mut Self {
        self.dump_csv = true;
        self
    }

    fn alloc_label(&mut self, kind: &'static str, requested: Option<String>) -> String {
        if let Some(id) = requested {
            if !self.used_ids.contains(&id) {
                self.used_ids.insert(id.clone());
                return id;
            }
            tracing::warn!(requested = %id, "duplicate block id requested, generating a fresh one");
        }
        let counter = self.counters.entry(kind).or_insert(0);
        loop {
            let candidate = format!("{} {}", kind, *counter);
            *counter += 1;
            if !self.used_ids.contains(&candidate) {
                self.used_ids.insert(candidate.clone());
                return candidate;
            }
        }
    }

    fn push_block(&mut self, label: String, plot: bool, state: BlockState, initial: Value, width: u32) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block::new(id, label, plot, state, initial, width));
        self.fanout.push(Vec::new());
        id
    }

    pub fn source(
        &mut self,
        schedule: Vec<(f64, Value)>,
        id: Option<String>,
        plot: bool,
    ) -> Result<BlockId, DigisimError> {
        let label = self.alloc_label("Source", id);
        let (state, width) = SourceState::new(&label, schedule)?;
        let initial = state.initial_value();
        Ok(self.push_block(label, plot, BlockState::Source(state), initial, width))
    }

    pub fn clock(
        &mut self,
        period: f64,
        on_time: f64,
        initial: u64,
        id: Option<String>,
        plot: bool,
    ) -> Result<BlockId, DigisimError> {
        let label = self.alloc_label("Clock", id);
        let state = ClockState::new(&label, period, on_time, initial)?;
        let level = state.level();
        Ok(self.push_block(label, plot, BlockState::Clock(state), level, 1))
    }

    pub fn combinational(
        &mut self,
        max_width: u32,
        f: impl Fn(Value) -> Value + Send + 'static,
        delay: f64,
        initial: Value,
        id: Option<String>,
        plot: bool,
    ) -> Result<BlockId, DigisimError> {
        let label = self.alloc_label("Combinational", id);
        if max_width == 0 {
            return Err(ConfigError::ZeroWidth { id: label }.into());
        }
        if delay < 0.0 {
            return Err(ConfigError::NegativeDelay { id: label, delay: delay.to_string() }.into());
        }
        let state = CombinationalState::new(Box::new(f), delay, InputPort::new());
        Ok(self.push_block(label, plot, BlockState::Combinational(state), initial, max_width))
    }

    pub fn moore(
        &mut self,
        max_width: u32,
        nsl: impl Fn(Value, Value) -> Value + Send + 'static,
        ol: impl Fn(Value) -> Value + Send + 'static,
        start: Value,
        rising: bool,
        nsl_delay: f64,
        ol_delay: f64,
        register_delay: f64,
        id: Option<String>,
        plot: bool,
    ) -> Result<BlockId, DigisimError> {
        let label = self.alloc_label("Moore", id);
        self.check_machine_delays(&label, max_width, nsl_delay, ol_delay, register_delay)?;
        let state = MachineState::new_moore(
            Box::new(nsl),
            Box::new(ol),
            start,
            rising,
            nsl_delay,
            ol_delay,
            register_delay,
            InputPort::new(),
        );
        Ok(self.push_block(label, plot, BlockState::Machine(state), start, max_width))
    }

    pub fn mealy(
        &mut self,
        max_width: u32,
        nsl: impl Fn(Value, Value) -> Value + Send + 'static,
        ol: impl Fn(Value, Value) -> Value + Send + 'static,
        start: Value,
        rising: bool,
        nsl_delay: f64,
        ol_delay: f64,
        register_delay: f64,
        id: Option<String>,
        plot: bool,
    ) -> Result<BlockId, DigisimError> {
        let label = self.alloc_label("Mealy", id);
        self.check_machine_delays(&label, max_width, nsl_delay, ol_delay, register_delay)?;
        let state = MachineState::new_mealy(
            Box::new(nsl),
            Box::new(ol),
            start,
            rising,
            nsl_delay,
            ol_delay,
            register_delay,
            InputPort::new(),
        );
        Ok(self.push_block(label, plot, BlockState::Machine(state), start, max_width))
    }

    fn check_machine_delays(
        &self,
        label: &str,
        max_width: u32,
        nsl_delay: f64,
        ol_delay: f64,
        register_delay: f64,
    ) -> Result<(), ConfigError> {
        if max_width == 0 {
            return Err(ConfigError::ZeroWidth { id: label.to_string() });
        }
        for (name, d) in [("nsl_delay", nsl_delay), ("ol_delay", ol_delay), ("register_delay", register_delay)] {
            if d < 0.0 {
                return Err(ConfigError::NegativeDelay {
                    id: format!("{} ({})", label, name),
                    delay: d.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn output(&mut self, id: Option<String>, plot: bool) -> Result<BlockId, DigisimError> {
        let label = self.alloc_label("Output", id);
        let state = SinkState::new(InputPort::new());
        Ok(self.push_block(label, plot, BlockState::Sink(state), 0, 0))
    }

    fn block_label(&self, id: BlockId) -> String {
        self.blocks[id.0].meta.label.clone()
    }

    fn check_block_id(&self, id: BlockId) -> Result<(), NetlistError> {
        if id.0 >= self.blocks.len() {
            Err(NetlistError::UnknownBlock { id: id.0.to_string() })
        } else {
            Ok(())
        }
    }

    /// Connect a producer (optionally sliced) to a consumer's data input
    /// port. Connections accumulate in call order (§4.3 packing order).
    pub fn connect(&mut self, producer: impl Into<Endpoint>, consumer: BlockId) -> Result<(), DigisimError> {
        let ep = producer.into();
        self.check_block_id(ep.producer)?;
        self.check_block_id(consumer)?;

        let producer_width = self.blocks[ep.producer.0].width;
        let conn = ep.resolve(producer_width);
        if conn.hi > producer_width || conn.lo >= conn.hi {
            return Err(NetlistError::SliceOutOfRange {
                from: self.block_label(ep.producer),
                to: self.block_label(consumer),
                lo: conn.lo,
                hi: conn.hi,
                width: producer_width,
            }
            .into());
        }

        self.push_input_connection(consumer, conn)?;
        self.fanout[ep.producer.0].push(FanoutEdge { consumer, kind: EdgeKind::Data });
        Ok(())
    }

    fn push_input_connection(&mut self, consumer: BlockId, conn: Connection) -> Result<(), NetlistError> {
        let label = self.block_label(consumer);
        let port = match &mut self.blocks[consumer.0].state {
            BlockState::Combinational(c) => &mut c.input,
            BlockState::Machine(m) => &mut m.input,
            BlockState::Sink(s) => &mut s.input,
            BlockState::Source(_) | BlockState::Clock(_) => {
                return Err(NetlistError::UnconnectedInput { id: label });
            }
        };
        let new_total = port.total_width() + conn.width;
        if new_total > Value::BITS {
            return Err(NetlistError::InputWidthOverflow { id: label, got: new_total, max: Value::BITS });
        }
        port.push(conn);
        Ok(())
    }

    /// Bind a clock block to a machine's dedicated clock port.
    pub fn connect_clock(&mut self, clock: BlockId, machine: BlockId) -> Result<(), DigisimError> {
        self.check_block_id(clock)?;
        self.check_block_id(machine)?;
        if !matches!(self.blocks[clock.0].state, BlockState::Clock(_)) {
            return Err(NetlistError::NotAClock { id: self.block_label(clock) }.into());
        }
        match &mut self.blocks[machine.0].state {
            BlockState::Machine(m) => m.bind_clock(clock),
            _ => return Err(NetlistError::NotAMachine { id: self.block_label(machine) }.into()),
        }
        self.fanout[clock.0].push(FanoutEdge { consumer: machine, kind: EdgeKind::Clock });
        Ok(())
    }

    fn validate_connections(&self) -> Result<(), NetlistError> {
        for block in &self.blocks {
            match &block.state {
                BlockState::Source(_) | BlockState::Clock(_) => {}
                BlockState::Combinational(c) => {
                    if c.input.is_empty() {
                        return Err(NetlistError::UnconnectedInput { id: block.meta.label.clone() });
                    }
                }
                BlockState::Machine(m) => {
                    if m.input.is_empty() {
                        return Err(NetlistError::UnconnectedInput { id: block.meta.label.clone() });
                    }
                    if m.clock.is_none() {
                        return Err(NetlistError::MissingClock { id: block.meta.label.clone() });
                    }
                }
                BlockState::Sink(s) => {
                    if s.input.is_empty() {
                        return Err(NetlistError::UnconnectedInput { id: block.meta.label.clone() });
                    }
                }
            }
        }
        Ok(())
    }

    /// Detect directed cycles restricted to the subgraph of combinational
    /// blocks whose propagation delay is exactly zero (§4.4.4, §5).
    fn validate_no_zero_delay_cycles(&self) -> Result<(), NetlistError> {
        let mut zero_delay: HashSet<usize> = HashSet::new();
        for (idx, block) in self.blocks.iter().enumerate() {
            if let BlockState::Combinational(c) = &block.state {
                if c.delay() == 0.0 {
                    zero_delay.insert(idx);
                }
            }
        }

        let mut edges: HashMap<usize, Vec<usize>> = HashMap::new();
        for &consumer_idx in &zero_delay {
            let conns: &[Connection] = match &self.blocks[consumer_idx].state {
                BlockState::Combinational(c) => c.input.connections(),
                _ => unreachable!(),
            };
            for conn in conns {
                if zero_delay.contains(&conn.producer.0) {
                    edges.entry(conn.producer.0).or_default().push(consumer_idx);
                }
            }
        }

        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            White,
            Gray,
            Black,
        }
        let mut color: HashMap<usize, Color> = zero_delay.iter().map(|&n| (n, Color::White)).collect();

        fn visit(
            node: usize,
            edges: &HashMap<usize, Vec<usize>>,
            color: &mut HashMap<usize, Color>,
        ) -> Option<usize> {
            color.insert(node, Color::Gray);
            if let Some(next_nodes) = edges.get(&node) {
                for &next in next_nodes {
                    match color.get(&next) {
                        Some(Color::Gray) => return Some(next),
                        Some(Color::White) => {
                            if let Some(c) = visit(next, edges, color) {
                                return Some(c);
                            }
                        }
                        _ => {}
                    }
                }
            }
            color.insert(node, Color::Black);
            None
        }

        let nodes: Vec<usize> = zero_delay.into_iter().collect();
        for node in nodes {
            if color.get(&node) == Some(&Color::White) {
                if let Some(culprit) = visit(node, &edges, &mut color) {
                    return Err(NetlistError::CombinationalCycle { id: self.blocks[culprit].meta.label.clone() });
                }
            }
        }
        Ok(())
    }

    /// Run the netlist from `t = 0` up to (but not including) `until`.
    pub fn run(&mut self, until: f64) -> Result<RunReport, DigisimError> {
        if self.ran {
            return Err(SchedulerMisuse::AlreadyRun.into());
        }
        if self.blocks.is_empty() {
            return Err(SchedulerMisuse::EmptyNetlist.into());
        }
        if until <= 0.0 {
            return Err(SchedulerMisuse::NonAdvancingHorizon { now: "0".to_string(), until: until.to_string() }.into());
        }
        self.validate_connections()?;
        self.validate_no_zero_delay_cycles()?;
        self.ran = true;

        let mut sched = Scheduler::new();
        for idx in 0..self.blocks.len() {
            match &self.blocks[idx].state {
                BlockState::Source(s) => {
                    if let Some(t) = s.next_time() {
                        sched.schedule(t, BlockId(idx), Phase::Play);
                    }
                }
                BlockState::Clock(c) => {
                    sched.schedule(SimTime::ZERO + c.dwell(), BlockId(idx), Phase::Tick);
                }
                _ => {}
            }
        }
        // Initial OL pass for every machine, so its output is defined
        // before the first clock edge (§4.4.4).
        let initial_values: Vec<Value> = self.blocks.iter().map(|b| b.bus_value).collect();
        for idx in 0..self.blocks.len() {
            if matches!(self.blocks[idx].state, BlockState::Machine(_)) {
                let id = BlockId(idx);
                let bus_value = |bid: BlockId| initial_values[bid.0];
                let start = match &mut self.blocks[idx].state {
                    BlockState::Machine(m) => m.start_ol(bus_value),
                    _ => unreachable!(),
                };
                if start.is_some() {
                    let d = match &self.blocks[idx].state {
                        BlockState::Machine(m) => m.ol_delay(),
                        _ => unreachable!(),
                    };
                    sched.schedule(SimTime::ZERO + d, id, Phase::Ol);
                }
            }
        }

        let until_time = SimTime::new(until);
        loop {
            let next_time = match sched.peek_time() {
                Some(t) => t,
                None => break,
            };
            if next_time >= until_time {
                break;
            }
            let event = sched.pop().expect("peeked event disappeared");
            self.dispatch(event.block, event.phase, &mut sched);
        }

        let mut report = self.build_report(until);
        if self.dump_csv {
            match crate::csv::write_dump(&report) {
                Ok(path) => report.csv_path = Some(path),
                Err(e) => tracing::warn!(error = %e, "failed to write CSV dump"),
            }
        }
        Ok(report)
    }

    fn dispatch(&mut self, id: BlockId, phase: Phase, sched: &mut Scheduler) {
        let mut values: Vec<Value> = self.blocks.iter().map(|b| b.bus_value).collect();
        match phase {
            Phase::Play => self.dispatch_play(id, &mut values, sched),
            Phase::Tick => self.dispatch_tick(id, &mut values, sched),
            Phase::Eval => self.dispatch_eval(id, &mut values, sched),
            Phase::Nsl => self.dispatch_nsl(id, &mut values, sched),
            Phase::Ol => self.dispatch_ol(id, &mut values, sched),
            Phase::Register => self.dispatch_register(id, sched),
        }
    }

    fn dispatch_play(&mut self, id: BlockId, values: &mut Vec<Value>, sched: &mut Scheduler) {
        let now = sched.now();
        let v = match &mut self.blocks[id.0].state {
            BlockState::Source(s) => s.play(),
            _ => unreachable!("Play event on non-source block"),
        };
        self.blocks[id.0].bus_value = v;
        values[id.0] = v;
        self.blocks[id.0].record_primary(now, v);
        tracing::debug!(id = %self.blocks[id.0].meta.label, %now, value = v, "Input to");

        self.post_fanout(id, &values[..], sched);

        let next = match &self.blocks[id.0].state {
            BlockState::Source(s) => s.next_time(),
            _ => unreachable!(),
        };
        if let Some(t) = next {
            sched.schedule(t, id, Phase::Play);
        }
    }

    fn dispatch_tick(&mut self, id: BlockId, values: &mut Vec<Value>, sched: &mut Scheduler) {
        let now = sched.now();
        let level = match &mut self.blocks[id.0].state {
            BlockState::Clock(c) => c.tick(),
            _ => unreachable!("Tick event on non-clock block"),
        };
        self.blocks[id.0].bus_value = level;
        values[id.0] = level;
        self.blocks[id.0].record_primary(now, level);
        tracing::debug!(id = %self.blocks[id.0].meta.label, %now, value = level, "Clock");

        self.post_fanout(id, &values[..], sched);

        let dwell = match &self.blocks[id.0].state {
            BlockState::Clock(c) => c.dwell(),
            _ => unreachable!(),
        };
        sched.schedule(now + dwell, id, Phase::Tick);
    }

    fn dispatch_eval(&mut self, id: BlockId, values: &mut Vec<Value>, sched: &mut Scheduler) {
        let now = sched.now();
        let v = match &mut self.blocks[id.0].state {
            BlockState::Combinational(c) => c.take_pending(),
            _ => unreachable!("Eval event on non-combinational block"),
        };
        self.blocks[id.0].bus_value = v;
        values[id.0] = v;
        self.blocks[id.0].record_output(now, v);
        tracing::debug!(id = %self.blocks[id.0].meta.label, %now, value = v, "output");

        self.post_fanout(id, &values[..], sched);

        let bus_value = |bid: BlockId| values[bid.0];
        let restart = match &mut self.blocks[id.0].state {
            BlockState::Combinational(c) => c.on_complete(bus_value),
            _ => unreachable!(),
        };
        if restart.is_some() {
            let delay = match &self.blocks[id.0].state {
                BlockState::Combinational(c) => c.delay(),
                _ => unreachable!(),
            };
            sched.schedule(now + delay, id, Phase::Eval);
        }
    }

    fn dispatch_nsl(&mut self, id: BlockId, values: &mut Vec<Value>, sched: &mut Scheduler) {
        let now = sched.now();
        let ns = match &mut self.blocks[id.0].state {
            BlockState::Machine(m) => m.commit_nsl(),
            _ => unreachable!("Nsl event on non-machine block"),
        };
        self.blocks[id.0].record_ns(now, ns);
        tracing::debug!(id = %self.blocks[id.0].meta.label, %now, value = ns, "NS of");

        let is_mealy = match &self.blocks[id.0].state {
            BlockState::Machine(m) => m.is_mealy(),
            _ => unreachable!(),
        };
        if is_mealy {
            let bus_value = |bid: BlockId| values[bid.0];
            let start = match &mut self.blocks[id.0].state {
                BlockState::Machine(m) => m.start_ol(bus_value),
                _ => unreachable!(),
            };
            if start.is_some() {
                let d = match &self.blocks[id.0].state {
                    BlockState::Machine(m) => m.ol_delay(),
                    _ => unreachable!(),
                };
                sched.schedule(now + d, id, Phase::Ol);
            }
        }

        let bus_value = |bid: BlockId| values[bid.0];
        let restart = match &mut self.blocks[id.0].state {
            BlockState::Machine(m) => m.complete_nsl(bus_value),
            _ => unreachable!(),
        };
        if let Some(packed) = restart {
            self.blocks[id.0].record_input(now, packed);
            let d = match &self.blocks[id.0].state {
                BlockState::Machine(m) => m.nsl_delay(),
                _ => unreachable!(),
            };
            sched.schedule(now + d, id, Phase::Nsl);
        }
    }

    fn dispatch_ol(&mut self, id: BlockId, values: &mut Vec<Value>, sched: &mut Scheduler) {
        let now = sched.now();
        let y = match &mut self.blocks[id.0].state {
            BlockState::Machine(m) => m.commit_ol(),
            _ => unreachable!("Ol event on non-machine block"),
        };
        self.blocks[id.0].bus_value = y;
        values[id.0] = y;
        self.blocks[id.0].record_output(now, y);
        tracing::debug!(id = %self.blocks[id.0].meta.label, %now, value = y, "output of");

        self.post_fanout(id, &values[..], sched);

        let bus_value = |bid: BlockId| values[bid.0];
        let restart = match &mut self.blocks[id.0].state {
            BlockState::Machine(m) => m.complete_ol(bus_value),
            _ => unreachable!(),
        };
        if restart.is_some() {
            let d = match &self.blocks[id.0].state {
                BlockState::Machine(m) => m.ol_delay(),
                _ => unreachable!(),
            };
            sched.schedule(now + d, id, Phase::Ol);
        }
    }

    fn dispatch_register(&mut self, id: BlockId, sched: &mut Scheduler) {
        let now = sched.now();
        let (ps, restart_register) = match &mut self.blocks[id.0].state {
            BlockState::Machine(m) => m.commit_register(),
            _ => unreachable!("Register event on non-machine block"),
        };
        self.blocks[id.0].record_ps(now, ps);
        tracing::debug!(id = %self.blocks[id.0].meta.label, %now, value = ps, "PS of");

        let values: Vec<Value> = self.blocks.iter().map(|b| b.bus_value).collect();

        let bus_value = |bid: BlockId| values[bid.0];
        let ol_start = match &mut self.blocks[id.0].state {
            BlockState::Machine(m) => m.start_ol(bus_value),
            _ => unreachable!(),
        };
        if ol_start.is_some() {
            let d = match &self.blocks[id.0].state {
                BlockState::Machine(m) => m.ol_delay(),
                _ => unreachable!(),
            };
            sched.schedule(now + d, id, Phase::Ol);
        }

        let bus_value = |bid: BlockId| values[bid.0];
        let nsl_start = match &mut self.blocks[id.0].state {
            BlockState::Machine(m) => m.start_nsl(bus_value),
            _ => unreachable!(),
        };
        if let Some(packed) = nsl_start {
            self.blocks[id.0].record_input(now, packed);
            let d = match &self.blocks[id.0].state {
                BlockState::Machine(m) => m.nsl_delay(),
                _ => unreachable!(),
            };
            sched.schedule(now + d, id, Phase::Nsl);
        }

        if restart_register {
            let d = match &self.blocks[id.0].state {
                BlockState::Machine(m) => m.register_delay(),
                _ => unreachable!(),
            };
            sched.schedule(now + d, id, Phase::Register);
        }
    }

    fn post_fanout(&mut self, producer: BlockId, values: &[Value], sched: &mut Scheduler) {
        let edges = self.fanout[producer.0].clone();
        for edge in edges {
            match edge.kind {
                EdgeKind::Data => self.notify_data(edge.consumer, values, sched),
                EdgeKind::Clock => self.notify_clock(values[producer.0], edge.consumer, sched),
            }
        }
    }

    fn notify_data(&mut self, consumer: BlockId, values: &[Value], sched: &mut Scheduler) {
        let sink_record = if let BlockState::Sink(s) = &self.blocks[consumer.0].state {
            let bus_value = |bid: BlockId| values[bid.0];
            Some(s.input.pack(bus_value))
        } else {
            None
        };

        let now = sched.now();
        let bus_value = |bid: BlockId| values[bid.0];
        let nsl_started = match &mut self.blocks[consumer.0].state {
            BlockState::Combinational(c) => {
                if c.on_notify(bus_value).is_some() {
                    let delay = c.delay();
                    sched.schedule(now + delay, consumer, Phase::Eval);
                }
                None
            }
            BlockState::Machine(m) => m.start_nsl(bus_value),
            _ => None,
        };
        if let Some(packed) = nsl_started {
            self.blocks[consumer.0].record_input(now, packed);
            let d = match &self.blocks[consumer.0].state {
                BlockState::Machine(m) => m.nsl_delay(),
                _ => unreachable!(),
            };
            sched.schedule(now + d, consumer, Phase::Nsl);
        }

        if let Some(packed) = sink_record {
            self.blocks[consumer.0].record_primary(now, packed);
            tracing::debug!(id = %self.blocks[consumer.0].meta.label, %now, value = packed, "Final Output from");
        }
    }

    fn notify_clock(&mut self, level: Value, consumer: BlockId, sched: &mut Scheduler) {
        match &mut self.blocks[consumer.0].state {
            BlockState::Machine(m) => {
                if m.clock_edge(level) {
                    let d = m.register_delay();
                    let now = sched.now();
                    sched.schedule(now + d, consumer, Phase::Register);
                }
            }
            _ => {}
        }
    }

    fn build_report(&mut self, until: f64) -> RunReport {
        let any_plot = self.blocks.iter().any(|b| b.meta.plot);
        let mut traces = Vec::new();
        let mut block_ranges = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let start = traces.len();
            traces.extend(block.traces().iter().cloned());
            block_ranges.push((start, traces.len()));
        }
        RunReport { name: self.name.clone(), until, traces, block_ranges, any_plot, csv_path: None }
    }
}
