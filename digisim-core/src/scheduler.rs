//! The event scheduler: a time-ordered priority queue with FIFO
//! tie-breaking, driving every block's state transitions.
//!
//! Modeled directly on a discrete-event network simulator's engine: a
//! `BinaryHeap` keyed by `(time, sequence)` with the comparison reversed so
//! the smallest time (and, within a time, the smallest sequence number)
//! pops first. There is no per-event cancellation; a block that no longer
//! cares about a previously scheduled wakeup simply ignores it when it
//! fires (see `netlist::Netlist::dispatch`).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::time::SimTime;

/// Identifies a block within a netlist by its position in the builder's
/// block vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub usize);

/// Which sub-process of a block a wakeup is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Combinational block: re-evaluate its function over current inputs.
    Eval,
    /// Moore/Mealy machine: re-run next-state logic.
    Nsl,
    /// Moore/Mealy machine: re-run output logic.
    Ol,
    /// Moore/Mealy machine: commit the pending next-state into present-state.
    Register,
    /// Clock: toggle and reschedule itself.
    Tick,
    /// Source: advance to the next scheduled sample.
    Play,
}

#[derive(Debug, Clone)]
pub struct WakeEvent {
    pub time: SimTime,
    seq: u64,
    pub block: BlockId,
    pub phase: Phase,
}

impl PartialEq for WakeEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for WakeEvent {}

impl PartialOrd for WakeEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WakeEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest
        // (time, seq) pair to come out first.
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The kernel's single event queue plus the current simulated time.
pub struct Scheduler {
    queue: BinaryHeap<WakeEvent>,
    next_seq: u64,
    now: SimTime,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            next_seq: 0,
            now: SimTime::ZERO,
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `block`'s `phase` to run at `time`. `time` may equal the
    /// current time (same-instant fan-out) or be in the future; it must
    /// never be in the past.
    pub fn schedule(&mut self, time: SimTime, block: BlockId, phase: Phase) {
        debug_assert!(
            time >= self.now,
            "scheduled an event in the past: {} < {}",
            time,
            self.now
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(WakeEvent { time, seq, block, phase });
        tracing::trace!(?block, ?phase, %time, "scheduled event");
    }

    /// Pop the next event in (time, seq) order, advancing `now` to its
    /// time. Returns `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<WakeEvent> {
        let event = self.queue.pop()?;
        self.now = event.time;
        tracing::debug!(block = ?event.block, phase = ?event.phase, time = %event.time, "dispatching event");
        Some(event)
    }

    /// Peek at the time of the next event without removing it.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|e| e.time)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_pop_in_time_order() {
        let mut s = Scheduler::new();
        s.schedule(SimTime::new(2.0), BlockId(0), Phase::Eval);
        s.schedule(SimTime::new(1.0), BlockId(1), Phase::Tick);
        s.schedule(SimTime::new(1.5), BlockId(2), Phase::Play);

        let first = s.pop().unwrap();
        assert_eq!(first.block, BlockId(1));
        let second = s.pop().unwrap();
        assert_eq!(second.block, BlockId(2));
        let third = s.pop().unwrap();
        assert_eq!(third.block, BlockId(0));
        assert!(s.pop().is_none());
    }

    #[test]
    fn same_time_events_pop_fifo() {
        let mut s = Scheduler::new();
        s.schedule(SimTime::new(1.0), BlockId(10), Phase::Eval);
        s.schedule(SimTime::new(1.0), BlockId(20), Phase::Eval);
        s.schedule(SimTime::new(1.0), BlockId(30), Phase::Eval);

        assert_eq!(s.pop().unwrap().block, BlockId(10));
        assert_eq!(s.pop().unwrap().block, BlockId(20));
        assert_eq!(s.pop().unwrap().block, BlockId(30));
    }

    #[test]
    fn now_tracks_last_popped_event() {
        let mut s = Scheduler::new();
        assert_eq!(s.now(), SimTime::ZERO);
        s.schedule(SimTime::new(3.0), BlockId(0), Phase::Eval);
        s.pop();
        assert_eq!(s.now(), SimTime::new(3.0));
    }
}
