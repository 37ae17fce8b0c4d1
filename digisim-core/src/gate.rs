//! Single-slot coalescing trigger gate.
//!
//! Every block process in this kernel is, conceptually, a loop of the
//! shape `loop { wait_for_trigger(); compute(); schedule_delay(); commit(); }`
//! where `wait_for_trigger` drains a notification channel that holds at
//! most one pending wakeup: if the process is busy computing when a second
//! trigger arrives, the two triggers coalesce into a single subsequent
//! re-run rather than queuing up. `TriggerGate` is that channel, shared by
//! Combinational, NSL, OL, and Register processes alike.

#[derive(Debug, Default)]
pub struct TriggerGate {
    busy: bool,
    pending: bool,
}

impl TriggerGate {
    pub fn new() -> Self {
        TriggerGate { busy: false, pending: false }
    }

    /// A new trigger has arrived. Returns `true` if the caller should start
    /// a compute/delay/commit cycle right now, `false` if one is already in
    /// flight (the trigger was coalesced into it).
    pub fn notify(&mut self) -> bool {
        if self.busy {
            self.pending = true;
            false
        } else {
            self.busy = true;
            true
        }
    }

    /// The in-flight cycle has committed. Returns `true` if a coalesced
    /// trigger arrived meanwhile and the caller should immediately start
    /// another cycle; `false` if the gate is now idle.
    pub fn complete(&mut self) -> bool {
        if self.pending {
            self.pending = false;
            true
        } else {
            self.busy = false;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_trigger_runs_once() {
        let mut gate = TriggerGate::new();
        assert!(gate.notify());
        assert!(!gate.complete());
    }

    #[test]
    fn overlapping_triggers_coalesce() {
        let mut gate = TriggerGate::new();
        assert!(gate.notify());
        assert!(!gate.notify());
        assert!(!gate.notify());
        assert!(gate.complete());
        assert!(!gate.complete());
    }

    #[test]
    fn trigger_after_completion_starts_fresh_cycle() {
        let mut gate = TriggerGate::new();
        assert!(gate.notify());
        assert!(!gate.complete());
        assert!(gate.notify());
        assert!(!gate.complete());
    }
}
