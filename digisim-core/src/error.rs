//! Error taxonomy for the simulation kernel.
//!
//! Three kinds, matching the three ways a caller can misuse or
//! misconfigure the simulator: a bad block configuration, a bad netlist
//! topology, and a bad call sequence against the scheduler itself.

use thiserror::Error;

/// A block was constructed with parameters that cannot describe a valid
/// circuit element (bad bit widths, bad timing parameters, ...).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("block `{id}`: width must be nonzero")]
    ZeroWidth { id: String },

    #[error("block `{id}`: delay must be non-negative, got {delay}")]
    NegativeDelay { id: String, delay: String },

    #[error("clock `{id}`: period must be positive, got {period}")]
    NonPositivePeriod { id: String, period: String },

    #[error("clock `{id}`: duty cycle must lie in (0, period), got duty={duty} period={period}")]
    DutyOutOfRange { id: String, duty: String, period: String },

    #[error("block `{id}`: duplicate identifier, already used by another block")]
    DuplicateId { id: String },

    #[error("source `{id}`: schedule is empty")]
    EmptySchedule { id: String },

    #[error("source `{id}`: schedule is not sorted by non-decreasing time")]
    UnsortedSchedule { id: String },
}

/// The netlist, as connected, cannot be run.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetlistError {
    #[error("block `{id}` has an input port that was never connected")]
    UnconnectedInput { id: String },

    #[error("connection from `{from}` to `{to}` references a bit slice [{lo},{hi}) outside the producer's width {width}")]
    SliceOutOfRange {
        from: String,
        to: String,
        lo: u32,
        hi: u32,
        width: u32,
    },

    #[error("unknown block id `{id}` referenced during connection")]
    UnknownBlock { id: String },

    #[error("block `{id}` is not a machine; clock ports can only be bound to machines")]
    NotAMachine { id: String },

    #[error("block `{id}` is not a clock; clock ports must be bound to a clock block")]
    NotAClock { id: String },

    #[error("machine `{id}` has no clock bound before run")]
    MissingClock { id: String },

    #[error("combined input width for block `{id}` ({got} bits) exceeds the kernel's native integer width ({max} bits)")]
    InputWidthOverflow { id: String, got: u32, max: u32 },

    #[error("zero-delay combinational feedback cycle detected, involving block `{id}`")]
    CombinationalCycle { id: String },
}

/// The scheduler itself was driven incorrectly (as opposed to the netlist
/// being malformed).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SchedulerMisuse {
    #[error("run_until called with a horizon ({until}) not after the current time ({now})")]
    NonAdvancingHorizon { now: String, until: String },

    #[error("netlist was run twice; a netlist can only be run once")]
    AlreadyRun,

    #[error("attempted to run a netlist with no blocks")]
    EmptyNetlist,
}

/// The union of every error a `digisim-core` call can return.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DigisimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Netlist(#[from] NetlistError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerMisuse),
}
