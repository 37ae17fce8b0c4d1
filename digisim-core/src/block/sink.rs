//! Sink: a pure observer that records its packed input on every change.
//! No bus of its own, no fan-out.

use crate::bus::InputPort;

#[derive(Debug)]
pub struct SinkState {
    pub input: InputPort,
}

impl SinkState {
    pub fn new(input: InputPort) -> Self {
        SinkState { input }
    }
}
