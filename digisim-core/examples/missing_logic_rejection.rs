//! A machine wired to a clock but never given a data input, and one wired
//! to data but never bound to a clock, are both rejected by `run` before
//! the scheduler advances a single tick. `moore`/`mealy` already force a
//! caller to supply next-state and output closures at construction time,
//! so the only way "missing logic" can still reach runtime is a dangling
//! connection.

use digisim_core::NetlistBuilder;

fn main() {
    let mut nl = NetlistBuilder::new("unwired_machine");
    let clk = nl.clock(1.0, 0.5, 0, None, false).unwrap();
    let m = nl.moore(1, |ps, _input| ps, |ps| ps, 0, true, 0.1, 0.1, 0.1, None, false).unwrap();
    nl.connect_clock(clk, m).unwrap();
    match nl.run(10.0) {
        Ok(_) => println!("unexpectedly ran with no data input connected"),
        Err(e) => println!("rejected as expected: {e}"),
    }

    let mut nl = NetlistBuilder::new("clockless_machine");
    let src = nl.source(vec![(0.0, 0)], None, false).unwrap();
    let m = nl.moore(1, |ps, _input| ps, |ps| ps, 0, true, 0.1, 0.1, 0.1, None, false).unwrap();
    nl.connect(src, m).unwrap();
    match nl.run(10.0) {
        Ok(_) => println!("unexpectedly ran with no clock bound"),
        Err(e) => println!("rejected as expected: {e}"),
    }
}
