//! End-to-end scenarios and cross-cutting properties for the simulation
//! kernel, built from whole netlists rather than individual block units.

use digisim_core::trace::Trace;
use digisim_core::{NetlistBuilder, Tap};

/// The value a trace was holding at time `t`: the payload of its last
/// recorded sample with `sample_time <= t`, or 0 if `t` precedes every
/// sample. This is the same forward-fill rule the CSV dump uses, applied
/// at an arbitrary query point instead of the union of all sample times.
fn value_at(trace: &Trace, t: f64) -> u64 {
    let mut last = 0u64;
    for &(st, v) in trace.samples() {
        if st.as_f64() <= t {
            last = v;
        } else {
            break;
        }
    }
    last
}

/// Mod-4 counter driving a PWM-style comparator against a held source
/// value. Exercises Moore machines, clocks, and combinational logic fed
/// by both a register output and an external source in one netlist.
#[test]
fn mod4_counter_drives_pwm_comparator() {
    let mut nl = NetlistBuilder::new("mod4_pwm");
    let src = nl.source(vec![(0.0, 0b0101), (10.0, 0b1011)], None, false).unwrap();
    let clk = nl.clock(1.0, 0.5, 0, None, false).unwrap();

    let counter = nl
        .moore(
            2,
            |ps, _input| (ps + 1) % 4,
            |ps| ps,
            0,
            true,
            0.01,
            0.01,
            0.01,
            None,
            false,
        )
        .unwrap();
    nl.connect(src.tap(0, 1), counter).unwrap();
    nl.connect_clock(clk, counter).unwrap();

    let cmp = nl
        .combinational(1, |x| if (x & 3) > (x >> 2) { 1 } else { 0 }, 0.05, 0, None, false)
        .unwrap();
    nl.connect(src.tap(0, 2), cmp).unwrap();
    nl.connect(counter, cmp).unwrap();

    let sink = nl.output(None, false).unwrap();
    nl.connect(cmp, sink).unwrap();

    let report = nl.run(8.0).unwrap();
    let cmp_trace = report.output_trace(cmp);

    // Counter cycles 0,1,2,3,0,... every clock period; the comparator is
    // high only while the counter reads 0 (source's low two bits hold 1
    // for the whole run), i.e. one quarter of the time.
    assert_eq!(value_at(cmp_trace, 0.3), 1);
    assert_eq!(value_at(cmp_trace, 0.9), 0);
    assert_eq!(value_at(cmp_trace, 1.9), 0);
    assert_eq!(value_at(cmp_trace, 2.9), 0);
    assert_eq!(value_at(cmp_trace, 4.9), 1);
    assert_eq!(value_at(cmp_trace, 5.9), 0);
}

/// A set-reset latch built from two cross-coupled NOR gates: pure
/// combinational blocks whose inputs include each other's own output.
/// Exercises the zero-delay-cycle check's tolerance for positive-delay
/// feedback and the gate's coalescing of repeated wake-ups.
#[test]
fn sr_latch_from_cross_coupled_nors() {
    let mut nl = NetlistBuilder::new("sr_latch");
    // packed source value = S*2 + R
    let src = nl
        .source(
            vec![(0.0, 0), (1.0, 2), (2.5, 0), (4.0, 1), (5.5, 0)],
            None,
            false,
        )
        .unwrap();

    let nor = |packed: u64| if packed == 0 { 1 } else { 0 };
    let q = nl.combinational(2, nor, 0.1, 0, None, false).unwrap();
    let qbar = nl.combinational(2, nor, 0.1, 1, None, false).unwrap();

    // Q = NOR(R, Qbar)
    nl.connect(src.tap(0, 1), q).unwrap();
    nl.connect(qbar, q).unwrap();
    // Qbar = NOR(S, Q)
    nl.connect(src.tap(1, 2), qbar).unwrap();
    nl.connect(q, qbar).unwrap();

    let report = nl.run(8.0).unwrap();
    let q_trace = report.output_trace(q);
    let qbar_trace = report.output_trace(qbar);

    let settled_points = [0.9, 2.4, 3.9, 5.4, 7.9];
    for &t in &settled_points {
        let qv = value_at(q_trace, t);
        let qbarv = value_at(qbar_trace, t);
        assert_eq!(qv + qbarv, 1, "Q and ~Q must be complementary at t={t}");
    }

    assert_eq!(value_at(q_trace, 0.9), 0); // reset state
    assert_eq!(value_at(q_trace, 2.4), 1); // set by S pulse at t=1
    assert_eq!(value_at(q_trace, 3.9), 1); // held through S=0,R=0
    assert_eq!(value_at(q_trace, 5.4), 0); // reset by R pulse at t=4
    assert_eq!(value_at(q_trace, 7.9), 0); // held
}

/// A level-sensitive D-latch expressed as a single combinational block
/// whose own output feeds back as one of its inputs: transparent while
/// the clock input is high, holding otherwise.
#[test]
fn level_sensitive_d_latch() {
    let mut nl = NetlistBuilder::new("d_latch");
    let d = nl.source(vec![(0.0, 0), (1.0, 1), (3.0, 0), (5.0, 1)], None, false).unwrap();
    let clk = nl.clock(4.0, 2.0, 0, None, false).unwrap();

    let latch = nl
        .combinational(
            1,
            |packed| {
                let d = packed & 1;
                let clk = (packed >> 1) & 1;
                let q = (packed >> 2) & 1;
                if clk == 1 {
                    d
                } else {
                    q
                }
            },
            0.1,
            0,
            None,
            false,
        )
        .unwrap();
    nl.connect(d, latch).unwrap();
    nl.connect(clk, latch).unwrap();
    nl.connect(latch, latch).unwrap();

    let report = nl.run(8.0).unwrap();
    let trace = report.output_trace(latch);

    assert_eq!(value_at(trace, 1.5), 0); // clock low, holds reset value
    assert_eq!(value_at(trace, 2.5), 1); // clock high, transparent to D=1
    assert_eq!(value_at(trace, 3.5), 0); // clock high, transparent to D=0
    assert_eq!(value_at(trace, 5.5), 0); // clock low, holds last latched value
    assert_eq!(value_at(trace, 6.5), 1); // clock high again, transparent to D=1
}

/// Two sources packed into one combinational input: connection order
/// fixes bit position, first connection occupies the low bits.
#[test]
fn parallel_sources_pack_lsb_first() {
    let mut nl = NetlistBuilder::new("packing");
    let a = nl.source(vec![(0.0, 1), (2.0, 2), (4.0, 3)], None, false).unwrap();
    let b = nl.source(vec![(0.0, 0), (2.0, 1), (4.0, 2)], None, false).unwrap();

    let identity = nl.combinational(4, |x| x, 0.05, 0, None, false).unwrap();
    nl.connect(a, identity).unwrap();
    nl.connect(b, identity).unwrap();

    let report = nl.run(6.0).unwrap();
    let trace = report.output_trace(identity);

    assert_eq!(value_at(trace, 0.5), 1 + (0 << 2));
    assert_eq!(value_at(trace, 2.5), 2 + (1 << 2));
    assert_eq!(value_at(trace, 4.5), 3 + (2 << 2));
}

/// One producer's bus sliced out to two independent sinks.
#[test]
fn output_slicing_to_multiple_sinks() {
    let mut nl = NetlistBuilder::new("slicing");
    let src = nl.source(vec![(0.0, 1), (2.0, 10), (4.0, 15)], None, false).unwrap();
    let identity = nl.combinational(4, |x| x, 0.05, 0, None, false).unwrap();
    nl.connect(src, identity).unwrap();

    let sink_lo = nl.output(None, false).unwrap();
    let sink_hi = nl.output(None, false).unwrap();
    nl.connect(identity.tap(0, 2), sink_lo).unwrap();
    nl.connect(identity.tap(2, 4), sink_hi).unwrap();

    let report = nl.run(6.0).unwrap();
    let lo = report.output_trace(sink_lo);
    let hi = report.output_trace(sink_hi);

    for &(t, full) in &[(0.5, 1u64), (2.5, 10u64), (4.5, 15u64)] {
        assert_eq!(value_at(lo, t), full & 3);
        assert_eq!(value_at(hi, t), full >> 2);
    }
}

/// A machine whose data input is never wired is rejected before any
/// event runs; likewise one with a data input but no bound clock. The
/// type signature of `moore`/`mealy` already forces both next-state and
/// output closures to be supplied, so "missing logic" can only surface
/// at the connectivity level once the closures exist.
#[test]
fn machines_require_both_a_data_input_and_a_bound_clock() {
    let mut nl = NetlistBuilder::new("unwired_machine");
    let _m = nl.moore(1, |ps, _i| ps, |ps| ps, 0, true, 0.1, 0.1, 0.1, None, false).unwrap();
    let err = nl.run(10.0).unwrap_err();
    assert!(matches!(
        err,
        digisim_core::DigisimError::Netlist(digisim_core::NetlistError::UnconnectedInput { .. })
    ));

    let mut nl = NetlistBuilder::new("clockless_machine");
    let src = nl.source(vec![(0.0, 0)], None, false).unwrap();
    let m = nl.moore(1, |ps, _i| ps, |ps| ps, 0, true, 0.1, 0.1, 0.1, None, false).unwrap();
    nl.connect(src, m).unwrap();
    let err = nl.run(10.0).unwrap_err();
    assert!(matches!(
        err,
        digisim_core::DigisimError::Netlist(digisim_core::NetlistError::MissingClock { .. })
    ));
}

/// A combinational block with no connections at all fails before the
/// scheduler advances a single tick.
#[test]
fn unconnected_block_is_rejected_before_running() {
    let mut nl = NetlistBuilder::new("dangling");
    let _c = nl.combinational(1, |x| x, 0.1, 0, None, false).unwrap();
    let err = nl.run(1.0).unwrap_err();
    assert!(matches!(
        err,
        digisim_core::DigisimError::Netlist(digisim_core::NetlistError::UnconnectedInput { .. })
    ));
}

/// Running the same netlist twice, independently, produces byte-identical
/// CSV dumps: nothing in the scheduler depends on wall-clock time or
/// hash-iteration order.
#[test]
fn identical_netlists_produce_identical_traces() {
    fn build_and_run() -> digisim_core::RunReport {
        let mut nl = NetlistBuilder::new("determinism");
        let src = nl.source(vec![(0.0, 1), (1.0, 2), (3.0, 0)], None, false).unwrap();
        let clk = nl.clock(0.5, 0.25, 0, None, false).unwrap();
        let m = nl
            .moore(2, |ps, i| (ps + i) % 4, |ps| ps, 0, true, 0.01, 0.01, 0.01, None, false)
            .unwrap();
        nl.connect(src.tap(0, 2), m).unwrap();
        nl.connect_clock(clk, m).unwrap();
        let sink = nl.output(None, false).unwrap();
        nl.connect(m, sink).unwrap();
        nl.run(5.0).unwrap()
    }

    let r1 = build_and_run();
    let r2 = build_and_run();

    let dir = std::env::temp_dir();
    let p1 = dir.join("digisim_determinism_a.csv");
    let p2 = dir.join("digisim_determinism_b.csv");
    digisim_core::csv::write_dump_to(&r1, &p1).unwrap();
    digisim_core::csv::write_dump_to(&r2, &p2).unwrap();
    let c1 = std::fs::read_to_string(&p1).unwrap();
    let c2 = std::fs::read_to_string(&p2).unwrap();
    std::fs::remove_file(&p1).ok();
    std::fs::remove_file(&p2).ok();
    assert_eq!(c1, c2);
}

/// A source's own trace is an exact record of its schedule: every
/// `(time, value)` pair appears once, in order, with nothing dropped or
/// coalesced on the producer side.
#[test]
fn source_trace_matches_its_schedule_exactly() {
    let schedule = vec![(0.0, 3), (1.5, 1), (2.0, 0), (4.25, 2)];
    let mut nl = NetlistBuilder::new("source_fidelity");
    let src = nl.source(schedule.clone(), None, false).unwrap();
    let sink = nl.output(None, false).unwrap();
    nl.connect(src, sink).unwrap();
    let report = nl.run(10.0).unwrap();

    let src_trace = report.output_trace(src);
    let recorded: Vec<(f64, u64)> = src_trace.samples().iter().map(|(t, v)| (t.as_f64(), *v)).collect();
    assert_eq!(recorded, schedule);
}

/// A Moore counter built with `rising = false` only advances its present
/// state on the clock's `1`-to-`0` transitions, never on its `0`-to-`1`
/// ones. Every other scenario in this file uses `rising = true`; this is
/// the falling-edge counterpart.
#[test]
fn falling_edge_moore_machine_advances_only_on_clock_fall() {
    let mut nl = NetlistBuilder::new("falling_edge_counter");
    let src = nl.source(vec![(0.0, 0)], None, false).unwrap();
    let clk = nl.clock(1.0, 0.5, 0, None, false).unwrap();

    let counter = nl
        .moore(
            2,
            |ps, _input| (ps + 1) % 4,
            |ps| ps,
            0,
            false,
            0.01,
            0.01,
            0.01,
            Some("Counter".to_string()),
            false,
        )
        .unwrap();
    nl.connect(src, counter).unwrap();
    nl.connect_clock(clk, counter).unwrap();

    let report = nl.run(8.0).unwrap();
    let ps_trace = report.trace_labeled("PS of Counter").unwrap();

    // Low on [0, 0.5), high on [0.5, 1.0), low on [1.0, 1.5), ... : rising
    // edges at 0.5, 1.5, 2.5, ...; falling edges at 1.0, 2.0, 3.0, ...
    assert_eq!(value_at(ps_trace, 0.6), 0, "must not advance on a rising edge");
    assert_eq!(value_at(ps_trace, 1.5), 1, "falling edge at t=1.0 advances ps to 1");
    assert_eq!(value_at(ps_trace, 2.5), 2);
    assert_eq!(value_at(ps_trace, 3.5), 3);
    assert_eq!(value_at(ps_trace, 4.5), 0);
}

/// §8's Moore causality property: a register commit lands strictly after
/// the clock edge that triggered it (by exactly `register_delay`), and the
/// output that commit feeds lands strictly after the register commit (by
/// at least `ol_delay`). Nothing downstream of a clock edge can appear at
/// or before the edge itself.
#[test]
fn moore_causality_orders_ps_and_output_after_the_triggering_edge() {
    let nsl_delay = 0.02;
    let ol_delay = 0.03;
    let register_delay = 0.05;

    let mut nl = NetlistBuilder::new("causality");
    let src = nl.source(vec![(0.0, 0)], None, false).unwrap();
    let clk = nl.clock(1.0, 0.5, 0, None, false).unwrap();

    let counter = nl
        .moore(
            2,
            |ps, _input| (ps + 1) % 4,
            |ps| ps,
            0,
            true,
            nsl_delay,
            ol_delay,
            register_delay,
            Some("Counter".to_string()),
            false,
        )
        .unwrap();
    nl.connect(src, counter).unwrap();
    nl.connect_clock(clk, counter).unwrap();

    // Stop just short of the 6th rising edge (5.5) so exactly the 5 edges
    // in `edge_times` are dispatched.
    let report = nl.run(5.0).unwrap();
    let ps_trace = report.trace_labeled("PS of Counter").unwrap();
    let out_trace = report.trace_labeled("output of Counter").unwrap();

    // Rising edges land at 0.5, 1.5, 2.5, 3.5, 4.5, 5.5.
    let edge_times = [0.5, 1.5, 2.5, 3.5, 4.5];
    let ps_samples = ps_trace.samples();
    let out_samples = out_trace.samples();

    assert_eq!(ps_samples.len(), edge_times.len(), "one ps commit per rising edge in range");
    for (&(ps_t, _), &edge) in ps_samples.iter().zip(edge_times.iter()) {
        let ps_t = ps_t.as_f64();
        assert!(ps_t > edge, "ps commit at {ps_t} must land after the edge at {edge}");
        assert!(
            (ps_t - (edge + register_delay)).abs() < 1e-9,
            "ps commit at {ps_t} must land exactly register_delay after the edge at {edge}"
        );
    }

    // `out_samples[0]` is the initial OL pass run before any clock edge
    // (§4.4.4), so it has no triggering ps commit; the rest pair up
    // one-for-one with `ps_samples`.
    assert_eq!(out_samples.len(), ps_samples.len() + 1);
    for (&(ps_t, _), &(out_t, _)) in ps_samples.iter().zip(out_samples.iter().skip(1)) {
        let ps_t = ps_t.as_f64();
        let out_t = out_t.as_f64();
        assert!(
            out_t >= ps_t + ol_delay - 1e-9,
            "output at {out_t} must land at least ol_delay after its ps commit at {ps_t}"
        );
    }
}
