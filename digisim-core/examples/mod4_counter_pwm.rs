//! Mod-4 counter (Moore machine) driving a PWM-style comparator against a
//! held source value. Run with `cargo run --example mod4_counter_pwm`.

use digisim_core::{NetlistBuilder, Tap};

fn main() -> Result<(), digisim_core::DigisimError> {
    tracing_subscriber::fmt::init();

    let mut nl = NetlistBuilder::new("mod4_counter_pwm");
    let src = nl.source(vec![(0.0, 0b0101), (10.0, 0b1011)], None, true)?;
    let clk = nl.clock(1.0, 0.5, 0, None, true)?;

    let counter = nl.moore(
        2,
        |ps, _input| (ps + 1) % 4,
        |ps| ps,
        0,
        true,
        0.01,
        0.01,
        0.01,
        Some("Counter".to_string()),
        true,
    )?;
    nl.connect(src.tap(0, 1), counter)?;
    nl.connect_clock(clk, counter)?;

    let cmp = nl.combinational(
        1,
        |x| if (x & 3) > (x >> 2) { 1 } else { 0 },
        0.05,
        0,
        Some("Comparator".to_string()),
        true,
    )?;
    nl.connect(src.tap(0, 2), cmp)?;
    nl.connect(counter, cmp)?;

    let sink = nl.output(Some("PWM out".to_string()), true)?;
    nl.connect(cmp, sink)?;

    nl.generate_csv();
    let report = nl.run(8.0)?;
    println!("ran {} to t={}, csv at {:?}", report.name(), report.until(), report.csv_path());
    Ok(())
}
