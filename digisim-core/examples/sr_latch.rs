//! Set-reset latch from two cross-coupled NOR gates: pure combinational
//! blocks whose inputs include each other's own output, stabilized by a
//! positive per-gate propagation delay.

use digisim_core::NetlistBuilder;

fn main() -> Result<(), digisim_core::DigisimError> {
    tracing_subscriber::fmt::init();

    let mut nl = NetlistBuilder::new("sr_latch");
    // packed source value = S*2 + R
    let src = nl.source(
        vec![(0.0, 0), (1.0, 2), (2.5, 0), (4.0, 1), (5.5, 0)],
        Some("S,R".to_string()),
        true,
    )?;

    let nor = |packed: u64| if packed == 0 { 1 } else { 0 };
    let q = nl.combinational(2, nor, 0.1, 0, Some("Q".to_string()), true)?;
    let qbar = nl.combinational(2, nor, 0.1, 1, Some("Qbar".to_string()), true)?;

    nl.connect(src.tap(0, 1), q)?;
    nl.connect(qbar, q)?;
    nl.connect(src.tap(1, 2), qbar)?;
    nl.connect(q, qbar)?;

    nl.generate_csv();
    let report = nl.run(8.0)?;
    println!("ran {} to t={}, csv at {:?}", report.name(), report.until(), report.csv_path());
    Ok(())
}
