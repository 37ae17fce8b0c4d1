//! One producer's bus sliced out to two independent sinks.

use digisim_core::{NetlistBuilder, Tap};

fn main() -> Result<(), digisim_core::DigisimError> {
    tracing_subscriber::fmt::init();

    let mut nl = NetlistBuilder::new("output_slicing");
    let src = nl.source(vec![(0.0, 1), (2.0, 10), (4.0, 15)], Some("Source".to_string()), true)?;
    let identity = nl.combinational(4, |x| x, 0.05, 0, Some("Buffered".to_string()), true)?;
    nl.connect(src, identity)?;

    let sink_lo = nl.output(Some("Low bits".to_string()), true)?;
    let sink_hi = nl.output(Some("High bits".to_string()), true)?;
    nl.connect(identity.tap(0, 2), sink_lo)?;
    nl.connect(identity.tap(2, 4), sink_hi)?;

    nl.generate_csv();
    let report = nl.run(6.0)?;
    println!("ran {} to t={}, csv at {:?}", report.name(), report.until(), report.csv_path());
    Ok(())
}
