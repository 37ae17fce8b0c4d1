//! Two independent sources packed into one combinational input: connection
//! order fixes bit position, first connection occupies the low bits.

use digisim_core::NetlistBuilder;

fn main() -> Result<(), digisim_core::DigisimError> {
    tracing_subscriber::fmt::init();

    let mut nl = NetlistBuilder::new("parallel_packing");
    let a = nl.source(vec![(0.0, 1), (2.0, 2), (4.0, 3)], Some("A".to_string()), true)?;
    let b = nl.source(vec![(0.0, 0), (2.0, 1), (4.0, 2)], Some("B".to_string()), true)?;

    let identity = nl.combinational(4, |x| x, 0.05, 0, Some("Packed".to_string()), true)?;
    nl.connect(a, identity)?;
    nl.connect(b, identity)?;

    nl.generate_csv();
    let report = nl.run(6.0)?;
    println!("ran {} to t={}, csv at {:?}", report.name(), report.until(), report.csv_path());
    Ok(())
}
