//! Level-sensitive D-latch expressed as a single combinational block whose
//! own output feeds back as one of its inputs: transparent while the clock
//! input is high, holding otherwise.

use digisim_core::NetlistBuilder;

fn main() -> Result<(), digisim_core::DigisimError> {
    tracing_subscriber::fmt::init();

    let mut nl = NetlistBuilder::new("d_latch");
    let d = nl.source(vec![(0.0, 0), (1.0, 1), (3.0, 0), (5.0, 1)], Some("D".to_string()), true)?;
    let clk = nl.clock(4.0, 2.0, 0, Some("Clock".to_string()), true)?;

    let latch = nl.combinational(
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
        Some("Q".to_string()),
        true,
    )?;
    nl.connect(d, latch)?;
    nl.connect(clk, latch)?;
    nl.connect(latch, latch)?;

    nl.generate_csv();
    let report = nl.run(8.0)?;
    println!("ran {} to t={}, csv at {:?}", report.name(), report.until(), report.csv_path());
    Ok(())
}
