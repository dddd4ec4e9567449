//! Example of running PELT detection over a plain-text signal file (one
//! value per line, or comma-separated on a single line).

use std::{error::Error, fs};

use pelt::{CostFunction, PeltEngine, Signal, cost::{L1, L2}};

pub fn main() -> Result<(), Box<dyn Error>> {
    for arg in std::env::args().skip(1) {
        eprintln!("Reading file '{arg}'");

        let contents = fs::read_to_string(&arg)?;
        let values: Vec<f64> = contents
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()?;

        let signal = Signal::from_1d(&values)?;

        for (name, cost) in [
            ("L1", CostFunction::L1(L1::new())),
            ("L2", CostFunction::L2(L2::new())),
        ] {
            eprintln!("{name}:");
            let mut engine = PeltEngine::new(cost, 2, 1);
            match engine.fit(&signal).and_then(|()| engine.detect(10.0_f64)) {
                Ok(breakpoints) => println!("{breakpoints:?}"),
                Err(err) => eprintln!("Error running PELT: {err}"),
            }
        }
    }

    Ok(())
}
