
use test_generator::test_resources;

use std::io::Read;
use std::path::Path;

use vmtranslator::machine::Machine;
use vmtranslator::{translate_file, Settings};

/* Each sample is a complete source program declaring its expected final
 * memory in special comments: `//! <address> <value>`. The sample is
 * translated whole-program (bootstrap included, entry function called), the
 * output runs on the simulator, and the named cells are checked. */

#[test_resources("samples/**/*.vm")]
fn run_sample(resource: &str) {
    let mut file = std::fs::File::open(resource).expect("File opens");
    let mut input = String::new();
    file.read_to_string(&mut input).expect("Read successful");

    let expectations = input.lines()
        .filter_map(|line| if let Some(rest) = line.strip_prefix("//! ") {
            Some(Ok(rest))
        }
        else if line.starts_with("//!") {
            Some(Err("Likely a typo: Put a space after \"//!\""))
        }
        else {
            None
        })
        .collect::<Result<Vec<_>, _>>()
        .expect("No issue with special comments");

    let expectations: Vec<(usize, i16)> = expectations.iter()
        .map(|line| {
            let (address, value) = line.split_once(' ').expect("Expectation names an address and a value");

            (
                address.trim().parse().expect("Expectation address is a RAM address"),
                value.trim().parse().expect("Expectation value is a 16 bit word"),
            )
        })
        .collect();

    assert!(!expectations.is_empty(), "Sample declares no expectations");

    let lines = translate_file(Path::new(resource), &Settings::whole_program())
        .expect("Sample translates");
    println!("{}", lines.join("\n"));

    let mut machine = Machine::new(&lines).expect("Output assembles");
    machine.run(10_000_000).expect("Program halts");

    for (address, value) in expectations {
        assert_eq!(machine.ram(address), value, "ram[{address}]");
    }
}
