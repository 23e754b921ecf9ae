use std::process;

use clap::Parser;
use ippcode23::Outcome;
use ippcode23_cli::{init_tracing, run, Args};

fn main() {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(Outcome::Halted) => process::exit(0),
        Ok(Outcome::Exited(code)) => process::exit(code),
        Err(status) => {
            eprintln!("{}", status);
            process::exit(status.code());
        }
    }
}
