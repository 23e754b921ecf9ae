use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use ippcode23::{Input, Outcome, Status};

/// Command-line arguments accepted by the launcher.
#[derive(Parser, Debug)]
#[command(about = "Executes an IPPcode23 XML program")]
pub struct Args {
    /// XML program file. Read from standard input if omitted.
    #[arg(long)]
    pub source: Option<PathBuf>,
    /// Input lines file consumed by READ. Interactive standard input if
    /// omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

/// Initializes the `tracing` subscriber from `RUST_LOG`, defaulting to
/// `info`. Writes to stderr, independent of the mandated one-line error
/// message `main` prints on failure.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Loads and runs one program according to `args`. Kept separate from
/// `main` so the orchestration can be exercised without touching
/// `process::exit`.
pub fn run(args: Args) -> Result<Outcome, Status> {
    if args.source.is_none() && args.input.is_none() {
        return Err(Status::MissingParam);
    }

    let instructions = match &args.source {
        Some(path) => {
            let file = File::open(path).map_err(|_| Status::InputFile)?;
            ippcode23_xml::load(BufReader::new(file))?
        }
        None => ippcode23_xml::load(io::stdin().lock())?,
    };

    let input = match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|_| Status::InputFile)?;
            let lines = BufReader::new(file)
                .lines()
                .collect::<Result<Vec<String>, _>>()
                .map_err(|_| Status::InputFile)?;
            Input::from_lines(lines)
        }
        None => Input::interactive(),
    };

    ippcode23::run(instructions, input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitting_both_source_and_input_is_missing_param() {
        let args = Args { source: None, input: None };
        assert_eq!(run(args), Err(Status::MissingParam));
    }

    #[test]
    fn nonexistent_source_file_is_input_file_error() {
        let args = Args { source: Some(PathBuf::from("/nonexistent/program.xml")), input: None };
        assert_eq!(run(args), Err(Status::InputFile));
    }
}
