mod executor;
mod frame;
mod instruction;
mod labels;
mod memory;
mod status;
mod validator;
mod value;

pub use executor::{Core, Outcome};
pub use frame::Frame;
pub use instruction::{Instruction, Opcode, Operand, OperandKind};
pub use labels::LabelIndex;
pub use memory::{Input, Memory};
pub use status::Status;
pub use validator::validate_all;
pub use value::{decode_string_escapes, Type, Value};

/// Runs a fully decoded program to completion: validates argument shapes,
/// builds the label table, then executes.
///
/// This is the single entry point satellite crates (the CLI launcher, and
/// any future embedder) call after decoding the XML source into
/// `Instruction`s.
pub fn run(instructions: Vec<Instruction>, input: Input) -> Result<Outcome, Status> {
    validate_all(&instructions)?;
    let labels = LabelIndex::build(&instructions)?;
    Core::new(instructions, labels, input).run()
}
