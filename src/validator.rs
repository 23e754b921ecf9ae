use crate::instruction::{Instruction, Opcode, OperandKind};
use crate::Status;

/// The declared shape of a single argument position, independent of which
/// literal kind (`int`/`string`/`bool`/`nil`) a `symb` ultimately carries.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ArgShape {
    /// A variable reference: kind must be `var`.
    Var,
    /// A label name: kind must be `label`.
    Label,
    /// Any value-bearing operand: `var`, `int`, `string`, `bool`, or `nil`.
    Symb,
    /// `READ`'s second argument: kind `type`, text restricted to the three
    /// readable type names.
    ReadType,
}

fn shape(kind: OperandKind, text: &str) -> ArgShape {
    match kind {
        OperandKind::Var => ArgShape::Var,
        OperandKind::Label => ArgShape::Label,
        OperandKind::Type if matches!(text, "int" | "string" | "bool") => ArgShape::ReadType,
        _ => ArgShape::Symb,
    }
}

fn matches(expected: ArgShape, actual: ArgShape) -> bool {
    match (expected, actual) {
        (ArgShape::Symb, ArgShape::Var) => true,
        (ArgShape::Symb, ArgShape::Symb) => true,
        (a, b) => a == b,
    }
}

/// Per-opcode expected argument shapes. `None` entries are fixed-arity;
/// length of the slice is the required argument count.
fn expected_shapes(opcode: Opcode) -> &'static [ArgShape] {
    use ArgShape::*;
    use Opcode::*;
    match opcode {
        MOVE => &[Var, Symb],
        CREATEFRAME | PUSHFRAME | POPFRAME | RETURN | BREAK => &[],
        DEFVAR => &[Var],
        CALL => &[Label],
        PUSHS => &[Symb],
        POPS => &[Var],
        ADD | SUB | MUL | IDIV => &[Var, Symb, Symb],
        LT | GT | EQ => &[Var, Symb, Symb],
        AND | OR => &[Var, Symb, Symb],
        NOT => &[Var, Symb],
        INT2CHAR => &[Var, Symb],
        STRI2INT => &[Var, Symb, Symb],
        READ => &[Var, ReadType],
        WRITE => &[Symb],
        CONCAT => &[Var, Symb, Symb],
        STRLEN => &[Var, Symb],
        GETCHAR => &[Var, Symb, Symb],
        SETCHAR => &[Var, Symb, Symb],
        TYPE => &[Var, Symb],
        LABEL => &[Label],
        JUMP => &[Label],
        JUMPIFEQ | JUMPIFNEQ => &[Label, Symb, Symb],
        EXIT => &[Symb],
        DPRINT => &[Symb],
    }
}

/// Checks one instruction's argument count and per-position kind against its
/// opcode's fixed shape. Run once over the whole decoded
/// stream before label indexing or execution begin.
pub fn validate(instruction: &Instruction) -> Result<(), Status> {
    let expected = expected_shapes(instruction.opcode);
    if instruction.args.len() != expected.len() {
        return Err(Status::InvalidXml);
    }
    for (arg, &want) in instruction.args.iter().zip(expected) {
        let got = shape(arg.kind, &arg.text);
        if !matches(want, got) {
            return Err(Status::InvalidXml);
        }
    }
    Ok(())
}

pub fn validate_all(instructions: &[Instruction]) -> Result<(), Status> {
    instructions.iter().try_for_each(validate)
}
