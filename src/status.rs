use std::fmt;

/// Terminal outcome of an interpreter run.
///
/// Every error in the interpreter is terminal: there is no recovery or
/// propagation across instructions, only a final `Status` that becomes the
/// process exit code. `Ok` is itself part of the closed taxonomy so that a
/// single type can flow through `Result<T, Status>` from decode through
/// execution.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Ok,
    MissingParam,
    InputFile,
    OutputFile,
    Malformed,
    InvalidXml,
    Semantic,
    TypeMismatch,
    VarNotExist,
    FrameNotExist,
    MissingValue,
    Value,
    String,
    Internal,
}

impl Status {
    /// The numeric process exit code for this status, per the fixed taxonomy.
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::MissingParam => 10,
            Status::InputFile => 11,
            Status::OutputFile => 12,
            Status::Malformed => 31,
            Status::InvalidXml => 32,
            Status::Semantic => 52,
            Status::TypeMismatch => 53,
            Status::VarNotExist => 54,
            Status::FrameNotExist => 55,
            Status::MissingValue => 56,
            Status::Value => 57,
            Status::String => 58,
            Status::Internal => 99,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::MissingParam => "missing or invalid command-line parameters",
            Status::InputFile => "input file could not be opened",
            Status::OutputFile => "output could not be written",
            Status::Malformed => "source XML is not well-formed",
            Status::InvalidXml => "source XML violates the IPPcode23 schema",
            Status::Semantic => "semantic error (duplicate label or variable, unknown label)",
            Status::TypeMismatch => "operand type mismatch",
            Status::VarNotExist => "variable does not exist",
            Status::FrameNotExist => "frame does not exist",
            Status::MissingValue => "missing value (uninitialized variable or empty stack)",
            Status::Value => "value out of allowed range",
            Status::String => "invalid string operation",
            Status::Internal => "internal interpreter error",
        };
        write!(f, "{}", name)
    }
}

impl std::error::Error for Status {}
