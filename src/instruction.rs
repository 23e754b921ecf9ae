use std::fmt;
use std::str::FromStr;

use util::EnumFromStr;
use util_derive::EnumFromStr;

use crate::Status;

/// The complete IPPcode23 opcode set. Variant names are the uppercase
/// mnemonics used in the XML `opcode` attribute; `Opcode::parse` uppercases
/// the input first, matching the schema's case-insensitive token rule.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
pub enum Opcode {
    MOVE,
    CREATEFRAME,
    PUSHFRAME,
    POPFRAME,
    DEFVAR,
    CALL,
    RETURN,
    PUSHS,
    POPS,
    ADD,
    SUB,
    MUL,
    IDIV,
    LT,
    GT,
    EQ,
    AND,
    OR,
    NOT,
    INT2CHAR,
    STRI2INT,
    READ,
    WRITE,
    CONCAT,
    STRLEN,
    GETCHAR,
    SETCHAR,
    TYPE,
    LABEL,
    JUMP,
    JUMPIFEQ,
    JUMPIFNEQ,
    EXIT,
    DPRINT,
    BREAK,
}

impl Opcode {
    /// Parses an opcode mnemonic case-insensitively, as required by the XML
    /// schema. Unknown mnemonics are INVALID_XML.
    pub fn parse(text: &str) -> Result<Opcode, Status> {
        Opcode::from_str(&text.to_ascii_uppercase()).map_err(|_| Status::InvalidXml)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The declared kind of an XML `argN` element. `Var`/`Label` name something
/// rather than carrying a value directly; the remaining four carry a
/// literal that `Value::parse_literal` turns into a `Value`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandKind {
    Var,
    Int,
    String,
    Bool,
    Nil,
    Label,
    /// The `type` pseudo-value used by `READ`'s second argument.
    Type,
}

impl OperandKind {
    pub fn parse(text: &str) -> Result<OperandKind, Status> {
        match text {
            "var" => Ok(OperandKind::Var),
            "int" => Ok(OperandKind::Int),
            "string" => Ok(OperandKind::String),
            "bool" => Ok(OperandKind::Bool),
            "nil" => Ok(OperandKind::Nil),
            "label" => Ok(OperandKind::Label),
            "type" => Ok(OperandKind::Type),
            _ => Err(Status::InvalidXml),
        }
    }
}

/// A single decoded operand: its declared kind plus raw text payload. Text
/// is interpreted lazily, at operand-resolution time, because the meaning of
/// a `var` operand's text (a qualified name) differs entirely from a `int`/
/// `string`/`bool`/`nil` operand's text (a literal to parse).
#[derive(Clone, Debug)]
pub struct Operand {
    pub kind: OperandKind,
    pub text: String,
}

/// A fully decoded instruction: its position in program order, opcode, and
/// 0-3 operands. Validity of the operand count/kinds against `opcode` is the
/// Validator's job (§4.5), not enforced at construction.
#[derive(Clone, Debug)]
pub struct Instruction {
    pub order: u64,
    pub opcode: Opcode,
    pub args: Vec<Operand>,
}
