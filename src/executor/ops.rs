use std::convert::TryFrom;
use std::io::Write as _;

use crate::instruction::{Instruction, Opcode, Operand, OperandKind};
use crate::labels::LabelIndex;
use crate::memory::Memory;
use crate::{Status, Type, Value};

/// What the executor should do after dispatching one instruction.
pub enum Step {
    /// Continue at the given order (fall-through or a taken jump/call).
    Continue(u64),
    /// `EXIT` was reached; the program terminates with this code.
    Exit(i32),
}

fn literal_type(kind: OperandKind) -> Type {
    match kind {
        OperandKind::Int => Type::Int,
        OperandKind::String => Type::String,
        OperandKind::Bool => Type::Bool,
        OperandKind::Nil => Type::Nil,
        _ => unreachable!("validator guarantees a symb operand never carries this kind"),
    }
}

/// Resolves a `symb` operand (`var`, or a literal kind) to its `Value`.
/// `Uninit` variables fail MISSING_VALUE here, before any opcode-specific
/// check runs.
fn resolve(operand: &Operand, memory: &Memory) -> Result<Value, Status> {
    match operand.kind {
        OperandKind::Var => memory.get(&operand.text).cloned(),
        kind => Value::parse_literal(literal_type(kind), &operand.text),
    }
}

/// Resolves a `symb` operand without rejecting `Uninit`. Used only by
/// `TYPE`, which reports the empty string for an uninitialized variable
/// instead of failing.
fn resolve_raw(operand: &Operand, memory: &Memory) -> Result<Value, Status> {
    match operand.kind {
        OperandKind::Var => memory.get_raw(&operand.text).cloned(),
        kind => Value::parse_literal(literal_type(kind), &operand.text),
    }
}

fn as_int(value: Value) -> Result<i64, Status> {
    match value {
        Value::Int(i) => Ok(i),
        _ => Err(Status::TypeMismatch),
    }
}

fn as_string(value: Value) -> Result<String, Status> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(Status::TypeMismatch),
    }
}

fn as_bool(value: Value) -> Result<bool, Status> {
    match value {
        Value::Bool(b) => Ok(b),
        _ => Err(Status::TypeMismatch),
    }
}

/// `EQ` and the equality arm of `JUMPIFEQ`/`JUMPIFNEQ`: `Nil` is equal only
/// to `Nil`, never to a same-typed value, and comparing across distinct
/// non-Nil types is `TYPE_MISMATCH`.
fn values_equal(a: &Value, b: &Value) -> Result<bool, Status> {
    match (a, b) {
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Nil, _) | (_, Value::Nil) => Ok(false),
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::String(x), Value::String(y)) => Ok(x == y),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        _ => Err(Status::TypeMismatch),
    }
}

/// `LT`/`GT`: `Nil` is forbidden on either side, and the two operands must
/// share a type. Bool orders `false < true`; String orders lexicographically
/// by byte value.
fn ordering(a: &Value, b: &Value) -> Result<std::cmp::Ordering, Status> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(x.as_bytes().cmp(y.as_bytes())),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        _ => Err(Status::TypeMismatch),
    }
}

fn code_unit_at(s: &str, idx: i64) -> Result<char, Status> {
    if idx < 0 {
        return Err(Status::String);
    }
    s.chars().nth(idx as usize).ok_or(Status::String)
}

/// Dispatches a single validated instruction. `instruction.order` is assumed
/// current; the returned `Step` tells the caller where to resume.
pub fn execute(
    instruction: &Instruction,
    memory: &mut Memory,
    labels: &LabelIndex,
) -> Result<Step, Status> {
    let next = instruction.order + 1;
    let arg = |i: usize| &instruction.args[i];

    match instruction.opcode {
        Opcode::MOVE => {
            let value = resolve(arg(1), memory)?;
            memory.set(&arg(0).text, value)?;
            Ok(Step::Continue(next))
        }
        Opcode::CREATEFRAME => {
            memory.frames().create();
            Ok(Step::Continue(next))
        }
        Opcode::PUSHFRAME => {
            memory.frames().push()?;
            Ok(Step::Continue(next))
        }
        Opcode::POPFRAME => {
            memory.frames().pop()?;
            Ok(Step::Continue(next))
        }
        Opcode::DEFVAR => {
            memory.declare(&arg(0).text)?;
            Ok(Step::Continue(next))
        }
        Opcode::CALL => {
            memory.push_return(next);
            Ok(Step::Continue(labels.resolve(&arg(0).text)?))
        }
        Opcode::RETURN => Ok(Step::Continue(memory.pop_return()?)),
        Opcode::PUSHS => {
            let value = resolve(arg(0), memory)?;
            memory.push_operand(value);
            Ok(Step::Continue(next))
        }
        Opcode::POPS => {
            let value = memory.pop_operand()?;
            memory.set(&arg(0).text, value)?;
            Ok(Step::Continue(next))
        }
        Opcode::ADD | Opcode::SUB | Opcode::MUL | Opcode::IDIV => {
            let a = as_int(resolve(arg(1), memory)?)?;
            let b = as_int(resolve(arg(2), memory)?)?;
            let result = match instruction.opcode {
                Opcode::ADD => a.wrapping_add(b),
                Opcode::SUB => a.wrapping_sub(b),
                Opcode::MUL => a.wrapping_mul(b),
                Opcode::IDIV => {
                    if b == 0 {
                        return Err(Status::Value);
                    }
                    a.wrapping_div(b)
                }
                _ => unreachable!(),
            };
            memory.set(&arg(0).text, Value::Int(result))?;
            Ok(Step::Continue(next))
        }
        Opcode::LT | Opcode::GT => {
            let a = resolve(arg(1), memory)?;
            let b = resolve(arg(2), memory)?;
            let order = ordering(&a, &b)?;
            let result = if instruction.opcode == Opcode::LT {
                order == std::cmp::Ordering::Less
            } else {
                order == std::cmp::Ordering::Greater
            };
            memory.set(&arg(0).text, Value::Bool(result))?;
            Ok(Step::Continue(next))
        }
        Opcode::EQ => {
            let a = resolve(arg(1), memory)?;
            let b = resolve(arg(2), memory)?;
            let result = values_equal(&a, &b)?;
            memory.set(&arg(0).text, Value::Bool(result))?;
            Ok(Step::Continue(next))
        }
        Opcode::AND | Opcode::OR => {
            let a = as_bool(resolve(arg(1), memory)?)?;
            let b = as_bool(resolve(arg(2), memory)?)?;
            let result = if instruction.opcode == Opcode::AND { a && b } else { a || b };
            memory.set(&arg(0).text, Value::Bool(result))?;
            Ok(Step::Continue(next))
        }
        Opcode::NOT => {
            let a = as_bool(resolve(arg(1), memory)?)?;
            memory.set(&arg(0).text, Value::Bool(!a))?;
            Ok(Step::Continue(next))
        }
        Opcode::INT2CHAR => {
            let code = as_int(resolve(arg(1), memory)?)?;
            let ch = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or(Status::String)?;
            memory.set(&arg(0).text, Value::String(ch.to_string()))?;
            Ok(Step::Continue(next))
        }
        Opcode::STRI2INT => {
            let s = as_string(resolve(arg(1), memory)?)?;
            let idx = as_int(resolve(arg(2), memory)?)?;
            let ch = code_unit_at(&s, idx)?;
            memory.set(&arg(0).text, Value::Int(ch as i64))?;
            Ok(Step::Continue(next))
        }
        Opcode::CONCAT => {
            let a = as_string(resolve(arg(1), memory)?)?;
            let b = as_string(resolve(arg(2), memory)?)?;
            memory.set(&arg(0).text, Value::String(a + &b))?;
            Ok(Step::Continue(next))
        }
        Opcode::STRLEN => {
            let s = as_string(resolve(arg(1), memory)?)?;
            memory.set(&arg(0).text, Value::Int(s.chars().count() as i64))?;
            Ok(Step::Continue(next))
        }
        Opcode::GETCHAR => {
            let s = as_string(resolve(arg(1), memory)?)?;
            let idx = as_int(resolve(arg(2), memory)?)?;
            let ch = code_unit_at(&s, idx)?;
            memory.set(&arg(0).text, Value::String(ch.to_string()))?;
            Ok(Step::Continue(next))
        }
        Opcode::SETCHAR => {
            let current = as_string(memory.get(&arg(0).text)?.clone())?;
            let idx = as_int(resolve(arg(1), memory)?)?;
            let src = as_string(resolve(arg(2), memory)?)?;
            let replacement = src.chars().next().ok_or(Status::String)?;
            if idx < 0 {
                return Err(Status::String);
            }
            let mut chars: Vec<char> = current.chars().collect();
            let slot = chars.get_mut(idx as usize).ok_or(Status::String)?;
            *slot = replacement;
            memory.set(&arg(0).text, Value::String(chars.into_iter().collect()))?;
            Ok(Step::Continue(next))
        }
        Opcode::READ => {
            let requested = arg(1).text.as_str();
            let value = match memory.read_line() {
                None => Value::Nil,
                Some(line) => match requested {
                    "int" => line.trim().parse::<i64>().map(Value::Int).unwrap_or(Value::Nil),
                    "bool" => Value::Bool(line.eq_ignore_ascii_case("true")),
                    "string" => Value::String(line),
                    _ => unreachable!("validator restricts READ's type argument"),
                },
            };
            memory.set(&arg(0).text, value)?;
            Ok(Step::Continue(next))
        }
        Opcode::WRITE => {
            let value = resolve(arg(0), memory)?;
            let mut stdout = std::io::stdout();
            write!(stdout, "{}", value.format()).map_err(|_| Status::OutputFile)?;
            stdout.flush().map_err(|_| Status::OutputFile)?;
            Ok(Step::Continue(next))
        }
        Opcode::DPRINT => {
            let value = resolve(arg(0), memory)?;
            eprint!("{}", value.format());
            Ok(Step::Continue(next))
        }
        Opcode::BREAK => {
            tracing::debug!(order = instruction.order, "BREAK reached");
            Ok(Step::Continue(next))
        }
        Opcode::LABEL => Ok(Step::Continue(next)),
        Opcode::JUMP => Ok(Step::Continue(labels.resolve(&arg(0).text)?)),
        Opcode::JUMPIFEQ | Opcode::JUMPIFNEQ => {
            let a = resolve(arg(1), memory)?;
            let b = resolve(arg(2), memory)?;
            let equal = values_equal(&a, &b)?;
            let taken = if instruction.opcode == Opcode::JUMPIFEQ { equal } else { !equal };
            if taken {
                Ok(Step::Continue(labels.resolve(&arg(0).text)?))
            } else {
                Ok(Step::Continue(next))
            }
        }
        Opcode::EXIT => {
            let code = as_int(resolve(arg(0), memory)?)?;
            if !(0..=49).contains(&code) {
                return Err(Status::Value);
            }
            Ok(Step::Exit(code as i32))
        }
        Opcode::TYPE => {
            let value = resolve_raw(arg(1), memory)?;
            let name = match value {
                Value::Uninit => String::new(),
                other => other.ty().expect("non-Uninit always has a type").name().to_string(),
            };
            memory.set(&arg(0).text, Value::String(name))?;
            Ok(Step::Continue(next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, Operand, OperandKind};
    use crate::memory::{Input, Memory};

    fn var(name: &str) -> Operand {
        Operand { kind: OperandKind::Var, text: name.to_string() }
    }

    fn lit(kind: OperandKind, text: &str) -> Operand {
        Operand { kind, text: text.to_string() }
    }

    fn instr(order: u64, opcode: Opcode, args: Vec<Operand>) -> Instruction {
        Instruction { order, opcode, args }
    }

    fn memory() -> Memory {
        Memory::new(Input::from_lines(Vec::<String>::new()))
    }

    #[test]
    fn add_writes_int_result() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(1, Opcode::ADD, vec![var("GF@x"), lit(OperandKind::Int, "2"), lit(OperandKind::Int, "3")]);
        execute(&i, &mut mem, &labels).unwrap();
        assert_eq!(mem.get("GF@x").unwrap(), &Value::Int(5));
    }

    #[test]
    fn idiv_by_zero_is_value_error() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(1, Opcode::IDIV, vec![var("GF@x"), lit(OperandKind::Int, "1"), lit(OperandKind::Int, "0")]);
        assert_eq!(execute(&i, &mut mem, &labels).unwrap_err(), Status::Value);
    }

    #[test]
    fn eq_permits_nil_either_side() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(1, Opcode::EQ, vec![var("GF@x"), lit(OperandKind::Nil, "nil"), lit(OperandKind::Int, "1")]);
        execute(&i, &mut mem, &labels).unwrap();
        assert_eq!(mem.get("GF@x").unwrap(), &Value::Bool(false));
    }

    #[test]
    fn lt_forbids_nil() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(1, Opcode::LT, vec![var("GF@x"), lit(OperandKind::Nil, "nil"), lit(OperandKind::Int, "1")]);
        assert_eq!(execute(&i, &mut mem, &labels).unwrap_err(), Status::TypeMismatch);
    }

    #[test]
    fn exit_rejects_code_above_49() {
        let mut mem = memory();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(1, Opcode::EXIT, vec![lit(OperandKind::Int, "50")]);
        assert_eq!(execute(&i, &mut mem, &labels).unwrap_err(), Status::Value);
    }

    #[test]
    fn exit_succeeds_in_range() {
        let mut mem = memory();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(1, Opcode::EXIT, vec![lit(OperandKind::Int, "7")]);
        match execute(&i, &mut mem, &labels).unwrap() {
            Step::Exit(code) => assert_eq!(code, 7),
            Step::Continue(_) => panic!("expected Exit"),
        }
    }

    #[test]
    fn type_of_uninit_var_is_empty_string() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        mem.declare("GF@y").unwrap();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(1, Opcode::TYPE, vec![var("GF@y"), var("GF@x")]);
        execute(&i, &mut mem, &labels).unwrap();
        assert_eq!(mem.get("GF@y").unwrap(), &Value::String(String::new()));
    }

    #[test]
    fn setchar_replaces_indexed_unit() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        mem.set("GF@x", Value::String("abc".to_string())).unwrap();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(
            1,
            Opcode::SETCHAR,
            vec![var("GF@x"), lit(OperandKind::Int, "1"), lit(OperandKind::String, "Z")],
        );
        execute(&i, &mut mem, &labels).unwrap();
        assert_eq!(mem.get("GF@x").unwrap(), &Value::String("aZc".to_string()));
    }

    #[test]
    fn setchar_out_of_range_is_string_error() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        mem.set("GF@x", Value::String("abc".to_string())).unwrap();
        let labels = LabelIndex::build(&[]).unwrap();
        let i = instr(
            1,
            Opcode::SETCHAR,
            vec![var("GF@x"), lit(OperandKind::Int, "9"), lit(OperandKind::String, "Z")],
        );
        assert_eq!(execute(&i, &mut mem, &labels).unwrap_err(), Status::String);
    }

    #[test]
    fn jumpifeq_takes_branch_only_when_equal() {
        let mut mem = memory();
        let i = instr(
            4,
            Opcode::JUMPIFEQ,
            vec![lit(OperandKind::Label, "end"), lit(OperandKind::Int, "1"), lit(OperandKind::Int, "1")],
        );
        let labels = LabelIndex::build(&[Instruction {
            order: 9,
            opcode: Opcode::LABEL,
            args: vec![lit(OperandKind::Label, "end")],
        }])
        .unwrap();
        match execute(&i, &mut mem, &labels).unwrap() {
            Step::Continue(order) => assert_eq!(order, 10),
            Step::Exit(_) => panic!("expected Continue"),
        }
    }
}
