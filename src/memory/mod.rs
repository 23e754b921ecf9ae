mod frames;
mod input;

pub use frames::FrameStack;
pub use input::Input;

use crate::{Frame, Status, Value};

/// A variable name split into its frame prefix and unqualified identifier,
/// e.g. `GF@counter` resolves to (`Global`, `"counter"`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameKind {
    Global,
    Temporary,
    Local,
}

impl FrameKind {
    /// Splits a qualified variable name into its frame prefix and bare
    /// identifier. INVALID_XML if the name carries no recognized prefix —
    /// this can only happen if the XML loader/validator let malformed text
    /// through, so it is an internal-consistency guard rather than a
    /// user-reachable path.
    pub fn resolve(qualified: &str) -> Result<(FrameKind, &str), Status> {
        if let Some(rest) = qualified.strip_prefix("GF@") {
            Ok((FrameKind::Global, rest))
        } else if let Some(rest) = qualified.strip_prefix("TF@") {
            Ok((FrameKind::Temporary, rest))
        } else if let Some(rest) = qualified.strip_prefix("LF@") {
            Ok((FrameKind::Local, rest))
        } else {
            Err(Status::InvalidXml)
        }
    }
}

/// The complete mutable state of one interpreter run: the global frame, the
/// temporary-frame/local-frame-stack lifecycle, the operand stack, the call
/// stack of return orders, and the input queue. One owned struct the
/// executor drives; no state is shared between instruction objects.
pub struct Memory {
    global: Frame,
    frames: FrameStack,
    operand_stack: Vec<Value>,
    call_stack: Vec<u64>,
    input: Input,
}

impl Memory {
    pub fn new(input: Input) -> Memory {
        Memory {
            global: Frame::new(),
            frames: FrameStack::new(),
            operand_stack: Vec::new(),
            call_stack: Vec::new(),
            input,
        }
    }

    pub fn frames(&mut self) -> &mut FrameStack {
        &mut self.frames
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, Status> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Temporary => self.frames.temporary(),
            FrameKind::Local => self.frames.top(),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, Status> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Temporary => self.frames.temporary_mut(),
            FrameKind::Local => self.frames.top_mut(),
        }
    }

    /// `DEFVAR`: declares a variable, initialized to `Uninit`.
    pub fn declare(&mut self, qualified: &str) -> Result<(), Status> {
        let (kind, name) = FrameKind::resolve(qualified)?;
        self.frame_mut(kind)?.insert(name)
    }

    /// Overwrites an existing variable's value.
    pub fn set(&mut self, qualified: &str, value: Value) -> Result<(), Status> {
        let (kind, name) = FrameKind::resolve(qualified)?;
        self.frame_mut(kind)?.set(name, value)
    }

    /// Reads a variable's raw cell, `Uninit` included. Used only by `TYPE`,
    /// which is exempt from the MISSING_VALUE rule (spec §4.3).
    pub fn get_raw(&self, qualified: &str) -> Result<&Value, Status> {
        let (kind, name) = FrameKind::resolve(qualified)?;
        self.frame(kind)?.get(name)
    }

    /// Reads a variable's value, failing MISSING_VALUE if it is `Uninit`.
    /// This is the path used by every opcode except `TYPE`.
    pub fn get(&self, qualified: &str) -> Result<&Value, Status> {
        match self.get_raw(qualified)? {
            Value::Uninit => Err(Status::MissingValue),
            value => Ok(value),
        }
    }

    pub fn push_operand(&mut self, value: Value) {
        self.operand_stack.push(value);
    }

    pub fn pop_operand(&mut self) -> Result<Value, Status> {
        self.operand_stack.pop().ok_or(Status::MissingValue)
    }

    /// `CALL`: pushes `return_order` (the instruction after the `CALL`).
    pub fn push_return(&mut self, return_order: u64) {
        self.call_stack.push(return_order);
    }

    /// `RETURN`: pops the most recent return order. MISSING_VALUE on an
    /// empty call stack (spec §4.7).
    pub fn pop_return(&mut self) -> Result<u64, Status> {
        self.call_stack.pop().ok_or(Status::MissingValue)
    }

    pub fn read_line(&mut self) -> Option<String> {
        self.input.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Memory {
        Memory::new(Input::from_lines(Vec::<String>::new()))
    }

    #[test]
    fn resolves_frame_prefixes() {
        assert_eq!(FrameKind::resolve("GF@x").unwrap(), (FrameKind::Global, "x"));
        assert_eq!(FrameKind::resolve("TF@y").unwrap(), (FrameKind::Temporary, "y"));
        assert_eq!(FrameKind::resolve("LF@z").unwrap(), (FrameKind::Local, "z"));
        assert_eq!(FrameKind::resolve("x").unwrap_err(), Status::InvalidXml);
    }

    #[test]
    fn declare_set_get_round_trip() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        mem.set("GF@x", Value::Int(5)).unwrap();
        assert_eq!(mem.get("GF@x").unwrap(), &Value::Int(5));
    }

    #[test]
    fn reading_uninit_is_missing_value() {
        let mut mem = memory();
        mem.declare("GF@x").unwrap();
        assert_eq!(mem.get("GF@x").unwrap_err(), Status::MissingValue);
        assert_eq!(mem.get_raw("GF@x").unwrap(), &Value::Uninit);
    }

    #[test]
    fn temporary_frame_access_without_createframe_fails() {
        let mut mem = memory();
        assert_eq!(mem.declare("TF@x").unwrap_err(), Status::FrameNotExist);
    }

    #[test]
    fn push_frame_exposes_values_under_local_prefix() {
        let mut mem = memory();
        mem.frames().create();
        mem.declare("TF@x").unwrap();
        mem.set("TF@x", Value::Int(5)).unwrap();
        mem.frames().push().unwrap();
        assert_eq!(mem.get("LF@x").unwrap(), &Value::Int(5));
        mem.frames().pop().unwrap();
        assert_eq!(mem.get("TF@x").unwrap(), &Value::Int(5));
    }

    #[test]
    fn operand_stack_round_trip() {
        let mut mem = memory();
        mem.push_operand(Value::Bool(true));
        assert_eq!(mem.pop_operand().unwrap(), Value::Bool(true));
        assert_eq!(mem.pop_operand().unwrap_err(), Status::MissingValue);
    }

    #[test]
    fn call_stack_round_trip() {
        let mut mem = memory();
        mem.push_return(7);
        assert_eq!(mem.pop_return().unwrap(), 7);
        assert_eq!(mem.pop_return().unwrap_err(), Status::MissingValue);
    }
}
