use crate::{Frame, Status};

/// The frame-lifecycle half of `Memory`: the temporary frame slot and the
/// stack of local frames. Split out from `Memory` itself the same way the
/// teacher splits `CompositeMemory` from the flat `Memory` type — one struct
/// per distinct piece of lifecycle logic.
#[derive(Default)]
pub struct FrameStack {
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> FrameStack {
        FrameStack::default()
    }

    pub fn temporary(&self) -> Result<&Frame, Status> {
        self.temporary.as_ref().ok_or(Status::FrameNotExist)
    }

    pub fn temporary_mut(&mut self) -> Result<&mut Frame, Status> {
        self.temporary.as_mut().ok_or(Status::FrameNotExist)
    }

    pub fn top(&self) -> Result<&Frame, Status> {
        self.locals.last().ok_or(Status::FrameNotExist)
    }

    pub fn top_mut(&mut self) -> Result<&mut Frame, Status> {
        self.locals.last_mut().ok_or(Status::FrameNotExist)
    }

    /// `CREATEFRAME`: replaces the temporary frame unconditionally, discarding
    /// whatever was there before.
    pub fn create(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// `PUSHFRAME`: requires a temporary frame, moves it verbatim onto the
    /// local frame stack and clears the slot. No key rewriting is needed
    /// since `Frame` never stores its own prefix.
    pub fn push(&mut self) -> Result<(), Status> {
        let frame = self.temporary.take().ok_or(Status::FrameNotExist)?;
        self.locals.push(frame);
        Ok(())
    }

    /// `POPFRAME`: requires a non-empty local stack; its top becomes the new
    /// temporary frame.
    pub fn pop(&mut self) -> Result<(), Status> {
        let frame = self.locals.pop().ok_or(Status::FrameNotExist)?;
        self.temporary = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_absent_by_default() {
        let stack = FrameStack::new();
        assert_eq!(stack.temporary().unwrap_err(), Status::FrameNotExist);
    }

    #[test]
    fn push_requires_temporary_frame() {
        let mut stack = FrameStack::new();
        assert_eq!(stack.push().unwrap_err(), Status::FrameNotExist);
    }

    #[test]
    fn create_push_pop_round_trip() {
        let mut stack = FrameStack::new();
        stack.create();
        stack.temporary_mut().unwrap().insert("x").unwrap();
        stack.push().unwrap();
        assert!(stack.top().is_ok());
        assert_eq!(stack.temporary().unwrap_err(), Status::FrameNotExist);
        stack.pop().unwrap();
        assert!(stack.temporary().is_ok());
        assert_eq!(stack.top().unwrap_err(), Status::FrameNotExist);
    }

    #[test]
    fn pop_on_empty_stack_is_frame_not_exist() {
        let mut stack = FrameStack::new();
        assert_eq!(stack.pop().unwrap_err(), Status::FrameNotExist);
    }
}
