use std::collections::HashMap;

use crate::{Status, Value};

/// An ordered-irrelevant mapping from unqualified variable name to a value
/// cell. Unlike the source implementation, the frame prefix (`GF@`/`TF@`/
/// `LF@`) is never stored in the key: `Memory` resolves the frame from the
/// prefix and only ever indexes `Frame` by the bare identifier. This makes
/// `PUSHFRAME`/`POPFRAME` an O(1) move of the whole frame instead of an O(n)
/// rewrite of every key.
#[derive(Default, Debug)]
pub struct Frame {
    vars: HashMap<String, Value>,
}

impl Frame {
    pub fn new() -> Frame {
        Frame::default()
    }

    /// Declares `name`, initialized to `Uninit`. A variable already present
    /// under that name is a SEMANTIC error (spec §3 Frame invariant).
    pub fn insert(&mut self, name: &str) -> Result<(), Status> {
        if self.vars.contains_key(name) {
            return Err(Status::Semantic);
        }
        self.vars.insert(name.to_string(), Value::Uninit);
        Ok(())
    }

    /// Overwrites the value of an existing variable, regardless of its
    /// current type. VAR_NOT_EXIST if `name` was never declared.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), Status> {
        match self.vars.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Status::VarNotExist),
        }
    }

    /// Reads the current value of `name`. VAR_NOT_EXIST if undeclared; the
    /// returned value may be `Uninit` — callers decide whether that's
    /// acceptable (`TYPE` is exempt from the usual MISSING_VALUE rule).
    pub fn get(&self, name: &str) -> Result<&Value, Status> {
        self.vars.get(name).ok_or(Status::VarNotExist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_is_uninit() {
        let mut f = Frame::new();
        f.insert("x").unwrap();
        assert_eq!(f.get("x").unwrap(), &Value::Uninit);
    }

    #[test]
    fn duplicate_insert_is_semantic_error() {
        let mut f = Frame::new();
        f.insert("x").unwrap();
        assert_eq!(f.insert("x"), Err(Status::Semantic));
    }

    #[test]
    fn set_on_undeclared_is_var_not_exist() {
        let mut f = Frame::new();
        assert_eq!(f.set("x", Value::Int(1)), Err(Status::VarNotExist));
    }

    #[test]
    fn set_overwrites_regardless_of_prior_type() {
        let mut f = Frame::new();
        f.insert("x").unwrap();
        f.set("x", Value::Int(1)).unwrap();
        f.set("x", Value::String("hi".into())).unwrap();
        assert_eq!(f.get("x").unwrap(), &Value::String("hi".into()));
    }

    #[test]
    fn get_on_undeclared_is_var_not_exist() {
        let f = Frame::new();
        assert_eq!(f.get("x"), Err(Status::VarNotExist));
    }
}
