use std::collections::BTreeMap;

use super::ops::{self, Step};
use crate::instruction::Instruction;
use crate::labels::LabelIndex;
use crate::memory::{Input, Memory};
use crate::Status;

/// Terminal result of a completed run that did not fail.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// Execution ran off the last order with no explicit `EXIT`.
    Halted,
    /// `EXIT` was reached with this code in `0..=49`.
    Exited(i32),
}

/// The fetch/decode/execute loop. Holds the program indexed
/// by `order` so that gap-skipping is a single `BTreeMap` range query, the
/// label table, and the `Memory` the instructions mutate.
pub struct Core {
    instructions: BTreeMap<u64, Instruction>,
    labels: LabelIndex,
    memory: Memory,
    order: u64,
}

impl Core {
    pub fn new(instructions: Vec<Instruction>, labels: LabelIndex, input: Input) -> Core {
        let order = instructions.iter().map(|i| i.order).min().unwrap_or(0);
        let instructions = instructions.into_iter().map(|i| (i.order, i)).collect();
        Core { instructions, labels, memory: Memory::new(input), order }
    }

    /// Runs to completion. `Ok` carries the normal-termination outcome;
    /// `Err` carries the failing `Status` of the instruction that aborted
    /// execution.
    pub fn run(&mut self) -> Result<Outcome, Status> {
        loop {
            let instruction = match self.instructions.range(self.order..).next() {
                Some((_, instruction)) => instruction.clone(),
                None => return Ok(Outcome::Halted),
            };
            tracing::debug!(order = instruction.order, opcode = ?instruction.opcode, "dispatch");
            match ops::execute(&instruction, &mut self.memory, &self.labels)? {
                Step::Continue(next) => self.order = next,
                Step::Exit(code) => return Ok(Outcome::Exited(code)),
            }
        }
    }
}
