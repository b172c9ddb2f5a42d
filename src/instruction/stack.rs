//! Per-name instruction history for one composition run.

use indexmap::IndexMap;

use super::Instruction;
use crate::core::error::Collision;
use crate::core::types::{Stage, TAGS_ATTR};
use crate::value::DocMerger;

/// Ordered record of the instructions folded for one attribute name
///
/// The last entry is always the currently winning instruction.
#[derive(Debug, Clone)]
pub struct InstructionStack {
    name: String,
    /// Running fold results, one per accepted instruction
    entries: Vec<Instruction>,
    /// Every instruction accepted so far, as declared
    history: Vec<Instruction>,
}

impl InstructionStack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fold an instruction into the running result
    ///
    /// Returns `Ok(false)` if the instruction was dropped because it equals
    /// the current winner and `drop_duplicates` is set. Only the top is
    /// compared: an instruction that reappears after a different one is
    /// folded again.
    pub fn push(
        &mut self,
        instruction: Instruction,
        docs: &DocMerger,
        drop_duplicates: bool,
    ) -> Result<bool, Collision> {
        if drop_duplicates && self.top() == Some(&instruction) {
            tracing::debug!("Dropped instruction equal to the current winner {}", instruction);
            return Ok(false);
        }

        let folded = match self.entries.last() {
            Some(top) => top.combine_with(&instruction, docs)?,
            None => instruction.clone(),
        };

        self.history.push(instruction);
        self.entries.push(folded);
        Ok(true)
    }

    /// The currently winning instruction
    pub fn top(&self) -> Option<&Instruction> {
        self.entries.last()
    }

    /// Running fold results in order
    pub fn entries(&self) -> &[Instruction] {
        &self.entries
    }

    /// Accepted instructions as declared
    pub fn history(&self) -> &[Instruction] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All stacks of one composition, split by stage, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct Stacks {
    stage1: IndexMap<String, InstructionStack>,
    stage2: IndexMap<String, InstructionStack>,
}

impl Stacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a named instruction into the stack for its stage and name
    ///
    /// Ordinary names keep one stack per stage, so an attribute can be
    /// installed and then plumbed. The reserved tags name only takes
    /// `implements`: anything folded there from the other stage collides.
    pub fn fold(
        &mut self,
        instruction: Instruction,
        docs: &DocMerger,
        drop_duplicates: bool,
    ) -> Result<bool, Collision> {
        let name = instruction.name().unwrap_or("None").to_string();
        let stage = instruction.stage();
        let (stacks, other) = match stage {
            Stage::Stage1 => (&mut self.stage1, &self.stage2),
            Stage::Stage2 => (&mut self.stage2, &self.stage1),
        };
        if name == TAGS_ATTR {
            if let Some(top) = other.get(&name).and_then(InstructionStack::top) {
                return Err(Collision::between(top, &instruction));
            }
        }
        let stack = stacks
            .entry(name.clone())
            .or_insert_with(|| InstructionStack::new(name));
        stack.push(instruction, docs, drop_duplicates)
    }

    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &InstructionStack> {
        match stage {
            Stage::Stage1 => self.stage1.values(),
            Stage::Stage2 => self.stage2.values(),
        }
    }

    pub fn get(&self, stage: Stage, name: &str) -> Option<&InstructionStack> {
        match stage {
            Stage::Stage1 => self.stage1.get(name),
            Stage::Stage2 => self.stage2.get(name),
        }
    }

    /// Winning instruction for a name, if any
    pub fn winner(&self, stage: Stage, name: &str) -> Option<&Instruction> {
        self.get(stage, name).and_then(InstructionStack::top)
    }

    pub fn len(&self) -> usize {
        self.stage1.len() + self.stage2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stage1.is_empty() && self.stage2.is_empty()
    }
}
