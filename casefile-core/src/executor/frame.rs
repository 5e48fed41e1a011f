use crate::script::{DialogueStep, Script};

#[derive(Debug, Clone)]
pub struct Frame {
    pub steps: Script,
    pub pc: usize,
}

impl Frame {
    pub fn new(steps: impl Into<Script>, pc: usize) -> Self {
        Self { steps: steps.into(), pc }
    }

    pub fn current(&self) -> Option<&DialogueStep> {
        self.steps.get(self.pc)
    }

    /// The step after the current one.
    pub fn peek(&self) -> Option<&DialogueStep> {
        self.steps.get(self.pc + 1)
    }

    pub fn advance(&mut self) {
        self.pc += 1;
    }
}
