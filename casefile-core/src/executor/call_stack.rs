use crate::executor::frame::Frame;

/// Root script at the bottom, one frame per choice response being played.
#[derive(Debug, Default, Clone)]
pub struct CallStack {
    pub stack: Vec<Frame>,
}

impl CallStack {
    pub fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.stack.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
