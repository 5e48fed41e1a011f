pub mod driver;
pub mod terminal;
#[cfg(feature = "tui")]
pub mod tui;
pub mod view;

use crate::event::{InputEvent, OutputEvent};

pub trait Renderer {
    fn render(&mut self, out: &OutputEvent);

    /// Next pending input, without blocking.
    fn poll(&mut self) -> Option<InputEvent>;

    /// Called once per frame after every event was rendered.
    fn present(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
