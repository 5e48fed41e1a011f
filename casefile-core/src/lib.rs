pub mod audio;
pub mod config;
pub mod event;
pub mod executor;
pub mod floating;
pub mod game;
pub mod manager;
pub mod renderer;
pub mod runtime;
pub mod screens;
pub mod script;
pub mod text;

#[cfg(test)]
mod testing;

pub use runtime::Ctx;
pub use executor::Sequencer;
pub use game::Game;
pub use manager::StoryManager;
pub use event::{InputEvent, OutputEvent};
pub use renderer::terminal::TerminalRenderer;
#[cfg(feature = "tui")]
pub use renderer::tui::TuiRenderer;
