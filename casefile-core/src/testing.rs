//! Fixtures for unit tests.

use std::sync::Arc;

use crate::config::CoreConfig;
use crate::manager::StoryManager;
use crate::runtime::Ctx;
use crate::script::Story;

const STORY: &str = include_str!("../../game/story.json");

pub fn story() -> Arc<Story> {
    let mut manager = StoryManager::new();
    manager.load_str(STORY, "story.json").expect("bundled story parses");
    manager.build().expect("bundled story validates")
}

/// A context with the bundled sounds registered.
pub fn ctx() -> Ctx {
    let mut ctx = Ctx::new(story(), &CoreConfig::default());
    ctx.audio.register_bundled();
    ctx
}
