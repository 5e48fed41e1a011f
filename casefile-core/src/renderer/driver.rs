use std::thread;
use std::time::{Duration, Instant};

use crate::game::Game;
use crate::renderer::Renderer;

/// Owns the frame loop: input, tick, render.
pub struct Driver<R: Renderer> {
    game: Game,
    renderer: R,
    tick: Duration,
}

impl<R: Renderer> Driver<R> {
    pub fn new(game: Game, renderer: R, tick: Duration) -> Self {
        Self { game, renderer, tick }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Runs one frame with an explicit `dt`.
    #[inline]
    pub fn frame(&mut self, dt: Duration) -> anyhow::Result<()> {
        while let Some(input) = self.renderer.poll() {
            self.game.feed(input);
        }
        self.game.tick(dt);
        for event in self.game.drain() {
            self.renderer.render(&event);
        }
        self.renderer.present()
    }

    /// Runs until the player quits.
    pub fn run(&mut self) -> anyhow::Result<()> {
        log::info!("Driver running at {:?} per frame", self.tick);
        let mut last = Instant::now();
        while !self.game.is_quit() {
            let now = Instant::now();
            let dt = now - last;
            last = now;
            self.frame(dt)?;
            if let Some(rest) = self.tick.checked_sub(now.elapsed()) {
                thread::sleep(rest);
            }
        }
        log::info!("Driver stopped");
        Ok(())
    }

    pub fn into_parts(self) -> (Game, R) {
        (self.game, self.renderer)
    }
}
