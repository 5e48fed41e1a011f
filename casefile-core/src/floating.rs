use std::time::Duration;
use rand::Rng;

use crate::event::{FloatVariant, FloatingWord, OutputEvent};
use crate::runtime::{Ctx, Interval, Timers};

const CLEAR_FADE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct FloatOptions {
    pub variant: FloatVariant,
    pub interval: Duration,
    pub lifetime: Duration,
    pub looping: bool,
    pub size: (f32, f32),
    pub opacity: (f32, f32),
}

impl Default for FloatOptions {
    fn default() -> Self {
        Self {
            variant: FloatVariant::Normal,
            interval: Duration::from_millis(800),
            lifetime: Duration::from_millis(3000),
            looping: false,
            size: (1.0, 2.5),
            opacity: (0.2, 0.5),
        }
    }
}

/// Ambient words drifting in the page margins.
///
/// Owned by whichever screen started it; `stop` halts spawning and leaves
/// live words to expire, `clear` also fades out the live ones.
#[derive(Debug)]
pub struct FloatingText {
    words: Vec<String>,
    options: FloatOptions,
    index: usize,
    spawner: Interval,
    live: Vec<u64>,
    expiry: Timers<u64>,
}

impl FloatingText {
    /// Starts spawning; the first word appears at once.
    pub fn start(words: Vec<String>, options: FloatOptions, ctx: &mut Ctx) -> Self {
        let mut floating = Self {
            spawner: Interval::new(options.interval),
            words,
            options,
            index: 0,
            live: Vec::new(),
            expiry: Timers::default(),
        };
        if floating.words.is_empty() {
            floating.spawner.stop();
        } else {
            floating.spawn_next(ctx);
        }
        floating
    }

    pub fn tick(&mut self, dt: Duration, ctx: &mut Ctx) {
        for id in self.expiry.tick(dt) {
            self.live.retain(|l| *l != id);
            ctx.push(OutputEvent::RemoveFloating { id });
        }
        for _ in 0..self.spawner.tick(dt) {
            self.spawn_next(ctx);
        }
    }

    pub fn stop(&mut self) {
        self.spawner.stop();
    }

    pub fn clear(&mut self, ctx: &mut Ctx) {
        self.stop();
        self.expiry.clear();
        for &id in &self.live {
            ctx.push(OutputEvent::FadeFloating { id });
            self.expiry.after(CLEAR_FADE, id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.spawner.is_running()
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    fn spawn_next(&mut self, ctx: &mut Ctx) {
        if !self.spawner.is_running() {
            return;
        }
        let text = self.words[self.index].clone();
        self.index += 1;
        if self.index >= self.words.len() {
            if self.options.looping {
                self.index = 0;
            } else {
                self.spawner.stop();
            }
        }

        let id = ctx.next_float_id();
        let rng = &mut ctx.rng;
        let x = if rng.random_bool(0.5) {
            2.0 + rng.random::<f32>() * 23.0
        } else {
            75.0 + rng.random::<f32>() * 23.0
        };
        let y = 5.0 + rng.random::<f32>() * 90.0;
        let (min_size, max_size) = self.options.size;
        let (min_opacity, max_opacity) = self.options.opacity;
        let word = FloatingWord {
            id,
            text,
            variant: self.options.variant,
            x,
            y,
            size: min_size + rng.random::<f32>() * (max_size - min_size),
            opacity: min_opacity + rng.random::<f32>() * (max_opacity - min_opacity),
            lifetime: self.options.lifetime,
        };
        self.live.push(id);
        self.expiry.after(self.options.lifetime, id);
        ctx.push(OutputEvent::SpawnFloating(word));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ctx;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    fn spawned(ctx: &mut Ctx) -> Vec<FloatingWord> {
        ctx.drain()
            .into_iter()
            .filter_map(|e| match e {
                OutputEvent::SpawnFloating(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn once_through_spawns_every_word_then_stops() {
        let mut ctx = ctx();
        let mut floating = FloatingText::start(words(&["a", "b", "c"]), FloatOptions::default(), &mut ctx);
        assert_eq!(spawned(&mut ctx).len(), 1);

        floating.tick(MS(800), &mut ctx);
        floating.tick(MS(800), &mut ctx);
        let later: Vec<_> = spawned(&mut ctx).into_iter().map(|w| w.text).collect();
        assert_eq!(later, ["b", "c"]);
        assert!(!floating.is_running());

        floating.tick(MS(800), &mut ctx);
        assert!(spawned(&mut ctx).is_empty());
    }

    #[test]
    fn looping_wraps_and_positions_stay_in_the_margins() {
        let mut ctx = ctx();
        let options = FloatOptions { looping: true, interval: MS(100), size: (1.2, 2.5), ..FloatOptions::default() };
        let mut floating = FloatingText::start(words(&["x", "y"]), options, &mut ctx);
        floating.tick(MS(500), &mut ctx);

        let all = spawned(&mut ctx);
        assert_eq!(all.len(), 6);
        assert_eq!(all.iter().map(|w| w.text.as_str()).collect::<String>(), "xyxyxy");
        for w in &all {
            assert!((2.0..=25.0).contains(&w.x) || (75.0..=98.0).contains(&w.x), "x = {}", w.x);
            assert!((5.0..=95.0).contains(&w.y));
            assert!((1.2..=2.5).contains(&w.size));
            assert!((0.2..=0.5).contains(&w.opacity));
        }
        assert!(floating.is_running());
    }

    #[test]
    fn words_expire_and_clear_fades_the_rest() {
        let mut ctx = ctx();
        let options = FloatOptions { looping: true, ..FloatOptions::default() };
        let mut floating = FloatingText::start(words(&["x"]), options, &mut ctx);
        floating.tick(MS(2400), &mut ctx);
        assert_eq!(floating.live(), 4);

        floating.tick(MS(600), &mut ctx);
        assert_eq!(floating.live(), 3);
        ctx.drain();

        floating.clear(&mut ctx);
        let fades = ctx.drain().iter().filter(|e| matches!(e, OutputEvent::FadeFloating { .. })).count();
        assert_eq!(fades, 3);
        floating.tick(MS(1000), &mut ctx);
        assert_eq!(floating.live(), 0);
        assert!(spawned(&mut ctx).is_empty());
    }
}
