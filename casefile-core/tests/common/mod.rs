#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use casefile_core::config::CoreConfig;
use casefile_core::event::{Element, InputEvent, ItemState, OutputEvent, ScreenId};
use casefile_core::manager::load_story;
use casefile_core::renderer::view::ViewState;
use casefile_core::script::Story;
use casefile_core::Game;

pub const FRAME: Duration = Duration::from_millis(20);
const MAX_FRAMES: usize = 400_000;

pub fn story() -> Arc<Story> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../game/story.json");
    load_story(path).expect("bundled story loads")
}

/// A game plus a view folded from everything it rendered.
pub struct Harness {
    pub game: Game,
    pub view: ViewState,
    pub log: Vec<OutputEvent>,
    pub name: String,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            game: Game::new(story(), &CoreConfig::default()),
            view: ViewState::new(),
            log: Vec::new(),
            name: "Jess".into(),
        }
    }

    fn collect(&mut self) {
        for event in self.game.drain() {
            self.view.apply(&event);
            self.log.push(event);
        }
    }

    pub fn feed(&mut self, input: InputEvent) -> bool {
        let handled = self.game.feed(input);
        self.collect();
        handled
    }

    pub fn frame(&mut self) {
        self.game.tick(FRAME);
        self.collect();
    }

    pub fn run(&mut self, duration: Duration) {
        let mut left = duration;
        while !left.is_zero() {
            let dt = left.min(FRAME);
            self.game.tick(dt);
            self.collect();
            left -= dt;
        }
    }

    /// Runs until no reveal is in progress.
    pub fn settle(&mut self) {
        for _ in 0..MAX_FRAMES {
            if !self.game.ctx().is_typing() {
                return;
            }
            self.frame();
        }
        panic!("text never finished revealing");
    }

    pub fn take_log(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.log)
    }

    /// The input a player would most plausibly give right now, if any.
    pub fn next_move(&self) -> Option<InputEvent> {
        let screen = self.view.screen();
        if self.game.ctx().is_typing() {
            return None;
        }
        if self.view.is_visible(Element::NameConfirm) {
            return Some(InputEvent::Confirm { yes: true });
        }
        if self.view.is_visible(Element::NameInput) {
            return Some(InputEvent::SubmitText { text: self.name.clone() });
        }
        if !self.view.choices.is_empty() {
            return Some(InputEvent::Choose { index: 0 });
        }
        if self.view.button().is_some() {
            return Some(InputEvent::Continue);
        }
        if self.view.is_visible(Element::EnterHint(screen)) {
            return Some(InputEvent::Advance);
        }
        let grid = match screen {
            ScreenId::Evidence => Element::EvidenceGrid,
            ScreenId::Witness => Element::WitnessList,
            ScreenId::Identify => Element::IdentifyGrid,
            _ => return None,
        };
        if self.view.disabled.contains(&grid) {
            return None;
        }
        self.view.grids.get(&grid)?.iter()
            .find(|(_, state)| *state == ItemState::Available)
            .map(|(item, _)| InputEvent::Select { id: item.id.clone() })
    }

    /// Plays on its own until `done` holds.
    pub fn play_until(&mut self, done: impl Fn(&Harness) -> bool) {
        for _ in 0..MAX_FRAMES {
            if done(self) {
                return;
            }
            if let Some(input) = self.next_move() {
                self.feed(input);
            }
            self.frame();
        }
        panic!("stuck on {:?}", self.game.screen());
    }

    pub fn start(&mut self) {
        assert!(self.feed(InputEvent::Start));
    }

    /// Cold start through the intro and title, up to the menu.
    pub fn to_menu(&mut self) {
        self.start();
        self.play_until(|h| h.game.screen() == ScreenId::Title);
        assert!(self.feed(InputEvent::Continue));
        assert_eq!(self.game.screen(), ScreenId::Menu);
    }

    /// Marks every prerequisite done and opens the identify screen.
    pub fn to_identify(&mut self) {
        self.to_menu();
        let story = self.game.ctx().story.clone();
        let progress = &mut self.game.ctx_mut().session.progress;
        progress.leads_complete = true;
        for item in &story.evidence.items {
            progress.complete_evidence(&item.id);
        }
        for witness in &story.witnesses.witnesses {
            progress.complete_witness(&witness.id);
        }
        assert!(self.feed(InputEvent::Open { screen: ScreenId::Identify }));
        assert_eq!(self.game.screen(), ScreenId::Identify);
    }
}
