use std::sync::Arc;
use std::time::Duration;

use crate::config::CoreConfig;
use crate::event::{InputEvent, OutputEvent, ScreenId};
use crate::runtime::Ctx;
use crate::screens::{
    EvidenceScreen, IdentifyScreen, IntroScreen, LeadsScreen, MenuScreen, Screen, TitleScreen, WitnessScreen,
};
use crate::script::Story;

const OPENING_TRACK: &str = "bgm";

#[derive(Default)]
struct Screens {
    intro: IntroScreen,
    title: TitleScreen,
    menu: MenuScreen,
    leads: LeadsScreen,
    evidence: EvidenceScreen,
    witness: WitnessScreen,
    identify: IdentifyScreen,
}

impl Screens {
    fn get_mut(&mut self, id: ScreenId) -> Option<&mut dyn Screen> {
        let screen: &mut dyn Screen = match id {
            ScreenId::Intro => &mut self.intro,
            ScreenId::Title => &mut self.title,
            ScreenId::Menu => &mut self.menu,
            ScreenId::Leads => &mut self.leads,
            ScreenId::Evidence => &mut self.evidence,
            ScreenId::Witness => &mut self.witness,
            ScreenId::Identify => &mut self.identify,
            ScreenId::Start | ScreenId::End => return None,
        };
        Some(screen)
    }

    fn reset(&mut self) {
        self.intro.reset();
        self.title.reset();
        self.menu.reset();
        self.leads.reset();
        self.evidence.reset();
        self.witness.reset();
        self.identify.reset();
    }
}

/// One play session: the shared context plus every screen, and the router
/// that moves between them.
pub struct Game {
    ctx: Ctx,
    screens: Screens,
    quit: bool,
}

impl Game {
    pub fn new(story: Arc<Story>, config: &CoreConfig) -> Self {
        Self {
            ctx: Ctx::new(story, config),
            screens: Screens::default(),
            quit: false,
        }
    }

    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    /// Direct access for frontends and tests, e.g. to restore progress.
    pub fn ctx_mut(&mut self) -> &mut Ctx {
        &mut self.ctx
    }

    pub fn screen(&self) -> ScreenId {
        self.ctx.screen()
    }

    pub fn identify(&self) -> &IdentifyScreen {
        &self.screens.identify
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    /// Everything produced since the last call.
    pub fn drain(&mut self) -> Vec<OutputEvent> {
        self.ctx.drain()
    }

    /// Delivers one input. Returns `true` when something consumed it.
    pub fn feed(&mut self, input: InputEvent) -> bool {
        log::trace!("input {:?} on {:?}", input, self.screen());
        let handled = match (&input, self.screen()) {
            (InputEvent::Quit, _) => {
                log::info!("Quit requested");
                self.quit = true;
                true
            }
            (InputEvent::Start, ScreenId::Start) => {
                log::info!("Session started");
                self.ctx.audio.register_bundled();
                self.ctx.play_track(OPENING_TRACK, None);
                self.ctx.request_screen(ScreenId::Intro);
                true
            }
            (InputEvent::Exit, ScreenId::Menu) => {
                self.ctx.audio.pause_current();
                self.ctx.request_screen(ScreenId::End);
                true
            }
            (InputEvent::PlayAgain, ScreenId::End) => {
                self.play_again();
                true
            }
            (_, id) => match self.screens.get_mut(id) {
                Some(screen) => screen.feed(&mut self.ctx, &input),
                None => false,
            },
        };
        if !handled {
            log::debug!("Input {:?} ignored on {:?}", input, self.screen());
        }
        self.pump();
        handled
    }

    pub fn tick(&mut self, dt: Duration) {
        self.ctx.tick(dt);
        if let Some(screen) = self.screens.get_mut(self.ctx.screen()) {
            screen.tick(&mut self.ctx, dt);
        }
        self.pump();
    }

    fn play_again(&mut self) {
        log::info!("Play again: resetting the session");
        if let Some(screen) = self.screens.get_mut(self.ctx.screen()) {
            screen.leave(&mut self.ctx);
        }
        self.ctx.reset();
        self.screens.reset();
        self.ctx.set_screen(ScreenId::Start);
        self.ctx.push(OutputEvent::ShowScreen { screen: ScreenId::Start });
    }

    /// Hands finished reveals to the live screen and applies route requests
    /// until both settle.
    fn pump(&mut self) {
        loop {
            if self.ctx.take_typed() {
                if let Some(screen) = self.screens.get_mut(self.ctx.screen()) {
                    screen.on_typed(&mut self.ctx);
                }
                continue;
            }
            match self.ctx.take_route() {
                Some(next) => self.show_screen(next),
                None => break,
            }
        }
    }

    fn show_screen(&mut self, next: ScreenId) {
        let previous = self.screen();
        log::info!("Screen {:?} -> {:?}", previous, next);
        if let Some(screen) = self.screens.get_mut(previous) {
            screen.leave(&mut self.ctx);
        }
        self.ctx.skip_typing();
        self.ctx.set_screen(next);
        self.ctx.push(OutputEvent::ShowScreen { screen: next });
        if let Some(screen) = self.screens.get_mut(next) {
            screen.enter(&mut self.ctx);
        }
    }
}
