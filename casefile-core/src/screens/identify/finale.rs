use std::time::Duration;

use crate::event::{Element, FloatVariant, OutputEvent, ScreenId, Surface};
use crate::executor::{Flow, Pacing, Sequencer, StepHooks, Then, CLICK};
use crate::floating::{FloatOptions, FloatingText};
use crate::runtime::{Ctx, Timers};
use crate::script::{Action, DialogueStep, Pitch};
use crate::text::RevealOptions;

const SCREEN: ScreenId = ScreenId::Identify;
const INPUT_DELAY: Duration = Duration::from_millis(500);
const LUISA_DELAY: Duration = Duration::from_millis(800);
const DIALOGUE_DELAY: Duration = Duration::from_millis(3000);
const DIALOGUE_HOLD: Duration = Duration::from_millis(1800);
const MUSIC_FADE: Duration = Duration::from_millis(8000);
const END_DELAY: Duration = Duration::from_millis(2000);
const OVERLAY_SETTLE: Duration = Duration::from_millis(3500);
const MESSAGE_HOLD: Duration = Duration::from_millis(4000);
const MESSAGE_GAP: Duration = Duration::from_millis(2000);
const LATE_FADE: Duration = Duration::from_millis(3000);
const LATE_HOLD: Duration = Duration::from_millis(7000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinaleTimer {
    ShowInput,
    ShowLuisa,
    Dialogue,
    Overlay,
    Message(usize),
    HideMessage(usize),
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Prompt,
    Answering,
    Reunion,
    Ending,
    Done,
}

#[derive(Default)]
struct FinaleHooks {
    fading: bool,
    ended: bool,
    finished: bool,
}

fn is_luisa(step: &DialogueStep) -> bool {
    step.speaker.as_deref() == Some("luisa")
}

impl StepHooks for FinaleHooks {
    fn on_step(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Option<Flow> {
        let then = match step.action {
            Action::StartFade => {
                ctx.flag(Element::Portrait(SCREEN), "bean-up", true);
                ctx.flag(Element::Luisa, "bean-up", true);
                ctx.audio.fade_out_current(MUSIC_FADE);
                ctx.flush_audio();
                self.fading = true;
                Then::AwaitInput
            }
            Action::End => Then::Resume,
            _ => Then::AwaitInput,
        };
        if step.text.is_none() {
            return Some(Flow::then(then));
        }
        let class = if is_luisa(step) { "speaker-luisa" } else { "speaker-mol" };
        let mut options = RevealOptions::speech(Surface::Dialogue(SCREEN))
            .speaker(step.speaker.as_deref())
            .pitch(self.voice(step))
            .class(class);
        options.detect_shouty = false;
        Some(Flow::say(step.text(), options, then))
    }

    fn resume(&mut self, _ctx: &mut Ctx, step: &DialogueStep) -> Then {
        match step.action {
            Action::End => {
                self.ended = true;
                Then::Pause(END_DELAY, Box::new(Then::Finish))
            }
            _ => Then::AwaitInput,
        }
    }

    fn voice(&self, step: &DialogueStep) -> Pitch {
        if is_luisa(step) {
            Pitch::Luisa
        } else {
            Pitch::Normal
        }
    }

    fn on_complete(&mut self, _ctx: &mut Ctx) {
        self.finished = true;
    }
}

/// The last question, the answer, and the conversation that follows it.
pub struct Finale {
    stage: Stage,
    wrong_answers: usize,
    floating: FloatingText,
    seq: Sequencer,
    hooks: FinaleHooks,
    timers: Timers<FinaleTimer>,
    ended: bool,
}

impl Finale {
    pub fn start(ctx: &mut Ctx) -> Self {
        let story = ctx.story.clone();
        let finale = &story.identify.finale;
        log::info!("Finale started");
        ctx.show(Element::Dreams, false);
        let options = FloatOptions {
            variant: FloatVariant::Soft,
            interval: Duration::from_millis(600),
            lifetime: Duration::from_millis(5000),
            looping: true,
            size: (1.0, 2.0),
            opacity: (0.2, 0.45),
        };
        let floating = FloatingText::start(finale.floating_words.clone(), options, ctx);
        ctx.reveal(&finale.prompt, RevealOptions::speech(Surface::Dialogue(SCREEN)));
        Self {
            stage: Stage::Prompt,
            wrong_answers: 0,
            floating,
            seq: Sequencer::new(SCREEN).with_pacing(Pacing::Auto(DIALOGUE_HOLD)),
            hooks: FinaleHooks::default(),
            timers: Timers::default(),
            ended: false,
        }
    }

    pub fn wrong_answers(&self) -> usize {
        self.wrong_answers
    }

    pub fn is_answering(&self) -> bool {
        self.stage == Stage::Answering
    }

    /// True once the last message faded out.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Checks an answer. Blank input is ignored and keeps the field open.
    pub fn submit(&mut self, ctx: &mut Ctx, text: &str) -> bool {
        if self.stage != Stage::Answering {
            return false;
        }
        let answer = text.trim().to_lowercase();
        if answer.is_empty() {
            return false;
        }
        ctx.play_sfx(CLICK);
        let story = ctx.story.clone();
        let finale = &story.identify.finale;
        let own_name = ctx.session.player_name.as_ref().is_some_and(|n| n.trim().to_lowercase() == answer);
        if finale.valid_answers.contains(&answer) || own_name {
            log::info!("Subject identified");
            ctx.show(Element::FinaleInput, false);
            self.reunion(ctx);
        } else {
            let messages = &finale.wrong_answer_messages;
            let message = messages.get(self.wrong_answers % messages.len().max(1));
            self.wrong_answers += 1;
            log::debug!("Wrong answer #{}", self.wrong_answers);
            if let Some(message) = message {
                ctx.reveal(message, RevealOptions::speech(Surface::Dialogue(SCREEN)));
            }
        }
        true
    }

    pub fn on_typed(&mut self, ctx: &mut Ctx) {
        match self.stage {
            Stage::Prompt => {
                self.stage = Stage::Answering;
                self.timers.after(INPUT_DELAY, FinaleTimer::ShowInput);
            }
            Stage::Reunion => {
                self.seq.on_typed(ctx, &mut self.hooks);
                self.settle(ctx);
            }
            _ => {}
        }
    }

    pub fn tick(&mut self, ctx: &mut Ctx, dt: Duration) {
        self.floating.tick(dt, ctx);
        for timer in self.timers.tick(dt) {
            match timer {
                FinaleTimer::ShowInput => ctx.show(Element::FinaleInput, true),
                FinaleTimer::ShowLuisa => ctx.flag(Element::Luisa, "visible", true),
                FinaleTimer::Dialogue => {
                    let dialogue = ctx.story.identify.finale.final_dialogue.clone();
                    self.seq.start(ctx, &mut self.hooks, dialogue);
                }
                FinaleTimer::Overlay => {
                    ctx.flag(Element::FadeOverlay, "active", true);
                    self.timers.after(OVERLAY_SETTLE, FinaleTimer::Message(0));
                }
                FinaleTimer::Message(index) => self.show_message(ctx, index),
                FinaleTimer::HideMessage(index) => {
                    ctx.flag(Element::FadeOverlay, "visible", false);
                    self.timers.after(MESSAGE_GAP, FinaleTimer::Message(index + 1));
                }
                FinaleTimer::Finish => self.finish(ctx),
            }
        }
        self.seq.tick(ctx, &mut self.hooks, dt);
        self.settle(ctx);
    }

    pub fn stop(&mut self, ctx: &mut Ctx) {
        self.seq.stop();
        self.timers.clear();
        self.floating.clear(ctx);
        self.stage = Stage::Done;
    }

    fn reunion(&mut self, ctx: &mut Ctx) {
        self.stage = Stage::Reunion;
        ctx.show(Element::EnterHint(SCREEN), false);
        ctx.show(Element::IdentifyGrid, false);
        ctx.push(OutputEvent::HideChoices { screen: SCREEN });
        ctx.show(Element::Luisa, true);
        ctx.flag(Element::IdentifyArea, "finale-mode", true);
        ctx.push(OutputEvent::ClearText { surface: Surface::Dialogue(SCREEN) });
        self.timers.after(LUISA_DELAY, FinaleTimer::ShowLuisa);
        self.timers.after(DIALOGUE_DELAY, FinaleTimer::Dialogue);
    }

    fn settle(&mut self, ctx: &mut Ctx) {
        if std::mem::take(&mut self.hooks.fading) {
            self.floating.stop();
        }
        if !std::mem::take(&mut self.hooks.finished) {
            return;
        }
        self.stage = Stage::Ending;
        self.floating.stop();
        if self.hooks.ended {
            self.timers.after(Duration::ZERO, FinaleTimer::Overlay);
        } else {
            // no closing line; fade everything out on our own
            ctx.flag(Element::FadeOverlay, "active", true);
            ctx.audio.fade_out_current(LATE_FADE);
            ctx.flush_audio();
            self.timers.after(LATE_HOLD, FinaleTimer::Finish);
        }
    }

    fn show_message(&mut self, ctx: &mut Ctx, index: usize) {
        let Some(message) = ctx.story.identify.finale.end_messages.get(index).cloned() else {
            self.finish(ctx);
            return;
        };
        ctx.push(OutputEvent::SetText { surface: Surface::FadeOverlay, text: message });
        ctx.flag(Element::FadeOverlay, "visible", true);
        self.timers.after(MESSAGE_HOLD, FinaleTimer::HideMessage(index));
    }

    fn finish(&mut self, ctx: &mut Ctx) {
        ctx.flag(Element::FadeOverlay, "active", false);
        ctx.push(OutputEvent::ClearText { surface: Surface::FadeOverlay });
        self.stage = Stage::Done;
        self.ended = true;
        log::info!("The end");
    }
}
