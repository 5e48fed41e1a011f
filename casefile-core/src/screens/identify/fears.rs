//! The shadows: fear words typed into an overlay, then crossed out one
//! cluster at a time.

use std::collections::VecDeque;
use std::time::Duration;

use crate::event::{Element, FloatVariant, OutputEvent, ScreenId, Surface};
use crate::executor::{say_step, Flow, Pacing, Sequencer, StepHooks, Then, CLICK};
use crate::floating::{FloatOptions, FloatingText};
use crate::runtime::{Ctx, Timers};
use crate::script::{Action, DepressionStage, DialogueStep, RecoveryStage, Script};
use crate::text::RevealOptions;

const SCREEN: ScreenId = ScreenId::Identify;
const INTRO_HOLD: Duration = Duration::from_millis(1500);
const REACTION_HOLD: Duration = Duration::from_millis(1200);
const CONCLUSION_HOLD: Duration = Duration::from_millis(1500);
const WORD_GAP: Duration = Duration::from_millis(400);
const CLUSTER_SETTLE: Duration = Duration::from_millis(800);
const NEXT_CLUSTER_DELAY: Duration = Duration::from_millis(500);
const CONCLUSION_DELAY: Duration = Duration::from_millis(1000);
const WORDS_FADE: Duration = Duration::from_millis(2000);
const RECOVERY_HOLD: Duration = Duration::from_millis(1500);
const DREAMS_DELAY: Duration = Duration::from_millis(1000);
const RESTORED_VOLUME: f32 = 0.3;

/// Says the step's line if it has one, then `then`.
pub(crate) fn say_or(step: &DialogueStep, then: Then) -> Flow {
    if step.text.is_some() {
        say_step(SCREEN, step, step.pitch.unwrap_or_default(), then)
    } else {
        Flow::then(then)
    }
}

/// Wipes every depression and recovery class off the identify area.
fn clear_mood(ctx: &mut Ctx) {
    for level in 1..=4 {
        ctx.flag(Element::IdentifyArea, &format!("depression-{}", level), false);
        ctx.flag(Element::IdentifyArea, &format!("recovery-{}", level), false);
    }
}

pub(crate) fn set_depression(ctx: &mut Ctx, stage: DepressionStage) {
    clear_mood(ctx);
    if stage > DepressionStage::Clear {
        ctx.flag(Element::IdentifyArea, &format!("depression-{}", stage.level()), true);
    }
    if let Some(volume) = stage.music_volume() {
        ctx.set_music_volume(volume);
    }
}

pub(crate) fn set_recovery(ctx: &mut Ctx, stage: RecoveryStage) {
    clear_mood(ctx);
    ctx.flag(Element::IdentifyArea, &format!("recovery-{}", stage.level()), true);
}

/// How the fear sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FearOutcome {
    Dreams,
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FearWord {
    pub text: String,
    pub cluster: usize,
    pub double: bool,
    pub clicks: u8,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Intro,
    Clusters,
    Conclusion,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FearTimer {
    NextWord,
    Reaction(usize),
    Conclusion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterWords {
    Reaction(usize),
    Crossing,
}

#[derive(Debug)]
struct PendingWord {
    text: String,
    cluster: usize,
    double: bool,
    separator: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FearSignal {
    ShowFears,
    NextCluster,
    EnableCrossing,
    ClearFloating,
    Dreams,
    Finished,
}

#[derive(Default)]
struct FearHooks {
    signals: Vec<FearSignal>,
    /// Second beat of a two-step action.
    beat: bool,
}

impl FearHooks {
    /// First call returns `first`, the next one runs `second`.
    fn two_beat(&mut self, first: Then, second: impl FnOnce(&mut Self) -> Then) -> Then {
        if self.beat {
            self.beat = false;
            second(self)
        } else {
            self.beat = true;
            first
        }
    }
}

impl StepHooks for FearHooks {
    fn on_step(&mut self, _ctx: &mut Ctx, step: &DialogueStep) -> Option<Flow> {
        let then = match step.action {
            Action::ShowFears
            | Action::ShowNextCluster
            | Action::EnableCrossing
            | Action::FadeWords
            | Action::FullRecovery
            | Action::ShowDreams => Then::Resume,
            _ => return None,
        };
        Some(say_or(step, then))
    }

    fn resume(&mut self, ctx: &mut Ctx, step: &DialogueStep) -> Then {
        match step.action {
            Action::ShowFears => {
                self.signals.push(FearSignal::ShowFears);
                Then::Halt
            }
            Action::ShowNextCluster => self.two_beat(Then::Pause(NEXT_CLUSTER_DELAY, Box::new(Then::Resume)), |h| {
                h.signals.push(FearSignal::NextCluster);
                Then::Halt
            }),
            Action::EnableCrossing => {
                self.signals.push(FearSignal::EnableCrossing);
                Then::Halt
            }
            Action::FadeWords if self.beat => {
                self.beat = false;
                ctx.show(Element::FearWords, false);
                ctx.flag(Element::FearWords, "fade-out", false);
                Then::Next
            }
            Action::FadeWords => {
                self.beat = true;
                ctx.flag(Element::FearWords, "fade-out", true);
                Then::Pause(WORDS_FADE, Box::new(Then::Resume))
            }
            Action::FullRecovery => {
                set_recovery(ctx, RecoveryStage::Restored);
                self.signals.push(FearSignal::ClearFloating);
                ctx.set_music_volume(RESTORED_VOLUME);
                Then::Pause(RECOVERY_HOLD, Box::new(Then::Next))
            }
            Action::ShowDreams => self.two_beat(Then::Pause(DREAMS_DELAY, Box::new(Then::Resume)), |h| {
                h.signals.push(FearSignal::Dreams);
                Then::Halt
            }),
            _ => Then::AwaitInput,
        }
    }

    fn on_complete(&mut self, _ctx: &mut Ctx) {
        self.signals.push(FearSignal::Finished);
    }
}

/// Drives the whole fear sequence for the identify screen.
pub struct FearSequence {
    seq: Sequencer,
    hooks: FearHooks,
    stage: Stage,
    words: Vec<FearWord>,
    pending: VecDeque<PendingWord>,
    after_words: AfterWords,
    typing_word: bool,
    depression: DepressionStage,
    cluster: usize,
    active: usize,
    crossing: bool,
    crossed: usize,
    additional: usize,
    response_started: bool,
    /// Cluster cleared; waiting for its reaction line to finish.
    awaiting_line: bool,
    floating: FloatingText,
    timers: Timers<FearTimer>,
    outcome: Option<FearOutcome>,
}

impl FearSequence {
    pub fn start(ctx: &mut Ctx) -> Self {
        let story = ctx.story.clone();
        let fears = &story.identify.fears;
        let all_words: Vec<String> = fears.clusters.iter()
            .flat_map(|c| c.words.iter().cloned())
            .chain(fears.additional.iter().flat_map(|c| c.words.iter().cloned()))
            .collect();
        let options = FloatOptions {
            variant: FloatVariant::Negative,
            interval: Duration::from_millis(1000),
            lifetime: Duration::from_millis(5000),
            looping: true,
            size: (1.2, 2.5),
            opacity: (0.25, 0.5),
        };
        log::info!("Fear sequence started");
        ctx.show(Element::FearWords, false);

        let mut fear = Self {
            seq: Sequencer::new(SCREEN),
            hooks: FearHooks::default(),
            stage: Stage::Intro,
            words: Vec::new(),
            pending: VecDeque::new(),
            after_words: AfterWords::Crossing,
            typing_word: false,
            depression: DepressionStage::Clear,
            cluster: 0,
            active: 0,
            crossing: false,
            crossed: 0,
            additional: 0,
            response_started: false,
            awaiting_line: false,
            floating: FloatingText::start(all_words, options, ctx),
            timers: Timers::default(),
            outcome: None,
        };
        fear.run(ctx, INTRO_HOLD, fears.intro.clone());
        fear
    }

    pub fn words(&self) -> &[FearWord] {
        &self.words
    }

    pub fn active_cluster(&self) -> usize {
        self.active
    }

    pub fn crossing_enabled(&self) -> bool {
        self.crossing
    }

    pub fn depression(&self) -> DepressionStage {
        self.depression
    }

    pub fn take_outcome(&mut self) -> Option<FearOutcome> {
        self.outcome.take()
    }

    fn run(&mut self, ctx: &mut Ctx, hold: Duration, script: Script) {
        self.hooks.beat = false;
        self.seq = Sequencer::new(SCREEN).with_pacing(Pacing::Auto(hold));
        self.seq.start(ctx, &mut self.hooks, script);
        self.pump(ctx);
    }

    pub fn tick(&mut self, ctx: &mut Ctx, dt: Duration) {
        self.floating.tick(dt, ctx);
        for timer in self.timers.tick(dt) {
            match timer {
                FearTimer::NextWord => self.next_word(ctx),
                FearTimer::Reaction(index) => {
                    let script = ctx.story.identify.fears.clusters[index].after_appear.clone();
                    self.run(ctx, REACTION_HOLD, script);
                }
                FearTimer::Conclusion => self.conclude(ctx),
            }
        }
        self.seq.tick(ctx, &mut self.hooks, dt);
        self.pump(ctx);
    }

    pub fn on_typed(&mut self, ctx: &mut Ctx) {
        if self.typing_word {
            self.typing_word = false;
            self.timers.after(WORD_GAP, FearTimer::NextWord);
            return;
        }
        if self.awaiting_line {
            self.awaiting_line = false;
            self.cluster_cleared(ctx);
            return;
        }
        self.seq.on_typed(ctx, &mut self.hooks);
        self.pump(ctx);
    }

    /// Strikes a word of the active cluster. Anything else is ignored.
    pub fn click(&mut self, ctx: &mut Ctx, index: usize) -> bool {
        if !self.crossing {
            return false;
        }
        let active = self.active;
        let Some(word) = self.words.get_mut(index) else {
            return false;
        };
        if word.cluster != active || word.resolved {
            return false;
        }
        word.clicks += 1;
        let strikes = word.clicks;
        if !word.double || word.clicks >= 2 {
            word.resolved = true;
        }
        let resolved = word.resolved;
        ctx.push(OutputEvent::StrikeWord { index, strikes });
        ctx.play_sfx(CLICK);
        if !resolved {
            return true;
        }

        if !self.response_started {
            self.response_started = true;
            self.start_response(ctx);
        }
        let cleared = self.words.iter().filter(|w| w.cluster == active).all(|w| w.resolved);
        if cleared {
            self.crossing = false;
            if ctx.is_typing() {
                self.awaiting_line = true;
            } else {
                self.cluster_cleared(ctx);
            }
        }
        true
    }

    /// Stops everything, fading the floating words.
    pub fn stop(&mut self, ctx: &mut Ctx) {
        self.seq.stop();
        self.timers.clear();
        self.floating.clear(ctx);
        self.crossing = false;
        self.stage = Stage::Done;
    }

    fn pump(&mut self, ctx: &mut Ctx) {
        for signal in std::mem::take(&mut self.hooks.signals) {
            log::debug!("fear signal {:?}", signal);
            match signal {
                FearSignal::ShowFears => {
                    self.stage = Stage::Clusters;
                    ctx.show(Element::FearWords, true);
                    self.show_cluster(ctx, 0);
                }
                FearSignal::NextCluster => {
                    self.cluster += 1;
                    if self.cluster < ctx.story.identify.fears.clusters.len() {
                        self.show_cluster(ctx, self.cluster);
                    }
                }
                FearSignal::EnableCrossing => {
                    self.active = 0;
                    self.crossing = true;
                }
                FearSignal::ClearFloating => self.floating.clear(ctx),
                FearSignal::Dreams => {
                    self.stage = Stage::Done;
                    self.outcome = Some(FearOutcome::Dreams);
                }
                FearSignal::Finished if self.stage == Stage::Conclusion => {
                    ctx.set_music_volume(RESTORED_VOLUME);
                    self.stage = Stage::Done;
                    self.outcome = Some(FearOutcome::Complete);
                }
                FearSignal::Finished => {}
            }
        }
    }

    fn show_cluster(&mut self, ctx: &mut Ctx, index: usize) {
        let story = ctx.story.clone();
        let Some(cluster) = story.identify.fears.clusters.get(index) else {
            return;
        };
        self.depression = cluster.depression;
        set_depression(ctx, cluster.depression);
        for word in &cluster.words {
            self.pending.push_back(PendingWord {
                text: word.clone(),
                cluster: index,
                double: cluster.double_click.as_ref() == Some(word),
                separator: false,
            });
        }
        self.after_words = AfterWords::Reaction(index);
        self.next_word(ctx);
    }

    fn show_additional(&mut self, ctx: &mut Ctx) {
        let story = ctx.story.clone();
        let fears = &story.identify.fears;
        let Some(extra) = fears.additional.get(self.additional) else {
            return;
        };
        let cluster = fears.clusters.len() + self.additional;
        self.active = cluster;
        for (i, word) in extra.words.iter().enumerate() {
            self.pending.push_back(PendingWord { text: word.clone(), cluster, double: false, separator: i == 0 });
        }
        self.after_words = AfterWords::Crossing;
        self.next_word(ctx);
    }

    fn next_word(&mut self, ctx: &mut Ctx) {
        let Some(word) = self.pending.pop_front() else {
            match self.after_words {
                AfterWords::Reaction(index) => self.timers.after(CLUSTER_SETTLE, FearTimer::Reaction(index)),
                AfterWords::Crossing => self.crossing = true,
            }
            return;
        };
        let index = self.words.len();
        ctx.push(OutputEvent::MountWord { index, cluster: word.cluster, separator: word.separator });
        self.words.push(FearWord {
            text: word.text.clone(),
            cluster: word.cluster,
            double: word.double,
            clicks: 0,
            resolved: false,
        });
        if word.text.is_empty() {
            self.timers.after(WORD_GAP, FearTimer::NextWord);
            return;
        }
        self.typing_word = true;
        let voiced = self.depression > DepressionStage::Clear;
        ctx.reveal(&word.text, RevealOptions::murmur(Surface::FearWord(index), voiced));
    }

    fn start_response(&mut self, ctx: &mut Ctx) {
        let story = ctx.story.clone();
        let fears = &story.identify.fears;
        let line = if let Some(response) = fears.responses.get(self.crossed) {
            &response.line
        } else if let Some(extra) = fears.additional.get(self.additional) {
            &extra.response
        } else {
            return;
        };
        ctx.reveal(line, RevealOptions::speech(Surface::Dialogue(SCREEN)));
    }

    fn cluster_cleared(&mut self, ctx: &mut Ctx) {
        let story = ctx.story.clone();
        let fears = &story.identify.fears;
        self.response_started = false;
        if let Some(response) = fears.responses.get(self.crossed) {
            if let Some(recovery) = response.recovery {
                set_recovery(ctx, recovery);
            }
            self.crossed += 1;
            if response.show_more_words {
                self.show_additional(ctx);
            } else {
                self.active += 1;
                self.crossing = true;
            }
        } else if let Some(extra) = fears.additional.get(self.additional) {
            if let Some(recovery) = extra.recovery {
                set_recovery(ctx, recovery);
            }
            self.additional += 1;
            if self.additional < fears.additional.len() {
                self.show_additional(ctx);
            } else {
                self.timers.after(CONCLUSION_DELAY, FearTimer::Conclusion);
            }
        }
    }

    fn conclude(&mut self, ctx: &mut Ctx) {
        log::info!("Fear words all crossed out");
        self.stage = Stage::Conclusion;
        self.floating.stop();
        let script = ctx.story.identify.fears.conclusion.clone();
        self.run(ctx, CONCLUSION_HOLD, script);
    }
}
