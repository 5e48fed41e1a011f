//! A displayable model folded from output events, shared by both frontends.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::event::{
    ChoiceOption, Element, FloatingWord, GridItem, InputEvent, ItemState, OutputEvent, ScreenId, Surface,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FearWordView {
    pub cluster: usize,
    pub strikes: u8,
    pub separator: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DreamView {
    pub surface: String,
    pub hidden: Option<String>,
}

#[derive(Debug, Default)]
pub struct ViewState {
    pub screen: Option<ScreenId>,
    pub texts: FxHashMap<Surface, String>,
    pub visible: FxHashSet<Element>,
    pub flags: FxHashSet<(Element, String)>,
    pub images: FxHashMap<Element, String>,
    pub disabled: FxHashSet<Element>,
    pub choices: Vec<ChoiceOption>,
    pub buttons: FxHashMap<Element, String>,
    pub grids: FxHashMap<Element, Vec<(GridItem, ItemState)>>,
    pub leads: usize,
    pub words: Vec<FearWordView>,
    pub dreams: Vec<DreamView>,
    pub floating: Vec<FloatingWord>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> ScreenId {
        self.screen.unwrap_or(ScreenId::Start)
    }

    pub fn text(&self, surface: Surface) -> &str {
        self.texts.get(&surface).map(String::as_str).unwrap_or("")
    }

    pub fn is_visible(&self, element: Element) -> bool {
        self.visible.contains(&element)
    }

    pub fn has_flag(&self, element: Element, flag: &str) -> bool {
        self.flags.contains(&(element, flag.to_string()))
    }

    /// Label of the live continue button on the current screen, if any.
    pub fn button(&self) -> Option<&str> {
        self.buttons.get(&Element::ContinueButton(self.screen())).map(String::as_str)
    }

    pub fn lead(&self, index: usize) -> &str {
        self.text(Surface::Lead(index))
    }

    pub fn apply(&mut self, event: &OutputEvent) {
        match event {
            OutputEvent::ShowScreen { screen } => {
                self.screen = Some(*screen);
                self.choices.clear();
                if *screen == ScreenId::Start {
                    *self = Self { screen: Some(ScreenId::Start), ..Self::default() };
                }
            }
            OutputEvent::ClearText { surface } => {
                self.texts.remove(surface);
            }
            OutputEvent::Glyph { surface, ch, .. } => self.texts.entry(*surface).or_default().push(*ch),
            OutputEvent::SetText { surface, text } => {
                self.texts.insert(*surface, text.clone());
            }
            OutputEvent::ShowChoices { options, .. } => self.choices = options.clone(),
            OutputEvent::HideChoices { .. } => self.choices.clear(),
            OutputEvent::ShowButton { element, label } => {
                self.buttons.insert(*element, label.clone());
                self.visible.insert(*element);
            }
            OutputEvent::SetVisible { element, visible } => {
                if *visible {
                    self.visible.insert(*element);
                } else {
                    self.visible.remove(element);
                    self.buttons.remove(element);
                }
            }
            OutputEvent::SetFlag { element, flag, on } => {
                if *on {
                    self.flags.insert((*element, flag.clone()));
                } else {
                    self.flags.remove(&(*element, flag.clone()));
                }
            }
            OutputEvent::SetImage { element, image } => {
                self.images.insert(*element, image.clone());
            }
            OutputEvent::SetEnabled { element, enabled } => {
                if *enabled {
                    self.disabled.remove(element);
                } else {
                    self.disabled.insert(*element);
                }
            }
            OutputEvent::MountItems { element, items } => {
                let grid = items.iter().map(|i| (i.clone(), ItemState::Available)).collect();
                self.grids.insert(*element, grid);
            }
            OutputEvent::SetItem { element, id, state } => {
                if let Some(grid) = self.grids.get_mut(element) {
                    if let Some(entry) = grid.iter_mut().find(|(item, _)| item.id == *id) {
                        entry.1 = state.clone();
                    }
                }
            }
            OutputEvent::MountLead { index } => self.leads = self.leads.max(index + 1),
            OutputEvent::RenameLead { index, text } => {
                self.texts.insert(Surface::Lead(*index), text.clone());
            }
            OutputEvent::MountWord { index, cluster, separator } => {
                if *index >= self.words.len() {
                    self.words.resize(index + 1, FearWordView { cluster: *cluster, strikes: 0, separator: false });
                }
                self.words[*index] = FearWordView { cluster: *cluster, strikes: 0, separator: *separator };
            }
            OutputEvent::StrikeWord { index, strikes } => {
                if let Some(word) = self.words.get_mut(*index) {
                    word.strikes = *strikes;
                }
            }
            OutputEvent::MountDreams { surfaces } => {
                self.dreams = surfaces.iter().map(|s| DreamView { surface: s.clone(), hidden: None }).collect();
            }
            OutputEvent::RevealDream { index, hidden } => {
                if let Some(dream) = self.dreams.get_mut(*index) {
                    dream.hidden = Some(hidden.clone());
                }
            }
            OutputEvent::SpawnFloating(word) => self.floating.push(word.clone()),
            OutputEvent::FadeFloating { .. } => {}
            OutputEvent::RemoveFloating { id } => self.floating.retain(|w| w.id != *id),
            OutputEvent::Audio(_) => {}
        }
    }

    /// Turns one typed line into an input.
    ///
    /// `:`-prefixed words are commands; a bare number picks a choice; anything
    /// else is free text for whichever field is open.
    pub fn parse_command(&self, line: &str) -> Option<InputEvent> {
        let line = line.trim();
        if let Some(command) = line.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            let name = parts.next()?;
            let arg = parts.next();
            let index = || arg.and_then(|a| a.parse::<usize>().ok());
            return Some(match name {
                "start" => InputEvent::Start,
                "leads" => InputEvent::Open { screen: ScreenId::Leads },
                "evidence" => InputEvent::Open { screen: ScreenId::Evidence },
                "witness" => InputEvent::Open { screen: ScreenId::Witness },
                "identify" => InputEvent::Open { screen: ScreenId::Identify },
                "menu" => InputEvent::Open { screen: ScreenId::Menu },
                "exit" => InputEvent::Exit,
                "again" => InputEvent::PlayAgain,
                "coffee" => InputEvent::GiveCoffee,
                "quit" => InputEvent::Quit,
                "pick" => InputEvent::Select { id: arg?.to_string() },
                "cross" => InputEvent::ClickWord { index: index()? },
                "dream" => InputEvent::ClickDream { index: index()? },
                _ => return None,
            });
        }

        if self.is_visible(Element::NameConfirm) {
            return match line.to_lowercase().as_str() {
                "y" | "yes" => Some(InputEvent::Confirm { yes: true }),
                "n" | "no" => Some(InputEvent::Confirm { yes: false }),
                _ => None,
            };
        }
        if self.is_visible(Element::NameInput) || self.is_visible(Element::FinaleInput) {
            return Some(InputEvent::SubmitText { text: line.to_string() });
        }
        if line.is_empty() {
            return Some(match self.screen() {
                ScreenId::Start => InputEvent::Start,
                ScreenId::Title => InputEvent::Continue,
                _ if self.button().is_some() => InputEvent::Continue,
                _ => InputEvent::Advance,
            });
        }
        match line.parse::<usize>() {
            Ok(n) if n >= 1 && n <= self.choices.len() => Some(InputEvent::Choose { index: n - 1 }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GlyphStyle;

    fn glyphs(view: &mut ViewState, surface: Surface, text: &str) {
        for ch in text.chars() {
            view.apply(&OutputEvent::Glyph { surface, ch, style: GlyphStyle::default() });
        }
    }

    #[test]
    fn glyphs_accumulate_until_cleared() {
        let mut view = ViewState::new();
        let surface = Surface::Dialogue(ScreenId::Intro);
        glyphs(&mut view, surface, "Hello");
        assert_eq!(view.text(surface), "Hello");
        view.apply(&OutputEvent::ClearText { surface });
        assert_eq!(view.text(surface), "");
    }

    #[test]
    fn blank_line_means_continue_only_when_a_button_is_up() {
        let mut view = ViewState::new();
        assert_eq!(view.parse_command(""), Some(InputEvent::Start));

        view.apply(&OutputEvent::ShowScreen { screen: ScreenId::Leads });
        assert_eq!(view.parse_command(""), Some(InputEvent::Advance));
        let element = Element::ContinueButton(ScreenId::Leads);
        view.apply(&OutputEvent::ShowButton { element, label: "Back to Menu".into() });
        assert_eq!(view.parse_command(""), Some(InputEvent::Continue));
        view.apply(&OutputEvent::SetVisible { element, visible: false });
        assert_eq!(view.parse_command(""), Some(InputEvent::Advance));
    }

    #[test]
    fn numbers_pick_visible_choices_and_text_goes_to_open_fields() {
        let mut view = ViewState::new();
        view.apply(&OutputEvent::ShowScreen { screen: ScreenId::Intro });
        let options = vec![
            ChoiceOption { label: "a".into(), hover: None },
            ChoiceOption { label: "b".into(), hover: None },
        ];
        view.apply(&OutputEvent::ShowChoices { screen: ScreenId::Intro, options });
        assert_eq!(view.parse_command("2"), Some(InputEvent::Choose { index: 1 }));
        assert_eq!(view.parse_command("3"), None);

        view.apply(&OutputEvent::SetVisible { element: Element::NameInput, visible: true });
        assert_eq!(view.parse_command(" Jess "), Some(InputEvent::SubmitText { text: "Jess".into() }));
        view.apply(&OutputEvent::SetVisible { element: Element::NameConfirm, visible: true });
        assert_eq!(view.parse_command("YES"), Some(InputEvent::Confirm { yes: true }));
    }

    #[test]
    fn commands() {
        let view = ViewState::new();
        assert_eq!(view.parse_command(":pick candle"), Some(InputEvent::Select { id: "candle".into() }));
        assert_eq!(view.parse_command(":cross 4"), Some(InputEvent::ClickWord { index: 4 }));
        assert_eq!(view.parse_command(":cross"), None);
        assert_eq!(view.parse_command(":identify"), Some(InputEvent::Open { screen: ScreenId::Identify }));
        assert_eq!(view.parse_command(":nope"), None);
    }
}
