use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Context;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};

use crate::event::{Element, InputEvent, ItemState, OutputEvent, ScreenId, Surface};
use crate::renderer::view::ViewState;
use crate::renderer::Renderer;

/// Full-screen frontend drawing the [`ViewState`] every frame.
pub struct TuiRenderer {
    terminal: DefaultTerminal,
    view: ViewState,
    input: String,
    status: String,
    pending: VecDeque<InputEvent>,
}

impl TuiRenderer {
    pub fn new() -> anyhow::Result<Self> {
        let terminal = ratatui::try_init().context("Failed to initialize terminal")?;
        Ok(Self {
            terminal,
            view: ViewState::new(),
            input: String::new(),
            status: "Enter to begin, Esc to quit".into(),
            pending: VecDeque::new(),
        })
    }

    fn read_keys(&mut self) -> anyhow::Result<()> {
        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else { continue };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc => self.pending.push_back(InputEvent::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.pending.push_back(InputEvent::Quit)
                }
                KeyCode::Char(c) => self.input.push(c),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Enter => {
                    let line = std::mem::take(&mut self.input);
                    match self.view.parse_command(&line) {
                        Some(input) => {
                            self.status.clear();
                            self.pending.push_back(input);
                        }
                        None => self.status = format!("Unknown command: {}", line),
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Drop for TuiRenderer {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

impl Renderer for TuiRenderer {
    fn render(&mut self, out: &OutputEvent) {
        self.view.apply(out);
    }

    fn poll(&mut self) -> Option<InputEvent> {
        if let Err(e) = self.read_keys() {
            log::warn!("Terminal input error: {}", e);
        }
        self.pending.pop_front()
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let view = &self.view;
        let input = &self.input;
        let status = &self.status;
        self.terminal.draw(|frame| draw(frame, view, input, status))?;
        Ok(())
    }
}

fn draw(frame: &mut Frame, view: &ViewState, input: &str, status: &str) {
    let screen = view.screen();
    let [header, body, choices, prompt] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(6),
        Constraint::Length(view.choices.len() as u16 + 2),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    let title = format!(" Who is Daphne? | {:?} ", screen);
    frame.render_widget(Paragraph::new(title).style(Style::default().add_modifier(Modifier::BOLD)), header);

    let [dialogue, side] = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);
    draw_dialogue(frame, view, dialogue);
    draw_side(frame, view, side);

    let items: Vec<ListItem> = view.choices.iter().enumerate()
        .map(|(i, c)| ListItem::new(format!("[{}] {}", i + 1, c.label)))
        .collect();
    frame.render_widget(List::new(items).block(Block::default().borders(Borders::ALL).title("Choices")), choices);

    let hint = match view.button() {
        Some(label) => format!("<{}> {}", label, status),
        None => status.to_string(),
    };
    frame.render_widget(
        Paragraph::new(format!("> {}", input)).block(Block::default().borders(Borders::ALL).title(hint)),
        prompt,
    );
}

fn draw_dialogue(frame: &mut Frame, view: &ViewState, area: Rect) {
    let screen = view.screen();
    let mut lines = vec![Line::from(view.text(Surface::Dialogue(screen)).to_string())];
    if screen == ScreenId::Menu && view.is_visible(Element::SpeechBubble) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            view.text(Surface::MenuBubble).to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
        if view.is_visible(Element::CoffeeButton) {
            lines.push(Line::from("(:coffee)"));
        }
    }
    if view.has_flag(Element::FadeOverlay, "visible") {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            view.text(Surface::FadeOverlay).to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    if view.is_visible(Element::EnterHint(screen)) {
        lines.push(Line::from(Span::styled("(Enter)", Style::default().fg(Color::DarkGray))));
    }
    let block = Block::default().borders(Borders::ALL).title(" Mol ");
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

fn draw_side(frame: &mut Frame, view: &ViewState, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let grid = match view.screen() {
        ScreenId::Evidence => Some(Element::EvidenceGrid),
        ScreenId::Identify if view.is_visible(Element::IdentifyGrid) => Some(Element::IdentifyGrid),
        _ => None,
    };
    if let Some(items) = grid.and_then(|g| view.grids.get(&g)) {
        for (item, state) in items {
            let text = match state {
                ItemState::Revealed { label } => format!("{} = {}", item.id, label),
                ItemState::Completed => format!("{} (done)", item.id),
                _ => format!("{}: {}", item.id, item.label),
            };
            lines.push(Line::from(text));
        }
    }
    if view.is_visible(Element::FearWords) {
        for (i, word) in view.words.iter().enumerate() {
            if word.separator {
                lines.push(Line::from("----"));
            }
            let style = if word.strikes > 0 {
                Style::default().add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::Red)
            };
            lines.push(Line::from(Span::styled(format!("{:>2} {}", i, view.text(Surface::FearWord(i))), style)));
        }
    }
    if view.is_visible(Element::Dreams) {
        for (i, dream) in view.dreams.iter().enumerate() {
            let text = match &dream.hidden {
                Some(hidden) => format!("{} {} -> {}", i, dream.surface, hidden),
                None => format!("{} {}", i, dream.surface),
            };
            lines.push(Line::from(text));
        }
    }
    if view.is_visible(Element::LeadsList) {
        lines.push(Line::from(Span::styled("Leads", Style::default().add_modifier(Modifier::UNDERLINED))));
        for i in 0..view.leads {
            lines.push(Line::from(format!("- {}", view.lead(i))));
        }
    }
    for word in view.floating.iter().take(4) {
        lines.push(Line::from(Span::styled(word.text.clone(), Style::default().fg(Color::DarkGray))));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(Block::default().borders(Borders::ALL)), area);
}
