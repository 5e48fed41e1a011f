use std::io::{stdin, stdout, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::event::{Element, InputEvent, ItemState, OutputEvent, ScreenId, Surface};
use crate::renderer::view::ViewState;
use crate::renderer::Renderer;

/// Plain line frontend: glyphs stream straight to stdout, input is read by a
/// background thread one line at a time.
pub struct TerminalRenderer {
    view: ViewState,
    lines: Receiver<String>,
    /// Surface whose glyphs are currently being printed.
    streaming: Option<Surface>,
    closed: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        println!("Who is Daphne? Press Enter to begin. Type :quit to leave.");
        Self { view: ViewState::new(), lines: rx, streaming: None, closed: false }
    }

    fn end_stream(&mut self) {
        if self.streaming.take().is_some() {
            println!();
        }
    }

    fn print_help(&self, screen: ScreenId) {
        match screen {
            ScreenId::Menu => println!("  :leads  :evidence  :witness  :identify  :coffee  :exit"),
            ScreenId::Evidence | ScreenId::Witness | ScreenId::Identify => {
                println!("  :pick <id> to select, :menu to go back")
            }
            ScreenId::End => println!("  :again to play again, :quit to leave"),
            _ => {}
        }
    }

    fn print_grid(&self, element: Element) {
        let Some(grid) = self.view.grids.get(&element) else { return };
        for (item, state) in grid {
            let mark = match state {
                ItemState::Available => " ".to_string(),
                ItemState::Locked => "-".to_string(),
                ItemState::Completed => "x".to_string(),
                ItemState::Revealed { label } => format!("= {}", label),
            };
            println!("  [{}] {} ({})", mark, item.label, item.id);
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, out: &OutputEvent) {
        self.view.apply(out);
        match out {
            OutputEvent::ShowScreen { screen } => {
                self.end_stream();
                println!("\n===== {:?} =====", screen);
                self.print_help(*screen);
            }
            OutputEvent::Glyph { surface, ch, .. } => {
                if self.streaming != Some(*surface) {
                    self.end_stream();
                    if let Surface::Lead(index) = surface {
                        print!("  lead #{}: ", index + 1);
                    }
                    self.streaming = Some(*surface);
                }
                print!("{}", ch);
                let _ = stdout().flush();
            }
            OutputEvent::SetText { text, .. } => {
                self.end_stream();
                println!("{}", text);
            }
            OutputEvent::RenameLead { index, text } => {
                self.end_stream();
                println!("  lead #{} is now: {}", index + 1, text);
            }
            OutputEvent::ShowChoices { options, .. } => {
                self.end_stream();
                for (i, option) in options.iter().enumerate() {
                    match &option.hover {
                        Some(hover) => println!("  [{}] {} / {}", i + 1, option.label, hover),
                        None => println!("  [{}] {}", i + 1, option.label),
                    }
                }
            }
            OutputEvent::ShowButton { label, .. } => {
                self.end_stream();
                println!("  <{}> (Enter)", label);
            }
            OutputEvent::SetVisible { element, visible: true } => match element {
                Element::NameInput => {
                    self.end_stream();
                    println!("  (type your name)");
                }
                Element::NameConfirm => {
                    self.end_stream();
                    println!("  (yes / no)");
                }
                Element::FinaleInput => {
                    self.end_stream();
                    println!("  (type your answer)");
                }
                Element::EvidenceGrid | Element::IdentifyGrid => {
                    self.end_stream();
                    self.print_grid(*element);
                }
                _ => {}
            },
            OutputEvent::SetItem { element, .. } if self.view.is_visible(*element) => {
                self.end_stream();
                self.print_grid(*element);
            }
            OutputEvent::MountWord { index, separator: true, .. } => {
                self.end_stream();
                println!("  ---- (word {} onwards)", index);
            }
            OutputEvent::StrikeWord { index, strikes } => {
                self.end_stream();
                println!("  ~~ word {} struck x{}", index, strikes);
            }
            OutputEvent::MountDreams { surfaces } => {
                self.end_stream();
                for (i, surface) in surfaces.iter().enumerate() {
                    println!("  ({}) {}", i, surface);
                }
                println!("  :dream <n> to look closer");
            }
            OutputEvent::RevealDream { index, hidden } => {
                self.end_stream();
                println!("  ({}) ... {}", index, hidden);
            }
            _ => {}
        }
    }

    fn poll(&mut self) -> Option<InputEvent> {
        loop {
            let line = match self.lines.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    if self.closed {
                        return None;
                    }
                    self.closed = true;
                    return Some(InputEvent::Quit);
                }
            };
            match self.view.parse_command(&line) {
                Some(input) => return Some(input),
                None => println!("  ?"),
            }
        }
    }
}
