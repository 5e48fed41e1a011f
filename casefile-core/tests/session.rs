mod common;

use std::time::Duration;

use casefile_core::event::{Element, InputEvent, OutputEvent, ScreenId, Surface};
use common::Harness;

fn identify_enabled(events: &[OutputEvent]) -> Option<bool> {
    events.iter().rev().find_map(|e| match e {
        OutputEvent::SetEnabled { element: Element::IdentifyButton, enabled } => Some(*enabled),
        _ => None,
    })
}

#[test]
fn advancing_while_typing_does_nothing() {
    let mut h = Harness::new();
    h.start();
    assert_eq!(h.game.screen(), ScreenId::Intro);
    assert!(h.game.ctx().is_typing());
    assert!(!h.feed(InputEvent::Advance));
    assert!(h.game.ctx().is_typing());

    h.settle();
    assert_eq!(h.view.text(Surface::Dialogue(ScreenId::Intro)), "Ah, there you are, cadet.");
    assert!(h.feed(InputEvent::Advance));
    // the same click arriving twice only moves one step
    assert!(!h.feed(InputEvent::Advance));
}

#[test]
fn jess_reviews_the_leads_but_identify_stays_locked() {
    let mut h = Harness::new();
    h.to_menu();
    assert_eq!(h.game.ctx().session.player_name.as_deref(), Some("Jess"));
    assert_eq!(identify_enabled(&h.log), Some(false));

    assert!(h.feed(InputEvent::Open { screen: ScreenId::Leads }));
    h.play_until(|h| h.game.ctx().session.progress.leads_complete);
    assert_eq!(
        h.game.ctx().session.leads.as_slice(),
        ["Woman. 20s.", "Has hair.", "Weird beverage called Fritz Kola."]
    );

    h.settle();
    assert!(h.feed(InputEvent::Continue));
    assert_eq!(h.game.screen(), ScreenId::Menu);
    assert_eq!(identify_enabled(&h.log), Some(false));
    assert!(!h.feed(InputEvent::Open { screen: ScreenId::Identify }));
    assert_eq!(h.game.screen(), ScreenId::Menu);
}

#[test]
fn leads_are_not_replayed_on_a_second_visit() {
    let mut h = Harness::new();
    h.to_menu();
    h.feed(InputEvent::Open { screen: ScreenId::Leads });
    h.play_until(|h| h.game.ctx().session.progress.leads_complete);
    h.settle();
    h.feed(InputEvent::Continue);

    h.feed(InputEvent::Open { screen: ScreenId::Leads });
    assert_eq!(h.view.text(Surface::Dialogue(ScreenId::Leads)), "You've already reviewed the leads.");
    assert_eq!(h.game.ctx().session.leads.len(), 3);
}

#[test]
fn play_again_replays_the_cold_start_exactly() {
    let mut h = Harness::new();
    h.start();
    h.run(Duration::from_secs(3));
    let cold = h.take_log();

    h.settle();
    h.play_until(|h| h.game.screen() == ScreenId::Title);
    h.feed(InputEvent::Continue);
    h.feed(InputEvent::Open { screen: ScreenId::Leads });
    h.play_until(|h| h.game.ctx().session.progress.leads_complete);
    h.feed(InputEvent::Open { screen: ScreenId::Menu });
    assert!(h.feed(InputEvent::Exit));
    assert_eq!(h.game.screen(), ScreenId::End);

    assert!(h.feed(InputEvent::PlayAgain));
    assert_eq!(h.game.screen(), ScreenId::Start);
    assert!(h.game.ctx().session.player_name.is_none());
    assert!(h.game.ctx().session.leads.is_empty());
    assert!(!h.game.ctx().session.progress.leads_complete);
    h.take_log();

    h.start();
    h.run(Duration::from_secs(3));
    assert_eq!(h.take_log(), cold);

    h.play_until(|h| h.game.screen() == ScreenId::Title);
    h.feed(InputEvent::Continue);
    assert_eq!(identify_enabled(&h.log), Some(false));
}

#[test]
fn menu_chatter_stops_when_leaving() {
    let mut h = Harness::new();
    h.to_menu();
    h.run(Duration::from_millis(2100));
    assert!(h.view.is_visible(Element::SpeechBubble));

    h.feed(InputEvent::Open { screen: ScreenId::Evidence });
    h.take_log();
    h.run(Duration::from_secs(40));
    let bubble = h.take_log().into_iter().any(|e| matches!(e, OutputEvent::SetText { surface: Surface::MenuBubble, .. }));
    assert!(!bubble);
}

#[test]
fn quit_is_accepted_anywhere() {
    let mut h = Harness::new();
    assert!(h.feed(InputEvent::Quit));
    assert!(h.game.is_quit());
}
