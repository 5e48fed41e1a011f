mod common;

use std::time::Duration;

use casefile_core::event::{Element, InputEvent, ScreenId, Surface};
use casefile_core::script::DepressionStage;
use common::Harness;

const MAX_FRAMES: usize = 200_000;

/// Runs the identify screen until the fear words can be crossed out.
fn reach_crossing(h: &mut Harness) {
    h.to_identify();
    h.play_until(|h| h.game.identify().fears().is_some_and(|f| f.crossing_enabled()));
}

/// Strikes every word of whichever cluster is live until the dreams show.
fn cross_everything(h: &mut Harness) {
    for _ in 0..MAX_FRAMES {
        if h.game.identify().dreams().is_some() {
            return;
        }
        let targets: Vec<usize> = match h.game.identify().fears() {
            Some(fears) if fears.crossing_enabled() => fears.words().iter().enumerate()
                .filter(|(_, w)| w.cluster == fears.active_cluster() && !w.resolved)
                .map(|(i, _)| i)
                .collect(),
            _ => Vec::new(),
        };
        for index in targets {
            h.feed(InputEvent::ClickWord { index });
        }
        h.frame();
    }
    panic!("dreams never appeared");
}

fn reach_finale(h: &mut Harness) {
    reach_crossing(h);
    cross_everything(h);
    let count = h.game.ctx().story.identify.dreams.items.len();
    for index in 0..count {
        h.settle();
        assert!(h.feed(InputEvent::ClickDream { index }));
        assert!(!h.feed(InputEvent::ClickDream { index }));
    }
    h.play_until(|h| h.view.is_visible(Element::FinaleInput));
}

#[test]
fn the_grid_reveals_every_trait_before_the_fears() {
    let mut h = Harness::new();
    reach_crossing(&mut h);
    let story = h.game.ctx().story.clone();
    assert_eq!(h.game.identify().revealed().len(), story.identify.items.len());
    assert!(!h.view.is_visible(Element::LeadsList));
    assert!(!h.view.is_visible(Element::IdentifyGrid));
    assert!(h.view.is_visible(Element::FearWords));
}

#[test]
fn only_the_active_cluster_can_be_crossed() {
    let mut h = Harness::new();
    reach_crossing(&mut h);
    let fears = h.game.identify().fears().expect("fears running");
    assert_eq!(fears.active_cluster(), 0);
    assert_eq!(fears.depression(), DepressionStage::Crushing);

    let first: Vec<usize> = fears.words().iter().enumerate().filter(|(_, w)| w.cluster == 0).map(|(i, _)| i).collect();
    let other = fears.words().iter().position(|w| w.cluster == 1).expect("second cluster mounted");
    assert!(!h.feed(InputEvent::ClickWord { index: other }));

    for &index in &first {
        assert!(h.feed(InputEvent::ClickWord { index }));
    }
    assert!(!h.feed(InputEvent::ClickWord { index: first[0] }));
    h.settle();
    h.frame();
    let fears = h.game.identify().fears().expect("fears running");
    assert_eq!(fears.active_cluster(), 1);
    assert!(fears.crossing_enabled());
    assert!(fears.words()[other..].iter().all(|w| !w.resolved));
}

#[test]
fn the_double_word_needs_two_strikes() {
    let mut h = Harness::new();
    reach_crossing(&mut h);
    let first: Vec<usize> = h.game.identify().fears().expect("fears").words().iter().enumerate()
        .filter(|(_, w)| w.cluster == 0)
        .map(|(i, _)| i)
        .collect();
    for index in first {
        h.feed(InputEvent::ClickWord { index });
    }
    h.settle();
    h.frame();

    let fears = h.game.identify().fears().expect("fears");
    assert_eq!(fears.active_cluster(), 1);
    let double = fears.words().iter().position(|w| w.double).expect("a word needing two strikes");
    let cluster = fears.words()[double].cluster;
    let rest: Vec<usize> = fears.words().iter().enumerate()
        .filter(|(i, w)| w.cluster == cluster && *i != double)
        .map(|(i, _)| i)
        .collect();

    assert!(h.feed(InputEvent::ClickWord { index: double }));
    for index in rest {
        h.feed(InputEvent::ClickWord { index });
    }
    h.settle();
    h.run(Duration::from_millis(500));
    assert_eq!(h.game.identify().fears().expect("fears").active_cluster(), cluster);

    assert!(h.feed(InputEvent::ClickWord { index: double }));
    h.settle();
    h.frame();
    assert_eq!(h.game.identify().fears().expect("fears").active_cluster(), cluster + 1);
}

#[test]
fn finale_answers_are_trimmed_and_case_blind() {
    let mut h = Harness::new();
    reach_finale(&mut h);
    let story = h.game.ctx().story.clone();

    assert!(!h.feed(InputEvent::SubmitText { text: "   ".into() }));
    assert!(h.feed(InputEvent::SubmitText { text: "luisaa".into() }));
    h.settle();
    assert_eq!(
        h.view.text(Surface::Dialogue(ScreenId::Identify)),
        story.identify.finale.wrong_answer_messages[0]
    );
    assert!(h.feed(InputEvent::SubmitText { text: "nobody".into() }));
    h.settle();
    assert_eq!(
        h.view.text(Surface::Dialogue(ScreenId::Identify)),
        story.identify.finale.wrong_answer_messages[1]
    );
    assert_eq!(h.game.identify().finale().expect("finale").wrong_answers(), 2);

    assert!(h.feed(InputEvent::SubmitText { text: "  DAPHNE ".into() }));
    assert!(!h.view.is_visible(Element::FinaleInput));
    assert!(h.view.is_visible(Element::Luisa));

    h.play_until(|h| h.game.screen() == ScreenId::End);
    assert!(h.feed(InputEvent::PlayAgain));
    assert_eq!(h.game.screen(), ScreenId::Start);
}

#[test]
fn the_players_own_name_is_accepted() {
    let mut h = Harness::new();
    h.name = "Bean".into();
    reach_finale(&mut h);
    assert!(h.feed(InputEvent::SubmitText { text: "bEaN".into() }));
    assert!(h.view.is_visible(Element::Luisa));
    assert_eq!(h.game.identify().finale().expect("finale").wrong_answers(), 0);
}
