mod common;

use casefile_core::event::{Element, InputEvent, ItemState, ScreenId, Surface};
use common::Harness;

fn grid_ready(h: &Harness, grid: Element) -> bool {
    !h.view.disabled.contains(&grid)
        && h.view.grids.get(&grid).is_some_and(|items| items.iter().any(|(_, s)| *s == ItemState::Available))
}

/// Opens `screen` from the menu and plays its intro until the grid takes clicks.
fn open_grid(h: &mut Harness, screen: ScreenId, grid: Element) {
    assert!(h.feed(InputEvent::Open { screen }));
    assert_eq!(h.game.screen(), screen);
    h.play_until(|h| grid_ready(h, grid));
}

fn select(h: &mut Harness, id: &str) -> bool {
    h.feed(InputEvent::Select { id: id.into() })
}

/// Every lead the session holds is on screen, in order and in full.
fn assert_leads_rendered(h: &Harness) {
    let leads = h.game.ctx().session.leads.as_slice();
    assert_eq!(h.view.leads, leads.len());
    for (i, lead) in leads.iter().enumerate() {
        assert_eq!(h.view.lead(i), lead, "lead #{i}");
    }
}

#[test]
fn leaving_mid_lead_still_writes_the_whole_lead() {
    let mut h = Harness::new();
    h.to_menu();
    open_grid(&mut h, ScreenId::Evidence, Element::EvidenceGrid);
    assert!(select(&mut h, "candle"));
    let candle = "A Lavender Scented Candle";
    h.play_until(|h| h.game.ctx().session.leads.contains(candle));
    assert!(h.game.ctx().is_typing());
    let index = h.game.ctx().session.leads.len() - 1;

    assert!(h.feed(InputEvent::Open { screen: ScreenId::Menu }));
    assert_eq!(h.game.screen(), ScreenId::Menu);
    assert_eq!(h.view.lead(index), candle);
    assert!(h.game.ctx().session.progress.evidence_done("candle"));
    assert_leads_rendered(&h);
}

#[test]
fn leaving_mid_filing_shows_every_witness_lead() {
    let mut h = Harness::new();
    h.to_menu();
    open_grid(&mut h, ScreenId::Witness, Element::WitnessList);
    assert!(select(&mut h, "cait"));
    assert_eq!(h.game.ctx().audio.witness_music(), Some("cait"));
    h.play_until(|h| h.game.ctx().session.leads.contains("Provided nutritious treats."));

    assert!(h.feed(InputEvent::Open { screen: ScreenId::Menu }));
    assert_eq!(h.game.screen(), ScreenId::Menu);
    let witness = h.game.ctx().story.witness("cait").cloned().expect("cait");
    for lead in &witness.leads {
        assert!(h.game.ctx().session.leads.contains(lead));
    }
    assert!(h.game.ctx().session.progress.witness_done("cait"));
    assert_eq!(h.game.ctx().audio.current(), Some("bgm"));
    assert_leads_rendered(&h);
}

#[test]
fn evidence_items_complete_once_and_rename_on_leave() {
    let mut h = Harness::new();
    h.to_menu();
    open_grid(&mut h, ScreenId::Evidence, Element::EvidenceGrid);
    let total = h.game.ctx().story.evidence.items.len();
    let before = h.game.ctx().session.leads.len();
    h.play_until(|h| h.game.ctx().session.progress.evidence_count() == total);
    h.settle();

    assert_eq!(
        h.view.text(Surface::Dialogue(ScreenId::Evidence)),
        "All evidence has been examined. Return to the menu to continue."
    );
    assert!(!select(&mut h, "candle"));
    assert_eq!(h.game.ctx().session.progress.evidence_count(), total);
    assert!(h.game.ctx().session.leads.contains("Digital questionable manuscript"));

    assert!(h.feed(InputEvent::Open { screen: ScreenId::Menu }));
    let leads = h.game.ctx().session.leads.clone();
    let renamed = leads.as_slice().iter()
        .position(|l| l == "Digital questionable manuscript (Suspiciously missing)")
        .expect("renamed in place");
    assert_eq!(h.view.lead(renamed), "Digital questionable manuscript (Suspiciously missing)");
    assert_eq!(leads.len(), before + total);
    assert_leads_rendered(&h);

    assert!(h.feed(InputEvent::Open { screen: ScreenId::Evidence }));
    assert_eq!(
        h.view.text(Surface::Dialogue(ScreenId::Evidence)),
        "You've already examined all the evidence."
    );
    assert!(h.view.button().is_some());
    assert_eq!(h.game.ctx().session.leads.len(), before + total);
}

#[test]
fn witnesses_file_their_leads_and_hand_the_music_back() {
    let mut h = Harness::new();
    h.to_menu();
    open_grid(&mut h, ScreenId::Witness, Element::WitnessList);
    let story = h.game.ctx().story.clone();
    let total = story.witnesses.witnesses.len();
    let before = h.game.ctx().session.leads.len();
    h.play_until(|h| h.game.ctx().session.progress.witness_count() == total);
    h.settle();

    assert!(!select(&mut h, "glorp"));
    assert_eq!(h.game.ctx().session.progress.witness_count(), total);
    assert_eq!(h.game.ctx().audio.current(), Some("bgm"));
    assert_eq!(h.game.ctx().audio.witness_music(), None);
    assert!(h.view.disabled.contains(&Element::IdentifyButton));
    assert_eq!(
        h.view.text(Surface::Dialogue(ScreenId::Witness)),
        "All witnesses have been interviewed. Return to the menu to continue."
    );

    let expected: usize = story.witnesses.witnesses.iter().map(|w| w.leads.len()).sum();
    assert_eq!(h.game.ctx().session.leads.len(), before + expected);
    assert_leads_rendered(&h);

    assert!(h.feed(InputEvent::Continue));
    assert_eq!(h.game.screen(), ScreenId::Menu);
    assert!(h.feed(InputEvent::Open { screen: ScreenId::Witness }));
    assert_eq!(
        h.view.text(Surface::Dialogue(ScreenId::Witness)),
        "You've already interviewed all witnesses."
    );
}
