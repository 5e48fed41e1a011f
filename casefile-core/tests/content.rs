mod common;

use std::fs;
use std::path::PathBuf;

use casefile_core::script::{Action, ContentError, DepressionStage};
use casefile_core::StoryManager;
use serde_json::Value;

fn bundled() -> Value {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../game/story.json");
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn bundled_story_has_the_whole_case() {
    let story = common::story();
    assert_eq!(story.evidence.items.len(), 5);
    assert_eq!(story.witnesses.witnesses.len(), 3);
    assert_eq!(story.identify.items.len(), 5);
    assert_eq!(story.identify.fears.clusters.len(), 3);
    assert_eq!(story.identify.fears.responses.len(), 3);
    assert_eq!(story.identify.fears.additional.len(), 3);
    assert_eq!(story.identify.dreams.items.len(), 9);
    assert_eq!(story.identify.finale.end_messages, ["You are loved."]);

    let first = &story.intro[0];
    assert_eq!(first.text.as_deref(), Some("Ah, there you are, cadet."));
    assert_eq!(first.action, Action::Wait);

    let stages: Vec<DepressionStage> = story.identify.fears.clusters.iter().map(|c| c.depression).collect();
    assert_eq!(stages, [DepressionStage::Dim, DepressionStage::Heavy, DepressionStage::Crushing]);
    assert_eq!(story.identify.fears.clusters[1].double_click.as_deref(), Some("Disgusting."));
}

#[test]
fn sections_split_across_files_merge() {
    let Value::Object(sections) = bundled() else { panic!("story is an object") };
    let dir: PathBuf = std::env::temp_dir().join(format!("casefile-split-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    for (name, value) in &sections {
        let doc = serde_json::json!({ name.as_str(): value });
        fs::write(dir.join(format!("{name}.json")), doc.to_string()).unwrap();
    }

    let mut manager = StoryManager::new();
    manager.load_project(&dir).unwrap();
    let story = manager.build().unwrap();
    assert_eq!(manager.sources().len(), sections.len());
    assert_eq!(story.identify.dreams.items.len(), 9);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_actions_name_their_location() {
    let mut doc = bundled();
    doc["leads"][2]["action"] = Value::String("teleport".into());

    let mut manager = StoryManager::new();
    manager.load_str(&doc.to_string(), "story.json").unwrap();
    let err = manager.build().unwrap_err();
    let content = err.downcast_ref::<ContentError>().expect("a content error underneath");
    assert_eq!(content.path, "leads[2]");
    assert!(content.reason.contains("teleport"));
}

#[test]
fn missing_sections_are_rejected() {
    let mut doc = bundled();
    doc.as_object_mut().unwrap().remove("witnessReports");
    let mut manager = StoryManager::new();
    manager.load_str(&doc.to_string(), "story.json").unwrap();
    assert!(manager.build().is_err());
}
