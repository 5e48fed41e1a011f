use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;
use log::{debug, info};
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::script::raw::RawStory;
use crate::script::Story;

/// Loads and validates the case file content.
///
/// Content is either one JSON document or a directory of JSON documents whose
/// top-level sections are merged.
#[derive(Debug, Default)]
pub struct StoryManager {
    sections: Map<String, Value>,
    sources: Vec<String>,
}

impl StoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_project(&mut self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        if root.is_file() {
            return self.load_file(root);
        }
        info!("Scanning story content at: {:?}", root);

        let mut files: Vec<_> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && e.path().extension().is_some_and(|x| x == "json"))
            .map(|e| e.into_path())
            .collect();
        files.sort();

        if files.is_empty() {
            bail!("No story files (*.json) found under {:?}", root);
        }
        for path in &files {
            self.load_file(path)?;
        }

        info!("Story loaded. Files: {}, Sections: {}", files.len(), self.sections.len());
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read story file: {:?}", path))?;
        self.load_str(&content, &path.display().to_string())
    }

    pub fn load_str(&mut self, content: &str, origin: &str) -> Result<()> {
        let doc: Value = serde_json::from_str(content)
            .with_context(|| format!("Malformed JSON in {}", origin))?;
        let Value::Object(map) = doc else {
            bail!("{}: top level must be an object of story sections", origin);
        };

        for (key, value) in map {
            if self.sections.contains_key(&key) {
                bail!("{}: section '{}' is already defined by another file", origin, key);
            }
            debug!("Section '{}' from {}", key, origin);
            self.sections.insert(key, value);
        }
        self.sources.push(origin.to_string());
        Ok(())
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Validates the merged sections into a [`Story`].
    pub fn build(&self) -> Result<Arc<Story>> {
        let raw: RawStory = serde_json::from_value(Value::Object(self.sections.clone()))
            .context("Story content does not match the expected shape")?;
        let story = raw.build().context("Story content failed validation")?;
        info!(
            "Story ready: {} evidence items, {} witnesses, {} profile items",
            story.evidence.items.len(),
            story.witnesses.witnesses.len(),
            story.identify.items.len()
        );
        Ok(Arc::new(story))
    }
}

/// Convenience for the common one-shot case.
pub fn load_story(path: impl AsRef<Path>) -> Result<Arc<Story>> {
    let mut manager = StoryManager::new();
    manager.load_project(path)?;
    manager.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_sections_are_rejected() {
        let mut manager = StoryManager::new();
        manager.load_str(r#"{"intro": []}"#, "a.json").unwrap();
        let err = manager.load_str(r#"{"intro": []}"#, "b.json").unwrap_err();
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn top_level_must_be_an_object() {
        let mut manager = StoryManager::new();
        assert!(manager.load_str("[1, 2]", "list.json").is_err());
    }
}
