//! The legacy content shape and its one-way conversion into the typed model.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{path}: {reason}")]
pub struct ContentError {
    pub path: String,
    pub reason: String,
}

impl ContentError {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self { path: path.to_string(), reason: reason.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStory {
    pub intro: Vec<RawStep>,
    pub leads: Vec<RawStep>,
    pub physical_evidence: RawEvidence,
    pub witness_reports: RawWitnesses,
    pub identify_suspect: RawIdentify,
    #[serde(default)]
    pub menu: RawMenu,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStep {
    #[serde(default)]
    pub text: Option<String>,
    pub action: String,
    #[serde(default)]
    pub loud: bool,
    pub effect: Option<String>,
    pub sound: Option<String>,
    pub speaker: Option<String>,
    pub pitch: Option<String>,
    pub button_text: Option<RawLabels>,
    pub lead: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub strikethrough: bool,
    pub choices: Option<Vec<String>>,
    pub responses: Option<Vec<RawResponse>>,
    pub choice_hover: Option<Vec<Option<String>>>,
    pub change_image: Option<String>,
    pub portrait: Option<String>,
    #[serde(default)]
    pub low_opacity: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabels {
    One(String),
    PerChoice(Vec<String>),
}

/// Tried in declaration order; anything that is not a string, a list of
/// strings or a list of steps lands in `Other` and is rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawResponse {
    Text(String),
    Lines(Vec<String>),
    Steps(Vec<RawStep>),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvidence {
    pub intro: Vec<RawStep>,
    pub items: Vec<RawEvidenceItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvidenceItem {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub lead_text: String,
    pub lead_text_after: Option<String>,
    pub dialogue: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWitnesses {
    pub intro: Vec<RawStep>,
    pub witnesses: Vec<RawWitness>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWitness {
    pub id: String,
    pub image: String,
    #[serde(default)]
    pub music: bool,
    pub pitch: Option<String>,
    #[serde(default)]
    pub wide: bool,
    #[serde(default)]
    pub delay_image: bool,
    #[serde(default)]
    pub leads: Vec<String>,
    pub dialogue: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIdentify {
    pub intro: Vec<RawStep>,
    /// Keyed by item id; file order is display order.
    pub evidence_items: Map<String, Value>,
    pub after_evidence: Vec<RawStep>,
    pub fears: RawFears,
    pub dreams: RawDreams,
    pub finale: RawFinale,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfileItem {
    pub name: String,
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub dialogue: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFears {
    pub intro: Vec<RawStep>,
    pub word_clusters: Vec<RawCluster>,
    pub cross_out_responses: Vec<RawCrossOut>,
    #[serde(default)]
    pub additional_clusters: Vec<RawAdditional>,
    pub conclusion: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCluster {
    pub words: Vec<String>,
    pub depression_stage: u8,
    pub double_click: Option<String>,
    #[serde(default)]
    pub after_appear: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCrossOut {
    pub dialogue: String,
    pub recovery_stage: Option<u8>,
    #[serde(default)]
    pub show_more_words: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAdditional {
    pub words: Vec<String>,
    pub cross_out_response: String,
    pub recovery_stage: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDreams {
    pub items: Vec<RawDream>,
    pub conclusion: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDream {
    pub surface: String,
    pub hidden: String,
    pub response: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFinale {
    #[serde(default)]
    pub floating_words: Vec<String>,
    pub prompt: String,
    pub valid_answers: Vec<String>,
    pub wrong_answer_messages: Vec<String>,
    pub final_dialogue: Vec<RawStep>,
    #[serde(default)]
    pub end_messages: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMenu {
    #[serde(default)]
    pub idle_lines: Vec<RawIdleLine>,
    #[serde(default)]
    pub coffee_reactions: Vec<String>,
    #[serde(default)]
    pub special_sprites: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIdleLine {
    pub text: String,
    #[serde(default)]
    pub coffee: bool,
}

impl RawStory {
    pub fn build(self) -> Result<Story, ContentError> {
        let RawStory { intro, leads, physical_evidence, witness_reports, identify_suspect, menu } = self;
        Ok(Story {
            intro: convert_script(intro, "intro")?,
            leads: convert_script(leads, "leads")?,
            evidence: physical_evidence.build()?,
            witnesses: witness_reports.build()?,
            identify: identify_suspect.build()?,
            menu: menu.build(),
        })
    }
}

impl RawEvidence {
    fn build(self) -> Result<EvidenceBook, ContentError> {
        let mut items = Vec::with_capacity(self.items.len());
        for (i, item) in self.items.into_iter().enumerate() {
            let path = format!("physicalEvidence.items[{}]", i);
            if items.iter().any(|e: &EvidenceItem| e.id == item.id) {
                return Err(ContentError::new(&path, format!("duplicate evidence id '{}'", item.id)));
            }
            items.push(EvidenceItem {
                dialogue: convert_script(item.dialogue, &format!("{}.dialogue", path))?,
                id: item.id,
                label: item.label,
                icon: item.icon,
                lead_text: item.lead_text,
                lead_text_after: item.lead_text_after,
            });
        }
        Ok(EvidenceBook {
            intro: convert_script(self.intro, "physicalEvidence.intro")?,
            items,
        })
    }
}

impl RawWitnesses {
    fn build(self) -> Result<WitnessBook, ContentError> {
        let mut witnesses = Vec::with_capacity(self.witnesses.len());
        for (i, w) in self.witnesses.into_iter().enumerate() {
            let path = format!("witnessReports.witnesses[{}]", i);
            if witnesses.iter().any(|e: &Witness| e.id == w.id) {
                return Err(ContentError::new(&path, format!("duplicate witness id '{}'", w.id)));
            }
            witnesses.push(Witness {
                dialogue: convert_script(w.dialogue, &format!("{}.dialogue", path))?,
                pitch: w.pitch.as_deref().map(Pitch::parse).unwrap_or_default(),
                id: w.id,
                image: w.image,
                music: w.music,
                wide: w.wide,
                delay_image: w.delay_image,
                leads: w.leads,
            });
        }
        Ok(WitnessBook {
            intro: convert_script(self.intro, "witnessReports.intro")?,
            witnesses,
        })
    }
}

impl RawIdentify {
    fn build(self) -> Result<IdentifyBook, ContentError> {
        let mut items = Vec::with_capacity(self.evidence_items.len());
        for (id, value) in self.evidence_items {
            let path = format!("identifySuspect.evidenceItems.{}", id);
            let raw: RawProfileItem = serde_json::from_value(value)
                .map_err(|e| ContentError::new(&path, e.to_string()))?;
            items.push(ProfileItem {
                dialogue: convert_script(raw.dialogue, &format!("{}.dialogue", path))?,
                id,
                name: raw.name,
                trait_name: raw.trait_name,
            });
        }

        Ok(IdentifyBook {
            intro: convert_script(self.intro, "identifySuspect.intro")?,
            items,
            after_evidence: convert_script(self.after_evidence, "identifySuspect.afterEvidence")?,
            fears: self.fears.build()?,
            dreams: self.dreams.build()?,
            finale: self.finale.build()?,
        })
    }
}

impl RawFears {
    fn build(self) -> Result<FearBook, ContentError> {
        let mut clusters = Vec::with_capacity(self.word_clusters.len());
        let mut deepest = DepressionStage::Clear;
        for (i, c) in self.word_clusters.into_iter().enumerate() {
            let path = format!("identifySuspect.fears.wordClusters[{}]", i);
            let depression = DepressionStage::from_level(c.depression_stage)
                .ok_or_else(|| ContentError::new(&path, format!("depression stage {} out of range", c.depression_stage)))?;
            if depression < deepest {
                return Err(ContentError::new(&path, "depression stages must not decrease"));
            }
            deepest = depression;
            if let Some(word) = &c.double_click {
                if !c.words.contains(word) {
                    return Err(ContentError::new(&path, format!("double-click word '{}' is not in the cluster", word)));
                }
            }
            if c.words.is_empty() {
                return Err(ContentError::new(&path, "cluster has no words"));
            }
            clusters.push(WordCluster {
                after_appear: convert_script(c.after_appear, &format!("{}.afterAppear", path))?,
                words: c.words,
                depression,
                double_click: c.double_click,
            });
        }

        let mut responses = Vec::with_capacity(self.cross_out_responses.len());
        for (i, r) in self.cross_out_responses.into_iter().enumerate() {
            let path = format!("identifySuspect.fears.crossOutResponses[{}]", i);
            responses.push(CrossOutResponse {
                line: r.dialogue,
                recovery: recovery(r.recovery_stage, &path)?,
                show_more_words: r.show_more_words,
            });
        }

        let mut additional = Vec::with_capacity(self.additional_clusters.len());
        for (i, a) in self.additional_clusters.into_iter().enumerate() {
            let path = format!("identifySuspect.fears.additionalClusters[{}]", i);
            if a.words.is_empty() {
                return Err(ContentError::new(&path, "cluster has no words"));
            }
            additional.push(AdditionalCluster {
                recovery: recovery(a.recovery_stage, &path)?,
                words: a.words,
                response: a.cross_out_response,
            });
        }

        Ok(FearBook {
            intro: convert_script(self.intro, "identifySuspect.fears.intro")?,
            clusters,
            responses,
            additional,
            conclusion: convert_script(self.conclusion, "identifySuspect.fears.conclusion")?,
        })
    }
}

fn recovery(level: Option<u8>, path: &str) -> Result<Option<RecoveryStage>, ContentError> {
    match level {
        None => Ok(None),
        Some(level) => RecoveryStage::from_level(level)
            .map(Some)
            .ok_or_else(|| ContentError::new(path, format!("recovery stage {} out of range", level))),
    }
}

impl RawDreams {
    fn build(self) -> Result<DreamBook, ContentError> {
        Ok(DreamBook {
            items: self.items.into_iter()
                .map(|d| Dream { surface: d.surface, hidden: d.hidden, response: d.response })
                .collect(),
            conclusion: convert_script(self.conclusion, "identifySuspect.dreams.conclusion")?,
        })
    }
}

impl RawFinale {
    fn build(self) -> Result<FinaleBook, ContentError> {
        if self.wrong_answer_messages.is_empty() {
            return Err(ContentError::new("identifySuspect.finale.wrongAnswerMessages", "at least one retry message is required"));
        }
        Ok(FinaleBook {
            floating_words: self.floating_words,
            prompt: self.prompt,
            valid_answers: self.valid_answers.iter().map(|a| a.trim().to_lowercase()).collect(),
            wrong_answer_messages: self.wrong_answer_messages,
            final_dialogue: convert_script(self.final_dialogue, "identifySuspect.finale.finalDialogue")?,
            end_messages: self.end_messages,
        })
    }
}

impl RawMenu {
    fn build(self) -> MenuBook {
        MenuBook {
            idle_lines: self.idle_lines.into_iter()
                .map(|l| IdleLine { text: l.text, coffee: l.coffee })
                .collect(),
            coffee_reactions: self.coffee_reactions,
            special_sprites: self.special_sprites,
        }
    }
}

pub fn convert_script(raw: Vec<RawStep>, path: &str) -> Result<Script, ContentError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, step)| convert_step(step, &format!("{}[{}]", path, i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Script::from)
}

fn convert_step(raw: RawStep, path: &str) -> Result<DialogueStep, ContentError> {
    let RawStep {
        text, action, loud, effect, sound, speaker, pitch, button_text, lead, color,
        strikethrough, choices, responses, choice_hover, change_image, portrait, low_opacity,
    } = raw;

    let (label, arm_labels) = match button_text {
        Some(RawLabels::One(l)) => (Some(l), None),
        Some(RawLabels::PerChoice(v)) => (None, Some(v)),
        None => (None, None),
    };
    let label = label.unwrap_or_else(|| "Continue".to_string());
    let has_choices = choices.is_some() || responses.is_some();

    let action = if action == "choice" || (action == "wait" && has_choices) {
        Action::Choice(convert_choice(choices, responses, choice_hover, arm_labels, path)?)
    } else {
        if has_choices {
            return Err(ContentError::new(path, format!("'{}' step cannot carry choices", action)));
        }
        match action.as_str() {
            "wait" => {
                if text.is_none() {
                    return Err(ContentError::new(path, "wait step needs text"));
                }
                Action::Wait
            }
            "name_input" => Action::NameInput,
            "continue_button" => Action::ContinueButton { label },
            "add_lead" => Action::AddLead {
                lead: lead.ok_or_else(|| ContentError::new(path, "add_lead step needs a lead"))?,
            },
            "colored_text" => {
                if text.is_none() {
                    return Err(ContentError::new(path, "colored_text step needs text"));
                }
                Action::ColoredText {
                    color: color.ok_or_else(|| ContentError::new(path, "colored_text step needs a color"))?,
                    strikethrough,
                }
            }
            "show_kola" => Action::ShowOverlay,
            "hide_kola" => Action::HideOverlay,
            "end_leads" => Action::EndLeads,
            "music_change" => Action::MusicChange,
            "show_image" => Action::ShowImage,
            "spin" => Action::Spin { label },
            "fly_away" => Action::FlyAway { label },
            "beam_up" => Action::BeamUp,
            "vanish" => Action::Vanish { label },
            "show_grid" => Action::ShowGrid,
            "hide_grid" => Action::HideGrid,
            "start_fears" => Action::StartFears,
            "show_fears" => Action::ShowFears,
            "show_next_cluster" => Action::ShowNextCluster,
            "enable_crossing" => Action::EnableCrossing,
            "fade_words" => Action::FadeWords,
            "full_recovery" => Action::FullRecovery,
            "show_dreams" => Action::ShowDreams,
            "show_finale" => Action::ShowFinale,
            "start_fade" => Action::StartFade,
            "end" => Action::End,
            other => return Err(ContentError::new(path, format!("unknown action '{}'", other))),
        }
    };

    let effect = match effect.as_deref() {
        None => None,
        Some("shake_flash") => Some(Effect::ShakeFlash),
        Some(other) => return Err(ContentError::new(path, format!("unknown effect '{}'", other))),
    };

    Ok(DialogueStep {
        text,
        action,
        loud,
        effect,
        sound,
        speaker,
        pitch: pitch.as_deref().map(Pitch::parse),
        portrait,
        change_image,
        whisper: low_opacity,
    })
}

fn convert_choice(
    choices: Option<Vec<String>>,
    responses: Option<Vec<RawResponse>>,
    hover: Option<Vec<Option<String>>>,
    labels: Option<Vec<String>>,
    path: &str,
) -> Result<ChoiceStep, ContentError> {
    let choices = choices.unwrap_or_default();
    let responses = responses.unwrap_or_default();
    if choices.is_empty() {
        return Err(ContentError::new(path, "choice step has no choices"));
    }
    if choices.len() != responses.len() {
        return Err(ContentError::new(
            path,
            format!("{} choices but {} responses", choices.len(), responses.len()),
        ));
    }
    let hover = hover.unwrap_or_default();
    let labels = labels.unwrap_or_default();

    let mut arms = Vec::with_capacity(choices.len());
    for (i, (label, response)) in choices.into_iter().zip(responses).enumerate() {
        arms.push(ChoiceArm {
            label,
            hover: hover.get(i).cloned().flatten(),
            response: convert_payload(response, &format!("{}.responses[{}]", path, i))?,
            continue_label: labels.get(i).cloned(),
        });
    }
    Ok(ChoiceStep { arms })
}

fn convert_payload(raw: RawResponse, path: &str) -> Result<ResponsePayload, ContentError> {
    match raw {
        RawResponse::Text(text) => Ok(ResponsePayload::Plain(text)),
        RawResponse::Lines(lines) if lines.is_empty() => Err(ContentError::new(path, "empty response payload")),
        RawResponse::Lines(lines) => Ok(ResponsePayload::Sequence(lines)),
        RawResponse::Steps(steps) => Ok(ResponsePayload::Steps(convert_script(steps, path)?)),
        RawResponse::Other(value) => Err(ContentError::new(
            path,
            format!("response payload must be a string, a list of strings or a list of steps, got {}", shape(&value)),
        )),
    }
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a mixed list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn steps(value: Value) -> Result<Script, ContentError> {
        let raw: Vec<RawStep> = serde_json::from_value(value).unwrap();
        convert_script(raw, "test")
    }

    #[test]
    fn payload_shapes_are_decided_at_load() {
        let script = steps(json!([
            {"action": "choice", "choices": ["a", "b", "c"], "responses": [
                "plain",
                ["one", "two"],
                [{"text": "nested", "action": "wait"}]
            ]}
        ])).unwrap();

        let Action::Choice(choice) = &script[0].action else { panic!("expected a choice") };
        assert_eq!(choice.arms[0].response, ResponsePayload::Plain("plain".into()));
        assert_eq!(choice.arms[1].response, ResponsePayload::Sequence(vec!["one".into(), "two".into()]));
        assert!(matches!(&choice.arms[2].response, ResponsePayload::Steps(s) if s.len() == 1));
    }

    #[test]
    fn empty_and_mixed_payloads_are_rejected() {
        let err = steps(json!([
            {"action": "choice", "choices": ["a"], "responses": [[]]}
        ])).unwrap_err();
        assert_eq!(err.path, "test[0].responses[0]");
        assert!(err.reason.contains("empty"));

        let err = steps(json!([
            {"action": "choice", "choices": ["a"], "responses": [["line", {"text": "x", "action": "wait"}]]}
        ])).unwrap_err();
        assert!(err.reason.contains("mixed list"));

        let err = steps(json!([
            {"action": "choice", "choices": ["a"], "responses": [42]}
        ])).unwrap_err();
        assert!(err.reason.contains("a number"));
    }

    #[test]
    fn mismatched_choice_arrays_are_rejected() {
        let err = steps(json!([
            {"action": "choice", "choices": ["a", "b"], "responses": ["only one"]}
        ])).unwrap_err();
        assert!(err.reason.contains("2 choices but 1 responses"));
    }

    #[test]
    fn wait_with_choices_becomes_prompted_choice() {
        let script = steps(json!([
            {"text": "Shoot!", "action": "wait", "choices": ["No"], "responses": ["Fine."],
             "choiceHover": [null]}
        ])).unwrap();
        assert!(matches!(script[0].action, Action::Choice(_)));
        assert!(!script[0].is_bare_choice());
    }

    #[test]
    fn per_arm_button_labels_and_hover() {
        let script = steps(json!([
            {"action": "choice", "choices": ["a", "b"], "responses": ["x", "y"],
             "buttonText": ["Continue", "We can continue"], "choiceHover": [null, "secret"]}
        ])).unwrap();
        let Action::Choice(choice) = &script[0].action else { panic!("expected a choice") };
        assert_eq!(choice.arms[1].continue_label.as_deref(), Some("We can continue"));
        assert_eq!(choice.arms[0].hover, None);
        assert_eq!(choice.arms[1].hover.as_deref(), Some("secret"));
    }

    #[test]
    fn unknown_tags_are_errors() {
        let err = steps(json!([{"text": "x", "action": "dance"}])).unwrap_err();
        assert!(err.reason.contains("unknown action 'dance'"));

        let err = steps(json!([{"text": "x", "action": "wait", "effect": "wobble"}])).unwrap_err();
        assert!(err.reason.contains("unknown effect"));

        let err = steps(json!([{"action": "add_lead"}])).unwrap_err();
        assert!(err.reason.contains("needs a lead"));
    }
}
