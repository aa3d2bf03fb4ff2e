//! Practice item types.
//!
//! Items are supplied by the item bank and are never mutated by the engine;
//! the session replaces its current item wholesale on every fetch. The serde
//! layout matches the item bank's JSON (`teks`, `type`, `answer_format`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::skill::SkillId;

/// The response shape an item expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Free numeric entry.
    #[serde(rename = "numeric")]
    Numeric,
    /// One or more options selected from a list.
    #[serde(rename = "mc")]
    MultipleChoice,
}

/// A selectable option of a multiple-choice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOption {
    pub id: String,
    pub text: String,
}

impl ItemOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Accepted numeric answer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerForm {
    Int,
    Fraction,
    Decimal,
}

/// Accepted-answer format of a numeric item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFormat {
    pub form: AnswerForm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// Rendered diagram attached to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub svg: String,
}

/// Stimulus material shown alongside the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
    /// Item-bank specific fields the engine passes through untouched.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A single practice question instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier assigned by the item bank.
    pub id: String,
    /// Skill the item exercises.
    #[serde(rename = "teks")]
    pub skill_id: SkillId,
    /// Response shape.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Generator seed, when the bank reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Question text (may contain inline math).
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stimulus: Option<Stimulus>,
    /// Options, multiple-choice only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ItemOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_format: Option<AnswerFormat>,
    /// Hints in authored order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    pub difficulty: u32,
}

impl Item {
    /// Create a numeric item.
    pub fn numeric(
        id: impl Into<String>,
        skill_id: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self::new(id, skill_id, ItemKind::Numeric, prompt)
    }

    /// Create a multiple-choice item.
    pub fn multiple_choice(
        id: impl Into<String>,
        skill_id: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<ItemOption>,
    ) -> Self {
        let mut item = Self::new(id, skill_id, ItemKind::MultipleChoice, prompt);
        item.options = options;
        item
    }

    fn new(
        id: impl Into<String>,
        skill_id: impl Into<String>,
        kind: ItemKind,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            skill_id: skill_id.into(),
            kind,
            seed: None,
            prompt: prompt.into(),
            stimulus: None,
            options: Vec::new(),
            answer_format: None,
            hints: Vec::new(),
            difficulty: 1,
        }
    }

    /// Set the hints.
    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the difficulty.
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the generator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the accepted-answer format.
    pub fn with_answer_format(mut self, format: AnswerFormat) -> Self {
        self.answer_format = Some(format);
        self
    }

    /// Set the stimulus.
    pub fn with_stimulus(mut self, stimulus: Stimulus) -> Self {
        self.stimulus = Some(stimulus);
        self
    }

    /// The first `limit` hints in authored order.
    pub fn visible_hints(&self, limit: usize) -> &[String] {
        &self.hints[..self.hints.len().min(limit)]
    }

    /// Whether `option_id` is one of this item's options.
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}
