//! Curriculum skills and the skill catalog.

use serde::{Deserialize, Serialize};

/// Curriculum code identifying a skill (e.g. `6.8B`).
pub type SkillId = String;

/// A unit of curriculum content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Curriculum code.
    pub id: SkillId,
    /// Human-readable title.
    pub title: String,
}

impl Skill {
    /// Create a new skill.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Ordered catalog of the skills a learner can practice.
///
/// The engine never mutates skills; the catalog is supplied by the
/// surrounding application and only used for lookups and display titles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
}

impl SkillCatalog {
    /// Create a catalog from skills, keeping the first entry for duplicate codes.
    pub fn new(skills: impl IntoIterator<Item = Skill>) -> Self {
        let mut catalog = Self::default();
        for skill in skills {
            if catalog.get(&skill.id).is_none() {
                catalog.skills.push(skill);
            }
        }
        catalog
    }

    /// The grade 6 mathematics catalog shipped with practica.
    pub fn grade_six() -> Self {
        Self::new([
            Skill::new("6.2", "Rational Numbers & Operations"),
            Skill::new("6.4", "Proportionality & Unit Rate"),
            Skill::new("6.7B", "Expressions vs Equations"),
            Skill::new("6.8B", "Area of a Trapezoid"),
            Skill::new("6.9A", "One-Step Equations"),
        ])
    }

    /// Look up a skill by code.
    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// Whether the catalog contains the given code.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display title for a code, falling back to the code itself.
    pub fn title_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|s| s.title.as_str()).unwrap_or(id)
    }

    /// Iterate over skills in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    /// Number of skills.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
