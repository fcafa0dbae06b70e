//! Entity definitions - immutable capability descriptors.
//!
//! An `EntityDefinition` describes a character, status, summon, support,
//! card or extension: its kind, tags, initial variables and skills.
//! Runtime objects (`CharacterState`, `EntityState`, `CardState`) point at
//! their definition through an `Arc`, so a definition is shared by every
//! instance created from it.
//!
//! ## Example
//!
//! ```
//! use rust_tcg::core::DefinitionId;
//! use rust_tcg::data::{EntityDefinition, InitiativeSkillType, SkillDefinition};
//!
//! let keqing = EntityDefinition::character(DefinitionId(1403), "Keqing")
//!     .with_health(10)
//!     .with_max_energy(3)
//!     .with_skill(SkillDefinition::initiative(DefinitionId(14031), InitiativeSkillType::Normal));
//!
//! assert_eq!(keqing.energy_variable(), "energy");
//! assert_eq!(keqing.initiative_skills().count(), 1);
//! ```

use std::sync::Arc;

use smallvec::SmallVec;

use super::skill::{SkillDefinition, TriggerOn};
use crate::core::{var, DefinitionId, Variables};
use crate::triggers::EventName;

/// What kind of object a definition describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DefinitionKind {
    Character,
    /// Attached to a character.
    Status,
    /// Attached to a character.
    Equipment,
    CombatStatus,
    Summon,
    Support,
    Card,
    /// Global rules object owned by neither player.
    Extension,
}

/// Energy stored in a custom variable instead of `energy`.
///
/// Characters with special energy never gain energy from skill use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialEnergy {
    pub variable: String,
    pub slot_size: i64,
}

/// Immutable definition shared by every instance.
#[derive(Clone, Debug)]
pub struct EntityDefinition {
    pub id: DefinitionId,
    pub kind: DefinitionKind,
    /// Name (for logging).
    pub name: String,
    pub tags: SmallVec<[String; 2]>,
    pub skills: Vec<Arc<SkillDefinition>>,
    /// Initial variables of every instance.
    pub variables: Variables,
    pub special_energy: Option<SpecialEnergy>,
}

impl EntityDefinition {
    /// Create a definition of any kind.
    #[must_use]
    pub fn entity(id: DefinitionId, kind: DefinitionKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            tags: SmallVec::new(),
            skills: Vec::new(),
            variables: Variables::default(),
            special_energy: None,
        }
    }

    /// Create a character definition.
    #[must_use]
    pub fn character(id: DefinitionId, name: impl Into<String>) -> Self {
        Self::entity(id, DefinitionKind::Character, name)
    }

    /// Create a card definition.
    #[must_use]
    pub fn card(id: DefinitionId, name: impl Into<String>) -> Self {
        Self::entity(id, DefinitionKind::Card, name)
    }

    /// Set max health; instances start at full health.
    #[must_use]
    pub fn with_health(self, health: i64) -> Self {
        self.with_variable(var::MAX_HEALTH, health)
            .with_variable(var::HEALTH, health)
    }

    #[must_use]
    pub fn with_max_energy(self, energy: i64) -> Self {
        self.with_variable(var::MAX_ENERGY, energy)
    }

    /// Set an initial variable (builder pattern).
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.skills.push(Arc::new(skill));
        self
    }

    /// Store energy in `variable` instead of `energy`.
    #[must_use]
    pub fn with_special_energy(mut self, variable: impl Into<String>, slot_size: i64) -> Self {
        let variable = variable.into();
        self.variables.entry(variable.clone()).or_insert(0);
        self.special_energy = Some(SpecialEnergy {
            variable,
            slot_size,
        });
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Name of the variable holding this character's energy.
    #[must_use]
    pub fn energy_variable(&self) -> &str {
        self.special_energy
            .as_ref()
            .map_or(var::ENERGY, |se| se.variable.as_str())
    }

    /// Skills triggered by the given event.
    pub fn skills_on(&self, name: EventName) -> impl Iterator<Item = &Arc<SkillDefinition>> {
        self.skills
            .iter()
            .filter(move |sk| sk.trigger_on == TriggerOn::Event(name))
    }

    /// Skills a player can choose to use.
    pub fn initiative_skills(&self) -> impl Iterator<Item = &Arc<SkillDefinition>> {
        self.skills.iter().filter(|sk| sk.is_initiative())
    }
}
