//! Effect definitions.
//!
//! Effects are data-driven skill bodies. Simple skills ("deal 2 Pyro damage
//! to the opponent's active character") are written as a list of effects
//! instead of a closure, and can be stored, compared and serialized.
//!
//! Definitions are referenced by id and looked up in the battle's
//! `GameData` when the effect is applied.

use serde::{Deserialize, Serialize};

use super::targeting::{Side, Target};
use crate::core::DefinitionId;
use crate::triggers::{Condition, DamageType, Request};

/// An atomic skill effect.
///
/// ## Characters
///
/// - `Damage`, `Heal`, `GainEnergy`: health and energy changes
/// - `SwitchActive`: make the (single) target the active character
///
/// ## Variables
///
/// - `SetVariable`, `AddVariable`: edit any character or entity variable
///
/// ## Entities
///
/// - `AttachStatus`, `CreateCombatStatus`, `Summon`: create or refresh
/// - `Dispose`: remove
/// - `Transform`: swap the definition in place
///
/// ## Composite
///
/// - `Batch`: run effects in order
/// - `Conditional`: run an effect if a condition holds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Characters ===

    Damage {
        target: Target,
        value: i64,
        damage_type: DamageType,
    },

    Heal {
        target: Target,
        value: i64,
    },

    GainEnergy {
        target: Target,
        value: i64,
    },

    SwitchActive {
        target: Target,
    },

    // === Variables ===

    SetVariable {
        target: Target,
        name: String,
        value: i64,
    },

    AddVariable {
        target: Target,
        name: String,
        delta: i64,
    },

    // === Entities ===

    /// Attach a status or equipment to each target character.
    AttachStatus {
        target: Target,
        definition: DefinitionId,
    },

    CreateCombatStatus {
        side: Side,
        definition: DefinitionId,
    },

    /// Summon onto the caller's side.
    Summon {
        definition: DefinitionId,
    },

    Dispose {
        target: Target,
    },

    Transform {
        target: Target,
        definition: DefinitionId,
    },

    /// Put a card into the caller owner's hand.
    CreateHandCard {
        definition: DefinitionId,
    },

    // === Cascade ===

    /// Save the character about to be defeated, leaving it at `new_health`.
    /// Only meaningful in `ModifyZeroHealth` listeners.
    Immune {
        new_health: i64,
    },

    /// Emit a request to be handled after this skill.
    Request(Request),

    // === Composite ===

    Batch(Vec<Effect>),

    Conditional {
        condition: Condition,
        effect: Box<Effect>,
    },
}

impl Effect {
    /// Deal damage to the opponent's active character.
    #[must_use]
    pub fn damage_opponent(value: i64, damage_type: DamageType) -> Self {
        Self::Damage {
            target: Target::Active(Side::Opponent),
            value,
            damage_type,
        }
    }

    /// Add to one of the caller's own variables.
    #[must_use]
    pub fn add_own(name: impl Into<String>, delta: i64) -> Self {
        Self::AddVariable {
            target: Target::Caller,
            name: name.into(),
            delta,
        }
    }

    /// Run `self` only when `condition` holds.
    #[must_use]
    pub fn when(self, condition: Condition) -> Self {
        Self::Conditional {
            condition,
            effect: Box::new(self),
        }
    }

    /// Number of leaf effects, counting through batches and conditionals.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Batch(effects) => effects.iter().map(Effect::leaf_count).sum(),
            Self::Conditional { effect, .. } => effect.leaf_count(),
            _ => 1,
        }
    }
}
