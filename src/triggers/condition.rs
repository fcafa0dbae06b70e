//! Declarative skill filters.
//!
//! Most triggered skills only need to ask simple questions about the event
//! and their caller: "is the damage aimed at me", "is this about my side".
//! `Condition` covers those cases as data; skills with stranger needs pass a
//! closure to `SkillDefinition::with_filter` instead.

use serde::{Deserialize, Serialize};

use super::event::{DamageType, SkillArg};
use crate::core::{EntityArea, GameState, PlayerId};
use crate::data::SkillInfo;

/// A predicate over the current state, the invocation and its argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    // === Caller ===

    /// Caller (or the character it is attached to) is alive.
    CallerAlive,

    /// Caller is its owner's active character, or is attached to it.
    CallerIsActive,

    /// Caller variable is at least `min`.
    CallerVarAtLeast { name: String, min: i64 },

    // === Event ===

    /// Event concerns the caller's owner.
    EventForCallerOwner,

    /// Event concerns the caller's opponent.
    EventForOpponent,

    /// Event target is the caller, or the character the caller is attached to.
    EventTargetIsCaller,

    /// Damage event of this type.
    DamageTypeIs(DamageType),

    /// Damage event that is not a heal.
    IsDamage,

    // === Combinators ===

    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),

    Always,
    Never,
}

impl Condition {
    /// All conditions must hold.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// At least one condition must hold.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }
}

/// Evaluates conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate `condition`. A caller that no longer exists (a disposed
    /// entity reacting to its own disposal) has no owner and is not alive.
    pub fn evaluate(condition: &Condition, state: &GameState, info: &SkillInfo, arg: &SkillArg) -> bool {
        let area = state.get_entity_area(info.caller.id).ok();
        let owner: Option<PlayerId> = area.and_then(EntityArea::who);
        let host = match area {
            Some(EntityArea::Character { character_id, .. }) => Some(character_id),
            Some(EntityArea::Characters { .. }) => Some(info.caller.id),
            _ => None,
        };
        let event = arg.event();

        match condition {
            Condition::CallerAlive => match host {
                Some(id) => state.character(id).map(|ch| ch.alive()).unwrap_or(false),
                None => area.is_some(),
            },
            Condition::CallerIsActive => match (host, owner) {
                (Some(id), Some(who)) => state.player(who).active_character_id == id,
                _ => false,
            },
            Condition::CallerVarAtLeast { name, min } => state
                .get_entity_by_id(info.caller.id)
                .map(|st| st.var(name) >= *min)
                .unwrap_or(false),
            Condition::EventForCallerOwner => {
                owner.is_some() && event.and_then(|e| e.who()) == owner
            }
            Condition::EventForOpponent => match (owner, event.and_then(|e| e.who())) {
                (Some(owner), Some(who)) => who == owner.flip(),
                _ => false,
            },
            Condition::EventTargetIsCaller => {
                let target = event.and_then(|e| e.target());
                target.is_some() && (target == Some(info.caller.id) || target == host)
            }
            Condition::DamageTypeIs(damage_type) => event
                .and_then(|e| e.damage())
                .is_some_and(|d| d.damage_type == *damage_type),
            Condition::IsDamage => event
                .and_then(|e| e.damage())
                .is_some_and(|d| d.is_damage_type_damage()),
            Condition::All(conditions) => conditions
                .iter()
                .all(|c| Self::evaluate(c, state, info, arg)),
            Condition::Any(conditions) => conditions
                .iter()
                .any(|c| Self::evaluate(c, state, info, arg)),
            Condition::Not(inner) => !Self::evaluate(inner, state, info, arg),
            Condition::Always => true,
            Condition::Never => false,
        }
    }
}
