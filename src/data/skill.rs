//! Skill definitions and per-invocation skill bindings.
//!
//! A `SkillDefinition` is a named effect attached to an entity definition.
//! It is either an initiative skill (chosen by a player) or triggered by an
//! event name. Its `filter` decides whether a triggered invocation runs;
//! its `action` edits a draft of the state through `SkillContext`.
//!
//! A `SkillInfo` binds a skill to the entity calling it for one invocation.
//! It is created fresh every time and passed explicitly to the filter and
//! the action.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definition::{DefinitionKind, EntityDefinition};
use crate::core::{DefinitionId, EntityId, GameState, PublicSkillType, Result};
use crate::effects::{Effect, SkillContext};
use crate::triggers::{Condition, ConditionEvaluator, EventName, SkillArg};

/// What makes a skill run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerOn {
    /// Chosen by a player (or requested by another skill).
    Initiative,
    Event(EventName),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitiativeSkillType {
    Normal,
    Elemental,
    Burst,
    Technique,
    /// The play effect of a card.
    PlayCard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeSkillConfig {
    pub skill_type: InitiativeSkillType,
    /// Using the skill grants the caller one energy.
    pub gain_energy: bool,
}

pub type SkillFilter = Arc<dyn Fn(&GameState, &SkillInfo, &SkillArg) -> bool + Send + Sync>;
pub type SkillAction = Arc<dyn Fn(&mut SkillContext<'_>, &SkillArg) -> Result<()> + Send + Sync>;

/// Immutable skill definition.
#[derive(Clone)]
pub struct SkillDefinition {
    pub id: DefinitionId,
    pub trigger_on: TriggerOn,
    pub initiative: Option<InitiativeSkillConfig>,
    pub filter: SkillFilter,
    pub action: SkillAction,
}

impl fmt::Debug for SkillDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillDefinition")
            .field("id", &self.id)
            .field("trigger_on", &self.trigger_on)
            .field("initiative", &self.initiative)
            .finish_non_exhaustive()
    }
}

impl SkillDefinition {
    fn new(id: DefinitionId, trigger_on: TriggerOn) -> Self {
        Self {
            id,
            trigger_on,
            initiative: None,
            filter: Arc::new(|_, _, _| true),
            action: Arc::new(|_, _| Ok(())),
        }
    }

    /// A skill triggered by `event`, with an always-true filter and a no-op body.
    #[must_use]
    pub fn triggered(id: DefinitionId, event: EventName) -> Self {
        Self::new(id, TriggerOn::Event(event))
    }

    /// An initiative skill. Normal attacks and elemental skills gain energy
    /// by default.
    #[must_use]
    pub fn initiative(id: DefinitionId, skill_type: InitiativeSkillType) -> Self {
        let gain_energy = matches!(
            skill_type,
            InitiativeSkillType::Normal | InitiativeSkillType::Elemental
        );
        let mut skill = Self::new(id, TriggerOn::Initiative);
        skill.initiative = Some(InitiativeSkillConfig {
            skill_type,
            gain_energy,
        });
        skill
    }

    /// The play effect of a card.
    #[must_use]
    pub fn play_card(id: DefinitionId) -> Self {
        Self::initiative(id, InitiativeSkillType::PlayCard)
    }

    /// Override energy gain (builder pattern). No effect on triggered skills.
    #[must_use]
    pub fn with_gain_energy(mut self, gain_energy: bool) -> Self {
        if let Some(config) = self.initiative.as_mut() {
            config.gain_energy = gain_energy;
        }
        self
    }

    #[must_use]
    pub fn with_filter(
        mut self,
        filter: impl Fn(&GameState, &SkillInfo, &SkillArg) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Use a declarative condition as the filter.
    #[must_use]
    pub fn with_condition(self, condition: Condition) -> Self {
        self.with_filter(move |state, info, arg| {
            ConditionEvaluator::evaluate(&condition, state, info, arg)
        })
    }

    #[must_use]
    pub fn with_action(
        mut self,
        action: impl Fn(&mut SkillContext<'_>, &SkillArg) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.action = Arc::new(action);
        self
    }

    /// Use a list of data effects as the body.
    #[must_use]
    pub fn with_effects(self, effects: Vec<Effect>) -> Self {
        self.with_action(move |ctx, arg| {
            for effect in &effects {
                ctx.apply(effect, arg)?;
            }
            Ok(())
        })
    }

    #[must_use]
    pub fn is_initiative(&self) -> bool {
        self.trigger_on == TriggerOn::Initiative
    }

    #[must_use]
    pub fn skill_type(&self) -> Option<InitiativeSkillType> {
        self.initiative.map(|c| c.skill_type)
    }

    /// Category reported to observers when this skill is used by `caller`.
    #[must_use]
    pub fn public_skill_type(&self, caller: &EntityDefinition) -> PublicSkillType {
        match self.skill_type() {
            Some(InitiativeSkillType::Normal) => PublicSkillType::Normal,
            Some(InitiativeSkillType::Elemental) => PublicSkillType::Elemental,
            Some(InitiativeSkillType::Burst) => PublicSkillType::Burst,
            Some(InitiativeSkillType::Technique) => PublicSkillType::Technique,
            Some(InitiativeSkillType::PlayCard) | None => {
                if caller.kind == DefinitionKind::Character {
                    PublicSkillType::CharacterPassive
                } else {
                    PublicSkillType::Triggered
                }
            }
        }
    }
}

/// The entity a skill is bound to, as it was when the binding was made.
#[derive(Clone, Debug)]
pub struct CallerRef {
    pub id: EntityId,
    pub definition: Arc<EntityDefinition>,
}

/// Serializable reference to a skill invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillRef {
    pub caller_id: EntityId,
    pub caller_definition_id: DefinitionId,
    pub skill_id: DefinitionId,
}

/// One invocation of a skill.
#[derive(Clone, Debug)]
pub struct SkillInfo {
    pub caller: CallerRef,
    pub definition: Arc<SkillDefinition>,
    pub charged: bool,
    pub plunging: bool,
    pub prepared: bool,
    pub request_by: Option<SkillRef>,
    pub is_preview: bool,
}

impl SkillInfo {
    #[must_use]
    pub fn new(caller: CallerRef, definition: Arc<SkillDefinition>) -> Self {
        Self {
            caller,
            definition,
            charged: false,
            plunging: false,
            prepared: false,
            request_by: None,
            is_preview: false,
        }
    }

    #[must_use]
    pub fn with_request_by(mut self, request_by: Option<SkillRef>) -> Self {
        self.request_by = request_by;
        self
    }

    #[must_use]
    pub fn with_charged_plunging(mut self, charged: bool, plunging: bool) -> Self {
        self.charged = charged;
        self.plunging = plunging;
        self
    }

    #[must_use]
    pub fn with_prepared(mut self, prepared: bool) -> Self {
        self.prepared = prepared;
        self
    }

    #[must_use]
    pub fn with_preview(mut self, is_preview: bool) -> Self {
        self.is_preview = is_preview;
        self
    }

    #[must_use]
    pub fn skill_ref(&self) -> SkillRef {
        SkillRef {
            caller_id: self.caller.id,
            caller_definition_id: self.caller.definition.id,
            skill_id: self.definition.id,
        }
    }

    /// A character's own initiative skill that is not a technique.
    #[must_use]
    pub fn is_character_initiative(&self) -> bool {
        self.caller.definition.kind == DefinitionKind::Character
            && self.definition.is_initiative()
            && self.definition.skill_type() != Some(InitiativeSkillType::Technique)
    }

    /// Skill belongs to a global extension.
    #[must_use]
    pub fn is_extension(&self) -> bool {
        self.caller.definition.kind == DefinitionKind::Extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(kind: DefinitionKind) -> CallerRef {
        CallerRef {
            id: EntityId(-1),
            definition: Arc::new(EntityDefinition::entity(DefinitionId(1), kind, "Caller")),
        }
    }

    #[test]
    fn test_initiative_defaults() {
        let normal = SkillDefinition::initiative(DefinitionId(11), InitiativeSkillType::Normal);
        assert!(normal.is_initiative());
        assert!(normal.initiative.unwrap().gain_energy);

        let burst = SkillDefinition::initiative(DefinitionId(12), InitiativeSkillType::Burst);
        assert!(!burst.initiative.unwrap().gain_energy);

        let triggered =
            SkillDefinition::triggered(DefinitionId(13), EventName::RoundBegin).with_gain_energy(true);
        assert!(triggered.initiative.is_none());
    }

    #[test]
    fn test_public_skill_type() {
        let ch = EntityDefinition::character(DefinitionId(1), "A");
        let summon = EntityDefinition::entity(DefinitionId(2), DefinitionKind::Summon, "B");
        let passive = SkillDefinition::triggered(DefinitionId(3), EventName::UseSkill);

        assert_eq!(passive.public_skill_type(&ch), PublicSkillType::CharacterPassive);
        assert_eq!(passive.public_skill_type(&summon), PublicSkillType::Triggered);

        let elemental = SkillDefinition::initiative(DefinitionId(4), InitiativeSkillType::Elemental);
        assert_eq!(elemental.public_skill_type(&ch), PublicSkillType::Elemental);
    }

    #[test]
    fn test_character_initiative() {
        let normal = Arc::new(SkillDefinition::initiative(
            DefinitionId(5),
            InitiativeSkillType::Normal,
        ));
        let technique = Arc::new(SkillDefinition::initiative(
            DefinitionId(6),
            InitiativeSkillType::Technique,
        ));

        assert!(SkillInfo::new(caller(DefinitionKind::Character), Arc::clone(&normal))
            .is_character_initiative());
        assert!(!SkillInfo::new(caller(DefinitionKind::Character), technique)
            .is_character_initiative());
        assert!(!SkillInfo::new(caller(DefinitionKind::Equipment), normal).is_character_initiative());
    }

    #[test]
    fn test_skill_ref() {
        let skill = Arc::new(SkillDefinition::triggered(DefinitionId(7), EventName::Enter));
        let info = SkillInfo::new(caller(DefinitionKind::Support), skill);
        let r = info.skill_ref();
        assert_eq!(r.caller_id, EntityId(-1));
        assert_eq!(r.caller_definition_id, DefinitionId(1));
        assert_eq!(r.skill_id, DefinitionId(7));
    }
}
