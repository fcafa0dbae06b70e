//! Primitive state edits.
//!
//! Every change to a `GameState` goes through `apply_mutation`. The mutator
//! and the skill drafts both call it, so there is exactly one place where
//! the shape of the state is edited.
//!
//! Most mutations have an `ExposedMutation` counterpart that is sent to
//! observers and network peers. Id allocation and the round-skill and
//! delaying logs are internal bookkeeping and have none.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};

use super::entity::{DefinitionId, EntityId};
use super::error::{EngineError, Result};
use super::player::PlayerId;
use super::state::{
    CardState, CardZone, DiceType, EntityArea, EntityState, GameState, Phase, PlayerFlag,
    RoundSkillRecord,
};
use crate::data::{EntityDefinition, TriggerOn};
use crate::triggers::{Event, EventName};

/// Which way a variable moved, for animation hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarDirection {
    Increase,
    Decrease,
}

/// Skill category reported in `SkillUsed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicSkillType {
    Normal,
    Elemental,
    Burst,
    Technique,
    CharacterPassive,
    Triggered,
}

/// A primitive edit of the game state.
#[derive(Clone, Debug)]
pub enum Mutation {
    /// Advance the id allocator by one.
    StepId,
    ChangePhase {
        new_phase: Phase,
    },
    SetWinner {
        winner: PlayerId,
    },
    SetPlayerFlag {
        who: PlayerId,
        flag: PlayerFlag,
        value: bool,
    },
    ModifyEntityVar {
        id: EntityId,
        name: String,
        value: i64,
        direction: Option<VarDirection>,
    },
    SwitchActive {
        who: PlayerId,
        to: EntityId,
    },
    PushRoundSkillLog {
        who: PlayerId,
        record: RoundSkillRecord,
    },
    PushDelayingEvent {
        event: Event,
    },
    ClearDelayingEvent,
    CreateEntity {
        area: EntityArea,
        entity: EntityState,
    },
    RemoveEntity {
        id: EntityId,
    },
    /// Insert a card; `index` 0 is the top of the pile. `None` appends.
    CreateCard {
        who: PlayerId,
        zone: CardZone,
        card: CardState,
        index: Option<usize>,
    },
    RemoveCard {
        who: PlayerId,
        zone: CardZone,
        id: EntityId,
        used: bool,
    },
    ResetDice {
        who: PlayerId,
        dice: Vector<DiceType>,
    },
    TransformDefinition {
        id: EntityId,
        definition: Arc<EntityDefinition>,
    },
}

impl Mutation {
    /// Observer-facing form, `None` for internal bookkeeping.
    #[must_use]
    pub fn to_exposed(&self) -> Option<ExposedMutation> {
        let exposed = match self {
            Self::StepId
            | Self::PushRoundSkillLog { .. }
            | Self::PushDelayingEvent { .. }
            | Self::ClearDelayingEvent => return None,
            Self::ChangePhase { new_phase } => ExposedMutation::ChangePhase {
                new_phase: *new_phase,
            },
            Self::SetWinner { winner } => ExposedMutation::SetWinner { winner: *winner },
            Self::SetPlayerFlag { who, flag, value } => ExposedMutation::SetPlayerFlag {
                who: *who,
                flag: *flag,
                value: *value,
            },
            Self::ModifyEntityVar {
                id,
                name,
                value,
                direction,
            } => ExposedMutation::ModifyEntityVar {
                id: *id,
                name: name.clone(),
                value: *value,
                direction: *direction,
            },
            Self::SwitchActive { who, to } => ExposedMutation::SwitchActive { who: *who, to: *to },
            Self::CreateEntity { area, entity } => ExposedMutation::CreateEntity {
                area: *area,
                id: entity.id,
                definition_id: entity.definition.id,
            },
            Self::RemoveEntity { id } => ExposedMutation::RemoveEntity { id: *id },
            Self::CreateCard { who, zone, card, .. } => ExposedMutation::CreateCard {
                who: *who,
                zone: *zone,
                id: card.id,
                definition_id: card.definition.id,
            },
            Self::RemoveCard { who, zone, id, used } => ExposedMutation::RemoveCard {
                who: *who,
                zone: *zone,
                id: *id,
                used: *used,
            },
            Self::ResetDice { who, dice } => ExposedMutation::ResetDice {
                who: *who,
                dice: dice.iter().copied().collect(),
            },
            Self::TransformDefinition { id, definition } => ExposedMutation::TransformDefinition {
                id: *id,
                new_definition_id: definition.id,
            },
        };
        Some(exposed)
    }
}

/// Serializable mutation record sent to observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExposedMutation {
    ChangePhase {
        new_phase: Phase,
    },
    SetWinner {
        winner: PlayerId,
    },
    SetPlayerFlag {
        who: PlayerId,
        flag: PlayerFlag,
        value: bool,
    },
    ModifyEntityVar {
        id: EntityId,
        name: String,
        value: i64,
        direction: Option<VarDirection>,
    },
    SwitchActive {
        who: PlayerId,
        to: EntityId,
    },
    CreateEntity {
        area: EntityArea,
        id: EntityId,
        definition_id: DefinitionId,
    },
    RemoveEntity {
        id: EntityId,
    },
    CreateCard {
        who: PlayerId,
        zone: CardZone,
        id: EntityId,
        definition_id: DefinitionId,
    },
    RemoveCard {
        who: PlayerId,
        zone: CardZone,
        id: EntityId,
        used: bool,
    },
    ResetDice {
        who: PlayerId,
        dice: Vec<DiceType>,
    },
    TransformDefinition {
        id: EntityId,
        new_definition_id: DefinitionId,
    },
    /// A skill ran and either is an initiative skill or changed the state.
    SkillUsed {
        who: Option<PlayerId>,
        caller_id: EntityId,
        caller_definition_id: DefinitionId,
        skill_definition_id: DefinitionId,
        skill_type: PublicSkillType,
        triggered_on: TriggerOn,
    },
    /// Opening or closing bracket around the handling of one event.
    HandleEvent {
        is_close: bool,
        event_name: EventName,
    },
}

/// Apply one mutation in place.
///
/// Fails only on structural problems: unknown ids, duplicate ids, or a
/// target area that cannot hold the entity.
pub fn apply_mutation(state: &mut GameState, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::StepId => {
            state.alloc_id();
        }
        Mutation::ChangePhase { new_phase } => {
            state.phase = *new_phase;
        }
        Mutation::SetWinner { winner } => {
            state.winner = Some(*winner);
        }
        Mutation::SetPlayerFlag { who, flag, value } => {
            state.players[*who].set_flag(*flag, *value);
        }
        Mutation::ModifyEntityVar { id, name, value, .. } => {
            state.variables_mut(*id)?.insert(name.clone(), *value);
        }
        Mutation::SwitchActive { who, to } => {
            if state.character_owner(*to)? != *who {
                return Err(EngineError::NotACharacter { id: *to });
            }
            state.players[*who].active_character_id = *to;
        }
        Mutation::PushRoundSkillLog { who, record } => {
            state.players[*who].round_skill_log.push_back(*record);
        }
        Mutation::PushDelayingEvent { event } => {
            state.delaying_events.push_back(event.clone());
        }
        Mutation::ClearDelayingEvent => {
            state.delaying_events.clear();
        }
        Mutation::CreateEntity { area, entity } => {
            if state.contains_id(entity.id) {
                return Err(EngineError::DuplicateId(entity.id));
            }
            state.entity_zone_mut(*area)?.push_back(entity.clone());
        }
        Mutation::RemoveEntity { id } => {
            let area = state.get_entity_area(*id)?;
            state.entity_zone_mut(area)?.retain(|et| et.id != *id);
        }
        Mutation::CreateCard {
            who,
            zone,
            card,
            index,
        } => {
            if state.contains_id(card.id) {
                return Err(EngineError::DuplicateId(card.id));
            }
            let cards = state.players[*who].zone_mut(*zone);
            match index {
                Some(idx) => cards.insert((*idx).min(cards.len()), card.clone()),
                None => cards.push_back(card.clone()),
            }
        }
        Mutation::RemoveCard { who, zone, id, .. } => {
            let cards = state.players[*who].zone_mut(*zone);
            let pos = cards
                .iter()
                .position(|c| c.id == *id)
                .ok_or(EngineError::EntityNotFound(*id))?;
            cards.remove(pos);
        }
        Mutation::ResetDice { who, dice } => {
            state.players[*who].dice = dice.clone();
        }
        Mutation::TransformDefinition { id, definition } => match state.get_entity_area(*id)? {
            EntityArea::Characters { .. } => {
                state.character_mut(*id)?.definition = Arc::clone(definition);
            }
            EntityArea::Cards { .. } => return Err(EngineError::EntityNotFound(*id)),
            area => {
                let zone = state.entity_zone_mut(area)?;
                if let Some(et) = zone.iter_mut().find(|et| et.id == *id) {
                    et.definition = Arc::clone(definition);
                }
            }
        },
    }
    Ok(())
}
