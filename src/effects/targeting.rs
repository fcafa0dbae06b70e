//! Effect targeting.
//!
//! `Target` names who an effect applies to relative to the calling skill:
//! the caller itself, its host character, characters of either side, the
//! target of the triggering event, or the targets a card was played with.

use serde::{Deserialize, Serialize};

use crate::core::{EntityArea, EntityId, GameState, PlayerId, Result};
use crate::data::SkillInfo;
use crate::triggers::SkillArg;

/// Side of the board relative to the caller's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Mine,
    Opponent,
}

/// What an effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// The calling entity.
    Caller,
    /// The character the caller is attached to, or the caller if it is a
    /// character.
    CallerHost,
    /// Active character of a side.
    Active(Side),
    /// Living characters of a side other than the active one.
    Standby(Side),
    /// Living characters of a side, starting from the active one.
    AllCharacters(Side),
    /// Target of the triggering event.
    EventTarget,
    /// Targets chosen when the card was played.
    ArgTargets,
    Entity(EntityId),
}

/// Owner of the calling entity.
///
/// Extensions and entities that already left the board act for the
/// current-turn player.
#[must_use]
pub fn caller_owner(state: &GameState, info: &SkillInfo) -> PlayerId {
    state
        .get_entity_area(info.caller.id)
        .ok()
        .and_then(EntityArea::who)
        .unwrap_or(state.current_turn)
}

fn side_owner(state: &GameState, info: &SkillInfo, side: Side) -> PlayerId {
    let owner = caller_owner(state, info);
    match side {
        Side::Mine => owner,
        Side::Opponent => owner.flip(),
    }
}

impl Target {
    /// Resolve to concrete ids. Unresolvable targets yield an empty list.
    pub fn resolve(&self, state: &GameState, info: &SkillInfo, arg: &SkillArg) -> Result<Vec<EntityId>> {
        let ids = match self {
            Self::Caller => vec![info.caller.id],
            Self::CallerHost => match state.get_entity_area(info.caller.id) {
                Ok(EntityArea::Character { character_id, .. }) => vec![character_id],
                Ok(EntityArea::Characters { .. }) => vec![info.caller.id],
                _ => Vec::new(),
            },
            Self::Active(side) => {
                let player = state.player(side_owner(state, info, *side));
                vec![player.active_character()?.id]
            }
            Self::Standby(side) => {
                let player = state.player(side_owner(state, info, *side));
                player
                    .characters_from_active()
                    .skip(1)
                    .filter(|ch| ch.alive())
                    .map(|ch| ch.id)
                    .collect()
            }
            Self::AllCharacters(side) => {
                let player = state.player(side_owner(state, info, *side));
                player
                    .characters_from_active()
                    .filter(|ch| ch.alive())
                    .map(|ch| ch.id)
                    .collect()
            }
            Self::EventTarget => arg.event().and_then(|e| e.target()).into_iter().collect(),
            Self::ArgTargets => arg.targets().to_vec(),
            Self::Entity(id) => vec![*id],
        };
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{apply_mutation, var, DefinitionId, GameConfig, Mutation};
    use crate::data::{CallerRef, EntityDefinition, GameData, SkillDefinition};
    use crate::triggers::EventName;

    fn test_state() -> GameState {
        let ch = Arc::new(EntityDefinition::character(DefinitionId(1), "A").with_health(10));
        GameState::new(GameConfig::default(), Arc::new(GameData::new()))
            .with_character(PlayerId::P0, Arc::clone(&ch))
            .with_character(PlayerId::P0, Arc::clone(&ch))
            .with_character(PlayerId::P0, Arc::clone(&ch))
            .with_character(PlayerId::P1, ch)
    }

    fn info(state: &GameState, id: EntityId) -> SkillInfo {
        let definition = Arc::clone(state.get_entity_by_id(id).unwrap().definition());
        SkillInfo::new(
            CallerRef { id, definition },
            Arc::new(SkillDefinition::triggered(DefinitionId(9), EventName::RoundBegin)),
        )
    }

    #[test]
    fn test_sides() {
        let state = test_state();
        let info = info(&state, EntityId(-1));
        let arg = SkillArg::none();

        assert_eq!(
            Target::Active(Side::Opponent).resolve(&state, &info, &arg).unwrap(),
            vec![EntityId(-4)]
        );
        assert_eq!(
            Target::Standby(Side::Mine).resolve(&state, &info, &arg).unwrap(),
            vec![EntityId(-2), EntityId(-3)]
        );
    }

    #[test]
    fn test_dead_characters_skipped() {
        let mut state = test_state();
        apply_mutation(
            &mut state,
            &Mutation::ModifyEntityVar {
                id: EntityId(-2),
                name: var::ALIVE.to_string(),
                value: 0,
                direction: None,
            },
        )
        .unwrap();
        let info = info(&state, EntityId(-1));
        let all = Target::AllCharacters(Side::Mine)
            .resolve(&state, &info, &SkillArg::none())
            .unwrap();
        assert_eq!(all, vec![EntityId(-1), EntityId(-3)]);
    }

    #[test]
    fn test_arg_targets() {
        let state = test_state();
        let info = info(&state, EntityId(-1));
        let arg = SkillArg::Initiative {
            targets: vec![EntityId(-3)],
        };
        assert_eq!(Target::ArgTargets.resolve(&state, &info, &arg).unwrap(), vec![EntityId(-3)]);
        assert!(Target::EventTarget.resolve(&state, &info, &arg).unwrap().is_empty());
    }
}
