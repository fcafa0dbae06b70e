//! Read-only rule queries.
//!
//! These answer the questions the executor asks before acting: would a
//! character survive a lethal hit, which initiative skills can a player
//! use, does a normal attack count as charged or plunging, what skill does
//! a card play.

use std::sync::Arc;

use crate::core::{tag, CharacterState, GameState, PlayerId, PlayerState};
use crate::data::{CallerRef, EntityDefinition, InitiativeSkillType, SkillDefinition, SkillInfo};
use crate::triggers::{all_skills, CallerAndSkill, DamageOrHealArg, Event, EventName, SkillArg};

/// True if some `ModifyZeroHealth` listener would accept this damage.
///
/// Only the filters run; nothing is committed.
#[must_use]
pub fn check_immune(state: &GameState, damage: &DamageOrHealArg) -> bool {
    let arg = SkillArg::Event(Event::ModifyZeroHealth(damage.clone()));
    all_skills(state, EventName::ModifyZeroHealth)
        .into_iter()
        .any(|CallerAndSkill { caller, skill }| {
            let filter = Arc::clone(&skill.filter);
            let info = SkillInfo::new(caller, skill);
            filter(state, &info, &arg)
        })
}

/// Initiative skills `who` may use right now: the active character's own
/// skills plus techniques granted by its equipment.
#[must_use]
pub fn initiative_skills_of_player(state: &GameState, who: PlayerId) -> Vec<CallerAndSkill> {
    let Ok(active) = state.player(who).active_character() else {
        return Vec::new();
    };
    if !active.alive() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for skill in active.definition.initiative_skills() {
        if skill.skill_type() != Some(InitiativeSkillType::PlayCard) {
            out.push(CallerAndSkill {
                caller: CallerRef {
                    id: active.id,
                    definition: Arc::clone(&active.definition),
                },
                skill: Arc::clone(skill),
            });
        }
    }
    for et in &active.entities {
        for skill in et.definition.initiative_skills() {
            if skill.skill_type() == Some(InitiativeSkillType::Technique) {
                out.push(CallerAndSkill {
                    caller: CallerRef {
                        id: et.id,
                        definition: Arc::clone(&et.definition),
                    },
                    skill: Arc::clone(skill),
                });
            }
        }
    }
    out
}

/// A status attached to the character forbids skill use.
#[must_use]
pub fn is_skill_disabled(character: &CharacterState) -> bool {
    character
        .entities
        .iter()
        .any(|et| et.definition.has_tag(tag::DISABLE_SKILL))
}

/// Charged and plunging flags for an initiative skill.
///
/// Only normal attacks qualify. A normal attack is charged when the player
/// holds an even number of dice (or has `can_charged`), and plunging when
/// the player switched characters since their last initiative skill.
#[must_use]
pub fn is_charged_plunging(skill: &SkillDefinition, player: &PlayerState) -> (bool, bool) {
    if skill.skill_type() != Some(InitiativeSkillType::Normal) {
        return (false, false);
    }
    let charged = player.dice.len() % 2 == 0 || player.can_charged;
    (charged, player.can_plunging)
}

/// The skill a card runs when played.
#[must_use]
pub fn play_skill_of_card(card: &EntityDefinition) -> Option<Arc<SkillDefinition>> {
    card.initiative_skills()
        .find(|s| s.skill_type() == Some(InitiativeSkillType::PlayCard))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        apply_mutation, var, DefinitionId, DiceType, EntityArea, EntityId, EntityState, GameConfig,
        Mutation,
    };
    use crate::data::{DefinitionKind, GameData};
    use crate::triggers::{Condition, DamageType};

    fn character() -> Arc<EntityDefinition> {
        Arc::new(
            EntityDefinition::character(DefinitionId(1), "A")
                .with_health(10)
                .with_skill(SkillDefinition::initiative(DefinitionId(11), InitiativeSkillType::Normal))
                .with_skill(SkillDefinition::initiative(DefinitionId(12), InitiativeSkillType::Burst)),
        )
    }

    fn test_state() -> GameState {
        GameState::new(GameConfig::default(), Arc::new(GameData::new()))
            .with_character(PlayerId::P0, character())
            .with_character(PlayerId::P1, character())
    }

    fn attach(state: &mut GameState, id: i32, definition: EntityDefinition) {
        let area = EntityArea::Character {
            who: PlayerId::P0,
            character_id: EntityId(-1),
        };
        let entity = EntityState::new(EntityId(id), Arc::new(definition));
        apply_mutation(state, &Mutation::CreateEntity { area, entity }).unwrap();
    }

    fn lethal() -> DamageOrHealArg {
        DamageOrHealArg {
            source: EntityId(-2),
            via: None,
            target: EntityId(-1),
            target_who: PlayerId::P0,
            damage_type: DamageType::Physical,
            value: 10,
            old_health: 10,
            new_health: 0,
            cause_defeated: true,
            immune: None,
        }
    }

    #[test]
    fn test_check_immune() {
        let mut state = test_state();
        assert!(!check_immune(&state, &lethal()));

        attach(
            &mut state,
            100,
            EntityDefinition::entity(DefinitionId(100), DefinitionKind::Status, "Guard").with_skill(
                SkillDefinition::triggered(DefinitionId(101), EventName::ModifyZeroHealth)
                    .with_condition(Condition::EventTargetIsCaller),
            ),
        );
        assert!(check_immune(&state, &lethal()));

        let mut other = lethal();
        other.target = EntityId(-2);
        other.target_who = PlayerId::P1;
        assert!(!check_immune(&state, &other));
    }

    #[test]
    fn test_initiative_skills_include_equipment_technique() {
        let mut state = test_state();
        assert_eq!(initiative_skills_of_player(&state, PlayerId::P0).len(), 2);

        attach(
            &mut state,
            100,
            EntityDefinition::entity(DefinitionId(100), DefinitionKind::Equipment, "Glider")
                .with_skill(SkillDefinition::initiative(DefinitionId(102), InitiativeSkillType::Technique)),
        );
        let skills = initiative_skills_of_player(&state, PlayerId::P0);
        assert_eq!(skills.len(), 3);
        assert_eq!(skills[2].caller.id, EntityId(100));
    }

    #[test]
    fn test_dead_active_has_no_skills() {
        let mut state = test_state();
        apply_mutation(
            &mut state,
            &Mutation::ModifyEntityVar {
                id: EntityId(-1),
                name: var::ALIVE.to_string(),
                value: 0,
                direction: None,
            },
        )
        .unwrap();
        assert!(initiative_skills_of_player(&state, PlayerId::P0).is_empty());
    }

    #[test]
    fn test_skill_disabled_by_tag() {
        let mut state = test_state();
        assert!(!is_skill_disabled(state.character(EntityId(-1)).unwrap()));
        attach(
            &mut state,
            100,
            EntityDefinition::entity(DefinitionId(100), DefinitionKind::Status, "Frozen")
                .with_tag(tag::DISABLE_SKILL),
        );
        assert!(is_skill_disabled(state.character(EntityId(-1)).unwrap()));
    }

    #[test]
    fn test_charged_plunging() {
        let normal = SkillDefinition::initiative(DefinitionId(11), InitiativeSkillType::Normal);
        let burst = SkillDefinition::initiative(DefinitionId(12), InitiativeSkillType::Burst);
        let mut player = PlayerState::new(PlayerId::P0);
        player.dice.push_back(DiceType::Omni);

        assert_eq!(is_charged_plunging(&normal, &player), (false, false));
        player.dice.push_back(DiceType::Pyro);
        player.can_plunging = true;
        assert_eq!(is_charged_plunging(&normal, &player), (true, true));
        assert_eq!(is_charged_plunging(&burst, &player), (false, false));
    }

    #[test]
    fn test_play_skill_of_card() {
        let card = EntityDefinition::card(DefinitionId(300), "Food")
            .with_skill(SkillDefinition::play_card(DefinitionId(301)));
        assert_eq!(play_skill_of_card(&card).map(|s| s.id), Some(DefinitionId(301)));
        assert!(play_skill_of_card(&EntityDefinition::card(DefinitionId(302), "Blank")).is_none());
    }
}
