//! Reactive skill lookup.
//!
//! Skills live on definitions, so "registering" a trigger means putting an
//! entity on the board. Lookup walks the board in a fixed order and returns
//! every (caller, skill) pair whose trigger names the event:
//!
//! 1. Global extensions
//! 2. The current-turn player, then the opponent. For each player:
//!    characters starting from the active one (each followed by its attached
//!    statuses and equipment), then combat statuses, summons, supports.
//!
//! The order is part of the rules: ties between listeners are broken by it.

use std::sync::Arc;

use super::event::{Event, EventName};
use crate::core::{EntityId, EntityState, GameState};
use crate::data::{CallerRef, EntityDefinition, SkillDefinition};

/// A skill together with the entity that would call it.
#[derive(Clone, Debug)]
pub struct CallerAndSkill {
    pub caller: CallerRef,
    pub skill: Arc<SkillDefinition>,
}

fn push_matching(
    out: &mut Vec<CallerAndSkill>,
    id: EntityId,
    definition: &Arc<EntityDefinition>,
    name: EventName,
) {
    for skill in definition.skills_on(name) {
        out.push(CallerAndSkill {
            caller: CallerRef {
                id,
                definition: Arc::clone(definition),
            },
            skill: Arc::clone(skill),
        });
    }
}

fn push_entities<'a>(
    out: &mut Vec<CallerAndSkill>,
    entities: impl IntoIterator<Item = &'a EntityState>,
    name: EventName,
) {
    for et in entities {
        push_matching(out, et.id, &et.definition, name);
    }
}

/// Every skill on the board triggered by `name`, in lookup order.
#[must_use]
pub fn all_skills(state: &GameState, name: EventName) -> Vec<CallerAndSkill> {
    let mut out = Vec::new();
    push_entities(&mut out, &state.extensions, name);
    for who in [state.current_turn, state.current_turn.flip()] {
        let player = state.player(who);
        for ch in player.characters_from_active() {
            push_matching(&mut out, ch.id, &ch.definition, name);
            push_entities(&mut out, &ch.entities, name);
        }
        push_entities(&mut out, &player.combat_statuses, name);
        push_entities(&mut out, &player.summons, name);
        push_entities(&mut out, &player.supports, name);
    }
    out
}

/// Listeners of `event`. A disposed entity is no longer on the board but
/// still reacts to its own disposal, ahead of everyone else.
#[must_use]
pub fn broadcast(state: &GameState, event: &Event) -> Vec<CallerAndSkill> {
    let name = event.name();
    let mut out = Vec::new();
    if let Event::Dispose(arg) = event {
        push_matching(&mut out, arg.entity.id, &arg.entity.definition, name);
    }
    out.extend(all_skills(state, name));
    out
}
