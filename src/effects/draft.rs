//! Mutation drafts.
//!
//! A `Draft` is a private working copy of the current state. Skill bodies
//! and the mutator's convenience helpers edit the draft through
//! `apply_mutation`, collecting exposed mutations and emitted events as they
//! go. `finish` hands back the original `Arc` untouched when nothing was
//! mutated, so callers can detect no-op skills by pointer identity.

use std::sync::Arc;

use tracing::trace;

use super::reaction::apply_element;
use crate::core::{
    apply_mutation, var, Aura, CardState, CardZone, EngineError, EntityArea, EntityId,
    EntityState, ExposedMutation, GameState, Mutation, PlayerFlag, PlayerId, Result, VarDirection,
};
use crate::data::{EntityDefinition, SkillRef};
use crate::triggers::{
    DamageOrHealArg, DamageType, DisposeArg, EnterArg, Event, EventAndRequest, ReactionArg,
    SwitchActiveArg,
};

/// How an entity variable is adjusted on insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableOverride {
    Set(String, i64),
    Add(String, i64),
}

/// Options for creating (or refreshing) an entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertOptions {
    pub overrides: Vec<VariableOverride>,
    /// When refreshing an existing entity, only touch overridden variables
    /// instead of resetting it to its initial variables.
    pub keep_existing: bool,
}

impl InsertOptions {
    /// Refresh an existing entity by adding `delta` to one variable.
    #[must_use]
    pub fn increment(name: impl Into<String>, delta: i64) -> Self {
        Self {
            overrides: vec![VariableOverride::Add(name.into(), delta)],
            keep_existing: true,
        }
    }

    #[must_use]
    pub fn with_set(mut self, name: impl Into<String>, value: i64) -> Self {
        self.overrides.push(VariableOverride::Set(name.into(), value));
        self
    }
}

/// Heal semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealKind {
    /// Add health up to the maximum.
    Common,
    /// Revive from zero health straight to the given value.
    ImmuneDefeated,
}

/// What a finished draft produced.
#[derive(Debug)]
pub struct DraftOutput {
    pub state: Arc<GameState>,
    pub exposed: Vec<ExposedMutation>,
    pub events: Vec<EventAndRequest>,
}

/// Working copy of a state snapshot.
#[derive(Debug)]
pub struct Draft {
    original: Arc<GameState>,
    state: GameState,
    touched: bool,
    exposed: Vec<ExposedMutation>,
    events: Vec<EventAndRequest>,
}

impl Draft {
    #[must_use]
    pub fn new(original: Arc<GameState>) -> Self {
        let state = (*original).clone();
        Self {
            original,
            state,
            touched: false,
            exposed: Vec::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Apply one mutation to the working copy.
    pub fn mutate(&mut self, mutation: Mutation) -> Result<()> {
        apply_mutation(&mut self.state, &mutation)?;
        if let Some(exposed) = mutation.to_exposed() {
            self.exposed.push(exposed);
        }
        self.touched = true;
        Ok(())
    }

    pub fn emit(&mut self, event: impl Into<EventAndRequest>) {
        self.events.push(event.into());
    }

    #[must_use]
    pub fn finish(self) -> DraftOutput {
        let state = if self.touched {
            Arc::new(self.state)
        } else {
            self.original
        };
        DraftOutput {
            state,
            exposed: self.exposed,
            events: self.events,
        }
    }

    /// Set a variable. No mutation when the value is unchanged.
    pub fn set_variable(&mut self, id: EntityId, name: &str, value: i64) -> Result<()> {
        let old = self.state.get_entity_by_id(id)?.var(name);
        if old == value {
            return Ok(());
        }
        let direction = if value > old {
            VarDirection::Increase
        } else {
            VarDirection::Decrease
        };
        self.mutate(Mutation::ModifyEntityVar {
            id,
            name: name.to_string(),
            value,
            direction: Some(direction),
        })
    }

    pub fn add_variable(&mut self, id: EntityId, name: &str, delta: i64) -> Result<()> {
        let old = self.state.get_entity_by_id(id)?.var(name);
        self.set_variable(id, name, old + delta)
    }

    pub fn set_player_flag(&mut self, who: PlayerId, flag: PlayerFlag, value: bool) -> Result<()> {
        if self.state.player(who).flag(flag) == value {
            return Ok(());
        }
        self.mutate(Mutation::SetPlayerFlag { who, flag, value })
    }

    /// Deal damage. Defeated characters are not hit.
    ///
    /// Emits `DamageOrHeal`, followed by `Reaction` when the element reacted
    /// with the target's aura.
    pub fn damage(
        &mut self,
        via: Option<SkillRef>,
        source: EntityId,
        target: EntityId,
        value: i64,
        damage_type: DamageType,
    ) -> Result<()> {
        if damage_type == DamageType::Heal {
            return self.heal(via, source, target, value, HealKind::Common);
        }
        let ch = self.state.character(target)?;
        if !ch.alive() {
            return Ok(());
        }
        let target_who = self.state.character_owner(target)?;
        let old_health = ch.health();
        let new_health = (old_health - value.max(0)).max(0);
        let aura = ch.aura();
        trace!(%target, old_health, new_health, ?damage_type, "damage");

        self.set_variable(target, var::HEALTH, new_health)?;
        let (next_aura, reaction) = apply_element(aura, damage_type);
        if next_aura != aura {
            self.mutate(Mutation::ModifyEntityVar {
                id: target,
                name: var::AURA.to_string(),
                value: next_aura.as_i64(),
                direction: None,
            })?;
        }
        self.emit(Event::DamageOrHeal(DamageOrHealArg {
            source,
            via,
            target,
            target_who,
            damage_type,
            value,
            old_health,
            new_health,
            cause_defeated: new_health == 0,
            immune: None,
        }));
        if let Some(reaction) = reaction {
            self.emit(Event::Reaction(ReactionArg {
                target,
                target_who,
                reaction,
                via,
            }));
        }
        Ok(())
    }

    /// Heal a living character.
    pub fn heal(
        &mut self,
        via: Option<SkillRef>,
        source: EntityId,
        target: EntityId,
        value: i64,
        kind: HealKind,
    ) -> Result<()> {
        let ch = self.state.character(target)?;
        if !ch.alive() {
            return Ok(());
        }
        let target_who = self.state.character_owner(target)?;
        let old_health = ch.health();
        let new_health = match kind {
            HealKind::Common => (old_health + value.max(0)).min(ch.max_health()),
            HealKind::ImmuneDefeated => value.max(0),
        };
        self.set_variable(target, var::HEALTH, new_health)?;
        self.emit(Event::DamageOrHeal(DamageOrHealArg {
            source,
            via,
            target,
            target_who,
            damage_type: DamageType::Heal,
            value,
            old_health,
            new_health,
            cause_defeated: false,
            immune: None,
        }));
        Ok(())
    }

    /// Add energy, clamped to `[0, maxEnergy]`. Characters with special
    /// energy gain into their own variable, clamped by its slot size.
    pub fn gain_energy(&mut self, target: EntityId, value: i64) -> Result<()> {
        let ch = self.state.character(target)?;
        if !ch.alive() {
            return Ok(());
        }
        let (name, max) = match &ch.definition.special_energy {
            Some(se) => (se.variable.clone(), se.slot_size),
            None => (var::ENERGY.to_string(), ch.max_energy()),
        };
        let next = (ch.var(&name) + value).clamp(0, max);
        self.set_variable(target, &name, next)
    }

    /// Create an entity in `area`, or refresh the existing one of the same
    /// definition. Returns `None` when a summon or support zone is full.
    pub fn create_entity(
        &mut self,
        definition: Arc<EntityDefinition>,
        area: EntityArea,
        opts: &InsertOptions,
    ) -> Result<Option<EntityId>> {
        let zone = self.state.entity_zone(area)?;
        if let Some(existing) = zone.iter().find(|et| et.definition.id == definition.id) {
            let id = existing.id;
            let current = existing.variables.clone();
            if !opts.keep_existing {
                let mut initial: Vec<_> = definition.variables.iter().collect();
                initial.sort();
                for (name, value) in initial {
                    if current.get(name) != Some(value) {
                        self.set_variable(id, name, *value)?;
                    }
                }
            }
            for ov in &opts.overrides {
                match ov {
                    VariableOverride::Set(name, value) => self.set_variable(id, name, *value)?,
                    VariableOverride::Add(name, delta) => self.add_variable(id, name, *delta)?,
                }
            }
            self.emit(Event::Enter(EnterArg {
                area,
                id,
                definition: definition.id,
                refreshed: true,
            }));
            return Ok(Some(id));
        }

        let limit = match area {
            EntityArea::Summons { .. } => self.state.config.max_summons_count,
            EntityArea::Supports { .. } => self.state.config.max_supports_count,
            _ => usize::MAX,
        };
        if zone.len() >= limit {
            trace!(?area, definition = %definition.id, "zone full, entity not created");
            return Ok(None);
        }

        let id = self.state.next_id;
        self.mutate(Mutation::StepId)?;
        let definition_id = definition.id;
        let mut entity = EntityState::new(id, definition);
        for ov in &opts.overrides {
            match ov {
                VariableOverride::Set(name, value) => {
                    entity.variables.insert(name.clone(), *value);
                }
                VariableOverride::Add(name, delta) => {
                    *entity.variables.entry(name.clone()).or_insert(0) += delta;
                }
            }
        }
        self.mutate(Mutation::CreateEntity { area, entity })?;
        self.emit(Event::Enter(EnterArg {
            area,
            id,
            definition: definition_id,
            refreshed: false,
        }));
        Ok(Some(id))
    }

    /// Remove an entity and announce it with a snapshot.
    pub fn dispose(&mut self, id: EntityId) -> Result<()> {
        let area = self.state.get_entity_area(id)?;
        let entity = self
            .state
            .entity_zone(area)?
            .iter()
            .find(|et| et.id == id)
            .cloned()
            .ok_or(EngineError::EntityNotFound(id))?;
        self.mutate(Mutation::RemoveEntity { id })?;
        self.emit(Event::Dispose(DisposeArg { area, entity }));
        Ok(())
    }

    /// Make `to` the active character of `who` and arm the plunging flag.
    pub fn switch_active(&mut self, who: PlayerId, to: EntityId, via: Option<SkillRef>) -> Result<()> {
        let from = self.state.player(who).active_character_id;
        if from == to {
            return Ok(());
        }
        if !self.state.character(to)?.alive() {
            return Err(EngineError::invalid_decision(
                who,
                format!("cannot switch to defeated character {to}"),
            ));
        }
        self.mutate(Mutation::SwitchActive { who, to })?;
        self.set_player_flag(who, PlayerFlag::CanPlunging, true)?;
        self.emit(Event::SwitchActive(SwitchActiveArg { who, from, to, via }));
        Ok(())
    }

    /// Put a new card into `who`'s hand. Returns `None` when the hand is
    /// full and `no_overflow` is not set.
    pub fn create_hand_card(
        &mut self,
        who: PlayerId,
        definition: Arc<EntityDefinition>,
        no_overflow: bool,
    ) -> Result<Option<EntityId>> {
        if !no_overflow && self.state.player(who).hands.len() >= self.state.config.max_hands_count {
            trace!(%who, definition = %definition.id, "hand full, card discarded");
            return Ok(None);
        }
        let id = self.state.next_id;
        self.mutate(Mutation::StepId)?;
        self.mutate(Mutation::CreateCard {
            who,
            zone: CardZone::Hands,
            card: CardState { id, definition },
            index: None,
        })?;
        Ok(Some(id))
    }

    /// Move a card between `who`'s zones, keeping its id.
    pub fn move_card(&mut self, who: PlayerId, id: EntityId, from: CardZone, to: CardZone, index: Option<usize>) -> Result<()> {
        let card = self
            .state
            .player(who)
            .zone(from)
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(EngineError::EntityNotFound(id))?;
        self.mutate(Mutation::RemoveCard {
            who,
            zone: from,
            id,
            used: false,
        })?;
        self.mutate(Mutation::CreateCard {
            who,
            zone: to,
            card,
            index,
        })
    }

    pub fn remove_card(&mut self, who: PlayerId, zone: CardZone, id: EntityId, used: bool) -> Result<()> {
        self.mutate(Mutation::RemoveCard { who, zone, id, used })
    }

    /// Replace the definition of a character or entity.
    pub fn transform_definition(&mut self, id: EntityId, definition: Arc<EntityDefinition>) -> Result<()> {
        self.mutate(Mutation::TransformDefinition { id, definition })
    }

    /// Clear the aura of a character without a reaction.
    pub fn clear_aura(&mut self, id: EntityId) -> Result<()> {
        self.set_variable(id, var::AURA, Aura::None.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DefinitionId, GameConfig};
    use crate::data::{DefinitionKind, GameData};

    fn test_state() -> Arc<GameState> {
        let ch = Arc::new(
            EntityDefinition::character(DefinitionId(1), "A")
                .with_health(10)
                .with_max_energy(2),
        );
        Arc::new(
            GameState::new(GameConfig::default().with_max_summons(1), Arc::new(GameData::new()))
                .with_character(PlayerId::P0, Arc::clone(&ch))
                .with_character(PlayerId::P0, Arc::clone(&ch))
                .with_character(PlayerId::P1, ch),
        )
    }

    fn summon(id: u32) -> Arc<EntityDefinition> {
        Arc::new(
            EntityDefinition::entity(DefinitionId(id), DefinitionKind::Summon, "S")
                .with_variable(var::USAGE, 2),
        )
    }

    #[test]
    fn test_untouched_draft_keeps_identity() {
        let state = test_state();
        let mut draft = Draft::new(Arc::clone(&state));
        draft.set_variable(EntityId(-1), var::HEALTH, 10).unwrap();
        let out = draft.finish();
        assert!(Arc::ptr_eq(&state, &out.state));
        assert!(out.exposed.is_empty());
    }

    #[test]
    fn test_damage_clamps_and_flags_defeat() {
        let state = test_state();
        let mut draft = Draft::new(state);
        draft
            .damage(None, EntityId(-1), EntityId(-3), 12, DamageType::Physical)
            .unwrap();
        assert_eq!(draft.state().character(EntityId(-3)).unwrap().health(), 0);

        let out = draft.finish();
        match &out.events[..] {
            [EventAndRequest::Event(Event::DamageOrHeal(arg))] => {
                assert!(arg.cause_defeated);
                assert_eq!(arg.old_health, 10);
                assert_eq!(arg.new_health, 0);
                assert_eq!(arg.target_who, PlayerId::P1);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_damage_applies_aura_and_reacts() {
        let state = test_state();
        let mut draft = Draft::new(state);
        draft.damage(None, EntityId(-3), EntityId(-1), 1, DamageType::Cryo).unwrap();
        assert_eq!(draft.state().character(EntityId(-1)).unwrap().aura(), Aura::Cryo);

        draft.damage(None, EntityId(-3), EntityId(-1), 1, DamageType::Pyro).unwrap();
        assert_eq!(draft.state().character(EntityId(-1)).unwrap().aura(), Aura::None);

        let out = draft.finish();
        assert_eq!(out.events.len(), 3);
        assert!(matches!(
            &out.events[2],
            EventAndRequest::Event(Event::Reaction(r)) if r.reaction == crate::triggers::ReactionType::Melt
        ));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let state = test_state();
        let mut draft = Draft::new(state);
        draft.damage(None, EntityId(-3), EntityId(-1), 3, DamageType::Physical).unwrap();
        draft.heal(None, EntityId(-3), EntityId(-1), 5, HealKind::Common).unwrap();
        assert_eq!(draft.state().character(EntityId(-1)).unwrap().health(), 10);
    }

    #[test]
    fn test_gain_energy_clamped() {
        let state = test_state();
        let mut draft = Draft::new(state);
        draft.gain_energy(EntityId(-1), 5).unwrap();
        assert_eq!(draft.state().character(EntityId(-1)).unwrap().energy(), 2);
    }

    #[test]
    fn test_create_refresh_and_capacity() {
        let state = test_state();
        let mut draft = Draft::new(state);
        let area = EntityArea::Summons { who: PlayerId::P0 };

        let id = draft.create_entity(summon(50), area, &InsertOptions::default()).unwrap().unwrap();
        draft.add_variable(id, var::USAGE, -1).unwrap();

        let refreshed = draft.create_entity(summon(50), area, &InsertOptions::default()).unwrap();
        assert_eq!(refreshed, Some(id));
        assert_eq!(draft.state().get_entity_by_id(id).unwrap().var(var::USAGE), 2);

        let full = draft.create_entity(summon(51), area, &InsertOptions::default()).unwrap();
        assert_eq!(full, None);
    }

    #[test]
    fn test_increment_keeps_other_variables() {
        let state = test_state();
        let mut draft = Draft::new(state);
        let area = EntityArea::Summons { who: PlayerId::P0 };
        let id = draft.create_entity(summon(50), area, &InsertOptions::default()).unwrap().unwrap();
        draft.set_variable(id, var::USAGE, 1).unwrap();

        draft.create_entity(summon(50), area, &InsertOptions::increment(var::EXP, 1)).unwrap();
        let et = draft.state().get_entity_by_id(id).unwrap();
        assert_eq!(et.var(var::USAGE), 1);
        assert_eq!(et.var(var::EXP), 1);
    }

    #[test]
    fn test_dispose_emits_snapshot() {
        let state = test_state();
        let mut draft = Draft::new(state);
        let area = EntityArea::Summons { who: PlayerId::P1 };
        let id = draft.create_entity(summon(50), area, &InsertOptions::default()).unwrap().unwrap();
        draft.dispose(id).unwrap();

        assert!(!draft.state().contains_id(id));
        let out = draft.finish();
        assert!(matches!(
            out.events.last(),
            Some(EventAndRequest::Event(Event::Dispose(arg))) if arg.entity.id == id
        ));
    }

    #[test]
    fn test_switch_active_arms_plunging() {
        let state = test_state();
        let mut draft = Draft::new(state);
        draft.switch_active(PlayerId::P0, EntityId(-2), None).unwrap();
        let player = draft.state().player(PlayerId::P0);
        assert_eq!(player.active_character_id, EntityId(-2));
        assert!(player.can_plunging);
    }
}
