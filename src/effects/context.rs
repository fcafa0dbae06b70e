//! The handle a skill body works through.
//!
//! A `SkillContext` wraps a `Draft` of the state the skill started from and
//! the `SkillInfo` it was invoked with. Every helper records its primitive
//! mutations on the draft; the executor commits them in one step once the
//! body returns.

use std::sync::Arc;

use super::draft::{Draft, DraftOutput, HealKind, InsertOptions};
use super::targeting::caller_owner;
use crate::core::{
    DefinitionId, EntityArea, EntityId, GameState, Mutation, PlayerFlag, PlayerId, Result,
};
use crate::data::SkillInfo;
use crate::triggers::{DamageType, Event, ImmuneInfo, Request};

/// What a skill body produced.
#[derive(Debug)]
pub struct SkillOutput {
    pub draft: DraftOutput,
    /// Set when a `ModifyZeroHealth` listener granted immunity.
    pub immune: Option<ImmuneInfo>,
}

/// Mutable view handed to skill actions.
#[derive(Debug)]
pub struct SkillContext<'a> {
    draft: Draft,
    skill: &'a SkillInfo,
    immune: Option<ImmuneInfo>,
}

impl<'a> SkillContext<'a> {
    #[must_use]
    pub fn new(state: Arc<GameState>, skill: &'a SkillInfo) -> Self {
        Self {
            draft: Draft::new(state),
            skill,
            immune: None,
        }
    }

    /// Current draft state, including edits made so far.
    #[must_use]
    pub fn state(&self) -> &GameState {
        self.draft.state()
    }

    #[must_use]
    pub fn skill(&self) -> &SkillInfo {
        self.skill
    }

    #[must_use]
    pub fn caller_id(&self) -> EntityId {
        self.skill.caller.id
    }

    /// Owner of the caller.
    #[must_use]
    pub fn who(&self) -> PlayerId {
        caller_owner(self.draft.state(), self.skill)
    }

    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.skill.is_preview
    }

    /// Escape hatch for edits without a helper.
    pub fn mutate(&mut self, mutation: Mutation) -> Result<()> {
        self.draft.mutate(mutation)
    }

    pub fn damage(&mut self, target: EntityId, value: i64, damage_type: DamageType) -> Result<()> {
        let via = Some(self.skill.skill_ref());
        self.draft.damage(via, self.skill.caller.id, target, value, damage_type)
    }

    pub fn heal(&mut self, target: EntityId, value: i64) -> Result<()> {
        let via = Some(self.skill.skill_ref());
        self.draft
            .heal(via, self.skill.caller.id, target, value, HealKind::Common)
    }

    pub fn gain_energy(&mut self, target: EntityId, value: i64) -> Result<()> {
        self.draft.gain_energy(target, value)
    }

    pub fn set_variable(&mut self, id: EntityId, name: &str, value: i64) -> Result<()> {
        self.draft.set_variable(id, name, value)
    }

    pub fn add_variable(&mut self, id: EntityId, name: &str, delta: i64) -> Result<()> {
        self.draft.add_variable(id, name, delta)
    }

    pub fn set_player_flag(&mut self, who: PlayerId, flag: PlayerFlag, value: bool) -> Result<()> {
        self.draft.set_player_flag(who, flag, value)
    }

    /// Create or refresh an entity of a registered definition.
    pub fn create_entity(
        &mut self,
        definition: DefinitionId,
        area: EntityArea,
    ) -> Result<Option<EntityId>> {
        self.create_entity_with(definition, area, &InsertOptions::default())
    }

    pub fn create_entity_with(
        &mut self,
        definition: DefinitionId,
        area: EntityArea,
        opts: &InsertOptions,
    ) -> Result<Option<EntityId>> {
        let definition = self.draft.state().data.require(definition)?;
        self.draft.create_entity(definition, area, opts)
    }

    pub fn dispose(&mut self, id: EntityId) -> Result<()> {
        self.draft.dispose(id)
    }

    /// Switch the owner of `to` over to it.
    pub fn switch_active(&mut self, to: EntityId) -> Result<()> {
        let who = self.draft.state().character_owner(to)?;
        let via = Some(self.skill.skill_ref());
        self.draft.switch_active(who, to, via)
    }

    /// Put a card into the caller owner's hand.
    pub fn create_hand_card(&mut self, definition: DefinitionId) -> Result<Option<EntityId>> {
        let who = self.who();
        let definition = self.draft.state().data.require(definition)?;
        self.draft.create_hand_card(who, definition, false)
    }

    pub fn transform_definition(&mut self, id: EntityId, definition: DefinitionId) -> Result<()> {
        let definition = self.draft.state().data.require(definition)?;
        self.draft.transform_definition(id, definition)
    }

    pub fn emit(&mut self, event: Event) {
        self.draft.emit(event);
    }

    /// Queue a request to be handled after this skill.
    pub fn request(&mut self, request: Request) {
        self.draft.emit(request);
    }

    /// Queue the end phase skills of `entity`. The entity is captured now,
    /// so the request still runs if it is disposed in the meantime.
    pub fn trigger_end_phase_skill(&mut self, entity: EntityId) -> Result<()> {
        let entity = self.draft.state().get_entity_by_id(entity)?.snapshot();
        let request = Request::TriggerEndPhaseSkill {
            who: self.who(),
            via: Some(self.skill.skill_ref()),
            entity,
        };
        self.draft.emit(request);
        Ok(())
    }

    /// Grant immunity to the character about to be defeated. The first
    /// grant in one skill wins.
    pub fn immune(&mut self, new_health: i64) {
        if self.immune.is_none() {
            self.immune = Some(ImmuneInfo {
                via: self.skill.skill_ref(),
                new_health,
            });
        }
    }

    pub(crate) fn finish(self) -> SkillOutput {
        SkillOutput {
            draft: self.draft.finish(),
            immune: self.immune,
        }
    }
}
