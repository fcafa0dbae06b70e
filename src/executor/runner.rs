//! Skill Action Runner.
//!
//! Runs one skill body against a draft of the current state and commits the
//! result through the mutator in a single transition. Nothing emitted by
//! the body is handled here.

use std::sync::Arc;

use crate::core::{
    EntityArea, ExposedMutation, Phase, PlayerFlag, Result,
};
use crate::data::{InitiativeSkillType, SkillInfo};
use crate::effects::{Draft, SkillContext};
use crate::mutator::DetailLogType;
use crate::triggers::{EventAndRequest, ImmuneInfo, SkillArg};

use super::SkillExecutor;

/// What one skill run produced.
#[derive(Debug, Default)]
pub(crate) struct RunOutput {
    pub events: Vec<EventAndRequest>,
    pub immune: Option<ImmuneInfo>,
}

impl SkillExecutor<'_> {
    /// Run `info`'s body once and commit it.
    ///
    /// - A finished game runs nothing.
    /// - A character's own non-technique initiative skill consumes the
    ///   plunging flag of its owner before the body runs.
    /// - `SkillUsed` is reported for non-extension, non-play-card skills
    ///   that are initiative skills or changed the state.
    pub(crate) fn run_skill(&mut self, info: &SkillInfo, arg: &SkillArg) -> Result<RunOutput> {
        if self.mutator.state().phase == Phase::GameEnd {
            return Ok(RunOutput::default());
        }
        let _scope = self.mutator.sub_log(
            DetailLogType::Skill,
            format_args!(
                "Using skill {}{}{}",
                info.definition.id,
                if info.charged { " (charged)" } else { "" },
                if info.plunging { " (plunging)" } else { "" },
            ),
        );
        self.mutator.log(
            DetailLogType::Other,
            format_args!("skill caller: {} ({})", info.caller.id, info.caller.definition.name),
        );

        let mut base = Arc::clone(self.mutator.state());
        let who = base
            .get_entity_area(info.caller.id)
            .ok()
            .and_then(EntityArea::who);
        let mut exposed: Vec<ExposedMutation> = Vec::new();
        if let (true, Some(who)) = (info.is_character_initiative(), who) {
            let mut draft = Draft::new(Arc::clone(&base));
            draft.set_player_flag(who, PlayerFlag::CanPlunging, false)?;
            let out = draft.finish();
            base = out.state;
            exposed.extend(out.exposed);
        }

        self.mutator.notify();
        let bound = info.clone().with_preview(self.config.preview);
        let mut ctx = SkillContext::new(Arc::clone(&base), &bound);
        (bound.definition.action)(&mut ctx, arg)?;
        let out = ctx.finish();

        let definition = &info.definition;
        let changed = !Arc::ptr_eq(&base, &out.draft.state);
        if !info.is_extension()
            && definition.skill_type() != Some(InitiativeSkillType::PlayCard)
            && (definition.initiative.is_some() || changed)
        {
            exposed.push(ExposedMutation::SkillUsed {
                who,
                caller_id: info.caller.id,
                caller_definition_id: info.caller.definition.id,
                skill_definition_id: definition.id,
                skill_type: definition.public_skill_type(&info.caller.definition),
                triggered_on: definition.trigger_on,
            });
        }
        exposed.extend(out.draft.exposed);
        self.mutator.reset_state(out.draft.state, exposed);

        Ok(RunOutput {
            events: out.draft.events,
            immune: out.immune,
        })
    }
}
