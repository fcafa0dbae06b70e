//! Effect resolution.
//!
//! `EffectResolver` applies data effects through a `SkillContext`, so an
//! effect list and a hand-written closure produce exactly the same
//! mutations and events.

use tracing::trace;

use super::context::SkillContext;
use super::draft::InsertOptions;
use super::effect::Effect;
use super::targeting::{caller_owner, Side};
use crate::core::{EntityArea, Result};
use crate::triggers::{ConditionEvaluator, SkillArg};

/// Resolves effects against a skill context.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve effects in order, stopping at the first error.
    pub fn resolve_batch(ctx: &mut SkillContext<'_>, effects: &[Effect], arg: &SkillArg) -> Result<()> {
        for effect in effects {
            Self::resolve(ctx, effect, arg)?;
        }
        Ok(())
    }

    /// Resolve a single effect. Targets are resolved against the draft as
    /// it stands when the effect starts.
    pub fn resolve(ctx: &mut SkillContext<'_>, effect: &Effect, arg: &SkillArg) -> Result<()> {
        trace!(?effect, caller = %ctx.caller_id(), "resolve effect");
        match effect {
            Effect::Damage {
                target,
                value,
                damage_type,
            } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    ctx.damage(id, *value, *damage_type)?;
                }
            }
            Effect::Heal { target, value } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    ctx.heal(id, *value)?;
                }
            }
            Effect::GainEnergy { target, value } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    ctx.gain_energy(id, *value)?;
                }
            }
            Effect::SwitchActive { target } => {
                if let Some(id) = target.resolve(ctx.state(), ctx.skill(), arg)?.first() {
                    ctx.switch_active(*id)?;
                }
            }
            Effect::SetVariable {
                target,
                name,
                value,
            } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    ctx.set_variable(id, name, *value)?;
                }
            }
            Effect::AddVariable {
                target,
                name,
                delta,
            } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    ctx.add_variable(id, name, *delta)?;
                }
            }
            Effect::AttachStatus { target, definition } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    let who = ctx.state().character_owner(id)?;
                    let area = EntityArea::Character {
                        who,
                        character_id: id,
                    };
                    ctx.create_entity(*definition, area)?;
                }
            }
            Effect::CreateCombatStatus { side, definition } => {
                let owner = caller_owner(ctx.state(), ctx.skill());
                let who = match side {
                    Side::Mine => owner,
                    Side::Opponent => owner.flip(),
                };
                ctx.create_entity(*definition, EntityArea::CombatStatuses { who })?;
            }
            Effect::Summon { definition } => {
                let who = ctx.who();
                ctx.create_entity_with(*definition, EntityArea::Summons { who }, &InsertOptions::default())?;
            }
            Effect::Dispose { target } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    ctx.dispose(id)?;
                }
            }
            Effect::Transform { target, definition } => {
                for id in target.resolve(ctx.state(), ctx.skill(), arg)? {
                    ctx.transform_definition(id, *definition)?;
                }
            }
            Effect::CreateHandCard { definition } => {
                ctx.create_hand_card(*definition)?;
            }
            Effect::Immune { new_health } => ctx.immune(*new_health),
            Effect::Request(request) => ctx.request(request.clone()),
            Effect::Batch(effects) => Self::resolve_batch(ctx, effects, arg)?,
            Effect::Conditional { condition, effect } => {
                if ConditionEvaluator::evaluate(condition, ctx.state(), ctx.skill(), arg) {
                    Self::resolve(ctx, effect, arg)?;
                }
            }
        }
        Ok(())
    }
}

impl SkillContext<'_> {
    /// Apply a data effect.
    pub fn apply(&mut self, effect: &Effect, arg: &SkillArg) -> Result<()> {
        EffectResolver::resolve(self, effect, arg)
    }
}
