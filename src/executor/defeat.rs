//! Damage and defeat resolution.
//!
//! `finalize_skill` runs a skill and then settles everything its damage
//! caused, in this order:
//!
//! 1. Lethal damage either marks the target defeated or, when an immunity
//!    listener exists, goes through `ModifyZeroHealth`. Saved characters
//!    are revived and the listeners' events are folded back into the loop
//!    until nothing new is emitted.
//! 2. A side with no living characters ends the game.
//! 3. An initiative skill of a character is logged for the round and
//!    grants one energy.
//! 4. Non-damage events, then non-lethal damage, then lethal damage are
//!    handled in full.
//! 5. Defeated active characters are replaced. Both players choose before
//!    either switch is applied.

use std::mem;

use crate::core::{
    var, Aura, EntityId, Mutation, Phase, PlayerFlag, PlayerId, Result, RoundSkillRecord,
    VarDirection,
};
use crate::data::{DefinitionKind, SkillInfo};
use crate::mutator::DetailLogType;
use crate::rules::check_immune;
use crate::triggers::{DamageOrHealArg, Event, EventAndRequest, SkillArg};

use super::SkillExecutor;

impl SkillExecutor<'_> {
    /// Run a skill and settle every consequence of it.
    pub fn finalize_skill(&mut self, info: &SkillInfo, arg: &SkillArg) -> Result<()> {
        if self.mutator.state().phase == Phase::GameEnd {
            return Ok(());
        }
        let mut emitted = self.run_skill(info, arg)?.events;
        self.mutator.notify_and_pause();

        let mut non_damage: Vec<EventAndRequest> = Vec::new();
        let mut safe: Vec<DamageOrHealArg> = Vec::new();
        let mut critical: Vec<DamageOrHealArg> = Vec::new();

        loop {
            let mut damages: Vec<(DamageOrHealArg, bool)> = Vec::new();
            let mut failed = [false; 2];

            for event in mem::take(&mut emitted) {
                match event {
                    EventAndRequest::Event(Event::DamageOrHeal(damage)) if damage.is_damage_type_damage() => {
                        let mut immune_pending = false;
                        if damage.cause_defeated {
                            if check_immune(self.mutator.state(), &damage) {
                                immune_pending = true;
                            } else {
                                self.defeat(damage.target, &mut failed)?;
                            }
                        }
                        damages.push((damage, immune_pending));
                    }
                    other => non_damage.push(other),
                }
            }

            match failed {
                [true, true] => {
                    self.mutator.log(
                        DetailLogType::Other,
                        "Both players have no living characters, no winner",
                    );
                    self.mutator.mutate(Mutation::ChangePhase {
                        new_phase: Phase::GameEnd,
                    })?;
                    self.mutator.notify_and_pause();
                    return Ok(());
                }
                [true, false] | [false, true] => {
                    let loser = if failed[0] { PlayerId::P0 } else { PlayerId::P1 };
                    self.mutator.log(
                        DetailLogType::Other,
                        format_args!("{loser} has no living characters, winner is {}", loser.flip()),
                    );
                    self.mutator.mutate(Mutation::ChangePhase {
                        new_phase: Phase::GameEnd,
                    })?;
                    self.mutator.mutate(Mutation::SetWinner {
                        winner: loser.flip(),
                    })?;
                    self.mutator.notify_and_pause();
                    return Ok(());
                }
                [false, false] => {}
            }

            let mut zero_health: Vec<usize> = Vec::new();
            for (damage, immune_pending) in damages {
                if damage.cause_defeated {
                    if immune_pending {
                        zero_health.push(critical.len());
                    }
                    critical.push(damage);
                } else {
                    safe.push(damage);
                }
            }

            if !critical.is_empty() {
                self.mutator.notify_and_pause();
            }

            for idx in zero_health {
                let (events, immune) =
                    self.resolve_shallow(Event::ModifyZeroHealth(critical[idx].clone()))?;
                emitted.extend(events);
                if let Some(immune) = immune {
                    critical[idx].immune = Some(immune);
                    let target = critical[idx].target;
                    self.mutator.log(
                        DetailLogType::Primitive,
                        format_args!("{target} is immune to defeat, revived to {}", immune.new_health),
                    );
                    let heal_events = self.mutator.heal(immune.new_health, target, immune.via)?;
                    self.mutator.notify_and_pause();
                    emitted.extend(self.handle_event_shallow(heal_events)?);
                }
            }

            if emitted.is_empty() {
                break;
            }
        }

        self.settle_initiative(info)?;

        self.handle_event(non_damage)?;
        for damage in safe {
            self.handle_event(vec![Event::DamageOrHeal(damage).into()])?;
        }
        let any_critical = !critical.is_empty();
        for damage in critical {
            self.handle_event(vec![Event::DamageOrHeal(damage).into()])?;
        }
        if any_critical {
            self.replace_defeated_actives()?;
        }
        Ok(())
    }

    /// Mark a character defeated. Already defeated characters are left
    /// alone.
    fn defeat(&mut self, target: EntityId, failed: &mut [bool; 2]) -> Result<()> {
        let state = self.mutator.state();
        let ch = state.character(target)?;
        if !ch.alive() {
            return Ok(());
        }
        let who = state.character_owner(target)?;
        let energy_variable = ch.definition.energy_variable().to_string();
        self.mutator.log(
            DetailLogType::Primitive,
            format_args!("{target} is defeated (and no immune available)"),
        );
        self.mutator.mutate(Mutation::ModifyEntityVar {
            id: target,
            name: var::ALIVE.to_string(),
            value: 0,
            direction: Some(VarDirection::Decrease),
        })?;
        self.mutator.mutate(Mutation::ModifyEntityVar {
            id: target,
            name: energy_variable,
            value: 0,
            direction: Some(VarDirection::Decrease),
        })?;
        self.mutator.mutate(Mutation::ModifyEntityVar {
            id: target,
            name: var::AURA.to_string(),
            value: Aura::None.as_i64(),
            direction: None,
        })?;
        self.mutator.mutate(Mutation::SetPlayerFlag {
            who,
            flag: PlayerFlag::HasDefeated,
            value: true,
        })?;
        if self.mutator.state().player(who).living_count() == 0 {
            failed[who.index()] = true;
        }
        Ok(())
    }

    /// Round log and energy gain after a character's initiative skill.
    ///
    /// The round log records the caller definition the skill was bound
    /// with, even if the character has transformed since.
    fn settle_initiative(&mut self, info: &SkillInfo) -> Result<()> {
        if info.caller.definition.kind != DefinitionKind::Character || !info.definition.is_initiative() {
            return Ok(());
        }
        let caller = info.caller.id;
        let who = self.mutator.state().character_owner(caller)?;
        self.mutator.mutate(Mutation::PushRoundSkillLog {
            who,
            record: RoundSkillRecord {
                caller_definition: info.caller.definition.id,
                skill: info.definition.id,
            },
        })?;

        let gains = info.definition.initiative.is_some_and(|c| c.gain_energy);
        if !gains {
            return Ok(());
        }
        let ch = self.mutator.state().character(caller)?;
        if !ch.alive() || ch.definition.special_energy.is_some() {
            return Ok(());
        }
        let energy = ch.energy();
        let next = (energy + 1).min(ch.max_energy());
        if next == energy {
            return Ok(());
        }
        self.mutator.log(
            DetailLogType::Other,
            format_args!("using skill gain 1 energy for {caller}"),
        );
        self.mutator.mutate(Mutation::ModifyEntityVar {
            id: caller,
            name: var::ENERGY.to_string(),
            value: next,
            direction: Some(VarDirection::Increase),
        })?;
        self.mutator.notify_and_pause();
        Ok(())
    }

    /// Ask every player whose active character fell for a replacement,
    /// then switch in player order and handle the switch events starting
    /// with the current-turn player.
    fn replace_defeated_actives(&mut self) -> Result<()> {
        let mut whos = [None, None];
        for who in PlayerId::both() {
            let active = self.mutator.state().player(who).active_character()?;
            if active.alive() {
                continue;
            }
            self.mutator.log(
                DetailLogType::Other,
                format_args!("Active character of {who} is defeated, waiting for a choice"),
            );
            whos[who.index()] = Some(who);
        }
        if whos.iter().all(Option::is_none) {
            return Ok(());
        }

        let chosen = self.mutator.choose_active_pair(whos)?;
        let choices: Vec<(PlayerId, EntityId)> = PlayerId::both()
            .zip(chosen)
            .filter_map(|(who, to)| to.map(|to| (who, to)))
            .collect();
        self.mutator.post_choose_active(&choices);

        let current_turn = self.mutator.state().current_turn;
        let mut switch_events: [Vec<EventAndRequest>; 2] = [Vec::new(), Vec::new()];
        for (who, to) in choices {
            let _scope = self.mutator.sub_log(
                DetailLogType::Primitive,
                format_args!("{who} switches active to {to}"),
            );
            switch_events[who.index()] = self.mutator.switch_active(who, to)?;
        }
        for who in [current_turn, current_turn.flip()] {
            let events = mem::take(&mut switch_events[who.index()]);
            self.handle_event(events)?;
        }
        Ok(())
    }
}
