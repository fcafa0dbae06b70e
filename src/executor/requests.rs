//! Full event handling: every event is resolved recursively, every request
//! is carried out.

use std::sync::Arc;

use crate::core::{tag, var, CardZone, EntityArea, EntityId, Mutation, PlayerId, Result};
use crate::data::{CallerRef, SkillRef};
use crate::effects::InsertOptions;
use crate::mutator::DetailLogType;
use crate::rules::{initiative_skills_of_player, is_charged_plunging, is_skill_disabled, play_skill_of_card};
use crate::triggers::{
    broadcast, CallerAndSkill, Event, EventAndRequest, EventName, Request, SelectCardArg,
    SelectCardInfo, SkillArg, UseSkillArg,
};

use super::SkillExecutor;

impl SkillExecutor<'_> {
    /// Handle `events` in order. Listeners are finalized, so whatever they
    /// emit is handled before the next event starts.
    pub fn handle_event(&mut self, events: Vec<EventAndRequest>) -> Result<()> {
        for event in events {
            let name = event.name();
            self.bracketed(name, |this| match event {
                EventAndRequest::Request(request) => this.handle_request(request),
                EventAndRequest::Event(event) => this.handle_plain_event(event),
            })?;
        }
        Ok(())
    }

    fn handle_request(&mut self, request: Request) -> Result<()> {
        match request {
            Request::Reroll { who, times } => {
                let _scope = self.mutator.sub_log(
                    DetailLogType::Event,
                    format_args!("request {who} to reroll"),
                );
                self.mutator.reroll(who, times)
            }
            Request::SwitchHands { who } => {
                let _scope = self.mutator.sub_log(
                    DetailLogType::Event,
                    format_args!("request {who} to switch hands"),
                );
                let events = self.mutator.switch_hands(who)?;
                self.handle_event(events)
            }
            Request::SelectCard { who, via, info } => {
                let _scope = self.mutator.sub_log(
                    DetailLogType::Event,
                    format_args!("request {who} to select card"),
                );
                self.select_card(who, via, info)
            }
            Request::UseSkill {
                who,
                via,
                skill_id,
                as_prepared,
            } => {
                let _scope = self.mutator.sub_log(
                    DetailLogType::Event,
                    format_args!("another skill {skill_id} is requested"),
                );
                let state = Arc::clone(self.mutator.state());
                let player = state.player(who);
                let active = player.active_character()?;
                if is_skill_disabled(active) {
                    self.mutator.log(
                        DetailLogType::Other,
                        format_args!(
                            "Skill {skill_id} is requested, but active character {} is marked as skill-disabled",
                            active.id
                        ),
                    );
                    return Ok(());
                }
                let found = initiative_skills_of_player(&state, who)
                    .into_iter()
                    .find(|cs| cs.skill.id == skill_id);
                let Some(CallerAndSkill { caller, skill }) = found else {
                    self.mutator.log(
                        DetailLogType::Other,
                        format_args!(
                            "Skill {skill_id} is not available on active character {}",
                            active.id
                        ),
                    );
                    return Ok(());
                };
                let (charged, plunging) = is_charged_plunging(&skill, player);
                let info = self
                    .bind(caller, skill)
                    .with_request_by(via)
                    .with_charged_plunging(charged, plunging)
                    .with_prepared(as_prepared);
                let use_skill = UseSkillArg {
                    who,
                    skill: info.skill_ref(),
                    skill_type: info.definition.public_skill_type(&info.caller.definition),
                    charged,
                    plunging,
                    prepared: as_prepared,
                };
                self.handle_event(vec![Event::BeforeUseSkill(use_skill.clone()).into()])?;
                self.finalize_skill(&info, &SkillArg::none())?;
                self.handle_event(vec![Event::UseSkill(use_skill).into()])
            }
            // The card played on request is never drawn, so it must not stay
            // in hand: it exists only while its play skill runs and is
            // removed afterwards, unless the skill already moved it.
            Request::PlayCard {
                who,
                via,
                card,
                targets,
            } => {
                let _scope = self.mutator.sub_log(
                    DetailLogType::Event,
                    format_args!("request {who} to play card {card}"),
                );
                let definition = self.mutator.state().data.require(card)?;
                let Some(id) = self.mutator.create_hand_card(who, Arc::clone(&definition), true)? else {
                    return Ok(());
                };
                let Some(skill) = play_skill_of_card(&definition) else {
                    self.mutator.log(
                        DetailLogType::Other,
                        format_args!("Card {card} has no play skill, skip playing"),
                    );
                    return self.remove_temporary_card(who, id, false);
                };
                let info = self
                    .bind(CallerRef { id, definition }, skill)
                    .with_request_by(via);
                self.finalize_skill(&info, &SkillArg::Initiative { targets })?;
                self.remove_temporary_card(who, id, true)
            }
            Request::Adventure { who, via } => {
                let _scope = self.mutator.sub_log(
                    DetailLogType::Event,
                    format_args!("request {who} to adventure"),
                );
                let state = Arc::clone(self.mutator.state());
                let supports = &state.player(who).supports;
                let area = EntityArea::Supports { who };
                if let Some(spot) = supports.iter().find(|et| et.definition.has_tag(tag::ADVENTURE_SPOT)) {
                    let events = self.mutator.insert_entity_on_stage(
                        Arc::clone(&spot.definition),
                        area,
                        &InsertOptions::increment(var::EXP, 1),
                    )?;
                    self.handle_event(events)
                } else if supports.len() < state.config.max_supports_count {
                    let candidates = state.data.adventure_spots().iter().map(|d| d.id).collect();
                    self.select_card(who, via, SelectCardInfo::CreateEntity { candidates, area })
                } else {
                    Ok(())
                }
            }
            Request::TriggerEndPhaseSkill { who, via, entity } => {
                let _scope = self.mutator.sub_log(
                    DetailLogType::Event,
                    format_args!("Triggering end phase skills of {} for {who}", entity.id),
                );
                let definition = self.mutator.state().data.require(entity.definition)?;
                let arg = SkillArg::Event(Event::EndPhase);
                for skill in definition.skills_on(EventName::EndPhase) {
                    let caller = CallerRef {
                        id: entity.id,
                        definition: Arc::clone(&definition),
                    };
                    let info = self.bind(caller, Arc::clone(skill)).with_request_by(via);
                    if !(skill.filter)(self.mutator.state().as_ref(), &info, &arg) {
                        continue;
                    }
                    self.finalize_skill(&info, &arg)?;
                }
                Ok(())
            }
        }
    }

    /// Ask for a card, handle what the choice created, then announce the
    /// selection.
    fn select_card(
        &mut self,
        who: PlayerId,
        via: Option<SkillRef>,
        info: SelectCardInfo,
    ) -> Result<()> {
        let events = self.mutator.select_card(who, via, &info)?;
        self.handle_event(events)?;
        self.handle_event(vec![Event::SelectCard(SelectCardArg { who, via, info }).into()])
    }

    fn remove_temporary_card(&mut self, who: PlayerId, id: EntityId, used: bool) -> Result<()> {
        let in_hand = self
            .mutator
            .state()
            .player(who)
            .hands
            .iter()
            .any(|c| c.id == id);
        if in_hand {
            self.mutator.remove_card(who, CardZone::Hands, id, used)?;
        }
        Ok(())
    }

    fn handle_plain_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::DamageOrHeal(_) | Event::Reaction(_) => {
                self.mutator.mutate(Mutation::PushDelayingEvent {
                    event: event.clone(),
                })?;
            }
            Event::BeforeUseSkill(_) => {
                self.mutator.mutate(Mutation::ClearDelayingEvent)?;
            }
            _ => {}
        }
        let _scope = self.mutator.sub_log(
            DetailLogType::Event,
            format_args!("Handling event {}", event.name().as_str()),
        );
        let listeners = broadcast(self.mutator.state(), &event);
        let arg = SkillArg::Event(event);
        for CallerAndSkill { caller, skill } in listeners {
            let info = self.bind(caller, skill);
            if !(info.definition.filter)(self.mutator.state().as_ref(), &info, &arg) {
                continue;
            }
            self.finalize_skill(&info, &arg)?;
        }
        Ok(())
    }
}
