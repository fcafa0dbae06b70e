//! Decision points.
//!
//! Each decision asks the `PlayerIo`, validates the answer against what was
//! offered, and (where the decision is self-contained) applies it.

use std::sync::Arc;

use im::Vector;
use tracing::debug;

use super::log::DetailLogType;
use super::state_mutator::StateMutator;
use crate::core::{
    CardZone, DefinitionId, EngineError, EntityId, Mutation, PlayerId, Result,
};
use crate::data::SkillRef;
use crate::effects::InsertOptions;
use crate::triggers::{EventAndRequest, Request, SelectCardInfo};

impl StateMutator {
    /// Living characters `who` could switch to.
    fn active_candidates(&self, who: PlayerId) -> Vec<EntityId> {
        let player = self.state().player(who);
        player
            .characters
            .iter()
            .filter(|ch| ch.alive() && ch.id != player.active_character_id)
            .map(|ch| ch.id)
            .collect()
    }

    /// Ask `who` for a replacement active character. Nothing is applied.
    pub fn choose_active(&mut self, who: PlayerId) -> Result<EntityId> {
        let candidates = self.active_candidates(who);
        if candidates.is_empty() {
            return Err(EngineError::NoLivingCharacter { who });
        }
        let state = Arc::clone(self.state());
        let chosen = self.io.choose_active(&state, who, &candidates);
        if !candidates.contains(&chosen) {
            return Err(EngineError::invalid_decision(
                who,
                format!("{chosen} is not a living standby character"),
            ));
        }
        self.log(DetailLogType::Other, format_args!("{who} chose {chosen} as active"));
        Ok(chosen)
    }

    /// Ask every listed player before anything is applied.
    pub fn choose_active_pair(&mut self, whos: [Option<PlayerId>; 2]) -> Result<[Option<EntityId>; 2]> {
        let mut chosen = [None, None];
        for (slot, who) in chosen.iter_mut().zip(whos) {
            if let Some(who) = who {
                *slot = Some(self.choose_active(who)?);
            }
        }
        Ok(chosen)
    }

    /// Tell observers that replacement choices were applied.
    pub fn post_choose_active(&mut self, choices: &[(PlayerId, EntityId)]) {
        self.notify();
        for &(who, chosen) in choices {
            self.observer_mut().on_choose_active(who, chosen);
        }
    }

    /// Let `who` reroll up to `times` rounds. Rerolled dice are replaced by
    /// fresh rolls and the pool is kept sorted.
    pub fn reroll(&mut self, who: PlayerId, times: u32) -> Result<()> {
        for round in 0..times {
            let state = Arc::clone(self.state());
            let dice: Vec<_> = state.player(who).dice.iter().copied().collect();
            let mut picked = self.io.reroll(&state, who, &dice);
            if picked.is_empty() {
                break;
            }
            picked.sort_unstable();
            picked.dedup();
            if let Some(&bad) = picked.iter().find(|&&idx| idx >= dice.len()) {
                return Err(EngineError::invalid_decision(
                    who,
                    format!("die index {bad} out of range ({} dice)", dice.len()),
                ));
            }
            let mut next: Vec<_> = dice
                .iter()
                .enumerate()
                .filter(|(idx, _)| picked.binary_search(idx).is_err())
                .map(|(_, die)| *die)
                .collect();
            for _ in 0..picked.len() {
                next.push(self.rng.roll_die());
            }
            next.sort_unstable();
            debug!(%who, round, rerolled = picked.len(), "reroll");
            self.mutate(Mutation::ResetDice {
                who,
                dice: next.into_iter().collect::<Vector<_>>(),
            })?;
            self.notify();
        }
        Ok(())
    }

    /// Put the chosen hand cards back into the pile at random positions and
    /// draw as many from the top.
    pub fn switch_hands(&mut self, who: PlayerId) -> Result<Vec<EventAndRequest>> {
        let state = Arc::clone(self.state());
        let returned = self.io.switch_hands(&state, who);
        let hands = &state.player(who).hands;
        if let Some(bad) = returned.iter().find(|id| !hands.iter().any(|c| c.id == **id)) {
            return Err(EngineError::invalid_decision(who, format!("{bad} is not in hand")));
        }
        if let Some((_, dup)) = returned
            .iter()
            .enumerate()
            .find(|(idx, id)| returned[..*idx].contains(*id))
        {
            return Err(EngineError::invalid_decision(who, format!("{dup} returned twice")));
        }
        if returned.is_empty() {
            return Ok(Vec::new());
        }

        let positions: Vec<usize> = {
            let mut pile_len = state.player(who).pile.len();
            returned
                .iter()
                .map(|_| {
                    let pos = self.rng.gen_range_usize(0..pile_len + 1);
                    pile_len += 1;
                    pos
                })
                .collect()
        };
        let count = returned.len();
        let (_, events) = self.with_draft(|draft| {
            for (id, pos) in returned.iter().zip(&positions) {
                draft.move_card(who, *id, CardZone::Hands, CardZone::Pile, Some(*pos))?;
            }
            for _ in 0..count {
                let Some(top) = draft.state().player(who).pile.front().map(|c| c.id) else {
                    break;
                };
                draft.move_card(who, top, CardZone::Pile, CardZone::Hands, None)?;
            }
            Ok(())
        })?;
        self.notify();
        Ok(events)
    }

    /// Ask `who` to pick one of the candidates and carry out `info`.
    ///
    /// Returns the events of the creation, or the play-card request for
    /// `RequestPlayCard`.
    pub fn select_card(
        &mut self,
        who: PlayerId,
        via: Option<SkillRef>,
        info: &SelectCardInfo,
    ) -> Result<Vec<EventAndRequest>> {
        let candidates = info.candidates();
        let state = Arc::clone(self.state());
        let selected: DefinitionId = self.io.select_card(&state, who, candidates);
        if !candidates.contains(&selected) {
            return Err(EngineError::invalid_decision(
                who,
                format!("{selected} was not offered"),
            ));
        }
        self.log(DetailLogType::Other, format_args!("{who} selected {selected}"));
        let definition = state.data.require(selected)?;
        match info {
            SelectCardInfo::CreateHandCard { .. } => {
                self.create_hand_card(who, definition, false)?;
                Ok(Vec::new())
            }
            SelectCardInfo::CreateEntity { area, .. } => {
                self.insert_entity_on_stage(definition, *area, &InsertOptions::default())
            }
            SelectCardInfo::RequestPlayCard { targets, .. } => Ok(vec![Request::PlayCard {
                who,
                via,
                card: selected,
                targets: targets.clone(),
            }
            .into()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::core::{var, DiceType, EntityArea, GameConfig, GameState};
    use crate::data::{DefinitionKind, EntityDefinition, GameData};
    use crate::mutator::PlayerIo;

    #[derive(Default)]
    struct Scripted {
        actives: VecDeque<EntityId>,
        rerolls: VecDeque<Vec<usize>>,
        switches: VecDeque<Vec<EntityId>>,
        selects: VecDeque<DefinitionId>,
    }

    impl PlayerIo for Scripted {
        fn choose_active(&mut self, _: &GameState, _: PlayerId, candidates: &[EntityId]) -> EntityId {
            self.actives.pop_front().unwrap_or(candidates[0])
        }
        fn reroll(&mut self, _: &GameState, _: PlayerId, _: &[DiceType]) -> Vec<usize> {
            self.rerolls.pop_front().unwrap_or_default()
        }
        fn switch_hands(&mut self, _: &GameState, _: PlayerId) -> Vec<EntityId> {
            self.switches.pop_front().unwrap_or_default()
        }
        fn select_card(&mut self, _: &GameState, _: PlayerId, candidates: &[DefinitionId]) -> DefinitionId {
            self.selects.pop_front().unwrap_or(candidates[0])
        }
    }

    fn test_state() -> GameState {
        let mut data = GameData::new();
        let ch = data.register(EntityDefinition::character(DefinitionId(1), "A").with_health(10));
        data.register(EntityDefinition::card(DefinitionId(300), "Food"));
        data.register(EntityDefinition::entity(DefinitionId(400), DefinitionKind::Support, "Inn"));
        GameState::new(GameConfig::default().with_seed(11), Arc::new(data))
            .with_character(PlayerId::P0, Arc::clone(&ch))
            .with_character(PlayerId::P0, Arc::clone(&ch))
            .with_character(PlayerId::P0, Arc::clone(&ch))
            .with_character(PlayerId::P1, ch)
    }

    fn kill(mutator: &mut StateMutator, id: EntityId) {
        mutator
            .mutate(Mutation::ModifyEntityVar {
                id,
                name: var::ALIVE.to_string(),
                value: 0,
                direction: None,
            })
            .unwrap();
    }

    #[test]
    fn test_choose_active_validates() {
        let io = Scripted {
            actives: VecDeque::from([EntityId(-2), EntityId(-2)]),
            ..Scripted::default()
        };
        let mut mutator = StateMutator::new(test_state()).with_io(io);
        assert_eq!(mutator.choose_active(PlayerId::P0).unwrap(), EntityId(-2));

        kill(&mut mutator, EntityId(-2));
        let err = mutator.choose_active(PlayerId::P0);
        assert!(matches!(err, Err(EngineError::InvalidDecision { .. })));
    }

    #[test]
    fn test_choose_active_without_candidates() {
        let mut mutator = StateMutator::new(test_state());
        let err = mutator.choose_active(PlayerId::P1);
        assert_eq!(err, Err(EngineError::NoLivingCharacter { who: PlayerId::P1 }));
    }

    #[test]
    fn test_choose_active_pair_skips_none() {
        let mut mutator = StateMutator::new(test_state());
        let chosen = mutator.choose_active_pair([Some(PlayerId::P0), None]).unwrap();
        assert_eq!(chosen, [Some(EntityId(-2)), None]);
        assert_eq!(mutator.revision(), 0);
    }

    #[test]
    fn test_reroll_replaces_dice() {
        let io = Scripted {
            rerolls: VecDeque::from([vec![0, 1, 1]]),
            ..Scripted::default()
        };
        let mut mutator = StateMutator::new(test_state()).with_io(io);
        mutator
            .mutate(Mutation::ResetDice {
                who: PlayerId::P0,
                dice: Vector::from(vec![DiceType::Omni; 4]),
            })
            .unwrap();
        mutator.reroll(PlayerId::P0, 3).unwrap();

        let dice = &mutator.state().player(PlayerId::P0).dice;
        assert_eq!(dice.len(), 4);
        assert_eq!(mutator.revision(), 2);
    }

    #[test]
    fn test_reroll_index_out_of_range() {
        let io = Scripted {
            rerolls: VecDeque::from([vec![9]]),
            ..Scripted::default()
        };
        let mut mutator = StateMutator::new(test_state()).with_io(io);
        assert!(mutator.reroll(PlayerId::P0, 1).is_err());
    }

    #[test]
    fn test_switch_hands_keeps_counts() {
        let mut mutator = StateMutator::new(test_state());
        let food = Arc::clone(mutator.state().data.get(DefinitionId(300)).unwrap());
        let mut hand = Vec::new();
        for _ in 0..3 {
            hand.push(mutator.create_hand_card(PlayerId::P0, Arc::clone(&food), false).unwrap().unwrap());
        }
        let io = Scripted {
            switches: VecDeque::from([vec![hand[0], hand[1]]]),
            ..Scripted::default()
        };
        let mut mutator = StateMutator::new((**mutator.state()).clone()).with_io(io);
        mutator.switch_hands(PlayerId::P0).unwrap();

        let player = mutator.state().player(PlayerId::P0);
        assert_eq!(player.hands.len(), 3);
        assert_eq!(player.pile.len(), 0);
    }

    #[test]
    fn test_switch_hands_rejects_repeated_card() {
        let mut mutator = StateMutator::new(test_state());
        let food = Arc::clone(mutator.state().data.get(DefinitionId(300)).unwrap());
        let a = mutator.create_hand_card(PlayerId::P0, Arc::clone(&food), false).unwrap().unwrap();
        let b = mutator.create_hand_card(PlayerId::P0, food, false).unwrap().unwrap();
        let io = Scripted {
            switches: VecDeque::from([vec![a, b, a]]),
            ..Scripted::default()
        };
        let mut mutator = StateMutator::new((**mutator.state()).clone()).with_io(io);

        let err = mutator.switch_hands(PlayerId::P0);

        assert!(matches!(err, Err(EngineError::InvalidDecision { .. })));
        assert_eq!(mutator.revision(), 0);
        assert_eq!(mutator.state().player(PlayerId::P0).hands.len(), 2);
    }

    #[test]
    fn test_select_card_flavours() {
        let io = Scripted {
            selects: VecDeque::from([DefinitionId(400), DefinitionId(300), DefinitionId(999)]),
            ..Scripted::default()
        };
        let mut mutator = StateMutator::new(test_state()).with_io(io);

        let area = EntityArea::Supports { who: PlayerId::P0 };
        let info = SelectCardInfo::CreateEntity {
            candidates: vec![DefinitionId(400)],
            area,
        };
        let events = mutator.select_card(PlayerId::P0, None, &info).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(mutator.state().player(PlayerId::P0).supports.len(), 1);

        let info = SelectCardInfo::RequestPlayCard {
            candidates: vec![DefinitionId(300)],
            targets: vec![EntityId(-1)],
        };
        let events = mutator.select_card(PlayerId::P0, None, &info).unwrap();
        assert!(matches!(
            &events[..],
            [EventAndRequest::Request(Request::PlayCard { card, .. })] if *card == DefinitionId(300)
        ));

        let info = SelectCardInfo::CreateHandCard {
            candidates: vec![DefinitionId(300)],
        };
        assert!(mutator.select_card(PlayerId::P0, None, &info).is_err());
    }
}
