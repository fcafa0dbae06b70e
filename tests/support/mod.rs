//! Shared fixtures for the integration tests.
//!
//! - `Battle`: registers definitions and builds a starting state
//! - `Journal`: one ordered record of notifications, pauses and decisions,
//!   shared by `RecordingObserver` and `ScriptedIo`
//! - skill builders for the usual test characters

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use rust_tcg::core::{
    apply_mutation, DefinitionId, DiceType, EntityArea, EntityId, EntityState, ExposedMutation,
    GameConfig, GameState, Mutation, PlayerId,
};
use rust_tcg::data::{
    DefinitionKind, EntityDefinition, GameData, InitiativeSkillType, SkillDefinition,
};
use rust_tcg::effects::{Effect, Side, Target};
use rust_tcg::mutator::{Notification, Observer, PlayerIo, StateMutator};
use rust_tcg::triggers::{DamageType, EventAndRequest, Request};

/// Normal attack id used by `hero`.
pub const STRIKE: DefinitionId = DefinitionId(101);

/// Install a `RUST_LOG`-driven subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ===== Journal =====

#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Notify(Notification),
    Pause,
    /// `PlayerIo::choose_active` was asked.
    AskActive(PlayerId),
    /// `Observer::on_choose_active` was told.
    ChoseActive(PlayerId, EntityId),
}

pub type Journal = Rc<RefCell<Vec<Entry>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Every exposed mutation in notification order.
pub fn exposed(journal: &Journal) -> Vec<ExposedMutation> {
    journal
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Entry::Notify(n) => Some(n.mutations.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Position of the first journal entry matching `pred`.
pub fn position(journal: &Journal, pred: impl Fn(&Entry) -> bool) -> Option<usize> {
    journal.borrow().iter().position(pred)
}

/// Journal position of the first notification carrying a matching
/// mutation.
pub fn position_of_mutation(journal: &Journal, pred: impl Fn(&ExposedMutation) -> bool) -> Option<usize> {
    position(journal, |e| matches!(e, Entry::Notify(n) if n.mutations.iter().any(&pred)))
}

pub struct RecordingObserver(pub Journal);

impl Observer for RecordingObserver {
    fn on_notify(&mut self, notification: &Notification) {
        self.0.borrow_mut().push(Entry::Notify(notification.clone()));
    }

    fn on_pause(&mut self, _state: &GameState) {
        self.0.borrow_mut().push(Entry::Pause);
    }

    fn on_choose_active(&mut self, who: PlayerId, chosen: EntityId) {
        self.0.borrow_mut().push(Entry::ChoseActive(who, chosen));
    }
}

/// Answers from queues, falling back to the first candidate.
#[derive(Default)]
pub struct ScriptedIo {
    pub journal: Option<Journal>,
    pub actives: VecDeque<EntityId>,
    pub rerolls: VecDeque<Vec<usize>>,
    pub switches: VecDeque<Vec<EntityId>>,
    pub selects: VecDeque<DefinitionId>,
}

impl ScriptedIo {
    pub fn recording(journal: &Journal) -> Self {
        Self {
            journal: Some(Rc::clone(journal)),
            ..Self::default()
        }
    }
}

impl PlayerIo for ScriptedIo {
    fn choose_active(&mut self, _state: &GameState, who: PlayerId, candidates: &[EntityId]) -> EntityId {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(Entry::AskActive(who));
        }
        self.actives
            .pop_front()
            .unwrap_or_else(|| candidates[0])
    }

    fn reroll(&mut self, _state: &GameState, _who: PlayerId, _dice: &[DiceType]) -> Vec<usize> {
        self.rerolls.pop_front().unwrap_or_default()
    }

    fn switch_hands(&mut self, _state: &GameState, _who: PlayerId) -> Vec<EntityId> {
        self.switches.pop_front().unwrap_or_default()
    }

    fn select_card(&mut self, _state: &GameState, _who: PlayerId, candidates: &[DefinitionId]) -> DefinitionId {
        self.selects
            .pop_front()
            .unwrap_or_else(|| candidates[0])
    }
}

// ===== Definitions =====

/// A character with 2 max energy and the given skills.
pub fn character(id: u32, health: i64, skills: Vec<SkillDefinition>) -> EntityDefinition {
    skills.into_iter().fold(
        EntityDefinition::character(DefinitionId(id), format!("Char{id}"))
            .with_health(health)
            .with_max_energy(2),
        EntityDefinition::with_skill,
    )
}

/// Normal attack for `value` physical damage on the opponent's active.
pub fn strike(id: DefinitionId, value: i64) -> SkillDefinition {
    SkillDefinition::initiative(id, InitiativeSkillType::Normal)
        .with_effects(vec![Effect::damage_opponent(value, DamageType::Physical)])
}

/// Hits both active characters for `value`.
pub fn double_strike(id: DefinitionId, value: i64) -> SkillDefinition {
    SkillDefinition::initiative(id, InitiativeSkillType::Normal).with_effects(vec![
        Effect::damage_opponent(value, DamageType::Piercing),
        Effect::Damage {
            target: Target::Active(Side::Mine),
            value,
            damage_type: DamageType::Piercing,
        },
    ])
}

pub fn use_skill(who: PlayerId, skill_id: DefinitionId) -> EventAndRequest {
    Request::UseSkill {
        who,
        via: None,
        skill_id,
        as_prepared: false,
    }
    .into()
}

// ===== Battle =====

/// Definition registry plus lineups.
pub struct Battle {
    pub data: GameData,
    pub config: GameConfig,
    lineups: [Vec<Arc<EntityDefinition>>; 2],
    placed: Vec<(EntityArea, i32, Arc<EntityDefinition>)>,
}

impl Battle {
    pub fn new() -> Self {
        Self {
            data: GameData::new(),
            config: GameConfig::default(),
            lineups: [Vec::new(), Vec::new()],
            placed: Vec::new(),
        }
    }

    pub fn register(&mut self, definition: EntityDefinition) -> Arc<EntityDefinition> {
        self.data.register(definition)
    }

    /// Register a character and add it to `who`'s lineup.
    pub fn character(mut self, who: PlayerId, definition: EntityDefinition) -> Self {
        let definition = self.data.register(definition);
        self.lineups[who.index()].push(definition);
        self
    }

    /// Reuse an already registered character definition.
    pub fn character_again(mut self, who: PlayerId, definition: &Arc<EntityDefinition>) -> Self {
        self.lineups[who.index()].push(Arc::clone(definition));
        self
    }

    /// Register `definition` and place one instance with id `id` in `area`.
    /// Character areas refer to lineup slots resolved in `build`, so use
    /// `attach` for those.
    pub fn place(mut self, area: EntityArea, id: i32, definition: EntityDefinition) -> Self {
        let definition = self.data.register(definition);
        self.placed.push((area, id, definition));
        self
    }

    /// Build the state. Characters get ids `-1`, `-2`, ... in lineup order,
    /// player 0 first.
    pub fn build(self) -> GameState {
        let mut state = GameState::new(self.config, Arc::new(self.data));
        for who in PlayerId::both() {
            for definition in &self.lineups[who.index()] {
                state = state.with_character(who, Arc::clone(definition));
            }
        }
        for (area, id, definition) in self.placed {
            apply_mutation(
                &mut state,
                &Mutation::CreateEntity {
                    area,
                    entity: EntityState::new(EntityId(id), definition),
                },
            )
            .unwrap();
        }
        state
    }
}

impl Default for Battle {
    fn default() -> Self {
        Self::new()
    }
}

/// A status/summon/support/extension definition with no skills.
pub fn entity(id: u32, kind: DefinitionKind) -> EntityDefinition {
    EntityDefinition::entity(DefinitionId(id), kind, format!("Entity{id}"))
}

/// Mutator recording into `journal`, answering with `io`.
pub fn mutator(state: GameState, journal: &Journal, io: ScriptedIo) -> StateMutator {
    StateMutator::new(state)
        .with_io(io)
        .with_observer(RecordingObserver(Rc::clone(journal)))
}

/// Ids of `who`'s characters in lineup order.
pub fn character_ids(state: &GameState, who: PlayerId) -> Vec<EntityId> {
    state.player(who).characters.iter().map(|ch| ch.id).collect()
}
