//! Skill executor: resolves skills and the cascades they start.
//!
//! - `runner`: runs one skill body and commits it as a single transition
//! - `cascade`: shallow event handling (listeners run, nothing finalized)
//! - `defeat`: `finalize_skill`, the damage and defeat sub-machine
//! - `requests`: `handle_event`, full recursive handling of events and
//!   player requests
//!
//! The executor borrows the `StateMutator` for the length of one pass and
//! re-reads its state after every step. Every decision is a blocking call
//! into the mutator's `PlayerIo`.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_tcg::core::{DefinitionId, GameConfig, GameState, PlayerId};
//! use rust_tcg::data::{EntityDefinition, GameData, InitiativeSkillType, SkillDefinition};
//! use rust_tcg::effects::Effect;
//! use rust_tcg::executor::SkillExecutor;
//! use rust_tcg::mutator::StateMutator;
//! use rust_tcg::triggers::{DamageType, Request};
//!
//! let strike = SkillDefinition::initiative(DefinitionId(11), InitiativeSkillType::Normal)
//!     .with_effects(vec![Effect::damage_opponent(2, DamageType::Physical)]);
//! let mut data = GameData::new();
//! let hero = data.register(
//!     EntityDefinition::character(DefinitionId(1), "Hero")
//!         .with_health(10)
//!         .with_max_energy(2)
//!         .with_skill(strike),
//! );
//! let state = GameState::new(GameConfig::default(), Arc::new(data))
//!     .with_character(PlayerId::P0, Arc::clone(&hero))
//!     .with_character(PlayerId::P1, hero);
//!
//! let mut mutator = StateMutator::new(state);
//! let request = Request::UseSkill {
//!     who: PlayerId::P0,
//!     via: None,
//!     skill_id: DefinitionId(11),
//!     as_prepared: false,
//! };
//! let state = SkillExecutor::handle_events(&mut mutator, vec![request.into()]).unwrap();
//!
//! let target = state.player(PlayerId::P1).active_character().unwrap();
//! assert_eq!(target.health(), 8);
//! let caller = state.player(PlayerId::P0).active_character().unwrap();
//! assert_eq!(caller.energy(), 1);
//! ```

mod runner;
mod cascade;
mod defeat;
mod requests;

use std::sync::Arc;

use crate::core::{ExecutorConfig, GameState, Result};
use crate::data::SkillInfo;
use crate::mutator::StateMutator;
use crate::triggers::{EventAndRequest, SkillArg};

/// Drives one resolution pass over a borrowed `StateMutator`.
#[derive(Debug)]
pub struct SkillExecutor<'m> {
    pub(crate) mutator: &'m mut StateMutator,
    pub(crate) config: ExecutorConfig,
}

impl<'m> SkillExecutor<'m> {
    #[must_use]
    pub fn new(mutator: &'m mut StateMutator, config: ExecutorConfig) -> Self {
        Self { mutator, config }
    }

    /// Current canonical state.
    #[must_use]
    pub fn state(&self) -> &Arc<GameState> {
        self.mutator.state()
    }

    #[must_use]
    pub fn config(&self) -> ExecutorConfig {
        self.config
    }

    /// Finalize one skill and return the resulting state.
    pub fn execute_skill(
        mutator: &mut StateMutator,
        skill: &SkillInfo,
        arg: &SkillArg,
    ) -> Result<Arc<GameState>> {
        let mut executor = SkillExecutor::new(mutator, ExecutorConfig::default());
        executor.finalize_skill(skill, arg)?;
        Ok(Arc::clone(executor.state()))
    }

    /// Fully handle `events` and return the resulting state.
    pub fn handle_events(
        mutator: &mut StateMutator,
        events: Vec<EventAndRequest>,
    ) -> Result<Arc<GameState>> {
        let mut executor = SkillExecutor::new(mutator, ExecutorConfig::default());
        executor.handle_event(events)?;
        Ok(Arc::clone(executor.state()))
    }
}
