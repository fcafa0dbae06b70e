//! Decision and notification boundaries.
//!
//! The core never decides on a player's behalf. Whenever the rules need a
//! choice (a replacement active character, dice to reroll, cards to switch,
//! a card to select) it asks a [`PlayerIo`]. Implementations can be a human
//! front end, a scripted fixture or an AI policy.
//!
//! Everything the core does is reported to an [`Observer`] as batches of
//! exposed mutations. A pause marks a point where presentation may catch up.

use serde::{Deserialize, Serialize};

use crate::core::{DefinitionId, DiceType, EngineError, EntityId, ExposedMutation, GameState, PlayerId, Result};

/// Answers decisions on behalf of players.
///
/// Answers are validated by the mutator; an answer outside the offered
/// candidates is an `EngineError::InvalidDecision`.
pub trait PlayerIo {
    /// Pick a replacement active character among `candidates`.
    fn choose_active(&mut self, state: &GameState, who: PlayerId, candidates: &[EntityId]) -> EntityId;

    /// Indices into `dice` to reroll. An empty answer ends rerolling.
    fn reroll(&mut self, state: &GameState, who: PlayerId, dice: &[DiceType]) -> Vec<usize>;

    /// Hand cards to put back into the pile.
    fn switch_hands(&mut self, state: &GameState, who: PlayerId) -> Vec<EntityId>;

    /// Pick one definition among `candidates`.
    fn select_card(&mut self, state: &GameState, who: PlayerId, candidates: &[DefinitionId]) -> DefinitionId;
}

/// Takes the first candidate and never rerolls or switches.
/// Useful for testing or as a fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstChoiceIo;

impl PlayerIo for FirstChoiceIo {
    fn choose_active(&mut self, _state: &GameState, _who: PlayerId, candidates: &[EntityId]) -> EntityId {
        candidates.first().copied().unwrap_or(EntityId(0))
    }

    fn reroll(&mut self, _state: &GameState, _who: PlayerId, _dice: &[DiceType]) -> Vec<usize> {
        Vec::new()
    }

    fn switch_hands(&mut self, _state: &GameState, _who: PlayerId) -> Vec<EntityId> {
        Vec::new()
    }

    fn select_card(&mut self, _state: &GameState, _who: PlayerId, candidates: &[DefinitionId]) -> DefinitionId {
        candidates.first().copied().unwrap_or(DefinitionId(0))
    }
}

/// A batch of exposed mutations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Mutator revision when the batch was flushed.
    pub revision: u64,
    pub mutations: Vec<ExposedMutation>,
}

impl Notification {
    /// Wire encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| EngineError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| EngineError::Encoding(e.to_string()))
    }
}

/// Receives everything the core reports.
pub trait Observer {
    fn on_notify(&mut self, notification: &Notification);

    /// A pause point; the state is the one observers should now display.
    fn on_pause(&mut self, _state: &GameState) {}

    /// A replacement active character was chosen. Called once per player
    /// after every choice of the round is in, before any is applied.
    fn on_choose_active(&mut self, _who: PlayerId, _chosen: EntityId) {}
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_notify(&mut self, _notification: &Notification) {}
}
