//! Battle outcome.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, Phase, PlayerId};

/// Result of a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(PlayerId),
    /// Both sides were defeated at once.
    Draw,
}

impl GameResult {
    /// Outcome of `state`, `None` while the battle continues.
    #[must_use]
    pub fn of(state: &GameState) -> Option<Self> {
        if state.phase != Phase::GameEnd {
            return None;
        }
        Some(state.winner.map_or(Self::Draw, Self::Winner))
    }

    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, Self::Winner(p) if *p == player)
    }
}
