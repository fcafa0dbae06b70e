//! Game and executor configuration.
//!
//! `GameConfig` carries the numeric rules limits the core consults while
//! resolving (support slots, hand size, dice cap). It is serde-enabled so a
//! room can ship it to both peers alongside the seed.
//!
//! `ExecutorConfig` tunes a single resolution pass.

use serde::{Deserialize, Serialize};

/// Rules limits shared by both players.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for dice and pile shuffling.
    pub random_seed: u64,

    /// Cards dealt at the start of the battle.
    pub init_hands_count: usize,

    /// Hand limit; extra cards are discarded unless created with `no_overflow`.
    pub max_hands_count: usize,

    /// Support zone slots.
    pub max_supports_count: usize,

    /// Summon zone slots.
    pub max_summons_count: usize,

    /// Dice cap per player.
    pub max_dice_count: usize,

    /// Round limit.
    pub max_rounds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            init_hands_count: 5,
            max_hands_count: 10,
            max_supports_count: 4,
            max_summons_count: 4,
            max_dice_count: 16,
            max_rounds: 15,
        }
    }
}

impl GameConfig {
    /// Create a configuration with the standard limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the support slot count.
    #[must_use]
    pub fn with_max_supports(mut self, count: usize) -> Self {
        self.max_supports_count = count;
        self
    }

    /// Set the summon slot count.
    #[must_use]
    pub fn with_max_summons(mut self, count: usize) -> Self {
        self.max_summons_count = count;
        self
    }

    /// Set the hand limit.
    #[must_use]
    pub fn with_max_hands(mut self, count: usize) -> Self {
        self.max_hands_count = count;
        self
    }
}

/// Options for one `SkillExecutor` pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Preview passes run skills against a throwaway mutator; skill bodies
    /// see `SkillInfo::is_preview` and may skip exposed logging.
    pub preview: bool,
}

impl ExecutorConfig {
    /// Configuration for a preview pass.
    #[must_use]
    pub const fn preview() -> Self {
        Self { preview: true }
    }
}
