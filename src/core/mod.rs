//! Core engine types: ids, players, state, mutations, RNG, configuration.
//!
//! Everything else in the crate reads a `GameState` and edits it only through
//! `apply_mutation`.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;
pub mod state;
pub mod mutation;

pub use entity::{DefinitionId, EntityId};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::{ExecutorConfig, GameConfig};
pub use error::{EngineError, Result};
pub use state::{
    tag, var, AnyState, Aura, CardState, CardZone, CharacterState, DiceType, EntityArea,
    EntitySnapshot, EntityState, GameState, Phase, PlayerFlag, PlayerState, RoundSkillRecord,
    Variables,
};
pub use mutation::{apply_mutation, ExposedMutation, Mutation, PublicSkillType, VarDirection};
