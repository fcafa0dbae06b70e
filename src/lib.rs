//! # rust-tcg
//!
//! Rules-resolution core of a two-player card battle.
//!
//! Given the current game state and a triggering action (skill use, card
//! play, player request) the engine decides which state mutations occur, in
//! what order, which events are emitted and which further skills react.
//! Resolution is deterministic: the same state, seed and decisions always
//! produce the same mutations.
//!
//! ## Design Principles
//!
//! 1. **Persistent state**: `GameState` is an immutable snapshot behind an
//!    `Arc`, built on `im` collections so every transition is a cheap copy.
//!
//! 2. **Single write path**: every edit is a `Mutation` applied through
//!    `apply_mutation`, and observers see the `ExposedMutation` subset in
//!    application order.
//!
//! 3. **Closed vocabularies**: events, requests and mutations are enums and
//!    dispatch over them is exhaustive.
//!
//! ## Modules
//!
//! - `core`: ids, players, state, mutations, RNG, configuration, errors
//! - `data`: entity and skill definitions, the definition registry
//! - `triggers`: events, requests, conditions, listener lookup
//! - `effects`: the skill body surface (`SkillContext`, `Effect`)
//! - `rules`: rule queries (immunity, available skills, charged/plunging)
//! - `mutator`: the canonical state owner, decisions and notifications
//! - `executor`: skill running, cascades, damage and defeat resolution

pub mod core;
pub mod data;
pub mod triggers;
pub mod effects;
pub mod rules;
pub mod mutator;
pub mod executor;

// Re-export commonly used types
pub use crate::core::{
    DefinitionId, EntityId, PlayerId, PlayerMap,
    GameRng, GameRngState,
    GameConfig, ExecutorConfig,
    EngineError, Result,
    GameState, PlayerState, CharacterState, EntityState, EntitySnapshot, CardState,
    EntityArea, Phase,
    Mutation, ExposedMutation, apply_mutation,
};

pub use crate::data::{
    EntityDefinition, DefinitionKind, GameData,
    SkillDefinition, SkillInfo, SkillRef, CallerRef, InitiativeSkillType,
};

pub use crate::triggers::{
    Event, EventName, Request, EventAndRequest, SkillArg,
    Condition, ConditionEvaluator, broadcast,
};

pub use crate::effects::{Effect, EffectResolver, SkillContext, Target, Side};

pub use crate::rules::GameResult;

pub use crate::mutator::{StateMutator, PlayerIo, Observer, Notification, FirstChoiceIo, NullObserver};

pub use crate::executor::SkillExecutor;
