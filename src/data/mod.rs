//! Immutable game data: entity definitions, skills, and the registry.
//!
//! ## Key Types
//!
//! - `EntityDefinition`: capability descriptor shared by every instance
//! - `SkillDefinition`: initiative or triggered skill with filter and body
//! - `SkillInfo`: one invocation of a skill, bound to its caller
//! - `GameData`: definition lookup

pub mod definition;
pub mod skill;
pub mod registry;

pub use definition::{DefinitionKind, EntityDefinition, SpecialEnergy};
pub use skill::{
    CallerRef, InitiativeSkillConfig, InitiativeSkillType, SkillAction, SkillDefinition,
    SkillFilter, SkillInfo, SkillRef, TriggerOn,
};
pub use registry::GameData;
