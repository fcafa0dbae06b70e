//! Skill bodies and the drafts they edit.
//!
//! - `Draft`: working copy of a state snapshot that records primitive
//!   mutations and emitted events
//! - `SkillContext`: what a skill action sees; wraps a draft and the
//!   invocation's `SkillInfo`
//! - `Effect` / `Target`: data-driven skill bodies
//! - `EffectResolver`: applies effects through a context
//!
//! ## Commit model
//!
//! A skill never edits the live state. Its body runs against a draft, and
//! the executor commits the draft in one step afterwards. A body that made
//! no edit returns the original snapshot, identical by pointer.

mod draft;
mod context;
mod effect;
mod reaction;
mod resolver;
mod targeting;

pub use draft::{Draft, DraftOutput, HealKind, InsertOptions, VariableOverride};
pub use context::{SkillContext, SkillOutput};
pub use effect::Effect;
pub use reaction::apply_element;
pub use resolver::EffectResolver;
pub use targeting::{caller_owner, Side, Target};
