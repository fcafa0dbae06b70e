//! Events, requests, and reactive skill lookup.
//!
//! ## Events
//!
//! `Event` is a closed enum of everything that can happen; `Request` is a
//! closed enum of decisions and protocol steps. `EventName` tags both for
//! trigger matching.
//!
//! ## Conditions
//!
//! `Condition` is a declarative filter for the common cases ("damage aimed
//! at me"). Skills can also filter with arbitrary closures.
//!
//! ## Lookup
//!
//! `all_skills` walks the board in rules order and returns every skill
//! triggered by an event name; `broadcast` adds the self-reaction of a
//! disposed entity.

pub mod event;
pub mod condition;
pub mod registry;

pub use event::{
    DamageOrHealArg, DamageType, DisposeArg, EnterArg, Event, EventAndRequest, EventName,
    ImmuneInfo, PlayCardArg, ReactionArg, ReactionType, Request, SelectCardArg, SelectCardInfo,
    SkillArg, SwitchActiveArg, UseSkillArg,
};
pub use condition::{Condition, ConditionEvaluator};
pub use registry::{all_skills, broadcast, CallerAndSkill};
