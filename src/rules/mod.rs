//! Rule queries.
//!
//! Read-only questions about a state snapshot that the executor asks
//! before acting:
//! - `check_immune`: would a lethal hit be prevented
//! - `initiative_skills_of_player`, `is_skill_disabled`: can a skill be used
//! - `is_charged_plunging`: normal attack modifiers
//! - `play_skill_of_card`: the play effect of a card
//!
//! `GameResult` reads the outcome of a finished battle.

pub mod queries;
pub mod outcome;

pub use queries::{
    check_immune, initiative_skills_of_player, is_charged_plunging, is_skill_disabled,
    play_skill_of_card,
};
pub use outcome::GameResult;
