//! Detail logging.
//!
//! Detail logs go through `tracing`. A `sub_log` opens a span that nests
//! every later log line until the returned guard is dropped, so the span
//! tree mirrors the skill and event nesting.

use std::fmt::Display;

use tracing::span::EnteredSpan;
use tracing::{debug, debug_span};

use super::state_mutator::StateMutator;

/// Category of a detail log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetailLogType {
    /// A primitive mutation.
    Primitive,
    Skill,
    Event,
    Other,
}

impl StateMutator {
    /// Open a nested log scope. The scope closes when the guard drops.
    #[must_use = "the log scope closes as soon as the guard is dropped"]
    pub fn sub_log(&self, kind: DetailLogType, message: impl Display) -> EnteredSpan {
        debug_span!("sub_log", ?kind, message = %message, revision = self.revision()).entered()
    }

    /// Emit one log line in the current scope.
    pub fn log(&self, kind: DetailLogType, message: impl Display) {
        debug!(?kind, revision = self.revision(), "{message}");
    }
}
