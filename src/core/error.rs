//! Engine error type.
//!
//! Only structural failures are errors. Unavailable skills are logged and
//! dropped, and defeats are ordinary outcomes of resolution, so neither
//! appears here.

use thiserror::Error;

use super::entity::{DefinitionId, EntityId};
use super::player::PlayerId;
use super::state::EntityArea;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("entity {0} not found in current state")]
    EntityNotFound(EntityId),

    #[error("entity {id} is not a character")]
    NotACharacter { id: EntityId },

    #[error("entity id {0} is already present in state")]
    DuplicateId(EntityId),

    #[error("area {0:?} does not hold entities")]
    NotAnEntityZone(EntityArea),

    #[error("definition {0} is not registered")]
    DefinitionNotFound(DefinitionId),

    #[error("{who} has no living character to switch to")]
    NoLivingCharacter { who: PlayerId },

    #[error("invalid decision from {who}: {reason}")]
    InvalidDecision { who: PlayerId, reason: String },

    #[error("notification encoding failed: {0}")]
    Encoding(String),
}

impl EngineError {
    pub(crate) fn invalid_decision(who: PlayerId, reason: impl Into<String>) -> Self {
        Self::InvalidDecision {
            who,
            reason: reason.into(),
        }
    }
}
