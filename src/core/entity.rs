//! Entity and definition identifiers.
//!
//! Every runtime object (character, status, summon, support, hand card,
//! extension) has a unique `EntityId`, allocated by the game state when the
//! object is created. Ids are never reused within a game and are unique
//! across both players' zones.
//!
//! A `DefinitionId` names the immutable capability descriptor an entity was
//! created from. Many entities can share one definition.
//!
//! ```
//! use rust_tcg::core::{DefinitionId, EntityId};
//!
//! let id = EntityId(-500);
//! assert!(id.is_negative());
//! assert_eq!(format!("{}", DefinitionId(1101)), "Def(1101)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any runtime entity.
///
/// Runtime allocation counts downwards from `-1` so ids never collide with
/// definition ids in logs and replays. Test fixtures may use any value as
/// long as it stays unique within the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub i32);

impl EntityId {
    /// First id handed out by a fresh state.
    pub const FIRST: EntityId = EntityId(-1);

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// True for ids produced by the runtime allocator.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The id the allocator hands out after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 - 1)
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Identifier of an immutable definition (character, entity, card or skill).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DefinitionId(pub u32);

impl DefinitionId {
    /// Create a new definition ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Def({})", self.0)
    }
}
