//! Definition registry.
//!
//! `GameData` stores every entity definition a battle can instantiate:
//! characters, statuses, summons, supports, cards and extensions. It is
//! built once, wrapped in an `Arc` and shared by every state snapshot.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{DefinitionKind, EntityDefinition};
use crate::core::{tag, DefinitionId, EngineError, Result};

/// Registry of entity definitions.
///
/// ## Example
///
/// ```
/// use rust_tcg::core::DefinitionId;
/// use rust_tcg::data::{DefinitionKind, EntityDefinition, GameData};
///
/// let mut data = GameData::new();
/// data.register(EntityDefinition::entity(DefinitionId(321), DefinitionKind::Support, "Liyue Harbor"));
///
/// assert_eq!(data.get(DefinitionId(321)).unwrap().name, "Liyue Harbor");
/// assert!(data.require(DefinitionId(7)).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct GameData {
    definitions: FxHashMap<DefinitionId, Arc<EntityDefinition>>,
}

impl GameData {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition and return the shared handle.
    ///
    /// Panics if a definition with the same ID already exists.
    pub fn register(&mut self, definition: EntityDefinition) -> Arc<EntityDefinition> {
        if self.definitions.contains_key(&definition.id) {
            panic!("Definition with ID {:?} already registered", definition.id);
        }
        let definition = Arc::new(definition);
        self.definitions.insert(definition.id, Arc::clone(&definition));
        definition
    }

    /// Get a definition by ID.
    #[must_use]
    pub fn get(&self, id: DefinitionId) -> Option<&Arc<EntityDefinition>> {
        self.definitions.get(&id)
    }

    /// Get a definition by ID, failing with `DefinitionNotFound`.
    pub fn require(&self, id: DefinitionId) -> Result<Arc<EntityDefinition>> {
        self.definitions
            .get(&id)
            .cloned()
            .ok_or(EngineError::DefinitionNotFound(id))
    }

    #[must_use]
    pub fn contains(&self, id: DefinitionId) -> bool {
        self.definitions.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over all definitions (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityDefinition>> {
        self.definitions.values()
    }

    /// Supports tagged as adventure spots, sorted by id so that selection
    /// prompts are identical on every peer.
    #[must_use]
    pub fn adventure_spots(&self) -> Vec<Arc<EntityDefinition>> {
        let mut spots: Vec<_> = self
            .definitions
            .values()
            .filter(|d| d.kind == DefinitionKind::Support && d.has_tag(tag::ADVENTURE_SPOT))
            .cloned()
            .collect();
        spots.sort_by_key(|d| d.id);
        spots
    }
}
