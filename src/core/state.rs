//! Game state snapshots.
//!
//! ## GameState
//!
//! An immutable snapshot of the whole battle. The mutator holds the current
//! snapshot behind an `Arc` and replaces it on every transition, so a
//! reference taken before a mutation keeps seeing the old world.
//!
//! Collections use `im` persistent structures: cloning a snapshot to derive
//! the next one shares everything that did not change.
//!
//! ## Variables (i64 only)
//!
//! Characters and entities carry a `Variables` bag (`FxHashMap<String, i64>`):
//! - Booleans: use 0/1 (`alive`)
//! - Enums: use discriminant values (`aura`)
//! - Everything else: plain integers (`health`, `energy`, `usage`, `exp`)
//!
//! ## Lookups
//!
//! `get_entity_by_id` and `get_entity_area` search every zone of both
//! players plus the global extensions. A missing id is a modelling bug and
//! surfaces as `EngineError::EntityNotFound`.

use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::entity::{DefinitionId, EntityId};
use super::error::{EngineError, Result};
use super::player::{PlayerId, PlayerMap};
use crate::data::{DefinitionKind, EntityDefinition, GameData};
use crate::triggers::Event;

/// Variable bag of a character or entity.
pub type Variables = FxHashMap<String, i64>;

/// Well-known variable names.
pub mod var {
    pub const HEALTH: &str = "health";
    pub const MAX_HEALTH: &str = "maxHealth";
    pub const ENERGY: &str = "energy";
    pub const MAX_ENERGY: &str = "maxEnergy";
    pub const ALIVE: &str = "alive";
    pub const AURA: &str = "aura";
    pub const USAGE: &str = "usage";
    pub const EXP: &str = "exp";
}

/// Well-known definition tags.
pub mod tag {
    /// Attached status that forbids the character from using skills.
    pub const DISABLE_SKILL: &str = "disableSkill";
    /// Support that takes part in adventures.
    pub const ADVENTURE_SPOT: &str = "adventureSpot";
}

/// Battle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    InitHands,
    InitActives,
    Rolling,
    Action,
    End,
    GameEnd,
}

/// Elemental aura attached to a character.
///
/// Stored in the `aura` variable as its discriminant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i64)]
pub enum Aura {
    #[default]
    None = 0,
    Cryo = 1,
    Hydro = 2,
    Pyro = 3,
    Electro = 4,
    Dendro = 5,
    CryoDendro = 6,
}

impl Aura {
    /// Decode from a variable value. Unknown values decode to `None`.
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        match value {
            1 => Self::Cryo,
            2 => Self::Hydro,
            3 => Self::Pyro,
            4 => Self::Electro,
            5 => Self::Dendro,
            6 => Self::CryoDendro,
            _ => Self::None,
        }
    }

    /// Variable encoding.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }
}

/// Die faces. `Omni` pays for anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiceType {
    Omni,
    Cryo,
    Hydro,
    Pyro,
    Electro,
    Anemo,
    Geo,
    Dendro,
}

impl DiceType {
    pub const ALL: [DiceType; 8] = [
        DiceType::Omni,
        DiceType::Cryo,
        DiceType::Hydro,
        DiceType::Pyro,
        DiceType::Electro,
        DiceType::Anemo,
        DiceType::Geo,
        DiceType::Dendro,
    ];
}

/// Boolean player flags addressable by `Mutation::SetPlayerFlag`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerFlag {
    /// The next initiative normal attack this round counts as plunging.
    CanPlunging,
    /// At least one of the player's characters was defeated.
    HasDefeated,
    DeclaredEnd,
    /// Normal attacks count as charged regardless of dice parity.
    CanCharged,
}

/// A non-character entity: status, equipment, combat status, summon,
/// support or extension.
#[derive(Clone, Debug)]
pub struct EntityState {
    pub id: EntityId,
    pub definition: Arc<EntityDefinition>,
    pub variables: Variables,
}

impl EntityState {
    /// Instantiate a definition with its initial variables.
    #[must_use]
    pub fn new(id: EntityId, definition: Arc<EntityDefinition>) -> Self {
        let variables = definition.variables.clone();
        Self {
            id,
            definition,
            variables,
        }
    }

    /// Read a variable, 0 when absent.
    #[must_use]
    pub fn var(&self, name: &str) -> i64 {
        self.variables.get(name).copied().unwrap_or(0)
    }
}

/// A character slot with its attached statuses and equipment.
#[derive(Clone, Debug)]
pub struct CharacterState {
    pub id: EntityId,
    pub definition: Arc<EntityDefinition>,
    pub variables: Variables,
    pub entities: Vector<EntityState>,
}

impl CharacterState {
    /// Instantiate a character definition at full health.
    #[must_use]
    pub fn new(id: EntityId, definition: Arc<EntityDefinition>) -> Self {
        let mut variables = definition.variables.clone();
        let max_health = variables.get(var::MAX_HEALTH).copied().unwrap_or(0);
        variables.entry(var::HEALTH.to_string()).or_insert(max_health);
        variables.insert(var::ALIVE.to_string(), 1);
        variables.entry(var::ENERGY.to_string()).or_insert(0);
        variables.insert(var::AURA.to_string(), Aura::None.as_i64());
        Self {
            id,
            definition,
            variables,
            entities: Vector::new(),
        }
    }

    /// Read a variable, 0 when absent.
    #[must_use]
    pub fn var(&self, name: &str) -> i64 {
        self.variables.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn health(&self) -> i64 {
        self.var(var::HEALTH)
    }

    #[must_use]
    pub fn max_health(&self) -> i64 {
        self.var(var::MAX_HEALTH)
    }

    #[must_use]
    pub fn energy(&self) -> i64 {
        self.var(var::ENERGY)
    }

    #[must_use]
    pub fn max_energy(&self) -> i64 {
        self.var(var::MAX_ENERGY)
    }

    #[must_use]
    pub fn alive(&self) -> bool {
        self.var(var::ALIVE) != 0
    }

    #[must_use]
    pub fn aura(&self) -> Aura {
        Aura::from_i64(self.var(var::AURA))
    }
}

/// A card in hand or pile.
#[derive(Clone, Debug)]
pub struct CardState {
    pub id: EntityId,
    pub definition: Arc<EntityDefinition>,
}

/// Record of one initiative skill use this round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSkillRecord {
    /// Caller definition captured when the skill started.
    pub caller_definition: DefinitionId,
    pub skill: DefinitionId,
}

/// Card zones of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardZone {
    Hands,
    Pile,
}

/// Where an entity lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityArea {
    /// The entity is itself a character slot.
    Characters { who: PlayerId },
    /// Status or equipment attached to a character.
    Character { who: PlayerId, character_id: EntityId },
    CombatStatuses { who: PlayerId },
    Summons { who: PlayerId },
    Supports { who: PlayerId },
    Cards { who: PlayerId, zone: CardZone },
    /// Global entities owned by neither player.
    Extensions,
}

impl EntityArea {
    /// Owning player, `None` for extensions.
    #[must_use]
    pub const fn who(self) -> Option<PlayerId> {
        match self {
            Self::Characters { who }
            | Self::Character { who, .. }
            | Self::CombatStatuses { who }
            | Self::Summons { who }
            | Self::Supports { who }
            | Self::Cards { who, .. } => Some(who),
            Self::Extensions => None,
        }
    }
}

/// Borrowed view of anything that has an id.
#[derive(Clone, Copy, Debug)]
pub enum AnyState<'a> {
    Character(&'a CharacterState),
    Entity(&'a EntityState),
    Card(&'a CardState),
}

impl<'a> AnyState<'a> {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Character(ch) => ch.id,
            Self::Entity(et) => et.id,
            Self::Card(card) => card.id,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &'a Arc<EntityDefinition> {
        match self {
            Self::Character(ch) => &ch.definition,
            Self::Entity(et) => &et.definition,
            Self::Card(card) => &card.definition,
        }
    }

    /// Read a variable. Cards have none.
    #[must_use]
    pub fn var(&self, name: &str) -> i64 {
        match self {
            Self::Character(ch) => ch.var(name),
            Self::Entity(et) => et.var(name),
            Self::Card(_) => 0,
        }
    }

    /// Detached copy that outlives the entity.
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        let variables = match self {
            Self::Character(ch) => ch.variables.clone(),
            Self::Entity(et) => et.variables.clone(),
            Self::Card(_) => Variables::default(),
        };
        EntitySnapshot {
            id: self.id(),
            definition: self.definition().id,
            variables,
        }
    }
}

/// An entity as it was when a request was made. The definition is
/// resolved through the registry, so the snapshot stays usable after the
/// entity left the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub definition: DefinitionId,
    pub variables: Variables,
}

/// One side of the board.
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub who: PlayerId,
    pub characters: Vector<CharacterState>,
    pub active_character_id: EntityId,
    pub combat_statuses: Vector<EntityState>,
    pub summons: Vector<EntityState>,
    pub supports: Vector<EntityState>,
    pub hands: Vector<CardState>,
    pub pile: Vector<CardState>,
    pub dice: Vector<DiceType>,
    pub can_plunging: bool,
    pub has_defeated: bool,
    pub declared_end: bool,
    pub can_charged: bool,
    pub round_skill_log: Vector<RoundSkillRecord>,
}

impl PlayerState {
    /// An empty side with no characters yet.
    #[must_use]
    pub fn new(who: PlayerId) -> Self {
        Self {
            who,
            characters: Vector::new(),
            active_character_id: EntityId(0),
            combat_statuses: Vector::new(),
            summons: Vector::new(),
            supports: Vector::new(),
            hands: Vector::new(),
            pile: Vector::new(),
            dice: Vector::new(),
            can_plunging: false,
            has_defeated: false,
            declared_end: false,
            can_charged: false,
            round_skill_log: Vector::new(),
        }
    }

    #[must_use]
    pub fn flag(&self, flag: PlayerFlag) -> bool {
        match flag {
            PlayerFlag::CanPlunging => self.can_plunging,
            PlayerFlag::HasDefeated => self.has_defeated,
            PlayerFlag::DeclaredEnd => self.declared_end,
            PlayerFlag::CanCharged => self.can_charged,
        }
    }

    pub fn set_flag(&mut self, flag: PlayerFlag, value: bool) {
        match flag {
            PlayerFlag::CanPlunging => self.can_plunging = value,
            PlayerFlag::HasDefeated => self.has_defeated = value,
            PlayerFlag::DeclaredEnd => self.declared_end = value,
            PlayerFlag::CanCharged => self.can_charged = value,
        }
    }

    /// Index of the active character in `characters`.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.characters
            .iter()
            .position(|ch| ch.id == self.active_character_id)
    }

    /// The active character.
    pub fn active_character(&self) -> Result<&CharacterState> {
        self.active_index()
            .map(|idx| &self.characters[idx])
            .ok_or(EngineError::EntityNotFound(self.active_character_id))
    }

    /// Characters starting from the active one, wrapping around.
    pub fn characters_from_active(&self) -> impl Iterator<Item = &CharacterState> {
        let start = self.active_index().unwrap_or(0);
        let len = self.characters.len();
        (0..len).map(move |offset| &self.characters[(start + offset) % len])
    }

    #[must_use]
    pub fn living_count(&self) -> usize {
        self.characters.iter().filter(|ch| ch.alive()).count()
    }

    /// Uses of `skill` by `caller_definition` recorded this round.
    #[must_use]
    pub fn round_skill_count(&self, caller_definition: DefinitionId, skill: DefinitionId) -> usize {
        self.round_skill_log
            .iter()
            .filter(|r| r.caller_definition == caller_definition && r.skill == skill)
            .count()
    }

    #[must_use]
    pub fn zone(&self, zone: CardZone) -> &Vector<CardState> {
        match zone {
            CardZone::Hands => &self.hands,
            CardZone::Pile => &self.pile,
        }
    }

    pub(crate) fn zone_mut(&mut self, zone: CardZone) -> &mut Vector<CardState> {
        match zone {
            CardZone::Hands => &mut self.hands,
            CardZone::Pile => &mut self.pile,
        }
    }
}

/// Complete battle snapshot.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub data: Arc<GameData>,
    pub phase: Phase,
    pub round_number: u32,
    pub current_turn: PlayerId,
    pub winner: Option<PlayerId>,
    pub players: PlayerMap<PlayerState>,
    /// Global entities; their skills are looked up before any player's.
    pub extensions: Vector<EntityState>,
    /// Damage and reaction events recorded since the last `BeforeUseSkill`.
    pub delaying_events: Vector<Event>,
    pub next_id: EntityId,
}

impl GameState {
    /// Empty battle in the `InitHands` phase.
    #[must_use]
    pub fn new(config: GameConfig, data: Arc<GameData>) -> Self {
        Self {
            config,
            data,
            phase: Phase::default(),
            round_number: 0,
            current_turn: PlayerId::P0,
            winner: None,
            players: PlayerMap::new(PlayerState::new),
            extensions: Vector::new(),
            delaying_events: Vector::new(),
            next_id: EntityId::FIRST,
        }
    }

    #[must_use]
    pub fn player(&self, who: PlayerId) -> &PlayerState {
        &self.players[who]
    }

    /// Hand out the next id. Only `Mutation::StepId` should call this.
    pub(crate) fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Find anything with the given id.
    pub fn get_entity_by_id(&self, id: EntityId) -> Result<AnyState<'_>> {
        for et in &self.extensions {
            if et.id == id {
                return Ok(AnyState::Entity(et));
            }
        }
        for (_, player) in self.players.iter() {
            for ch in &player.characters {
                if ch.id == id {
                    return Ok(AnyState::Character(ch));
                }
                if let Some(et) = ch.entities.iter().find(|et| et.id == id) {
                    return Ok(AnyState::Entity(et));
                }
            }
            for zone in [&player.combat_statuses, &player.summons, &player.supports] {
                if let Some(et) = zone.iter().find(|et| et.id == id) {
                    return Ok(AnyState::Entity(et));
                }
            }
            for zone in [CardZone::Hands, CardZone::Pile] {
                if let Some(card) = player.zone(zone).iter().find(|c| c.id == id) {
                    return Ok(AnyState::Card(card));
                }
            }
        }
        Err(EngineError::EntityNotFound(id))
    }

    /// Find where an id lives.
    pub fn get_entity_area(&self, id: EntityId) -> Result<EntityArea> {
        if self.extensions.iter().any(|et| et.id == id) {
            return Ok(EntityArea::Extensions);
        }
        for (who, player) in self.players.iter() {
            for ch in &player.characters {
                if ch.id == id {
                    return Ok(EntityArea::Characters { who });
                }
                if ch.entities.iter().any(|et| et.id == id) {
                    return Ok(EntityArea::Character {
                        who,
                        character_id: ch.id,
                    });
                }
            }
            if player.combat_statuses.iter().any(|et| et.id == id) {
                return Ok(EntityArea::CombatStatuses { who });
            }
            if player.summons.iter().any(|et| et.id == id) {
                return Ok(EntityArea::Summons { who });
            }
            if player.supports.iter().any(|et| et.id == id) {
                return Ok(EntityArea::Supports { who });
            }
            for zone in [CardZone::Hands, CardZone::Pile] {
                if player.zone(zone).iter().any(|c| c.id == id) {
                    return Ok(EntityArea::Cards { who, zone });
                }
            }
        }
        Err(EngineError::EntityNotFound(id))
    }

    #[must_use]
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.get_entity_area(id).is_ok()
    }

    /// Look up a character by id.
    pub fn character(&self, id: EntityId) -> Result<&CharacterState> {
        match self.get_entity_by_id(id)? {
            AnyState::Character(ch) => Ok(ch),
            _ => Err(EngineError::NotACharacter { id }),
        }
    }

    /// Owner of a character, failing for anything else.
    pub fn character_owner(&self, id: EntityId) -> Result<PlayerId> {
        match self.get_entity_area(id)? {
            EntityArea::Characters { who } => Ok(who),
            _ => Err(EngineError::NotACharacter { id }),
        }
    }

    pub(crate) fn character_mut(&mut self, id: EntityId) -> Result<&mut CharacterState> {
        let who = self.character_owner(id)?;
        self.players[who]
            .characters
            .iter_mut()
            .find(|ch| ch.id == id)
            .ok_or(EngineError::EntityNotFound(id))
    }

    /// Mutable access to the variable bag of a character or entity.
    pub(crate) fn variables_mut(&mut self, id: EntityId) -> Result<&mut Variables> {
        match self.get_entity_area(id)? {
            EntityArea::Characters { .. } => Ok(&mut self.character_mut(id)?.variables),
            EntityArea::Cards { .. } => Err(EngineError::EntityNotFound(id)),
            area => {
                let zone = self.entity_zone_mut(area)?;
                zone.iter_mut()
                    .find(|et| et.id == id)
                    .map(|et| &mut et.variables)
                    .ok_or(EngineError::EntityNotFound(id))
            }
        }
    }

    /// The entity list backing a non-character, non-card area.
    pub(crate) fn entity_zone_mut(&mut self, area: EntityArea) -> Result<&mut Vector<EntityState>> {
        match area {
            EntityArea::Extensions => Ok(&mut self.extensions),
            EntityArea::Character { character_id, .. } => {
                Ok(&mut self.character_mut(character_id)?.entities)
            }
            EntityArea::CombatStatuses { who } => Ok(&mut self.players[who].combat_statuses),
            EntityArea::Summons { who } => Ok(&mut self.players[who].summons),
            EntityArea::Supports { who } => Ok(&mut self.players[who].supports),
            area @ (EntityArea::Characters { .. } | EntityArea::Cards { .. }) => {
                Err(EngineError::NotAnEntityZone(area))
            }
        }
    }

    /// Read-only counterpart of `entity_zone_mut`.
    pub fn entity_zone(&self, area: EntityArea) -> Result<&Vector<EntityState>> {
        match area {
            EntityArea::Extensions => Ok(&self.extensions),
            EntityArea::Character { character_id, .. } => Ok(&self.character(character_id)?.entities),
            EntityArea::CombatStatuses { who } => Ok(&self.players[who].combat_statuses),
            EntityArea::Summons { who } => Ok(&self.players[who].summons),
            EntityArea::Supports { who } => Ok(&self.players[who].supports),
            area @ (EntityArea::Characters { .. } | EntityArea::Cards { .. }) => {
                Err(EngineError::NotAnEntityZone(area))
            }
        }
    }

    /// Add a character to a player's lineup. The first one becomes active.
    ///
    /// Used while setting up a battle; during play characters are fixed.
    pub fn with_character(mut self, who: PlayerId, definition: Arc<EntityDefinition>) -> Self {
        assert!(
            definition.kind == DefinitionKind::Character,
            "Only character definitions can fill a character slot"
        );
        let id = self.alloc_id();
        let player = &mut self.players[who];
        if player.characters.is_empty() {
            player.active_character_id = id;
        }
        player.characters.push_back(CharacterState::new(id, definition));
        self
    }
}
