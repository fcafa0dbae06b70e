//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! The battle always has exactly two seats, `PlayerId(0)` and `PlayerId(1)`.
//! `flip()` names the opponent.
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by a fixed pair for O(1) access.
//! Supports iteration and indexing by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat identifier in a two-player battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The first seat.
    pub const P0: PlayerId = PlayerId(0);
    /// The second seat.
    pub const P1: PlayerId = PlayerId(1);

    /// Create a new player ID.
    ///
    /// Panics if `id` is not 0 or 1.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        assert!(id < 2, "Player id must be 0 or 1");
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The opponent of this player.
    ///
    /// ```
    /// use rust_tcg::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::P0.flip(), PlayerId::P1);
    /// assert_eq!(PlayerId::P1.flip(), PlayerId::P0);
    /// ```
    #[must_use]
    pub const fn flip(self) -> Self {
        Self(1 - self.0)
    }

    /// Both seats in index order.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [Self::P0, Self::P1].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use rust_tcg::core::{PlayerId, PlayerMap};
///
/// let mut dice: PlayerMap<u32> = PlayerMap::new(|_| 8);
/// dice[PlayerId::P1] -= 3;
/// assert_eq!(dice[PlayerId::P0], 8);
/// assert_eq!(dice[PlayerId::P1], 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId::P0), factory(PlayerId::P1)],
        }
    }

    /// Create from an explicit pair.
    pub fn from_pair(p0: T, p1: T) -> Self {
        Self { data: [p0, p1] }
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Apply a function to both entries.
    pub fn map<U>(self, f: impl Fn(PlayerId, T) -> U) -> PlayerMap<U> {
        let [p0, p1] = self.data;
        PlayerMap {
            data: [f(PlayerId::P0, p0), f(PlayerId::P1, p1)],
        }
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}
