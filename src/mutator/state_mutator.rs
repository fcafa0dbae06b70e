//! The canonical state owner.

use std::sync::Arc;

use tracing::trace;

use super::io::{FirstChoiceIo, Notification, NullObserver, Observer, PlayerIo};
use super::log::DetailLogType;
use crate::core::{
    apply_mutation, CardZone, EntityArea, EntityId, ExposedMutation, GameRng, GameState, Mutation,
    PlayerId, Result,
};
use crate::data::{EntityDefinition, SkillRef};
use crate::effects::{Draft, HealKind, InsertOptions};
use crate::triggers::EventAndRequest;

/// Owns the current state snapshot and everything that talks to the
/// outside world: notifications, pauses, decisions and the RNG.
///
/// Every transition replaces the `Arc` and bumps the revision. Exposed
/// mutations accumulate until the next `notify`.
pub struct StateMutator {
    state: Arc<GameState>,
    revision: u64,
    pending: Vec<ExposedMutation>,
    pub(super) io: Box<dyn PlayerIo>,
    observer: Box<dyn Observer>,
    pub(super) rng: GameRng,
}

impl std::fmt::Debug for StateMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMutator")
            .field("revision", &self.revision)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl StateMutator {
    /// Wrap `state`. The RNG is seeded from the state's config.
    #[must_use]
    pub fn new(state: GameState) -> Self {
        let rng = GameRng::new(state.config.random_seed);
        Self {
            state: Arc::new(state),
            revision: 0,
            pending: Vec::new(),
            io: Box::new(FirstChoiceIo),
            observer: Box::new(NullObserver),
            rng,
        }
    }

    #[must_use]
    pub fn with_io(mut self, io: impl PlayerIo + 'static) -> Self {
        self.io = Box::new(io);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    #[must_use]
    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> &Arc<GameState> {
        &self.state
    }

    /// Number of state transitions so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Exposed mutations not yet sent to the observer.
    #[must_use]
    pub fn pending(&self) -> &[ExposedMutation] {
        &self.pending
    }

    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    /// Apply one primitive mutation.
    pub fn mutate(&mut self, mutation: Mutation) -> Result<()> {
        let mut next = (*self.state).clone();
        apply_mutation(&mut next, &mutation)?;
        self.log(DetailLogType::Primitive, format_args!("{mutation:?}"));
        if let Some(exposed) = mutation.to_exposed() {
            self.pending.push(exposed);
        }
        self.state = Arc::new(next);
        self.revision += 1;
        Ok(())
    }

    /// Replace the snapshot with one produced elsewhere, queueing the
    /// exposed mutations that led to it. Handing back the current snapshot
    /// is not a transition.
    pub fn reset_state(&mut self, state: Arc<GameState>, exposed: Vec<ExposedMutation>) {
        if !Arc::ptr_eq(&self.state, &state) {
            self.state = state;
            self.revision += 1;
        }
        self.pending.extend(exposed);
    }

    /// Flush pending mutations to the observer.
    pub fn notify(&mut self) {
        self.notify_with(Vec::new());
    }

    /// Flush pending mutations followed by `extra`.
    pub fn notify_with(&mut self, extra: Vec<ExposedMutation>) {
        let mut mutations = std::mem::take(&mut self.pending);
        mutations.extend(extra);
        if mutations.is_empty() {
            return;
        }
        trace!(count = mutations.len(), revision = self.revision, "notify");
        self.observer.on_notify(&Notification {
            revision: self.revision,
            mutations,
        });
    }

    /// Flush and give observers a pause point.
    pub fn notify_and_pause(&mut self) {
        self.notify();
        self.observer.on_pause(&self.state);
    }

    pub(super) fn observer_mut(&mut self) -> &mut dyn Observer {
        self.observer.as_mut()
    }

    /// Run `f` on a draft of the current state and commit the result.
    pub(super) fn with_draft<T>(
        &mut self,
        f: impl FnOnce(&mut Draft) -> Result<T>,
    ) -> Result<(T, Vec<EventAndRequest>)> {
        let mut draft = Draft::new(Arc::clone(&self.state));
        let value = f(&mut draft)?;
        let out = draft.finish();
        for mutation in &out.exposed {
            self.log(DetailLogType::Primitive, format_args!("{mutation:?}"));
        }
        self.reset_state(out.state, out.exposed);
        Ok((value, out.events))
    }

    /// Revive a character from zero health, used when immunity saves it.
    pub fn heal(&mut self, amount: i64, target: EntityId, via: SkillRef) -> Result<Vec<EventAndRequest>> {
        let (_, events) = self.with_draft(|draft| {
            draft.heal(Some(via), via.caller_id, target, amount, HealKind::ImmuneDefeated)
        })?;
        Ok(events)
    }

    /// Put a new card into `who`'s hand.
    pub fn create_hand_card(
        &mut self,
        who: PlayerId,
        definition: Arc<EntityDefinition>,
        no_overflow: bool,
    ) -> Result<Option<EntityId>> {
        let (id, _) = self.with_draft(|draft| draft.create_hand_card(who, definition, no_overflow))?;
        Ok(id)
    }

    pub fn remove_card(&mut self, who: PlayerId, zone: CardZone, id: EntityId, used: bool) -> Result<()> {
        self.with_draft(|draft| draft.remove_card(who, zone, id, used))?;
        Ok(())
    }

    /// Create or refresh an entity and return the `Enter` events.
    pub fn insert_entity_on_stage(
        &mut self,
        definition: Arc<EntityDefinition>,
        area: EntityArea,
        opts: &InsertOptions,
    ) -> Result<Vec<EventAndRequest>> {
        let (_, events) = self.with_draft(|draft| draft.create_entity(definition, area, opts))?;
        Ok(events)
    }

    /// Switch `who`'s active character outside of any skill.
    pub fn switch_active(&mut self, who: PlayerId, to: EntityId) -> Result<Vec<EventAndRequest>> {
        let (_, events) = self.with_draft(|draft| draft.switch_active(who, to, None))?;
        Ok(events)
    }
}
