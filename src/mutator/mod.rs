//! The Mutator: canonical owner of the game state.
//!
//! - `StateMutator`: holds the current `Arc<GameState>`, applies primitive
//!   mutations, queues exposed mutations and flushes them to the observer
//! - `PlayerIo`: answers decisions (replacement active, reroll, switch
//!   hands, card selection)
//! - `Observer`: receives notification batches and pause points
//! - `DetailLogType`: detail log categories, mapped onto `tracing`
//!
//! ## Transitions
//!
//! Every transition (a single `mutate`, or a `reset_state` with a new
//! snapshot) bumps the revision. Committing the snapshot that is already
//! current is not a transition.

mod state_mutator;
mod decisions;
mod io;
mod log;

pub use state_mutator::StateMutator;
pub use io::{FirstChoiceIo, Notification, NullObserver, Observer, PlayerIo};
pub use log::DetailLogType;
