//! subscribable events that report a search's progress and result
//!
//! Every event is published through the [`SharedState`]'s [`Publisher`]. The
//! [`EventPublisher`] trait provides a simple interface for subscribing to and
//! notifying listeners of events.
//!
//! [`AttemptCompleted`], [`CodeFound`] and [`Exhausted`] are published while the
//! shared state's lock is held, so listeners see them in counter order and must
//! not call back into the [`SharedState`] that published them.
//!
//! [`SharedState`]: crate::state::SharedState
//!
//! # Examples
//!
//! ```
//! use codesweep::events::{EventPublisher, AttemptCompleted};
//! use codesweep::state::SharedState;
//!
//! let state = SharedState::new();
//!
//! state.events().subscribe(|event: AttemptCompleted| {
//!    println!("{} -> {} ({} tested)", event.candidate, event.success, event.tested);
//! });
//!
//! state.events().notify(AttemptCompleted {
//!     candidate: "1000".to_string(),
//!     success: false,
//!     tested: 1,
//! });
//! ```

mod publisher;

pub use self::publisher::{EventPublisher, Publisher};

/// This event is emitted once, right before the first candidate is dispatched
#[derive(Copy, Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchStarted {
    /// number of candidates in the search space
    pub total: usize,

    /// maximum number of attempts in flight at any given time
    pub workers: usize,
}

/// This event is emitted before the search starts when the body template has no
/// `<field>=<digits>` placeholder; every attempt will send the same body
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MissingPlaceholder {
    /// the form field that was expected in the body
    pub field: String,
}

/// This event is emitted once per completed attempt, hit or miss
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptCompleted {
    /// the candidate that was sent
    pub candidate: String,

    /// whether or not the response was a hit
    pub success: bool,

    /// number of completed attempts, including this one
    pub tested: usize,
}

/// This event is emitted exactly once per search, for the first hit observed
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodeFound {
    /// the winning candidate
    pub candidate: String,

    /// number of completed attempts when the hit was recorded
    pub tested: usize,
}

/// This event is emitted once when every candidate completed without a hit
#[derive(Copy, Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Exhausted {
    /// total number of completed attempts
    pub tested: usize,
}

/// This event is emitted at most once, when the dispatcher finds a code already
/// recorded right before it would hand out the next candidate. Attempts already in
/// flight still run to completion after this. It isn't emitted when every
/// candidate was dispatched before the hit was recorded.
#[derive(Copy, Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopSearching {
    /// number of candidates that were dispatched
    pub dispatched: usize,
}
