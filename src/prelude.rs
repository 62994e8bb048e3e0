//! small collection of widely used core types and traits
//!
//! # Traits
//!
//! - [`AsyncRequests`] - exposes the `send` method on transports such as [`AsyncClient`]
//! - [`Mutator`] - exposes the `mutate` and `matches` methods on [`CodeFieldMutator`]
//! - [`Decider`] - exposes the `decide` method on [`RedirectDecider`]
//! - [`EventPublisher`] - exposes `subscribe` and `notify` on the [`SharedState`]'s publisher
//!
//! # Structs & Enums
//!
//! - [`SearchConfig`] - every knob of a search
//! - [`RequestTemplate`] - the parsed raw request
//! - [`SharedState`] - the search's shared tally
//! - [`SearchOutcome`] - how a search ended
//! - [`Action`] - the verdict about a single response
//!
//! [`AsyncClient`]: crate::client::AsyncClient
//! [`CodeFieldMutator`]: crate::mutators::CodeFieldMutator
//! [`RedirectDecider`]: crate::deciders::RedirectDecider
//! [`AsyncRequests`]: crate::client::AsyncRequests
//! [`Mutator`]: crate::mutators::Mutator
//! [`Decider`]: crate::deciders::Decider
//! [`EventPublisher`]: crate::events::EventPublisher

// traits that are likely to be used by anyone driving a search
pub use crate::client::AsyncRequests as _;
pub use crate::deciders::Decider as _;
pub use crate::events::EventPublisher as _;
pub use crate::mutators::Mutator as _;

// core structs needed by everyone
pub use crate::actions::Action;
pub use crate::config::SearchConfig;
pub use crate::coordinator::{start_bruteforce, SearchCoordinator};
pub use crate::requests::RequestTemplate;
pub use crate::state::{SearchOutcome, SharedState};

// crate's error type
pub use crate::error::SweepError;
