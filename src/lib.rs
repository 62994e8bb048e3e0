//! Replays a captured HTTP form request once per candidate in a numeric code
//! space, and stops as soon as the server accepts one.
//!
//! The pieces, in the order a search uses them:
//!
//! - [`requests::RequestTemplate`] parses the raw request
//! - [`corpora::CodeRange`] yields the zero-padded candidates
//! - [`mutators::CodeFieldMutator`] swaps each candidate into the body
//! - [`client::AsyncClient`] sends it as a form `POST` without following redirects
//! - [`deciders::RedirectDecider`] decides whether the response is a hit
//! - [`state::SharedState`] tallies attempts and publishes [`events`]
//!
//! [`coordinator::SearchCoordinator`] drives all of them with bounded concurrency;
//! [`start_bruteforce`] wires it up from a [`config::SearchConfig`].
#![macro_use]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::perf,
    rustdoc::broken_intra_doc_links,
    missing_docs,
    clippy::missing_const_for_fn
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)] // appears to be a false positive; cargo tree doesn't show what clippy yells about

pub mod actions;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod corpora;
pub mod deciders;
pub mod error;
pub mod events;
pub mod mutators;
pub mod prelude;
pub mod requests;
pub mod responses;
pub mod state;
pub mod statistics;

pub use coordinator::start_bruteforce;

/// Wrapper `Atomic*.fetch_add` to save me from writing `Ordering::SeqCst` a bajillion times
///
/// default is to increment by 1, second arg can be used to increment by a different value
#[macro_export]
macro_rules! atomic_increment {
    ($atomic:expr) => {
        $atomic.fetch_add(1, Ordering::SeqCst);
    };

    ($atomic:expr, $value:expr) => {
        $atomic.fetch_add($value, Ordering::SeqCst);
    };
}

/// Wrapper around `Atomic*.load` to save me from writing `Ordering::SeqCst` a bajillion times
#[macro_export]
macro_rules! atomic_load {
    ($atomic:expr) => {
        $atomic.load(Ordering::SeqCst)
    };
    ($atomic:expr, $ordering:expr) => {
        $atomic.load($ordering)
    };
}
