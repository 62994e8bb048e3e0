// the builder moves through its states by value, which rules out const
#![allow(clippy::missing_const_for_fn)]

use std::time::Duration;

use super::SearchCoordinator;
use crate::client::AsyncRequests;
use crate::config::{DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};
use crate::corpora::CodeRange;
use crate::deciders::{Decider, RedirectDecider};
use crate::mutators::{CodeFieldMutator, Mutator};
use crate::requests::RequestTemplate;

/// create a new [`SearchCoordinatorBuilder`] that, when finalized with
/// [`SearchCoordinatorBuilder::build`], will create a [`SearchCoordinator`]
///
/// `()` stands in for the client and template until they're provided, so `build`
/// only exists once both are set
///
/// mandatory build methods:
/// - [`SearchCoordinatorBuilder::client`]
/// - [`SearchCoordinatorBuilder::template`]
///
/// optional build methods:
/// - [`SearchCoordinatorBuilder::workers`]
/// - [`SearchCoordinatorBuilder::candidates`]
/// - [`SearchCoordinatorBuilder::mutator`]
/// - [`SearchCoordinatorBuilder::decider`]
/// - [`SearchCoordinatorBuilder::timeout`]
///
/// # Examples
///
/// ```
/// # use codesweep::client::AsyncClient;
/// # use codesweep::coordinator::SearchCoordinatorBuilder;
/// # use codesweep::corpora::CodeRange;
/// # use codesweep::error::SweepError;
/// # use codesweep::requests::RequestTemplate;
/// # fn main() -> Result<(), SweepError> {
/// let template: RequestTemplate = "POST /mfa HTTP/1.1\nHost: example.com\n\ncode=1234".parse()?;
///
/// let coordinator = SearchCoordinatorBuilder::new()
///     .client(AsyncClient::new()?)
///     .template(template)
///     .candidates(CodeRange::new(0, 999_999, 6)?)
///     .workers(10)
///     .build();
///
/// assert_eq!(coordinator.workers(), 10);
/// assert_eq!(coordinator.candidates().len(), 1_000_000);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SearchCoordinatorBuilder<A, T, D, M> {
    workers: usize,
    client: A,
    template: T,
    candidates: CodeRange,
    mutator: M,
    decider: D,
    timeout: Duration,
}

impl SearchCoordinatorBuilder<(), (), RedirectDecider, CodeFieldMutator> {
    /// create a new builder with every optional value at its default
    #[must_use]
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            client: (),
            template: (),
            candidates: CodeRange::default(),
            mutator: CodeFieldMutator::default(),
            decider: RedirectDecider::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Default for SearchCoordinatorBuilder<(), (), RedirectDecider, CodeFieldMutator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D, M> SearchCoordinatorBuilder<(), T, D, M> {
    /// the transport used to send every attempt
    pub fn client<A>(self, client: A) -> SearchCoordinatorBuilder<A, T, D, M>
    where
        A: AsyncRequests,
    {
        SearchCoordinatorBuilder {
            workers: self.workers,
            client,
            template: self.template,
            candidates: self.candidates,
            mutator: self.mutator,
            decider: self.decider,
            timeout: self.timeout,
        }
    }
}

impl<A, D, M> SearchCoordinatorBuilder<A, (), D, M> {
    /// the parsed request every attempt is built from
    pub fn template(self, template: RequestTemplate) -> SearchCoordinatorBuilder<A, RequestTemplate, D, M> {
        SearchCoordinatorBuilder {
            workers: self.workers,
            client: self.client,
            template,
            candidates: self.candidates,
            mutator: self.mutator,
            decider: self.decider,
            timeout: self.timeout,
        }
    }
}

impl<A, T, D, M> SearchCoordinatorBuilder<A, T, D, M> {
    /// maximum number of attempts in flight at once
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// the candidate space, dispatched in ascending order
    #[must_use]
    pub fn candidates(mut self, candidates: CodeRange) -> Self {
        self.candidates = candidates;
        self
    }

    /// per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// replace the default [`CodeFieldMutator`]
    pub fn mutator<N>(self, mutator: N) -> SearchCoordinatorBuilder<A, T, D, N>
    where
        N: Mutator,
    {
        SearchCoordinatorBuilder {
            workers: self.workers,
            client: self.client,
            template: self.template,
            candidates: self.candidates,
            mutator,
            decider: self.decider,
            timeout: self.timeout,
        }
    }

    /// replace the default [`RedirectDecider`]
    pub fn decider<E>(self, decider: E) -> SearchCoordinatorBuilder<A, T, E, M>
    where
        E: Decider,
    {
        SearchCoordinatorBuilder {
            workers: self.workers,
            client: self.client,
            template: self.template,
            candidates: self.candidates,
            mutator: self.mutator,
            decider,
            timeout: self.timeout,
        }
    }
}

impl<A, D, M> SearchCoordinatorBuilder<A, RequestTemplate, D, M>
where
    A: AsyncRequests,
    D: Decider,
    M: Mutator,
{
    /// finalize the builder
    pub fn build(self) -> SearchCoordinator<A, D, M> {
        SearchCoordinator::new(
            self.workers,
            self.client,
            self.template,
            self.candidates,
            self.mutator,
            self.decider,
            self.timeout,
        )
    }
}
