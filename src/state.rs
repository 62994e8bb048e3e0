//! search's runtime state information
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{debug, instrument, warn};

use crate::error::SweepError;
use crate::events::{AttemptCompleted, CodeFound, EventPublisher, Exhausted, Publisher};
use crate::responses::Response;
use crate::statistics::Statistics;

/// the part of the state that every worker reads and writes; always accessed
/// through a single lock
#[derive(Clone, Default, Debug, PartialEq, Eq)]
struct Tally {
    // monotonic false -> true, never reset
    found: bool,

    // incremented exactly once per completed attempt
    tested: usize,

    winner: Option<String>,
}

/// what recording a single attempt amounted to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
    tested: usize,
    first_hit: bool,
}

impl AttemptRecord {
    /// number of completed attempts, including the recorded one
    #[must_use]
    pub const fn tested(&self) -> usize {
        self.tested
    }

    /// whether or not the recorded attempt was the search's first (and only reported) hit
    #[must_use]
    pub const fn is_first_hit(&self) -> bool {
        self.first_hit
    }
}

/// how a search ended
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SearchOutcome {
    /// a candidate was accepted
    Found {
        /// the winning candidate
        candidate: String,

        /// number of completed attempts once all in-flight work finished
        tested: usize,
    },

    /// every candidate completed without a hit
    Exhausted {
        /// number of completed attempts
        tested: usize,
    },
}

impl SearchOutcome {
    /// the winning candidate, if any
    #[must_use]
    pub fn candidate(&self) -> Option<&str> {
        match self {
            Self::Found { candidate, .. } => Some(candidate),
            Self::Exhausted { .. } => None,
        }
    }

    /// number of completed attempts
    #[must_use]
    pub const fn tested(&self) -> usize {
        match self {
            Self::Found { tested, .. } | Self::Exhausted { tested } => *tested,
        }
    }
}

impl Display for SearchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { candidate, tested } => {
                write!(f, "VALID CODE FOUND -> {candidate} (after {tested} attempts)")
            }
            Self::Exhausted { tested } => {
                write!(f, "no valid code found; exhausted {tested} candidates")
            }
        }
    }
}

/// search's current state, shared between every worker
///
/// cloning is cheap and every clone refers to the same underlying state. A
/// `SharedState` belongs to a single search: once a code is found it stays found.
#[derive(Clone, Default, Debug)]
pub struct SharedState {
    tally: Arc<Mutex<Tally>>,
    statistics: Arc<RwLock<Statistics>>,
    publisher: Arc<RwLock<Publisher>>,
}

impl SharedState {
    /// create a new, empty `SharedState`
    #[must_use]
    #[instrument(level = "trace")]
    pub fn new() -> Self {
        debug!("created new SharedState");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tally>, SweepError> {
        self.tally.lock().map_err(|_| SweepError::PoisonedState)
    }

    /// whether or not a code has been found
    ///
    /// a poisoned state reports `true`, so that nothing else gets dispatched
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.lock().map_or(true, |tally| tally.found)
    }

    /// number of completed attempts so far
    #[must_use]
    pub fn tested(&self) -> usize {
        self.lock().map_or(0, |tally| tally.tested)
    }

    /// the winning candidate, once found
    #[must_use]
    pub fn winner(&self) -> Option<String> {
        self.lock().ok().and_then(|tally| tally.winner.clone())
    }

    /// record a completed attempt
    ///
    /// the counter increment, its [`AttemptCompleted`] event and (for the first hit
    /// only) the found transition with its [`CodeFound`] event all happen under one
    /// lock, so no update is lost and a hit is reported at most once no matter how
    /// many workers race here
    ///
    /// # Errors
    ///
    /// returns [`SweepError::PoisonedState`] if a listener panicked while the lock was held
    #[instrument(skip(self), level = "trace")]
    pub fn record_attempt(
        &self,
        candidate: &str,
        success: bool,
    ) -> Result<AttemptRecord, SweepError> {
        let mut tally = self.lock()?;

        tally.tested += 1;

        let tested = tally.tested;

        self.publisher.notify(AttemptCompleted {
            candidate: candidate.to_string(),
            success,
            tested,
        });

        let first_hit = success && !tally.found;

        if first_hit {
            tally.found = true;
            tally.winner = Some(candidate.to_string());

            self.publisher.notify(CodeFound {
                candidate: candidate.to_string(),
                tested,
            });
        }

        Ok(AttemptRecord { tested, first_hit })
    }

    /// close out a search over `total` candidates
    ///
    /// publishes [`Exhausted`] when no code was found
    ///
    /// # Errors
    ///
    /// returns [`SweepError::PoisonedState`] if a listener panicked while the lock was held
    #[instrument(skip(self), level = "trace")]
    pub fn finish(&self, total: usize) -> Result<SearchOutcome, SweepError> {
        let tally = self.lock()?;

        if let (true, Some(candidate)) = (tally.found, tally.winner.clone()) {
            return Ok(SearchOutcome::Found {
                candidate,
                tested: tally.tested,
            });
        }

        if tally.tested != total {
            warn!(
                tested = tally.tested,
                total, "search ended without a hit, but not every candidate completed"
            );
        }

        self.publisher.notify(Exhausted {
            tested: tally.tested,
        });

        Ok(SearchOutcome::Exhausted {
            tested: tally.tested,
        })
    }

    /// update the [`Statistics`] object with the given [`Response`]
    pub fn update(&self, response: &Response) {
        if let Ok(mut guard) = self.statistics.write() {
            guard.update(response);
        }
    }

    /// update the [`Statistics`] object with the given [`SweepError`]
    pub fn update_from_error(&self, error: &SweepError) {
        if let Ok(mut guard) = self.statistics.write() {
            guard.update_from_error(error);
        }
    }

    /// mark the beginning of the search in the [`Statistics`]
    pub fn start_timer(&self) {
        if let Ok(mut guard) = self.statistics.write() {
            guard.start();
        }
    }

    /// get the statistics container
    #[must_use]
    pub fn stats(&self) -> Arc<RwLock<Statistics>> {
        self.statistics.clone()
    }

    /// get the event publisher
    #[must_use]
    pub fn events(&self) -> Arc<RwLock<Publisher>> {
        self.publisher.clone()
    }
}

impl Display for SharedState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "SharedState::{{")?;

        if let Ok(tally) = self.tally.lock() {
            writeln!(f, "  Found={}", tally.found)?;
            writeln!(f, "  Tested={}", tally.tested)?;
            writeln!(f, "  Winner={:?}", tally.winner)?;
        }

        if let Ok(guard) = self.statistics.read() {
            writeln!(f, "  Statistics={guard}")?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn only_the_first_hit_is_reported() -> Result<(), SweepError> {
        let state = SharedState::new();
        let found = Arc::new(AtomicUsize::new(0));

        let counter = found.clone();
        state.events().subscribe(move |_: CodeFound| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!state.record_attempt("1000", false)?.is_first_hit());
        assert!(state.record_attempt("1001", true)?.is_first_hit());
        assert!(!state.record_attempt("1002", true)?.is_first_hit());

        assert!(state.is_found());
        assert_eq!(state.tested(), 3);
        assert_eq!(state.winner().as_deref(), Some("1001"));
        assert_eq!(found.load(Ordering::SeqCst), 1);

        assert_eq!(
            state.finish(3)?,
            SearchOutcome::Found {
                candidate: "1001".to_string(),
                tested: 3
            }
        );
        Ok(())
    }

    #[test]
    fn finishing_without_a_hit_publishes_exhausted() -> Result<(), SweepError> {
        let state = SharedState::new();
        let exhausted = Arc::new(AtomicUsize::new(0));

        let seen = exhausted.clone();
        state.events().subscribe(move |event: Exhausted| {
            seen.store(event.tested, Ordering::SeqCst);
        });

        for candidate in ["1000", "1001"] {
            state.record_attempt(candidate, false)?;
        }

        let outcome = state.finish(2)?;

        assert_eq!(outcome, SearchOutcome::Exhausted { tested: 2 });
        assert_eq!(outcome.candidate(), None);
        assert_eq!(exhausted.load(Ordering::SeqCst), 2);
        assert!(!state.is_found());
        Ok(())
    }

    #[test]
    fn ticks_are_monotonic_across_threads() -> Result<(), SweepError> {
        let state = SharedState::new();
        let ticks = Arc::new(Mutex::new(Vec::new()));

        let seen = ticks.clone();
        state.events().subscribe(move |event: AttemptCompleted| {
            seen.lock().unwrap().push(event.tested);
        });

        let handles: Vec<_> = (0..16)
            .map(|worker| {
                let state = state.clone();
                thread::spawn(move || {
                    for attempt in 0..250 {
                        state
                            .record_attempt(&format!("{worker}-{attempt}"), false)
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let ticks = ticks.lock().unwrap();

        assert_eq!(state.tested(), 4000);
        assert_eq!(ticks.len(), 4000);
        // published under the lock: strictly increasing by exactly one
        assert!(ticks.windows(2).all(|pair| pair[1] == pair[0] + 1));
        assert_eq!(ticks.first(), Some(&1));
        Ok(())
    }

    #[test]
    fn racing_hits_report_once() {
        let state = SharedState::new();
        let found = Arc::new(AtomicUsize::new(0));

        let counter = found.clone();
        state.events().subscribe(move |_: CodeFound| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let first_hits: usize = (0..50)
            .map(|worker| {
                let state = state.clone();
                thread::spawn(move || {
                    usize::from(
                        state
                            .record_attempt(&format!("{worker:04}"), true)
                            .unwrap()
                            .is_first_hit(),
                    )
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .sum();

        assert_eq!(first_hits, 1);
        assert_eq!(found.load(Ordering::SeqCst), 1);
        assert_eq!(state.tested(), 50);
    }

    #[test]
    fn display_contains_the_tally() -> Result<(), SweepError> {
        let state = SharedState::new();
        state.record_attempt("4242", true)?;

        let shown = state.to_string();

        assert!(shown.contains("Found=true"));
        assert!(shown.contains("Winner=Some(\"4242\")"));
        Ok(())
    }
}
