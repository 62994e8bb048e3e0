//! drives a search: fan the candidate space out over a bounded pool of concurrent
//! attempts, and stop dispatching once a code is found
mod async_coordinator;
mod builder;

pub use self::async_coordinator::SearchCoordinator;
pub use self::builder::SearchCoordinatorBuilder;
pub use crate::state::SearchOutcome;

use tracing::{error, info, instrument};

use crate::client::AsyncRequests;
use crate::config::SearchConfig;
use crate::error::SweepError;
use crate::requests::RequestTemplate;
use crate::state::SharedState;

/// parse `raw`, then replay it once per candidate described by `config` until a
/// code is accepted or the candidates run out
///
/// nothing is sent when `raw` can't be parsed or `config` doesn't validate
///
/// # Errors
///
/// returns the [`SweepError`] describing why `raw` isn't a usable request, or why
/// `config` is invalid. Individual transport failures are never errors here; they
/// count as failed attempts.
///
/// # Examples
///
/// ```no_run
/// # use codesweep::client::AsyncClient;
/// # use codesweep::config::SearchConfig;
/// # use codesweep::coordinator::start_bruteforce;
/// # use codesweep::error::SweepError;
/// # use codesweep::state::SharedState;
/// # #[tokio::main]
/// # async fn main() -> Result<(), SweepError> {
/// let raw = "POST /mfa.php HTTP/1.1\nHost: 10.10.10.10\n\ncode=1234";
///
/// let config = SearchConfig::default();
/// let client = AsyncClient::from_config(&config)?;
/// let state = SharedState::new();
///
/// let outcome = start_bruteforce(raw, &config, client, &state).await?;
///
/// println!("{outcome}");
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, level = "trace")]
pub async fn start_bruteforce<A>(
    raw: &str,
    config: &SearchConfig,
    client: A,
    state: &SharedState,
) -> Result<SearchOutcome, SweepError>
where
    A: AsyncRequests + Clone + 'static,
{
    config.validate()?;

    let template = RequestTemplate::parse(raw).map_err(|source| {
        error!(%source, "could not parse the raw request");
        source
    })?;

    info!(
        method = template.method(),
        url = template.url(),
        "parsed request template"
    );

    let coordinator = SearchCoordinator::from_config(config, client, template)?;

    coordinator.search(state).await
}
