use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::AsyncReadExt;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use codesweep::client::AsyncClient;
use codesweep::config::SearchConfig;
use codesweep::coordinator::SearchCoordinator;
use codesweep::error::SweepError;
use codesweep::events::{AttemptCompleted, CodeFound, EventPublisher, SearchStarted};
use codesweep::requests::RequestTemplate;
use codesweep::state::{SearchOutcome, SharedState};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.cyan} [{elapsed_precise}] [{wide_bar:.blue}] {pos}/{len} (eta {eta}) {msg}";

const FOUND_MESSAGE: &str = "code found; waiting on in-flight attempts";

/// Replay a captured HTTP form request across a numeric code space until one is accepted
#[derive(Parser, Debug)]
#[command(name = "codesweep", version, about)]
struct Cli {
    /// file holding the raw HTTP request; read from stdin until EOF when omitted
    #[arg(short, long, value_name = "FILE")]
    request: Option<PathBuf>,

    /// json file holding a search configuration; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// maximum number of attempts in flight [default: 50]
    #[arg(short, long)]
    workers: Option<usize>,

    /// per-request timeout in seconds [default: 2]
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// first candidate [default: 1000]
    #[arg(long)]
    start: Option<u32>,

    /// last candidate, inclusive [default: 9999]
    #[arg(long)]
    end: Option<u32>,

    /// zero-padded width of each candidate [default: 4]
    #[arg(long)]
    width: Option<usize>,

    /// form field whose digits get replaced [default: code]
    #[arg(short, long, value_name = "NAME")]
    field: Option<String>,

    /// log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn search_config(&self) -> Result<SearchConfig, SweepError> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_json_file(path)?,
            None => SearchConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = end;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(field) = &self.field {
            config.field.clone_from(field);
        }

        config.validate()?;

        Ok(config)
    }

    async fn raw_request(&self) -> Result<String, SweepError> {
        if let Some(path) = &self.request {
            return Ok(tokio::fs::read_to_string(path).await?);
        }

        if std::io::stdin().is_terminal() {
            eprintln!("Paste the full HTTP request below (Ctrl+D to finish):\n");
        }

        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;

        Ok(raw)
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "codesweep=debug" } else { "warn" };

    // RUST_LOG wins over --verbose when both are present
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install the log subscriber: {err}");
    }
}

/// wire a progress bar to the search's events; it stays hidden until the search starts
fn progress_bar(state: &SharedState) -> ProgressBar {
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let bar = ProgressBar::hidden().with_style(style);

    let started = bar.clone();
    state.events().subscribe(move |event: SearchStarted| {
        started.set_length(event.total as u64);
        started.set_draw_target(ProgressDrawTarget::stderr());
    });

    let found = Arc::new(AtomicBool::new(false));

    let ticker = bar.clone();
    let quiet = found.clone();
    state.events().subscribe(move |event: AttemptCompleted| {
        ticker.inc(1);

        // once a code is found, later misses keep the found message
        if !event.success && !quiet.load(Ordering::SeqCst) {
            ticker.set_message(format!(
                "TRY {} -> invalid  (total tested: {})",
                event.candidate, event.tested
            ));
        }
    });

    let winner = bar.clone();
    state.events().subscribe(move |event: CodeFound| {
        found.store(true, Ordering::SeqCst);
        winner.println(format!("VALID CODE FOUND -> {}", event.candidate));
        winner.set_message(FOUND_MESSAGE);
    });

    bar
}

async fn run(cli: &Cli) -> Result<SearchOutcome, SweepError> {
    let config = cli.search_config()?;
    let raw = cli.raw_request().await?;

    let template = RequestTemplate::parse(&raw)?;

    println!("\nParsed Request Summary:\n{template}\n");
    println!(
        "Starting {}-digit code search ({})...",
        config.width,
        config.candidates()?
    );
    println!("Using {} workers\n", config.workers);

    let client = AsyncClient::from_config(&config)?;
    let coordinator = SearchCoordinator::from_config(&config, client, template)?;

    let state = SharedState::new();
    let bar = progress_bar(&state);

    let outcome = coordinator.search(&state).await;

    bar.abandon();

    debug!("{state}");

    outcome
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(outcome) => {
            println!("\n{outcome}");

            match outcome {
                SearchOutcome::Found { .. } => ExitCode::SUCCESS,
                SearchOutcome::Exhausted { .. } => ExitCode::from(1),
            }
        }
        Err(err) => {
            error!(%err, "search could not run");
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_defaults() -> Result<(), SweepError> {
        let cli = Cli::parse_from(["codesweep", "-w", "8", "--start", "0", "--end", "999999", "--width", "6"]);

        let config = cli.search_config()?;

        assert_eq!(config.workers, 8);
        assert_eq!(config.candidates()?.len(), 1_000_000);
        assert_eq!(config.field, "code");
        Ok(())
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let cli = Cli::parse_from(["codesweep", "--start", "9999", "--end", "1000"]);

        assert!(matches!(
            cli.search_config(),
            Err(SweepError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn attempts_after_a_hit_leave_the_found_message_alone() -> Result<(), SweepError> {
        let state = SharedState::new();
        let bar = progress_bar(&state);

        state.record_attempt("1000", false)?;
        assert!(bar.message().starts_with("TRY 1000 -> invalid"));

        state.record_attempt("1001", true)?;
        state.record_attempt("1002", false)?;

        assert_eq!(bar.message(), FOUND_MESSAGE);
        assert_eq!(bar.position(), 3);
        Ok(())
    }
}
