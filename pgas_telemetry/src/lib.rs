//! Process-wide logging setup shared by the PGAS runtime crates.

/// Environment variable holding the log filter, in `EnvFilter`
/// directive syntax (e.g. `info` or `globmem=debug`).
pub const PGAS_LOG: &str = "PGAS_LOG";

/// Filter used when [`PGAS_LOG`] is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

use std::io::IsTerminal;
use std::sync::OnceLock;

use lazy_static::lazy_static;
pub use tracing::Level;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt;

// The guard must live as long as the process, or buffered lines are lost.
lazy_static! {
    static ref WRITER_GUARD: (NonBlocking, WorkerGuard) =
        tracing_appender::non_blocking::NonBlockingBuilder::default()
            .lossy(false)
            .thread_name("pgas-log-writer")
            .finish(std::io::stderr());
}

fn env_filter(directives: Option<String>) -> EnvFilter {
    match directives {
        Some(directives) => match EnvFilter::try_new(&directives) {
            Ok(filter) => filter,
            Err(err) => {
                eprintln!("ignoring invalid {}={:?}: {}", PGAS_LOG, directives, err);
                EnvFilter::new(DEFAULT_LOG_FILTER)
            }
        },
        None => EnvFilter::new(DEFAULT_LOG_FILTER),
    }
}

/// Install the global tracing subscriber. Writes go to stderr through a
/// non-blocking writer and are filtered by [`PGAS_LOG`].
///
/// Safe to call any number of times from any thread; only the first
/// call has an effect. If another subscriber is already installed it is
/// left in place.
pub fn initialize_logging() {
    static INITIALIZED: OnceLock<()> = OnceLock::new();
    INITIALIZED.get_or_init(|| {
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let writer: &NonBlocking = &WRITER_GUARD.0;
        let layer = fmt::Layer::default()
            .with_writer(writer.clone())
            .with_thread_names(true)
            .with_ansi(std::io::stderr().is_terminal())
            .with_filter(env_filter(std::env::var(PGAS_LOG).ok()));

        if let Err(err) = Registry::default().with(layer).try_init() {
            tracing::debug!("logging already initialized for this process: {}", err);
        }
    });
}

pub mod test_utils {
    use tracing::Level;

    /// Set up a tracing subscriber printing events at `level` and above
    /// to the test harness' captured output. Later calls are no-ops.
    pub fn set_tracing_env_filter(level: Level) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(level.as_str()))
            .with_test_writer()
            .try_init();
    }
}
