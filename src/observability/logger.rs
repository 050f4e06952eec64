//! Structured logging setup
//!
//! Events are emitted through `tracing`. Development environments get the
//! human-readable format; every other environment gets one JSON object per
//! line. `RUST_LOG` replaces the default filter.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,tower_http=debug,sqlx=warn";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local work
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Pick the format for a deployment environment name
    pub fn for_env(env: &str) -> Self {
        match env.to_ascii_lowercase().as_str() {
            "local" | "dev" | "development" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Build a subscriber writing `format` lines to `writer`
pub fn subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    match format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
    }
}

/// Install the global subscriber for `env`.
///
/// Returns false if a subscriber was already installed; the first one stays.
pub fn init(env: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing::subscriber::set_global_default(subscriber(
        LogFormat::for_env(env),
        filter,
        std::io::stdout,
    ))
    .is_ok()
}
