//! Log subscriber setup.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CliError, CliResult};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. With `json`, events are
/// emitted as flattened JSON lines.
pub fn init_logging(filter: &str, json: bool) -> CliResult<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| CliError::Config(format!("invalid log filter '{filter}': {e}")))?;

    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    // Already initialized (tests, embedding) is not an error.
    let _ = tracing_subscriber::registry()
        .with(json_layer)
        .with(text_layer)
        .with(filter_layer)
        .try_init();

    tracing::debug!(filter = %filter, json, "Logging initialized");
    Ok(())
}
