use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::{LogFormat, LoggingConfig};

/// HTTP stack crates that log every connection at debug level
const TRANSPORT_TARGETS: [&str; 3] = ["hyper", "h2", "reqwest"];

/// Install the global subscriber.
///
/// Output goes to stderr so generated text on stdout stays clean. `RUST_LOG`
/// takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    tracing_subscriber::registry()
        .with(output_layer(config.format))
        .with(filter)
        .try_init()?;

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

/// Configured level for this crate, transport crates capped at `warn`.
fn filter_directives(level: &str) -> String {
    let mut directives = level.to_string();
    for target in TRANSPORT_TARGETS {
        directives.push_str(&format!(",{}=warn", target));
    }
    directives
}

fn output_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    // Stream spans close when the generation task finishes; logging the close
    // records each stream's duration.
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().with_target(true).boxed(),
    }
}
