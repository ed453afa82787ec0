//! Tracing subscriber bootstrap.

use anyhow::{anyhow, Context};
use bookstore_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `telemetry.log_level`. Fails if a global
/// subscriber is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| anyhow!(err))
    .context("failed to install tracing subscriber")?;

    tracing::info!(
        target: "bookstore-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );

    Ok(())
}

fn build_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .with_context(|| format!("invalid log level '{}'", settings.log_level)),
    }
}
