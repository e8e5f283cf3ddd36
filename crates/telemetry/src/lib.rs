//! Logging and tracing bootstrap.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use folio_kernel::settings::{LogFormat, TelemetrySettings};

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, defaulting to `info`. Call once at startup;
/// a second call fails because the global subscriber is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match settings.log_format {
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?,
        LogFormat::Pretty => builder
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?,
    }

    tracing::info!(format = ?settings.log_format, "telemetry initialized");
    Ok(())
}
