use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "intake=debug,tower_http=debug";

/// Initialize console tracing.
///
/// Compact format, filtered by `RUST_LOG` or [`DEFAULT_LOG_FILTER`]. Fails if a global
/// subscriber is already installed.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(console_fmt)
        .try_init()?;

    tracing::debug!("Tracing initialized");
    Ok(())
}
