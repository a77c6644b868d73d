pub mod config;
mod filters;
mod formatter;

pub use config::{LogFormat, LoggingConfig};
use tracing_subscriber::{
    layer::{Layer, Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Installs the global tracing subscriber.
///
/// Fails if a global subscriber has already been set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = filters::build_filter_from_config(config);
    let fmt_layer: Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync> =
        formatter::build_formatter_from_config(config, std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.build_filter_directive(),
        log_format = %config.format,
        "Logging system initialized"
    );

    Ok(())
}
