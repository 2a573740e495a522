//! Structured logging for the Aegis core
//!
//! Console output for interactive use plus an optional JSON-lines file
//! layer. Each JSON record carries `timestamp`, `level`, `target` and the
//! event message; a `request_id` span field is included whenever the caller
//! opened one via [`request_span`].

use std::path::Path;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::core::config::LoggingSettings;
use crate::core::error::{AegisError, Result};

static LOGGING_INITIALIZED: Once = Once::new();

/// Initialize the tracing subscriber. Safe to call more than once; only the
/// first call installs layers.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let mut outcome = Ok(());
    LOGGING_INITIALIZED.call_once(|| {
        outcome = setup(settings);
    });
    outcome
}

fn setup(settings: &LoggingSettings) -> Result<()> {
    let level: Level = settings
        .level
        .parse()
        .map_err(|_| AegisError::invalid_parameters(format!("unknown LOG_LEVEL '{}'", settings.level)))?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stdout)
        .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level));

    let mut layers = vec![Box::new(console_layer) as Box<dyn Layer<_> + Send + Sync>];

    if let Some(path) = &settings.file_path {
        let path = Path::new(path);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "aegis.log".to_string());
        std::fs::create_dir_all(dir).map_err(|e| {
            AegisError::service_init("logging", format!("cannot create log directory: {}", e))
        })?;
        let appender = tracing_appender::rolling::never(dir, file_name);

        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(appender)
            .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level));
        layers.push(Box::new(json_layer));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| AegisError::service_init("logging", e.to_string()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %settings.level,
        file = settings.file_path.as_deref().unwrap_or("<none>"),
        "aegis logging initialized"
    );
    Ok(())
}

/// Open a span carrying the façade-provided request id so it shows up in
/// every JSON record emitted underneath.
pub fn request_span(request_id: &str) -> tracing::Span {
    tracing::info_span!("request", request_id = %request_id)
}

/// Whether the subscriber has been installed
pub fn is_initialized() -> bool {
    LOGGING_INITIALIZED.is_completed()
}
