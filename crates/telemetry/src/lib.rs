//! Tracing bootstrap shared by the server binary and the CLI.

use anyhow::Context;
use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when neither the settings nor `RUST_LOG` provide directives.
pub const DEFAULT_FILTER: &str =
    "bookshelf=info,bookshelf_app=info,bookshelf_http=info,bookshelf_authz=info,bookshelf_db=info,tower_http=info,sqlx=warn";

/// Build the filter: configured directives first, then `RUST_LOG`, then the default.
pub fn build_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match &settings.filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{}'", directives)),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global subscriber.
///
/// Calling this twice is harmless: the second install is skipped, which keeps
/// tests and the CLI free to initialize eagerly.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .try_init(),
    };

    if installed.is_ok() {
        tracing::info!(
            target: "bookshelf-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_filter_is_validated() {
        let settings = TelemetrySettings {
            log_format: LogFormat::Pretty,
            filter: Some("bookshelf_app=debug".to_string()),
        };
        assert!(build_filter(&settings).is_ok());

        let broken = TelemetrySettings {
            log_format: LogFormat::Json,
            filter: Some("bookshelf_app=loud".to_string()),
        };
        assert!(build_filter(&broken).is_err());
    }

    #[test]
    fn init_twice_is_not_an_error() {
        let settings = TelemetrySettings::default();
        init(&settings).unwrap();
        init(&settings).unwrap();
    }
}
