//! Tracing subscriber setup
//!
//! This module provides shared tracing configuration used by both
//! the CLI and tests.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use super::warning_log::{WarningLogHandle, WarningLogLayer};
use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// This sets up:
/// - Logging to `log_file_path`, or to stderr when no path is given
/// - Environment-based filtering (RUST_LOG), falling back to the configured level
/// - Warning capture layer that forwards WARN+ to the returned handle
///
/// Returns None if the log file cannot be created or a global subscriber
/// is already installed.
pub fn init_global(
    log_file_path: Option<&Path>,
    logging: &LoggingConfig,
) -> Option<WarningLogHandle> {
    let (warning_layer, warning_handle) =
        super::warning_log::create(Duration::from_secs(logging.warning_dedup_secs));

    match log_file_path {
        Some(path) => {
            let log_file = File::create(path).ok()?;
            build_subscriber(Arc::new(log_file), &logging.level, Some(warning_layer))
                .try_init()
                .ok()?;
        }
        None => {
            build_subscriber(std::io::stderr, &logging.level, Some(warning_layer))
                .try_init()
                .ok()?;
        }
    }

    Some(warning_handle)
}

/// Build a subscriber with formatted logging and an optional warning layer.
///
/// This is the core subscriber configuration shared between the CLI and tests.
pub fn build_subscriber<W>(
    writer: W,
    default_level: &str,
    warning_layer: Option<WarningLogLayer>,
) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .with(warning_layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::warning_log;
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn subscriber_with_warnings(
        window: Duration,
    ) -> (impl tracing::Subscriber + Send + Sync, WarningLogHandle) {
        let (layer, handle) = warning_log::create(window);
        (build_subscriber(std::io::sink, "debug", Some(layer)), handle)
    }

    #[test]
    fn test_warning_layer_captures_warn_and_error() {
        let (subscriber, handle) = subscriber_with_warnings(Duration::from_secs(5));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Knowledge base unreachable");
            tracing::error!("Listing failed");
        });

        let warnings = handle.drain();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("WARN"));
        assert!(warnings[0].contains("Knowledge base unreachable"));
        assert!(warnings[1].contains("ERROR"));
    }

    #[test]
    fn test_warning_layer_ignores_info_and_debug() {
        let (subscriber, handle) = subscriber_with_warnings(Duration::from_secs(5));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Fetched roots");
            tracing::debug!("Expanded A");
        });

        assert!(handle.drain().is_empty());
    }

    #[test]
    fn test_warning_layer_deduplicates() {
        let (subscriber, handle) = subscriber_with_warnings(Duration::from_secs(60));

        tracing::subscriber::with_default(subscriber, || {
            for _ in 0..5 {
                tracing::warn!("Listing children of B failed");
            }
            tracing::warn!("Listing children of C failed");
        });

        assert_eq!(handle.drain().len(), 2);
    }

    #[test]
    fn test_file_writer_receives_log_lines() {
        let log_file = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(Arc::new(log_file.reopen().unwrap()), "debug", None);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Test warning message");
        });

        let mut contents = String::new();
        log_file.reopen().unwrap().read_to_string(&mut contents).unwrap();
        assert!(contents.contains("Test warning message"));
    }
}
