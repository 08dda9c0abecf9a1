//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Shared primitives and utilities for the EcoSphere workspace."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "ECOSPHERE_LOG";

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
static STDOUT_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Available log formats for stdout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Log file stem used when `logging.file_prefix` is not configured.
pub const DEFAULT_FILE_PREFIX: &str = "ecosphere";

/// Filter from `ECOSPHERE_LOG`, then `RUST_LOG`, defaulting to `info`.
fn env_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive ({err}); defaulting to info logging");
            EnvFilter::new("info")
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Install the global subscriber for a long-running service.
///
/// Stdout receives JSON or pretty output per [`LogFormat`]. Every event is also
/// appended as JSON to `{directory}/{file_prefix}.log`, rotated daily. A second
/// call keeps the first subscriber.
pub fn init_tracing(service: &str, config: &LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory)?;
    let file_name = format!(
        "{}.log",
        config.file_prefix.as_deref().unwrap_or(DEFAULT_FILE_PREFIX)
    );
    let (file_writer, file_guard) =
        tracing_appender::non_blocking(daily(&config.directory, &file_name));
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let _ = FILE_GUARD.set(file_guard);
    let _ = STDOUT_GUARD.set(stdout_guard);

    let timer = fmt::time::UtcTime::rfc_3339();
    let stdout_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .json()
            .with_target(false)
            .with_timer(timer.clone())
            .with_writer(stdout_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_timer(timer.clone())
            .with_writer(stdout_writer)
            .boxed(),
    };
    let file_layer = fmt::layer()
        .json()
        .with_timer(timer)
        .with_writer(file_writer)
        .boxed();

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    info!(service, log_file = %config.directory.join(&file_name).display(), format = ?config.format, "tracing initialised");
    Ok(())
}
