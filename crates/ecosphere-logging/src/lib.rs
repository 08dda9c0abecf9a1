//! ---
//! eco_section: "03-logging"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Structured logging context and helpers."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Context-enriched tracing helpers shared by the insight service, the HTTP
//! surface and the CLI.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for tools and tests.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Building archetype associated with the log event.
    pub archetype: Option<&'a str>,
    /// Focus metric (energy, carbon, water, waste).
    pub metric: Option<&'a str>,
    /// Insight request sequence token.
    pub request: Option<u64>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a building archetype.
    pub fn with_archetype(mut self, archetype: &'a str) -> Self {
        self.archetype = Some(archetype);
        self
    }

    /// Attach a focus metric.
    pub fn with_metric(mut self, metric: &'a str) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Attach an insight request sequence token.
    pub fn with_request(mut self, request: u64) -> Self {
        self.request = Some(request);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation completed on a degraded path (e.g. static fallback).
    Degraded,
    /// The operation failed or was aborted.
    Fault,
}

impl SystemEventOutcome {
    /// Static label used in structured fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Degraded => "degraded",
            SystemEventOutcome::Fault => "fault",
        }
    }

    fn level(&self) -> Level {
        match self {
            SystemEventOutcome::Success => Level::INFO,
            SystemEventOutcome::Degraded => Level::WARN,
            SystemEventOutcome::Fault => Level::ERROR,
        }
    }
}

/// Emit a standardized system event with an outcome label.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    let archetype = ctx.archetype.unwrap_or("");
    let metric = ctx.metric.unwrap_or("");
    let request = ctx.request.unwrap_or_default();
    match outcome.level() {
        Level::ERROR => tracing::error!(event, outcome = outcome.as_str(), archetype, metric, request, message = %message),
        Level::WARN => tracing::warn!(event, outcome = outcome.as_str(), archetype, metric, request, message = %message),
        _ => tracing::info!(event, outcome = outcome.as_str(), archetype, metric, request, message = %message),
    }
}
