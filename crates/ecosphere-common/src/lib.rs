//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Shared primitives and utilities for the EcoSphere workspace."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
//! Shared primitives for the EcoSphere workspace.
//! This crate exposes configuration loading and tracing initialisation
//! consumed by the CLI, the HTTP surface and the integration tests.

pub mod config;
pub mod logging;

pub use config::{
    ApiConfig, AppConfig, DashboardConfig, InsightsConfig, LoadedAppConfig, LoggingConfig,
    SimulationConfig,
};
pub use logging::{init_tracing, LogFormat};
