//! ---
//! eco_section: "03-logging"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Structured logging context and helpers."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---

/// Shared expansion for the level-specific macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __eco_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            $level,
            archetype = ctx.archetype.unwrap_or(""),
            metric = ctx.metric.unwrap_or(""),
            request = ctx.request.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational log enriched with EcoSphere context.
#[macro_export]
macro_rules! eco_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::INFO, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a debug log enriched with EcoSphere context.
#[macro_export]
macro_rules! eco_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a warning log enriched with EcoSphere context.
#[macro_export]
macro_rules! eco_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::WARN, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::WARN, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit an error log enriched with EcoSphere context.
#[macro_export]
macro_rules! eco_error {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::ERROR, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__eco_event!(tracing::Level::ERROR, $crate::LogContext::default(), $($arg)+)
    };
}
