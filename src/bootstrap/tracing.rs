//! Setup for the application tracing.
//!
//! It redirects the tracing info to the standard output with the tracing level and style defined in the settings.
//!
//! - `Off` (i.e. don't load any subscriber...)
//! - `Error`
//! - `Warn`
//! - `Info`
//! - `Debug`
//! - `Trace`
//!
//! Refer to the [settings documentation](crate::settings) to know how to change tracing settings.
use std::sync::Once;

use tracing::info;

use crate::settings::{Settings, TraceLevel, TraceStyle};

static INIT: Once = Once::new();

/// It redirects the tracing info to the standard output with the tracing level defined in the settings.
pub fn setup(settings: &Settings) {
    let Some(level) = config_level(settings.log_level) else {
        return;
    };

    INIT.call_once(|| {
        stdout_config(level, settings.log_style);
    });
}

fn config_level(trace_level: TraceLevel) -> Option<tracing::Level> {
    match trace_level {
        TraceLevel::Off => None,
        TraceLevel::Error => Some(tracing::Level::ERROR),
        TraceLevel::Warn => Some(tracing::Level::WARN),
        TraceLevel::Info => Some(tracing::Level::INFO),
        TraceLevel::Debug => Some(tracing::Level::DEBUG),
        TraceLevel::Trace => Some(tracing::Level::TRACE),
    }
}

fn stdout_config(level: tracing::Level, style: TraceStyle) {
    let builder = tracing_subscriber::fmt().with_max_level(level);

    let () = match style {
        TraceStyle::Full => builder.init(),
        TraceStyle::Pretty => builder.pretty().init(),
        TraceStyle::Compact => builder.compact().init(),
        TraceStyle::Json => builder.json().init(),
    };

    info!(%level, %style, "tracing initialized.");
}
