use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

use super::filter::DebugOnlyFilter;
use super::filter::ErrorWarnFilter;
use super::filter::InfoAndAboveFilter;
use super::format::AtharFormat;
use crate::config::LoggingConfig;
use crate::err_with_loc;
use crate::error::EngineError;

/// Keeps the non-blocking file writers flushing until dropped.
pub struct TracingGuards {
    _guards: Vec<WorkerGuard>,
}

pub fn setup_tracing(
    engine_name: &str,
    logging_config: &LoggingConfig,
) -> crate::Result<TracingGuards> {
    let base_logs_dir = Path::new(logging_config.directory.as_deref().unwrap_or(".logs"));

    let logs_dirs = [base_logs_dir.to_path_buf(), base_logs_dir.join("debug"), base_logs_dir.join("error")];

    for dir in &logs_dirs {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| {
                err_with_loc!(EngineError::SetupTracingError(format!(
                    "failed_to_create_logs_directory::{}::{}",
                    dir.display(),
                    e
                )))
            })?;
        }
    }

    let file_name = format!("{}.log", engine_name);
    let info_appender = RollingFileAppender::new(Rotation::DAILY, base_logs_dir, &file_name);
    let debug_appender = RollingFileAppender::new(Rotation::DAILY, base_logs_dir.join("debug"), &file_name);
    let error_appender = RollingFileAppender::new(Rotation::DAILY, base_logs_dir.join("error"), &file_name);

    let (non_blocking_info, info_guard) = tracing_appender::non_blocking(info_appender);
    let (non_blocking_debug, debug_guard) = tracing_appender::non_blocking(debug_appender);
    let (non_blocking_error, error_guard) = tracing_appender::non_blocking(error_appender);

    let format = AtharFormat {
        engine_name: engine_name.to_string(),
    };

    let terminal_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("athar={}", logging_config.terminal_level)));

    let subscriber = tracing_subscriber::registry()
        // Terminal output, RUST_LOG driven
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(true)
                .event_format(format.clone())
                .with_filter(terminal_filter),
        )
        // INFO log file - info and above
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .event_format(format.clone())
                .with_writer(non_blocking_info)
                .with_filter(InfoAndAboveFilter),
        )
        // DEBUG log file - debug only
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .event_format(format.clone())
                .with_writer(non_blocking_debug)
                .with_filter(DebugOnlyFilter),
        )
        // ERROR log file - warn and error only
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .event_format(format)
                .with_writer(non_blocking_error)
                .with_filter(ErrorWarnFilter),
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| err_with_loc!(EngineError::SetupTracingError(e.to_string())))?;

    tracing::info!("{}_logging_started::info_logs::{}/{}", engine_name, base_logs_dir.display(), file_name);
    tracing::info!("{}_logging_started::debug_logs::{}/debug/{}", engine_name, base_logs_dir.display(), file_name);
    tracing::info!("{}_logging_started::error_logs::{}/error/{}", engine_name, base_logs_dir.display(), file_name);

    Ok(TracingGuards {
        _guards: vec![info_guard, debug_guard, error_guard],
    })
}
