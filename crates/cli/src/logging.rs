// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup: a non-blocking file layer driven by the `[logging]`
//! config section, with an optional stdout layer added when `--stdout`
//! is passed — mirroring `backup_utils.get_logger`'s dual file+stream
//! handlers, reworked here as `tracing` layers.

use crate::config_file::LoggingConfig;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Keeps the non-blocking file writer's background thread alive; dropping
/// this flushes and stops it.
pub struct LoggingGuard(#[allow(dead_code)] tracing_appender::non_blocking::WorkerGuard);

/// Initializes the global `tracing` subscriber for one invocation. The
/// log file is named `<customer>_<basename of logging.log_file>` in the
/// same directory, exactly as the original prefixes its log file per
/// customer so concurrent customers' runs don't interleave into one file.
pub fn init(logging: &LoggingConfig, customer: &str, stdout: bool) -> anyhow::Result<LoggingGuard> {
    let log_path = Path::new(&logging.log_file);
    let dir = match log_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("logging.log_file '{}' has no file name", logging.log_file))?;
    let prefixed = format!("{customer}_{}", file_name.to_string_lossy());

    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, prefixed);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));

    let stdout_layer = stdout.then(|| fmt::layer().with_writer(std::io::stdout));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard(guard))
}
