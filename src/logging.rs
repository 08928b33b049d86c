use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MAX_LOG_FILES: usize = 20;

/// Console on stderr plus a daily rotated file in `log_dir`.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose. The
/// returned guard flushes the file writer on drop and must live until exit.
pub fn init(log_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
    let file_appender = Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix("antv_schema")
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to open log file")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(guard)
}
