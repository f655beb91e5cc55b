use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_NAME: &str = "tama.log";

/// Sends tracing output to `<log_dir>/tama.log`. The terminal belongs to the
/// TUI, so nothing is written to stdout. Failures only produce a warning on
/// stderr; the client runs without logs.
pub fn init_tracing(level: &str, log_dir: &Path) {
    static TRACE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

    if let Err(error) = std::fs::create_dir_all(log_dir) {
        eprintln!(
            "warning: failed to create log directory {}: {error}",
            log_dir.display()
        );
        return;
    }
    let file_writer = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
    {
        Ok(writer) => writer,
        Err(error) => {
            eprintln!("warning: failed to initialize tracing writer: {error}");
            return;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_writer);
    let _ = TRACE_GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking);

    if let Err(error) = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
    {
        eprintln!(
            "warning: failed to initialize tracing subscriber for {}: {error}",
            log_dir.join(LOG_FILE_NAME).display()
        );
    }
}
