//! Logging Infrastructure
//!
//! Command output goes to stdout, so log lines go to stderr or, when a log
//! directory is configured, to a daily rolling file.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Log file prefix inside the log directory
const LOG_FILE_PREFIX: &str = "flor-pos";

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_logger(log_level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if let Err(e) = std::fs::create_dir_all(log_path) {
            eprintln!("Cannot create log directory {dir}: {e}");
        } else {
            let file_appender = tracing_appender::rolling::daily(log_path, LOG_FILE_PREFIX);
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
    }

    subscriber.with_writer(std::io::stderr).init();
}
