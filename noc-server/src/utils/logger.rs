//! Logging Infrastructure
//!
//! Structured logging setup with console output by default and an
//! optional daily-rotated file appender.

use std::path::Path;

/// Initialize the logger: console output at the given level, plus a
/// daily-rotated file appender when a log directory is configured.
pub fn init_logger_with_file(log_level: &str, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level.parse().unwrap_or(tracing::Level::INFO))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "noc-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
