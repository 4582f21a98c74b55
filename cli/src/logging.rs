use std::path::Path;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Days of log files kept in `HANDSPELL_LOG_DIR`.
const MAX_LOG_FILES: usize = 7;

/// Install the global subscriber.
///
/// Logs go to a daily rolling file when `HANDSPELL_LOG_DIR` is set, otherwise
/// to stderr. `RUST_LOG` overrides the default `info` level. Keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(dir) = std::env::var("HANDSPELL_LOG_DIR") {
        let dir = Path::new(&dir);
        let appender = std::fs::create_dir_all(dir).and_then(|_| {
            BasicRollingFileAppender::new(
                dir.join("handspell.log"),
                RollingConditionBasic::new().daily(),
                MAX_LOG_FILES,
            )
        });
        match appender {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .init();
                return Some(guard);
            }
            Err(e) => eprintln!("Cannot log to {}: {e}", dir.display()),
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}
