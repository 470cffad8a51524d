use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{env_bool, env_string};

const LOG_FILE_PREFIX: &str = "flashcards.log";
/// Crates whose events follow the configured level; everything else stays at warn.
const APP_TARGETS: &[&str] = &["flashcards_backend", "flashcards_core", "tower_http"];

/// Keeps the background log writer alive; flushes on drop.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

pub fn file_logging_enabled() -> bool {
    env_bool("ENABLE_FILE_LOGS").unwrap_or(false)
}

/// Expands a bare level such as `debug` into per-crate directives so
/// dependency chatter (hyper, reqwest, calamine) stays at warn. Full
/// directive strings are used as given.
pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.is_empty() {
        return filter_directives("info");
    }
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directives = vec!["warn".to_string()];
    directives.extend(APP_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(filter_directives(log_level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directives("info")));
    let stdout_layer = fmt::layer().with_target(true);

    let file_layer = file_logging_enabled()
        .then(|| env_string("LOG_DIR").unwrap_or_else(|| "./logs".to_string()))
        .and_then(|log_dir| match std::fs::create_dir_all(&log_dir) {
            Ok(()) => Some(log_dir),
            Err(err) => {
                eprintln!("failed to create log directory {log_dir}: {err}");
                None
            }
        })
        .map(|log_dir| {
            let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
            tracing_appender::non_blocking(appender)
        });

    match file_layer {
        Some((file_writer, guard)) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .init();
            Some(FileLogGuard { _guard: guard })
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_app_crates() {
        assert_eq!(
            filter_directives("debug"),
            "warn,flashcards_backend=debug,flashcards_core=debug,tower_http=debug"
        );
        assert!(EnvFilter::try_new(filter_directives("debug")).is_ok());
    }

    #[test]
    fn test_full_directives_pass_through() {
        assert_eq!(filter_directives("info,reqwest=trace"), "info,reqwest=trace");
        assert_eq!(filter_directives("hyper=debug"), "hyper=debug");
    }

    #[test]
    fn test_blank_level_defaults_to_info() {
        assert_eq!(filter_directives("  "), filter_directives("info"));
    }
}
