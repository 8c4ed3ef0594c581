use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/disparity.log";

/// Filter for both layers. A bare level such as `debug` only raises this
/// workspace's crates; full directives are passed through untouched.
fn filter_directive(level: Option<&str>) -> String {
    match level.map(str::trim).filter(|l| !l.is_empty()) {
        None => "info".to_string(),
        Some(l) if l.contains('=') || l.contains(',') => l.to_string(),
        Some(l) => format!("info,disparity={l},disparity_core={l}"),
    }
}

/// Console output goes to stderr so the per-image result lines on stdout stay
/// clean; the file layer also records worker thread names.
pub fn init_logger() -> WorkerGuard {
    let directive = filter_directive(env::var("TRACING_LEVEL").ok().as_deref());
    let log_file = PathBuf::from(env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.into()));

    let file_appender = tracing_appender::rolling::never("./", &log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();
    let file = fmt::layer()
        .with_writer(file_writer)
        .with_thread_names(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(EnvFilter::new(&directive))
        .init();

    debug!("Logging with '{}' to {}", directive, log_file.display());
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(None), "info");
        assert_eq!(filter_directive(Some("  ")), "info");
        assert_eq!(
            filter_directive(Some("debug")),
            "info,disparity=debug,disparity_core=debug"
        );
        assert_eq!(filter_directive(Some("rayon=trace")), "rayon=trace");
        assert_eq!(filter_directive(Some("warn,disparity_core=trace")), "warn,disparity_core=trace");
    }
}
