use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// Files roll daily under `log_dir` as JSON lines. `RUST_LOG` overrides the
/// default filter.
pub fn init_logging(log_dir: &str) {
    install(log_dir, true);
}

/// File-only logging, for interactive commands that own the terminal.
pub fn init_file_logging(log_dir: &str) {
    install(log_dir, false);
}

fn install(log_dir: &str, console: bool) {
    let _ = fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, "roamsix.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let console_layer = console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stdout)
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("roamsix=debug,info"));

    // try_init so repeated calls (tests, CLI subcommands) don't panic
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    // The guard flushes on drop; keep it for the life of the process
    std::mem::forget(guard);
}
