use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "monitor-tui.log";

/// Route `tracing` output to `<dir>/monitor-tui.log`. The terminal belongs to the
/// TUI, so nothing goes to stdout/stderr.
pub fn init_logging(dir: &Path) {
    let file_appender = rolling::never(dir, LOG_FILE);
    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, headless reruns) is not an error worth surfacing
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();
}
