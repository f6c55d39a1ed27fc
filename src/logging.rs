use std::path::Path;
use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "piecekeeper=info".into())
}

/// Install the stdout tracing subscriber. Safe to call more than once;
/// only the first call wins (tests call this from several entry points).
pub fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

/// Install the subscriber with an additional daily-rolling file sink under
/// `log_dir`. The returned guard must be held for the process lifetime or
/// buffered lines are lost.
pub fn init_logging_with_file(log_dir: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, "piecekeeper.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let mut installed = false;
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .init();
        installed = true;
    });

    if installed {
        Ok(Some(guard))
    } else {
        // A subscriber was already installed without the file sink.
        Ok(None)
    }
}
