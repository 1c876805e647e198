use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "txn_importer=info";
const VERBOSE_FILTER: &str = "txn_importer=debug,info";

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Compact human-readable logs for interactive runs. `RUST_LOG` wins over `verbose`.
pub fn init_cli_logger(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };

    let _ = tracing_subscriber::registry()
        .with(filter(default))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// JSON lines for unattended runs, so log collectors can parse the counters.
pub fn init_json_logger(level: Option<&str>) {
    let default = match level {
        Some(level) => format!("txn_importer={}", level),
        None => DEFAULT_FILTER.to_string(),
    };

    let _ = tracing_subscriber::registry()
        .with(filter(&default))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .json(),
        )
        .try_init();
}
