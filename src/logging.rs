use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::{config::LoggingConfig, errors::InitializationError, MonitorError};

/// Install the global subscriber.
///
/// Output goes through a non-blocking writer, to stdout or to a daily rolling
/// file under `log_dir`. The returned guard flushes that writer and must be
/// held for the lifetime of the process.
pub fn setup_logging(config: &LoggingConfig) -> Result<WorkerGuard, MonitorError> {
    config.validate()?;

    let timer = OffsetTime::new(
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        time::format_description::well_known::Rfc3339,
    );

    // RUST_LOG directives win over the configured level
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.get_level_filter().into())
        .from_env_lossy();

    let (writer, guard) = match &config.log_dir {
        Some(dir) => tracing_appender::non_blocking(tracing_appender::rolling::daily(
            dir,
            "fleet-monitor.log",
        )),
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(config.thread_ids)
        .with_thread_names(config.thread_names)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_level(true)
        .with_ansi(config.log_dir.is_none())
        .with_timer(timer);

    let layer = if config.is_json() {
        layer.json().with_filter(env_filter).boxed()
    } else {
        layer.with_filter(env_filter).boxed()
    };

    Registry::default().with(layer).try_init().map_err(|e| {
        MonitorError::Init(InitializationError::logging(format!(
            "Failed to initialize logging: {}",
            e
        )))
    })?;

    Ok(guard)
}
