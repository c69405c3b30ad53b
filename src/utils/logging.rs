use std::sync::Arc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    registry, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;
use crate::utils::time::{log_stamp, Clock};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Stamps log lines from an injected [`Clock`] instead of reading the
/// system time directly, so tests can pin timestamps.
#[derive(Clone)]
pub struct ClockTimer(pub Arc<dyn Clock>);

impl FormatTime for ClockTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", log_stamp(self.0.as_ref()))
    }
}

/// Filter used when `RUST_LOG` is unset: other crates at `warn`, this
/// crate's events at `level`. Event targets carry the crate name, not the
/// configured `app_name`, which only names the log file.
pub fn default_directive(level: Level) -> String {
    format!(
        "warn,{}={}",
        env!("CARGO_CRATE_NAME"),
        level.as_str().to_lowercase()
    )
}

/// Initialize the tracing system with the given configuration
///
/// Returns the file appender guard when a log directory is configured.
/// Keep it alive for the lifetime of the process or buffered file output
/// is lost on exit.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use smb_opener::config::LoggingConfig;
/// use smb_opener::utils::logging::init_logging;
/// use smb_opener::utils::time::SystemClock;
///
/// let _guard = init_logging(&LoggingConfig::default(), Arc::new(SystemClock));
/// ```
pub fn init_logging(config: &LoggingConfig, clock: Arc<dyn Clock>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.log_level)));

    let timer = ClockTimer(clock);
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if let Some(log_dir) = &config.log_dir {
        let file_appender = rolling::daily(log_dir, format!("{}.log", config.app_name));
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_timer(timer.clone());
        if config.json_format {
            layers.push(file_layer.json().boxed());
        } else {
            layers.push(file_layer.boxed());
        }
    }

    // Console output is the fallback when nothing else is configured.
    let console = config.log_to_console || config.log_dir.is_none();
    if console {
        let stdout_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_timer(timer);
        if config.json_format {
            layers.push(stdout_layer.json().boxed());
        } else {
            layers.push(stdout_layer.with_ansi(true).boxed());
        }
    }

    if registry().with(layers).with(filter).try_init().is_err() {
        tracing::debug!("Global subscriber already installed");
        return guard;
    }

    if !config.log_to_console && config.log_dir.is_none() {
        tracing::warn!("No log output configured, defaulting to stdout");
    }
    tracing::info!("Logging initialized at {} level", config.log_level);
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_targets_this_crate() {
        let directive = default_directive(Level::INFO);
        assert_eq!(directive, "warn,smb_opener=info");
        assert!(directive.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn directive_ignores_app_name() {
        let config = LoggingConfig {
            app_name: "smb-opener".to_string(),
            ..LoggingConfig::default()
        };
        let directive = default_directive(config.log_level);
        assert!(directive.contains(module_path!().split("::").next().unwrap_or_default()));
        assert!(!directive.contains(&config.app_name));
    }
}
