//! Logging infrastructure - structured tracing throughout the call engine
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log levels per module
//! - Zero-cost when disabled
//! - Span-based tracking of each native call
//! - Console or file output

use once_cell::sync::OnceCell;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

// Re-export tracing macros for use throughout the crate
pub use tracing::{debug, debug_span, error, info, trace, warn, Level};

/// Global logging state; holds the file writer guard when logging to a file
static LOGGER_INITIALIZED: OnceCell<Option<WorkerGuard>> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Log file path; console output when `None`
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // CALLC_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("CALLC_LOG_LEVEL") {
            config.level = parse_level(&level_str);
        }

        // CALLC_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("CALLC_LOG_FILE") {
            config.log_path = Some(path);
        }

        config.json_format = std::env::var("CALLC_LOG_JSON").is_ok();
        config.show_spans = std::env::var("CALLC_LOG_SPANS").is_ok();

        config
    }
}

/// Parse a level name, falling back to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging with configuration from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration (first call wins)
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("callc={}", config.level.as_str().to_lowercase()))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let (writer, guard) = match &config.log_path {
            Some(path) => {
                let path = Path::new(path);
                let directory = path.parent().unwrap_or_else(|| Path::new("."));
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "callc.log".to_string());
                let appender = tracing_appender::rolling::never(directory, file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                (writer, Some(guard))
            }
            None => {
                let (writer, guard) = tracing_appender::non_blocking(io::stderr());
                (writer, Some(guard))
            }
        };

        let layer = if config.json_format {
            fmt::layer()
                .with_writer(writer)
                .json()
                .with_span_events(span_events)
                .with_target(true)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(writer)
                .with_span_events(span_events)
                .with_target(true)
                .with_thread_ids(cfg!(debug_assertions))
                .with_line_number(cfg!(debug_assertions))
                .boxed()
        };

        // Another subscriber may already be installed by the embedder
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init();

        guard
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

// ============================================================================
// Call-engine logging functions
// ============================================================================

/// Log a native call about to be dispatched
#[inline]
pub fn log_ffi_call(fn_name: &str, arg_count: usize) {
    debug!(
        event = "ffi_call",
        function = fn_name,
        args = arg_count,
        "native routine called"
    );
}

/// Log a native call return
#[inline]
pub fn log_ffi_return(fn_name: &str) {
    trace!(
        event = "ffi_return",
        function = fn_name,
        "native routine returned"
    );
}

/// Log a fatal call error
pub fn log_ffi_error(fn_name: &str, error: &str) {
    error!(
        event = "ffi_error",
        function = fn_name,
        error = error,
        "native call failed"
    );
}

/// Log an integer result promoted to a boxed double
#[inline]
pub fn log_promotion(fn_name: &str, from: &str) {
    trace!(
        event = "result_promotion",
        function = fn_name,
        from = from,
        to = "double",
        "integer result outside inline range"
    );
}

/// Log engine initialization
pub fn log_runtime_init() {
    info!(event = "runtime_init", "callc engine initialized");
}
