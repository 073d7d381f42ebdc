//! callc - native routine call engine for a dynamically typed interpreter
//!
//! Marshals interpreter values into native calling conventions, calls the
//! routine through an arity-specialized stub and boxes the result.

pub mod config;
pub mod gc;
pub mod interop;
pub mod logging;
pub mod objects;

// Re-export core types
pub use config::{Config, UnknownReturn};
pub use gc::RefCount;
pub use interop::{
    call_native, define_c_routine, CallEngine, CallError, CallingConvention, DefineError,
    RoutineDescriptor, RoutineTable, TypeCode,
};
pub use objects::Value;

use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Process-wide configuration; defaults until `init_with_config` runs
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Initialize with the discovered `.callcrc.toml`, environment log settings
/// taking precedence
pub fn init() {
    let config = Config::discover();
    let mut log = config.logging.to_log_config();
    if std::env::var_os("CALLC_LOG_LEVEL").is_some()
        || std::env::var_os("CALLC_LOG_FILE").is_some()
    {
        log = logging::LogConfig::from_env();
    }
    install(config, log);
}

/// Initialize with an explicit configuration
pub fn init_with_config(config: Config) {
    let log = config.logging.to_log_config();
    install(config, log);
}

fn install(config: Config, log: logging::LogConfig) {
    logging::init_with_config(log);
    if CONFIG.set(config).is_err() {
        logging::warn!("configuration already installed; keeping the first one");
    }
    interop::init();
    logging::log_runtime_init();
}

/// Runtime initialization
#[no_mangle]
pub extern "C" fn callc_init() {
    init();
}
