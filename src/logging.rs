// Conditional logging macros - only active in debug builds

use crate::config::InterfaceKind;

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

/// Filter used when `RUST_LOG` is unset. The full-screen board owns the
/// terminal, so it only gets log output on request.
#[must_use]
pub fn default_filter(verbose: bool, interface: InterfaceKind) -> &'static str {
    match (verbose, interface) {
        (true, _) => "debug",
        (false, InterfaceKind::Tui) => "off",
        (false, InterfaceKind::Plain) => "warn",
    }
}

/// Installs the stderr logger. `RUST_LOG` wins over [`default_filter`].
pub fn init_logging(verbose: bool, interface: InterfaceKind) {
    let env = env_logger::Env::default().default_filter_or(default_filter(verbose, interface));
    // A second initialisation (tests, embedding) is not an error worth surfacing.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
