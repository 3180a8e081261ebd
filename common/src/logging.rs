pub use tracing;

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => ($crate::logging::tracing::error!($($arg)+))
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => ($crate::logging::tracing::trace!($($arg)+))
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => ($crate::logging::tracing::info!($($arg)+))
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => ($crate::logging::tracing::debug!($($arg)+))
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => ($crate::logging::tracing::warn!($($arg)+))
}

/// Logs the message as an error event, then panics with it.
#[macro_export]
macro_rules! log_fatal {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::logging::tracing::error!(target: $target, $($arg)+);
        panic!($($arg)+)
    }};
    ($($arg:tt)+) => {{
        $crate::logging::tracing::error!($($arg)+);
        panic!($($arg)+)
    }};
}
