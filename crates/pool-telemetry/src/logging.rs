//! Structured log helpers.
//!
//! Every pool log line carries a `component` field so JSON output can be
//! filtered per pool instance. Amounts are logged as plain integers.

/// Log a pool event with the standard `component` and `operation` fields.
///
/// ```rust,ignore
/// log_pool_event!(info, "enter", "Holder entered", holder = ?holder, shares = 10u128);
/// ```
#[macro_export]
macro_rules! log_pool_event {
    (info, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = "collateral-pool",
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = "collateral-pool",
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };

    (error, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = "collateral-pool",
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = "collateral-pool",
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a rejected operation with its error family.
#[macro_export]
macro_rules! log_rejection {
    ($operation:expr, $family:expr, $error:expr) => {
        tracing::debug!(
            component = "collateral-pool",
            operation = $operation,
            family = $family,
            error = %$error,
            "Operation rejected"
        )
    };
}
