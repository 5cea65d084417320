// Logging shim: forwards to `tracing` when the feature is on, otherwise expands to nothing.
//
// Usage: `vlog!(debug, count = n, "message")`.

#[cfg(feature = "tracing")]
macro_rules! vlog {
    (trace, $($tt:tt)*) => {
        tracing::trace!(target: "virtual_sortable_adapter", $($tt)*)
    };
    (debug, $($tt:tt)*) => {
        tracing::debug!(target: "virtual_sortable_adapter", $($tt)*)
    };
    (warn, $($tt:tt)*) => {
        tracing::warn!(target: "virtual_sortable_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vlog {
    ($level:ident, $($tt:tt)*) => {};
}
