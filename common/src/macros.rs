//! Console logging shortcuts.
//!
//! Everything goes through `tracing`; the CLI formatter decides how each line
//! looks. `success!` is an info event under a dedicated target so it can be
//! rendered differently from plain progress messages.

/// Target used by [`success!`] events.
pub const SUCCESS_TARGET: &str = "netsweep::success";

/// Target used for raw, unprefixed console output.
pub const PRINT_TARGET: &str = "netsweep::print";

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: $crate::macros::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!($($arg)*)
    };
}
