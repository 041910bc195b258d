//! Logging helpers shared by every crate in the workspace.

/// Target used for "positive outcome" events; the CLI formatter renders them
/// with a distinct status symbol.
pub const SUCCESS_TARGET: &str = "edgescan::success";

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}
