/// Errors recoverable by a caller, as opposed to the programming-error
/// contract violations (double-arming a [`crate::SuspensionPoint`], resuming
/// a finished frame) that this crate detects with `debug_assert!`/`panic!`
/// instead, since those can only come from a bug in the host program rather
/// than from data the host program doesn't control.
#[derive(Debug, thiserror::Error)]
pub enum PromiseError {
    /// A frame of non-`()` return type ran to completion without ever
    /// setting its return value. Only possible if the body itself panics
    /// after partially running, or is built by hand rather than through the
    /// normal `async` sugar; surfaced at the point an ancestor `await`s the
    /// offending frame.
    #[error("function did not return a value")]
    MissingReturnValue,
}
