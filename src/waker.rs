use std::task::{RawWaker, RawWakerVTable, Waker};

/// A waker that does nothing when woken.
///
/// This runtime never parks on an OS primitive waiting to be woken up: every
/// frame is driven forward exactly when the host program calls `start`,
/// `resume`, or `SuspensionPoint::resume`, so the waker handed to
/// `Future::poll` is purely a formality required by the `Future` trait.
pub(crate) fn create() -> Waker {
    // Safety: the waker points to a vtable whose functions do nothing.
    // Doing nothing is memory-safe.
    unsafe { Waker::from_raw(RAW_WAKER) }
}

const RAW_WAKER: RawWaker = RawWaker::new(std::ptr::null(), &VTABLE);
const VTABLE: RawWakerVTable = RawWakerVTable::new(clone, do_nothing, do_nothing, do_nothing);

unsafe fn clone(_: *const ()) -> RawWaker {
    RAW_WAKER
}
unsafe fn do_nothing(_: *const ()) {}
