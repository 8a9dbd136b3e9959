use std::cell::Cell;
use std::rc::Rc;

/// A single-slot, single-threaded mailbox: a coroutine primitive writes into
/// it right before returning `Poll::Pending`, and whoever drives the
/// surrounding frame picks the value back up on the next step.
///
/// Capacity of exactly one, shared by clone. This is the same shape as the
/// teacher's `executor::msg_channel::{Sender, Receiver}` pair and its
/// `coro_param::YieldChannel`, generalized to hold any `T` (yielded values,
/// suspension-point resume values) instead of one fixed `WaitingReason` enum.
pub(crate) struct Mailbox<T> {
    slot: Rc<Cell<Option<T>>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self {
            slot: Rc::new(Cell::new(None)),
        }
    }
}

impl<T> Mailbox<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn send(&self, value: T) {
        self.slot.replace(Some(value));
    }

    pub(crate) fn take(&self) -> Option<T> {
        self.slot.replace(None)
    }
}
