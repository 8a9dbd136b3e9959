use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use crate::mailbox::Mailbox;
use crate::optional::Optional;
use crate::resumable::{Resumable, Retarget};

/// Everything a running body needs to talk back to the frame that owns it,
/// shared between the frame's own bookkeeping (`frame::Inner`) and whatever
/// `Yielder` was handed to the body at construction time.
///
/// Grounded in the same split the teacher uses between `Fib` (handed to the
/// body) and the executor-side state it quietly shares a channel with —
/// `coroutine::Fib` plus `coroutine::coro_param::YieldChannel`.
pub(crate) struct FrameContext<Y> {
    pub(crate) yield_mailbox: Mailbox<Optional<Y>>,
    // Weak: this frame doesn't own whatever it's blocked on (a
    // `SuspensionPoint`, via an ancestor's `FrameAwait`/`JoinAll`) — the
    // point owns the frame, through `PointInner::waiter`, not the other way
    // around. A strong reference here would pair with that one into a cycle
    // that never drops if the point is abandoned without ever firing.
    pub(crate) blocked_on: RefCell<Option<Weak<dyn Retarget>>>,
    pub(crate) self_resume: Box<dyn Fn() -> Rc<dyn Resumable>>,
}

/// Handed to a coroutine body so it can emit yields and await other
/// awaitables without needing to know anything about the frame that owns it.
///
/// Cloning a `Yielder` is cheap (it's a single `Rc` clone) and safe: every
/// clone talks to the same frame, mirroring how the teacher's `Fib` is
/// deliberately *not* user-cloneable but is freely passed by value into the
/// one body that owns it.
pub struct Yielder<Y> {
    pub(crate) ctx: Rc<FrameContext<Y>>,
}

impl<Y> Clone for Yielder<Y> {
    fn clone(&self) -> Self {
        Self {
            ctx: Rc::clone(&self.ctx),
        }
    }
}

impl<Y: 'static> Yielder<Y> {
    /// Suspends the current step, handing `value` to whoever is waiting on
    /// this frame (a direct caller of `resume`, or an ancestor frame that
    /// `await`s this one and forwards the value onward).
    pub fn yield_value(&self, value: Y) -> YieldNow<Y> {
        YieldNow {
            ctx: Rc::clone(&self.ctx),
            pending: Some(Optional::filled(value)),
        }
    }

    /// Suspends the current step without producing a value.
    pub fn yield_nothing(&self) -> YieldNow<Y> {
        YieldNow {
            ctx: Rc::clone(&self.ctx),
            pending: Some(Optional::empty()),
        }
    }
}

/// The future behind [`Yielder::yield_value`]/[`Yielder::yield_nothing`].
///
/// Two-poll shape lifted straight from the teacher's `coroutine::duration::NextTick`:
/// the first poll deposits the yielded value in the frame's mailbox and
/// reports `Pending`; the next poll (driven by the next `resume`) reports
/// `Ready` and the body continues.
pub struct YieldNow<Y> {
    ctx: Rc<FrameContext<Y>>,
    pending: Option<Optional<Y>>,
}

impl<Y> Unpin for YieldNow<Y> {}

impl<Y> Future for YieldNow<Y> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        match self.pending.take() {
            Some(value) => {
                self.ctx.yield_mailbox.send(value);
                Poll::Pending
            }
            None => Poll::Ready(()),
        }
    }
}
