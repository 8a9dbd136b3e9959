use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use crate::mailbox::Mailbox;
use crate::resumable::{Resumable, Retarget};
use crate::yielder::Yielder;

struct PointInner<T> {
    waiter: Option<Rc<dyn Resumable>>,
    mailbox: Mailbox<T>,
}

impl<T: 'static> Retarget for RefCell<PointInner<T>> {
    fn retarget(&self, new_waiter: Rc<dyn Resumable>) {
        self.borrow_mut().waiter = Some(new_waiter);
    }
}

/// An externally-signalled suspension point: a frame awaits one to pause
/// until something outside the coroutine world calls [`SuspensionPoint::resume`].
///
/// Reassigning a point (`*point = SuspensionPoint::default()`) abandons
/// whatever waiter is currently armed on it without resuming it, matching
/// the spec's "assignment to empty" escape hatch.
pub struct SuspensionPoint<T> {
    inner: Rc<RefCell<PointInner<T>>>,
}

impl<T> Default for SuspensionPoint<T> {
    fn default() -> Self {
        SuspensionPoint {
            inner: Rc::new(RefCell::new(PointInner {
                waiter: None,
                mailbox: Mailbox::new(),
            })),
        }
    }
}

impl<T: 'static> SuspensionPoint<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a waiter is currently armed.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().waiter.is_none()
    }

    /// Delivers `value` to the armed waiter and resumes it. A programming
    /// error if nothing is waiting.
    pub fn resume(&self, value: T) {
        let waiter = {
            let mut inner = self.inner.borrow_mut();
            debug_assert!(
                inner.waiter.is_some(),
                "SuspensionPoint::resume() called with no frame waiting on it"
            );
            inner.mailbox.send(value);
            inner.waiter.take()
        };
        if let Some(waiter) = waiter {
            waiter.resume();
        }
    }
}

impl<Y: 'static> Yielder<Y> {
    /// Awaits `point`, suspending until some external caller calls
    /// [`SuspensionPoint::resume`].
    pub fn suspend<T: 'static>(&self, point: &SuspensionPoint<T>) -> SuspensionAwait<T, Y> {
        SuspensionAwait {
            point: Rc::downgrade(&point.inner),
            ctx: Rc::clone(&self.ctx),
            armed: false,
        }
    }
}

pub struct SuspensionAwait<T, Y> {
    // Weak: the point owns this frame while it's suspended (via
    // `PointInner::waiter`), not the other way around. Holding a strong
    // reference here would make abandoning an armed point (dropping it, or
    // reassigning it, without ever firing) leak both the point and the
    // frame instead of deallocating either.
    point: Weak<RefCell<PointInner<T>>>,
    ctx: Rc<crate::yielder::FrameContext<Y>>,
    armed: bool,
}

impl<T: 'static, Y: 'static> Future for SuspensionAwait<T, Y> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<T> {
        if !self.armed {
            let point = self
                .point
                .upgrade()
                .expect("SuspensionPoint dropped before it was ever awaited");
            {
                let mut inner = point.borrow_mut();
                debug_assert!(
                    inner.waiter.is_none(),
                    "SuspensionPoint awaited while a waiter was already armed on it"
                );
                inner.waiter = Some((self.ctx.self_resume)());
            }
            let dyn_rc: Rc<dyn Retarget> = point;
            let weak_dyn: Weak<dyn Retarget> = Rc::downgrade(&dyn_rc);
            *self.ctx.blocked_on.borrow_mut() = Some(weak_dyn);
            self.armed = true;
            return Poll::Pending;
        }

        match self.point.upgrade() {
            Some(point) => {
                let taken = point.borrow_mut().mailbox.take();
                match taken {
                    Some(value) => {
                        *self.ctx.blocked_on.borrow_mut() = None;
                        Poll::Ready(value)
                    }
                    None => {
                        // Spuriously re-polled before the point fired; stay armed.
                        let dyn_rc: Rc<dyn Retarget> = point;
                        let weak_dyn: Weak<dyn Retarget> = Rc::downgrade(&dyn_rc);
                        *self.ctx.blocked_on.borrow_mut() = Some(weak_dyn);
                        Poll::Pending
                    }
                }
            }
            None => {
                // The point was abandoned (dropped, or reassigned) without
                // ever firing. This frame can never complete; it is only
                // waiting for its own last reference to go away.
                *self.ctx.blocked_on.borrow_mut() = None;
                Poll::Pending
            }
        }
    }
}
