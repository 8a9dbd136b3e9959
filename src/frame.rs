use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use crate::error::PromiseError;
use crate::optional::Optional;
use crate::resumable::{Resumable, Retarget};
use crate::waker;
use crate::yielder::{FrameContext, Yielder};

/// The state a lazily-started, steppable coroutine frame carries between
/// calls to `start`/`resume`. Mirrors the teacher's `CoroState`/`Fib` split,
/// but here the body is a native `async` block driven by a single dummy
/// `Waker` per step (the same one-poll-per-resume idiom as the teacher's
/// `function_coroutine.rs`) instead of a hand-rolled state machine.
struct Inner<R, Y> {
    future: Pin<Box<dyn Future<Output = R>>>,
    started: bool,
    done: bool,
    yielded: bool,
    yield_value: Optional<Y>,
    return_value: Optional<R>,
    ctx: Rc<FrameContext<Y>>,
}

fn do_resume<R: 'static, Y: 'static>(cell: &RefCell<Inner<R, Y>>) {
    let mut inner = cell.borrow_mut();
    debug_assert!(!inner.done, "resume() called on a frame that has already run to completion");

    inner.yielded = false;
    inner.yield_value = Optional::empty();

    let waker = waker::create();
    let mut cx = Context::from_waker(&waker);
    // Safety-free: `future` is already `Pin<Box<..>>`, `as_mut()` just
    // reborrows it.
    match inner.future.as_mut().poll(&mut cx) {
        Poll::Ready(value) => {
            inner.done = true;
            inner.return_value = Optional::filled(value);
            log::trace!("frame ran to completion");
        }
        Poll::Pending => {
            if let Some(y) = inner.ctx.yield_mailbox.take() {
                inner.yielded = true;
                inner.yield_value = y;
                log::trace!("frame yielded");
            } else {
                log::trace!("frame suspended without yielding");
            }
        }
    }
}

impl<R: 'static, Y: 'static> Resumable for RefCell<Inner<R, Y>> {
    fn resume(&self) {
        do_resume(self);
    }
}

/// A reference-counted handle to a coroutine frame.
///
/// `Handle` *is* an `Rc`, so its own strong count is the frame's ref count:
/// the frame is destroyed exactly when the last `Handle` (and the last
/// waiter registered on any [`crate::SuspensionPoint`] it is currently
/// suspended on) goes away, with no extra bookkeeping needed.
pub struct Handle<R, Y>(Rc<RefCell<Inner<R, Y>>>);

impl<R, Y> Clone for Handle<R, Y> {
    fn clone(&self) -> Self {
        Handle(Rc::clone(&self.0))
    }
}

impl<R: 'static, Y: 'static> Handle<R, Y> {
    /// Builds a lazily-started frame around `body`. `body` receives a
    /// [`Yielder`] it can use to emit yields and await other awaitables; it
    /// does not run at all until the first call to [`Handle::start`].
    pub fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Yielder<Y>) -> Fut,
        Fut: Future<Output = R> + 'static,
    {
        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Inner<R, Y>>>| {
            let weak_self = weak.clone();
            let self_resume: Box<dyn Fn() -> Rc<dyn Resumable>> = Box::new(move || {
                let strong = weak_self
                    .upgrade()
                    .expect("frame resumed itself after being dropped");
                strong as Rc<dyn Resumable>
            });
            let ctx = Rc::new(FrameContext {
                yield_mailbox: crate::mailbox::Mailbox::new(),
                blocked_on: RefCell::new(None),
                self_resume,
            });
            let yielder = Yielder { ctx: Rc::clone(&ctx) };
            let future: Pin<Box<dyn Future<Output = R>>> = Box::pin(body(yielder));
            RefCell::new(Inner {
                future,
                started: false,
                done: false,
                yielded: false,
                yield_value: Optional::empty(),
                return_value: Optional::empty(),
                ctx,
            })
        });
        Handle(inner)
    }

    /// Runs the frame's first step. A no-op safety net aside, calling this
    /// more than once on the same frame is a programming error.
    pub fn start(&self) {
        {
            let mut inner = self.0.borrow_mut();
            debug_assert!(!inner.started, "start() called twice on the same frame");
            inner.started = true;
        }
        self.resume();
    }

    /// Runs one more step: advances the body until it next yields, awaits
    /// something that isn't ready, or returns.
    pub fn resume(&self) {
        do_resume(&self.0);
    }

    pub fn started(&self) -> bool {
        self.0.borrow().started
    }

    pub fn done(&self) -> bool {
        self.0.borrow().done
    }

    pub fn yielded(&self) -> bool {
        self.0.borrow().yielded
    }

    pub fn yielded_value(&self) -> Optional<Y>
    where
        Y: Clone,
    {
        self.0.borrow().yield_value.clone()
    }

    pub fn returned_value(&self) -> Optional<R>
    where
        R: Clone,
    {
        self.0.borrow().return_value.clone()
    }

    pub(crate) fn blocked_on(&self) -> Option<Weak<dyn Retarget>> {
        self.0.borrow().ctx.blocked_on.borrow().clone()
    }
}

impl<Y: 'static> Yielder<Y> {
    /// Awaits another frame to completion, forwarding every value it yields
    /// along the way as though this frame had yielded it directly, and
    /// re-targeting any [`crate::SuspensionPoint`] the callee ends up
    /// blocked on so that firing it resumes from the top of the await chain
    /// instead of skipping straight to the nested frame.
    ///
    /// This is the "wait for callee" procedure: in the spec's model a frame
    /// drives its callee explicitly and copies state back up by hand; here
    /// the equivalent falls out of polling a child `Handle` from within a
    /// parent's own `async` body, since Rust's own `.await` machinery
    /// already re-enters exactly this point on every subsequent poll.
    pub fn await_frame<R2: 'static>(&self, child: Handle<R2, Y>) -> FrameAwait<R2, Y> {
        FrameAwait {
            child,
            ctx: Rc::clone(&self.ctx),
            started: false,
        }
    }
}

pub struct FrameAwait<R, Y> {
    child: Handle<R, Y>,
    ctx: Rc<FrameContext<Y>>,
    started: bool,
}

impl<R: 'static + Clone, Y: 'static + Clone> Future for FrameAwait<R, Y> {
    type Output = Result<R, PromiseError>;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.started {
            self.child.start();
            self.started = true;
        } else {
            self.child.resume();
        }

        if self.child.done() {
            *self.ctx.blocked_on.borrow_mut() = None;
            let value = self.child.returned_value().into_inner();
            return Poll::Ready(value.ok_or(PromiseError::MissingReturnValue));
        }

        if self.child.yielded() {
            // Forwarded yield: the callee's value becomes this frame's
            // yielded value for this step.
            self.ctx.yield_mailbox.send(self.child.yielded_value());
            *self.ctx.blocked_on.borrow_mut() = None;
            return Poll::Pending;
        }

        match self.child.blocked_on() {
            Some(weak_target) => match weak_target.upgrade() {
                Some(target) => {
                    target.retarget((self.ctx.self_resume)());
                    *self.ctx.blocked_on.borrow_mut() = Some(weak_target);
                }
                None => {
                    *self.ctx.blocked_on.borrow_mut() = None;
                }
            },
            None => {
                *self.ctx.blocked_on.borrow_mut() = None;
            }
        }
        Poll::Pending
    }
}
