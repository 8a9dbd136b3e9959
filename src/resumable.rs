use std::rc::Rc;

/// Type-erased "poke this frame forward one step" handle.
///
/// `Rc<RefCell<frame::Inner<R, Y>>>` coerces straight to `Rc<dyn Resumable>`
/// (the impl lives on `RefCell<Inner<R, Y>>` in `frame.rs`), which is what
/// lets a [`crate::SuspensionPoint`] hold a waiter without knowing that
/// waiter's return type. Holding the `Rc` (not a `Weak`) is what keeps a
/// frame alive after its owner drops the handle while it is still suspended.
pub(crate) trait Resumable {
    fn resume(&self);
}

/// Lets an ancestor frame move a [`crate::SuspensionPoint`]'s stored waiter
/// from a descendant frame onto itself, so that firing the point resumes
/// from the top of the await chain rather than skipping straight to the
/// deeply-nested frame that originally armed it (see `frame::FrameAwait`).
///
/// Frames only ever hold a `Weak<dyn Retarget>` to whatever they're blocked
/// on (`FrameContext::blocked_on`, `suspension::SuspensionAwait::point`): the
/// point already owns the frame for as long as it's armed
/// (`PointInner::waiter`), so a frame holding a strong reference back would
/// form a cycle that survives the point being dropped or reassigned without
/// ever firing.
pub(crate) trait Retarget {
    fn retarget(&self, new_waiter: Rc<dyn Resumable>);
}
