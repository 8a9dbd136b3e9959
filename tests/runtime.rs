//! End-to-end coverage for the bare coroutine runtime: suspension points and
//! parallel await (scenario 6 from the testable-properties list).

use filament::{Handle, SuspensionPoint, Yielder};
use std::cell::Cell;
use std::rc::Rc;

fn wrap_point(point: &Rc<SuspensionPoint<()>>) -> Handle<(), ()> {
    let point = Rc::clone(point);
    Handle::spawn(move |y: Yielder<()>| async move {
        y.suspend(&point).await;
    })
}

#[test]
fn suspension_point_resumes_exactly_its_waiter() {
    let _ = env_logger::try_init();
    let point = Rc::new(SuspensionPoint::<i32>::new());
    let point_in_body = Rc::clone(&point);
    let f: Handle<i32, ()> = Handle::spawn(move |y| async move { y.suspend(&point_in_body).await });

    f.start();
    assert!(!f.done());
    assert!(!point.is_empty());

    point.resume(42);
    assert!(f.done());
    assert_eq!(f.returned_value(), 42);
}

#[test]
fn parallel_await_completes_once_after_the_last_fire() {
    let p0 = Rc::new(SuspensionPoint::<()>::new());
    let p1 = Rc::new(SuspensionPoint::<()>::new());
    let p2 = Rc::new(SuspensionPoint::<()>::new());

    let h0 = wrap_point(&p0);
    let h1 = wrap_point(&p1);
    let h2 = wrap_point(&p2);

    let coro: Handle<(), ()> = Handle::spawn(move |y: Yielder<()>| async move {
        let _ = y.join_all(vec![h0, h1, h2]).await;
    });

    coro.start();
    assert!(!coro.done());

    p1.resume(());
    assert!(!coro.done(), "only one of three has fired");

    p0.resume(());
    assert!(!coro.done(), "two of three have fired");

    p2.resume(());
    assert!(coro.done(), "all three have fired");
}

#[test]
fn reassigning_an_empty_point_is_a_no_op() {
    let point = SuspensionPoint::<()>::new();
    assert!(point.is_empty());
    let point = SuspensionPoint::<()>::new();
    assert!(point.is_empty());
    drop(point);
}

/// Sets a shared flag when dropped, so a test can observe a frame being
/// deallocated without needing a `Handle` to ask it.
struct DropSentinel(Rc<Cell<bool>>);

impl Drop for DropSentinel {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

#[test]
fn dropping_the_last_handle_while_suspended_does_not_abandon_the_frame() {
    // spec §4.2.6, "finished-after-release" path: a frame dropped by its
    // owner while suspended on a point lives on via the point's own `Rc`
    // and still completes when the point later fires.
    let point = Rc::new(SuspensionPoint::<i32>::new());
    let ran = Rc::new(Cell::new(false));

    let handle: Handle<(), ()> = Handle::spawn({
        let point = Rc::clone(&point);
        let ran = Rc::clone(&ran);
        move |y: Yielder<()>| async move {
            let v = y.suspend(&point).await;
            ran.set(v == 7);
        }
    });

    handle.start();
    assert!(!handle.done());
    assert!(!point.is_empty());

    drop(handle);
    assert!(!ran.get(), "body must not have run yet");

    point.resume(7);
    assert!(ran.get(), "frame must have been kept alive by the point and completed");
}

#[test]
fn abandoning_a_point_without_firing_deallocates_the_suspended_frame() {
    // spec §4.2.6, "never-finished" path: if the point is dropped before it
    // ever fires, the frame it was keeping alive is silently deallocated,
    // not leaked and not resumed.
    let dropped = Rc::new(Cell::new(false));
    let sentinel = DropSentinel(Rc::clone(&dropped));

    let point = Rc::new(SuspensionPoint::<()>::new());
    let handle: Handle<(), ()> = Handle::spawn({
        let point = Rc::clone(&point);
        move |y: Yielder<()>| async move {
            let _sentinel = sentinel;
            y.suspend(&point).await;
        }
    });

    handle.start();
    assert!(!handle.done());
    assert!(!point.is_empty());

    drop(handle);
    assert!(!dropped.get(), "point still holds the frame alive");

    drop(point);
    assert!(dropped.get(), "frame must be deallocated once its only point is gone");
}

#[test]
fn yield_type_matches_across_nested_frames() {
    let outer: Handle<i32, &'static str> = Handle::spawn(|y: Yielder<&'static str>| async move {
        let inner: Handle<(), &'static str> = Handle::spawn(|y2| async move {
            y2.yield_value("first").await;
            y2.yield_value("second").await;
        });
        let _ = y.await_frame(inner).await;
        7
    });

    outer.start();
    assert_eq!(outer.yielded_value(), "first");

    outer.resume();
    assert_eq!(outer.yielded_value(), "second");

    outer.resume();
    assert!(outer.done());
    assert_eq!(outer.returned_value(), 7);
}
