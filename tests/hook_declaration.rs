//! The hook-declaration helper (`declare_hook!`) and the self-pointer /
//! copy-on-write behavior from spec §9, grounded directly in
//! `examples/original_source/test/idhook.cpp`'s `IDHookOwner` /
//! `set_pre_hook_after_copy` scenario: a parent owns a hook whose `impl`
//! reaches back into the parent's own state, and copying the parent leaves
//! the two hook lists independently mutable afterwards.

use filament::{declare_hook, Handle, Yielder};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

declare_hook!(pub EmptyHook: Hook<(), (), ()>);

struct Owner {
    empty_hook: EmptyHook,
    function_count: RefCell<i32>,
}

impl Owner {
    /// Builds a fresh owner whose hook's `impl` closes over a `Weak`
    /// back-pointer to itself — the Rust stand-in for the original's raw
    /// `self` pointer into the enclosing parent (spec §4.3 "Self pointer").
    fn new() -> Rc<RefCell<Owner>> {
        Rc::new_cyclic(|weak: &Weak<RefCell<Owner>>| {
            RefCell::new(Owner {
                empty_hook: EmptyHook::new(Self::impl_closure(weak.clone())),
                function_count: RefCell::new(0),
            })
        })
    }

    fn impl_closure(self_ptr: Weak<RefCell<Owner>>) -> impl Fn(()) -> Handle<(), ()> + 'static {
        move |_args: ()| {
            let self_ptr = self_ptr.clone();
            Handle::spawn(move |_y: Yielder<()>| async move {
                let owner = self_ptr.upgrade().expect("owner dropped while its hook was running");
                *owner.borrow().function_count.borrow_mut() += 1;
            })
        }
    }

    /// Models "copying the parent" (spec §9): a brand new owner is built
    /// whose hook's `impl` closes over the *new* cell, then the source's
    /// pre/post hook lists are grafted onto it by value. No pointer-fixup
    /// pass is needed the way the original's copy-initializer performs one
    /// — `HookList::clone` already hands back an independent list.
    fn duplicate(src: &Rc<RefCell<Owner>>) -> Rc<RefCell<Owner>> {
        let copy = Owner::new();
        let pre = src.borrow_mut().empty_hook.pre_hooks().clone();
        let post = src.borrow_mut().empty_hook.post_hooks().clone();
        {
            let mut copy_ref = copy.borrow_mut();
            *copy_ref.empty_hook.pre_hooks() = pre;
            *copy_ref.empty_hook.post_hooks() = post;
        }
        copy
    }
}

fn add_called(called: &Rc<RefCell<Vec<i32>>>, value: i32) -> impl Fn(()) -> Handle<(), ()> + 'static {
    let called = Rc::clone(called);
    move |_args: ()| {
        let called = Rc::clone(&called);
        Handle::spawn(move |_y: Yielder<()>| async move {
            called.borrow_mut().push(value);
        })
    }
}

#[test]
fn hook_impl_reaches_parent_state_through_self_pointer() {
    let owner = Owner::new();
    let call = owner.borrow().empty_hook.call(());
    call.start();
    assert!(call.done());
    assert_eq!(*owner.borrow().function_count.borrow(), 1);
}

#[test]
fn set_pre_hook_after_copy() {
    let _ = env_logger::try_init();
    let owner = Owner::new();
    let called: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));

    let mut ids = Vec::new();
    for i in 0..6 {
        let id = owner.borrow_mut().empty_hook.pre_hooks().add(add_called(&called, i));
        ids.push(id);
    }

    assert!(owner
        .borrow_mut()
        .empty_hook
        .pre_hooks()
        .set(ids[2], add_called(&called, 10)));
    assert!(owner.borrow_mut().empty_hook.pre_hooks().remove(ids[4]));
    assert!(!owner
        .borrow_mut()
        .empty_hook
        .pre_hooks()
        .set(ids[4], add_called(&called, 10)));

    let copy = Owner::duplicate(&owner);
    copy.borrow_mut().empty_hook.pre_hooks().set(ids[0], add_called(&called, 9));

    let p = owner.borrow().empty_hook.call(());
    let q = copy.borrow().empty_hook.call(());
    p.start();
    q.start();

    assert_eq!(*called.borrow(), vec![0, 1, 10, 3, 5, 9, 1, 10, 3, 5]);
    assert_eq!(*owner.borrow().function_count.borrow(), 1);
    assert_eq!(*copy.borrow().function_count.borrow(), 1);

    // The copy's own mutation never touched the original's list.
    assert_eq!(owner.borrow_mut().empty_hook.pre_hooks().len(), 5);
    assert_eq!(copy.borrow_mut().empty_hook.pre_hooks().len(), 5);
}
