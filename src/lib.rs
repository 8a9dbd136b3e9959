//! A single-threaded cooperative coroutine runtime, plus an observable
//! function ("hook") layer built on top of it.
//!
//! A coroutine body is an ordinary `async` block or `async fn`. [`Handle`]
//! wraps one in a lazily-started, reference-counted frame that can be
//! stepped one `resume` at a time, can emit intermediate [`yield`][Handle::yielded_value]
//! values, can await other frames (propagating their yields), and can await
//! externally-signalled [`SuspensionPoint`]s. [`Hook`] composes an
//! implementation coroutine with ordered, identifier-keyed lists of
//! pre- and post-hook coroutines.
//!
//! Nothing here is thread-safe on purpose: frames, suspension points and
//! hook lists are built on `Rc`/`RefCell` and are driven entirely by
//! whichever thread calls `start`/`resume`.

mod error;
mod frame;
mod hook;
mod mailbox;
mod optional;
mod par;
mod resumable;
mod suspension;
mod waker;
mod yielder;

pub use error::PromiseError;
pub use frame::{FrameAwait, Handle};
pub use hook::{Hook, HookList, PostHook, PreHook};
pub use optional::{Optional, OptionalRef, OptionalUnit};
pub use par::JoinAll;
pub use suspension::{SuspensionAwait, SuspensionPoint};
pub use yielder::{YieldNow, Yielder};

/// Stamps out a uniquely-typed, newtype-wrapped [`Hook`] that a parent type
/// installs as an ordinary field.
///
/// This is the Rust realization of the hook-declaration helper described in
/// the spec: declarative macros can't expand to a single field inline inside
/// a hand-written `struct { .. }` body the way the original's `HOOK(...)`
/// macro stamps out a member, so `declare_hook!` instead generates a small
/// wrapper type — `Deref`/`DerefMut` to [`Hook`] so it's used exactly like
/// one — that the parent then declares a plain field of, the same way a
/// parent would declare a field of any other named type:
///
/// ```
/// use filament::{declare_hook, Handle, Yielder};
///
/// declare_hook!(pub EmptyHook: Hook<(), (), ()>);
///
/// struct Owner {
///     empty_hook: EmptyHook,
/// }
/// # let _ = EmptyHook::new(|_args: ()| Handle::spawn(|_y: Yielder<()>| async {}));
/// ```
///
/// `impl`s defined out-of-line as member functions of the parent (as the
/// original's `Promise<R> Owner::hook_name::impl(...)` does) have no direct
/// Rust equivalent either, since a closure can't be "a method of `Owner`"
/// without capturing a handle back to one; the parent instead builds the
/// `impl` closure in its own constructor, typically capturing a
/// `Weak<RefCell<Owner>>` back-pointer it upgrades on every call — see
/// `tests/hook_declaration.rs` for the full pattern, including how "the
/// parent is copied" (spec §9's self-pointer fixup) falls out of building a
/// fresh `Rc<RefCell<Owner>>` and grafting the old pre/post hook lists onto
/// hooks that close over the new one, rather than patching a raw pointer.
#[macro_export]
macro_rules! declare_hook {
    ($vis:vis $name:ident : Hook<$result:ty, $yield:ty $(, $arg:ty)* $(,)?>) => {
        #[derive(Clone)]
        $vis struct $name($crate::Hook<$result, $yield $(, $arg)*>);

        impl $name {
            $vis fn new(
                implementation: impl Fn($($arg),*) -> $crate::Handle<$result, $yield> + 'static,
            ) -> Self {
                $name($crate::Hook::new(implementation))
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::Hook<$result, $yield $(, $arg)*>;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}
