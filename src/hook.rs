use std::rc::Rc;

use crate::frame::Handle;
use crate::yielder::Yielder;

/// One entry of a [`HookList`]: a pre-hook, run before the implementation,
/// given the same arguments the implementation will receive.
pub struct PreHook<Y, Args>(Rc<dyn Fn(Args) -> Handle<(), Y>>);

impl<Y, Args> Clone for PreHook<Y, Args> {
    fn clone(&self) -> Self {
        PreHook(Rc::clone(&self.0))
    }
}

/// One entry of a [`HookList`]: a post-hook, run after the implementation,
/// given both the implementation's result and the original arguments.
pub struct PostHook<R, Y, Args>(Rc<dyn Fn(R, Args) -> Handle<(), Y>>);

impl<R, Y, Args> Clone for PostHook<R, Y, Args> {
    fn clone(&self) -> Self {
        PostHook(Rc::clone(&self.0))
    }
}

/// An ordered, identifier-keyed list of hooks.
///
/// Identifiers are handed out from a monotonic counter and never reused,
/// unlike the teacher's `id_alloc::Ids` (a generational allocator built for
/// recycling `bevy::Entity` slots) — reuse would let a stale identifier from
/// a removed hook silently refer to an unrelated later hook, which the spec
/// explicitly rules out.
pub struct HookList<H> {
    entries: Vec<(u64, H)>,
    next_id: u64,
}

impl<H> Default for HookList<H> {
    fn default() -> Self {
        HookList {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<H: Clone> Clone for HookList<H> {
    fn clone(&self) -> Self {
        HookList {
            entries: self.entries.clone(),
            next_id: self.next_id,
        }
    }
}

impl<H> HookList<H> {
    fn push(&mut self, hook: H) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, hook));
        id
    }

    /// Removes the hook with this identifier. Returns `false` if no hook
    /// with that identifier is currently in the list (already removed, or
    /// never existed).
    pub fn remove(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => {
                log::debug!("remove() on hook id {id} that isn't in the list");
                false
            }
        }
    }

    /// Replaces the hook at this identifier in place, preserving its
    /// position in iteration order. Returns `false` if the identifier isn't
    /// present. The public, closure-taking `set` lives on the specific
    /// `HookList<PreHook<..>>`/`HookList<PostHook<..>>` impls below, since
    /// `H`'s fields are private outside this module.
    fn set_entry(&mut self, id: u64, hook: H) -> bool {
        match self.entries.iter_mut().find(|(entry_id, _)| *entry_id == id) {
            Some(entry) => {
                entry.1 = hook;
                true
            }
            None => {
                log::debug!("set() on hook id {id} that isn't in the list");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &H> {
        self.entries.iter().map(|(_, h)| h)
    }
}

impl<Y: 'static, Args: 'static> HookList<PreHook<Y, Args>> {
    /// Adds a pre-hook that receives the call's arguments.
    pub fn add(&mut self, hook: impl Fn(Args) -> Handle<(), Y> + 'static) -> u64 {
        self.push(PreHook(Rc::new(hook)))
    }

    /// Adds a pre-hook that ignores the call's arguments.
    pub fn add_no_arg(&mut self, hook: impl Fn() -> Handle<(), Y> + 'static) -> u64 {
        self.push(PreHook(Rc::new(move |_args: Args| hook())))
    }

    /// Mounts another (void-returning) hook's implementation as a pre-hook,
    /// skipping that hook's own pre/post lists.
    pub fn add_hook(&mut self, hook: &Hook<(), Y, Args>) -> u64 {
        let implementation = Rc::clone(&hook.implementation);
        self.push(PreHook(Rc::new(move |args: Args| implementation(args))))
    }

    /// Replaces the pre-hook at `id` in place. Returns `false` if `id` isn't
    /// present.
    pub fn set(&mut self, id: u64, hook: impl Fn(Args) -> Handle<(), Y> + 'static) -> bool {
        self.set_entry(id, PreHook(Rc::new(hook)))
    }
}

impl<R: 'static, Y: 'static, Args: 'static> HookList<PostHook<R, Y, Args>> {
    /// Adds a post-hook that receives both the result and the arguments.
    ///
    /// This is the general `(result, args)` shape. For a void-returning
    /// `Hook<(), Y, Args>` it collapses to the same shape as `preHooks`
    /// (spec §3 Data Model), so the canonical `add`/`set` on
    /// `HookList<PostHook<(), Y, Args>>` take `Fn(Args)` instead — see the
    /// impl block below. `add_with_result` stays available for every `R`
    /// (including `()`, where the leading argument is just uninteresting)
    /// since Rust has no specialization to let one name cover both shapes.
    pub fn add_with_result(&mut self, hook: impl Fn(R, Args) -> Handle<(), Y> + 'static) -> u64 {
        self.push(PostHook(Rc::new(hook)))
    }

    /// Adds a post-hook that ignores both the result and the arguments.
    pub fn add_no_arg(&mut self, hook: impl Fn() -> Handle<(), Y> + 'static) -> u64 {
        self.push(PostHook(Rc::new(move |_: R, _: Args| hook())))
    }

    /// Adds a post-hook that only wants the result.
    pub fn add_result(&mut self, hook: impl Fn(R) -> Handle<(), Y> + 'static) -> u64 {
        self.push(PostHook(Rc::new(move |r: R, _: Args| hook(r))))
    }

    /// Adds a post-hook that only wants the original arguments.
    pub fn add_args(&mut self, hook: impl Fn(Args) -> Handle<(), Y> + 'static) -> u64 {
        self.push(PostHook(Rc::new(move |_: R, a: Args| hook(a))))
    }

    /// Mounts another (void-returning) hook's implementation as a post-hook,
    /// skipping that hook's own pre/post lists.
    pub fn add_hook(&mut self, hook: &Hook<(), Y, Args>) -> u64 {
        let implementation = Rc::clone(&hook.implementation);
        self.push(PostHook(Rc::new(move |_result: R, args: Args| {
            implementation(args)
        })))
    }

    /// Replaces the post-hook at `id` in place with one taking the general
    /// `(result, args)` shape. Returns `false` if `id` isn't present.
    pub fn set_with_result(&mut self, id: u64, hook: impl Fn(R, Args) -> Handle<(), Y> + 'static) -> bool {
        self.set_entry(id, PostHook(Rc::new(hook)))
    }
}

impl<Y: 'static, Args: 'static> HookList<PostHook<(), Y, Args>> {
    /// Adds a post-hook. For a void-returning implementation there is
    /// nothing meaningful to report back, so the canonical shape collapses
    /// to exactly `preHooks`'s: `Fn(Args) -> Handle<(), Y>` (spec §3 Data
    /// Model, "for R = void, same shape as preHooks"), matching
    /// `examples/original_source/src/include/hook.h:78-115`'s void
    /// specialization, which shares one `PreHookList` class between
    /// `preHooks` and `postHooks`.
    pub fn add(&mut self, hook: impl Fn(Args) -> Handle<(), Y> + 'static) -> u64 {
        self.push(PostHook(Rc::new(move |_: (), a: Args| hook(a))))
    }

    /// Replaces the post-hook at `id` in place. Returns `false` if `id`
    /// isn't present.
    pub fn set(&mut self, id: u64, hook: impl Fn(Args) -> Handle<(), Y> + 'static) -> bool {
        self.set_entry(id, PostHook(Rc::new(move |_: (), a: Args| hook(a))))
    }
}

/// An observable function: an implementation coroutine plus ordered lists of
/// pre- and post-hook coroutines run around every call.
///
/// Grounded in `examples/original_source/src/include/hook.h`'s final-iteration
/// `ObservablePromise<R, Y, Args...>` — the earlier, non-coroutine
/// `ObservableFunction` in `functionhook.h` was superseded by it and has no
/// counterpart here.
pub struct Hook<R, Y, Args> {
    implementation: Rc<dyn Fn(Args) -> Handle<R, Y>>,
    pre_hooks: HookList<PreHook<Y, Args>>,
    post_hooks: HookList<PostHook<R, Y, Args>>,
}

impl<R, Y, Args> Clone for Hook<R, Y, Args> {
    fn clone(&self) -> Self {
        Hook {
            implementation: Rc::clone(&self.implementation),
            pre_hooks: self.pre_hooks.clone(),
            post_hooks: self.post_hooks.clone(),
        }
    }
}

impl<R, Y, Args> Hook<R, Y, Args> {
    /// Builds a hook around `implementation`. `implementation` spawns a
    /// fresh frame for each call; it is never invoked directly by this
    /// constructor.
    pub fn new(implementation: impl Fn(Args) -> Handle<R, Y> + 'static) -> Self {
        Hook {
            implementation: Rc::new(implementation),
            pre_hooks: HookList::default(),
            post_hooks: HookList::default(),
        }
    }

    pub fn pre_hooks(&mut self) -> &mut HookList<PreHook<Y, Args>> {
        &mut self.pre_hooks
    }

    pub fn post_hooks(&mut self) -> &mut HookList<PostHook<R, Y, Args>> {
        &mut self.post_hooks
    }

    /// Calls the implementation directly, bypassing pre- and post-hooks.
    /// What [`HookList::add_hook`] mounts when composing one hook into
    /// another's list.
    pub fn impl_only(&self, args: Args) -> Handle<R, Y> {
        (self.implementation)(args)
    }
}

impl<R: Clone + 'static, Y: Clone + 'static, Args: Clone + 'static> Hook<R, Y, Args> {
    /// Spawns a frame that runs every pre-hook in order, then the
    /// implementation, then every post-hook in order, and completes with the
    /// implementation's result.
    pub fn call(&self, args: Args) -> Handle<R, Y> {
        let implementation = Rc::clone(&self.implementation);
        let pre: Vec<_> = self.pre_hooks.iter().map(|h| Rc::clone(&h.0)).collect();
        let post: Vec<_> = self.post_hooks.iter().map(|h| Rc::clone(&h.0)).collect();

        Handle::spawn(move |yielder: Yielder<Y>| async move {
            for pre_fn in &pre {
                let _ = yielder.await_frame(pre_fn(args.clone())).await;
            }
            let result = yielder
                .await_frame(implementation(args.clone()))
                .await
                .expect("implementation coroutine did not return a value");
            for post_fn in &post {
                let _ = yielder.await_frame(post_fn(result.clone(), args.clone())).await;
            }
            result
        })
    }
}
