use std::{
    cell::{Ref, RefCell},
    marker::PhantomData,
    rc::Rc,
};

use crate::{
    destination::{AnyDestination, Destination},
    navigator::{Navigator, NavigatorId, SubscriberId, state_matches},
    resolver::Resolver,
};

thread_local! {
    static ACTIVE_ROOTS: RefCell<Vec<NavigatorId>> = const { RefCell::new(Vec::new()) };
}

/// The mount point of one navigation stack.
///
/// A root pairs a [`Navigator`] with the always-present root content and
/// hosts the rendered stack: after every successful path mutation it
/// re-renders synchronously, invoking the root closure once and the
/// resolver once per path entry, so [`screens`](Self::screens) always holds
/// exactly `depth + 1` units with the root content at index 0.
///
/// Because the whole stack is re-resolved on every render pass, resolvers
/// and root closures must be pure, side-effect-free and cheap functions of
/// their input.
///
/// Each independently mounted root owns its navigator; dropping the root
/// tears the navigator down.
pub struct NavigationRoot<V: 'static> {
    navigator: Navigator<V>,
    screens: Rc<RefCell<Vec<V>>>,
    subscription: SubscriberId,
}

impl<V: 'static> NavigationRoot<V> {
    /// Mount a root over `resolver`, with `root` producing the content of
    /// the always-present first screen.
    pub fn new(resolver: Resolver<V>, root: impl Fn() -> V + 'static) -> Self {
        Self::with_navigator(Navigator::new(resolver), root)
    }

    fn with_navigator(navigator: Navigator<V>, root: impl Fn() -> V + 'static) -> Self {
        let root_fn: Rc<dyn Fn() -> V> = Rc::new(root);
        let screens = Rc::new(RefCell::new(Vec::new()));
        render_stack(navigator, &root_fn, &screens);
        let subscription = navigator.subscribe({
            let root_fn = root_fn.clone();
            let screens = screens.clone();
            move || render_stack(navigator, &root_fn, &screens)
        });
        NavigationRoot {
            navigator,
            screens,
            subscription,
        }
    }

    /// Limit this root's path depth; see [`NavigationPath::with_max_depth`](crate::path::NavigationPath::with_max_depth).
    pub fn with_max_depth(self, limit: usize) -> Self {
        self.navigator.with_max_depth(limit);
        self
    }

    /// This root's navigator. Handles are `Copy`; pass them into screens
    /// that need to navigate.
    pub fn navigator(&self) -> Navigator<V> {
        self.navigator
    }

    /// The rendered stack, root content first. Always `depth + 1` entries.
    ///
    /// The borrow must not be held across a navigation, which re-renders
    /// the stack.
    pub fn screens(&self) -> Ref<'_, Vec<V>> {
        self.screens.borrow()
    }

    pub fn screen_count(&self) -> usize {
        self.screens.borrow().len()
    }

    /// Mount a new root whose root content is the resolved `destination`,
    /// sharing this root's resolver.
    ///
    /// This is how a sheet or modal gets its own navigation stack while
    /// resolving the same destinations as the presenting stack.
    pub fn nested(&self, destination: impl Destination) -> NavigationRoot<V> {
        let resolver = self.navigator.resolver();
        let destination = AnyDestination::new(destination);
        let navigator = Navigator::with_shared(resolver.clone());
        Self::with_navigator(navigator, move || resolver.resolve(&destination))
    }

    /// Run `f` with this root as the innermost ambient root, so code in
    /// `f` (typically the construction of this root's subtree of screens)
    /// can reach the navigator through [`use_navigator`].
    pub fn scoped<O>(&self, f: impl FnOnce() -> O) -> O {
        ACTIVE_ROOTS.with(|roots| roots.borrow_mut().push(self.navigator.id()));
        let result = f();
        ACTIVE_ROOTS.with(|roots| {
            roots.borrow_mut().pop();
        });
        result
    }
}

impl<V: 'static> Drop for NavigationRoot<V> {
    fn drop(&mut self) {
        self.navigator.unsubscribe(self.subscription);
        self.navigator.dispose();
    }
}

// TODO: reuse unchanged screens across renders instead of rebuilding the
// whole stack; entries are Eq + Hash precisely so a host can diff them.
fn render_stack<V: 'static>(
    navigator: Navigator<V>,
    root_fn: &Rc<dyn Fn() -> V>,
    screens: &Rc<RefCell<Vec<V>>>,
) {
    let resolver = navigator.resolver();
    let mut stack = Vec::with_capacity(navigator.depth() + 1);
    stack.push(root_fn());
    navigator.with_path(|path| {
        for destination in path.entries() {
            stack.push(resolver.resolve(destination));
        }
    });
    *screens.borrow_mut() = stack;
}

/// The navigator of the nearest enclosing navigation root, or `None` when
/// no root with renderable unit type `V` is in scope.
///
/// This is scoped lookup, not a global: it only sees roots whose
/// [`scoped`](NavigationRoot::scoped) call is currently on the stack of
/// this thread, innermost first, so independently mounted roots (nested
/// modals included) each hand out their own navigator.
pub fn use_navigator<V: 'static>() -> Option<Navigator<V>> {
    ACTIVE_ROOTS.with(|roots| {
        let roots = roots.borrow();
        roots
            .iter()
            .rev()
            .find(|id| state_matches::<V>(**id))
            .map(|id| Navigator {
                id: *id,
                ty: PhantomData,
            })
    })
}
