use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    rc::Rc,
};

use slotmap::{SlotMap, new_key_type};

use crate::{
    destination::{AnyDestination, Destination},
    path::{NavigationPath, PathError},
    resolver::{ResolveError, Resolver},
};

new_key_type! {
    /// A stable identifier for a navigator.
    pub struct NavigatorId;
}

thread_local! {
    static NAVIGATORS: RefCell<SlotMap<NavigatorId, Rc<dyn Any>>> =
        RefCell::new(SlotMap::with_key());
}

/// Identifies one subscription created with [`Navigator::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct NavigatorState<V> {
    path: RefCell<NavigationPath>,
    resolver: Rc<Resolver<V>>,
    subscribers: RefCell<HashMap<SubscriberId, Rc<dyn Fn()>>>,
    next_subscriber: Cell<u64>,
}

/// The single mutation point for one navigation root's back-stack, and the
/// single dispatch point from opaque destinations to renderable units.
///
/// A `Navigator` is a cheap `Copy` handle; the path and resolver it fronts
/// live for as long as the owning [`NavigationRoot`](crate::root::NavigationRoot)
/// (or until [`dispose`](Self::dispose)). The path is exclusively owned:
/// nothing else mutates it, and every successful mutation notifies the
/// subscribed renderers synchronously, after the path is fully updated.
///
/// All of this is single-threaded: handles only reach state
/// created on the current thread, and there is no locking and nothing
/// asynchronous anywhere. Every operation completes before returning.
pub struct Navigator<V> {
    pub(crate) id: NavigatorId,
    pub(crate) ty: PhantomData<V>,
}

impl<V> Copy for Navigator<V> {}

impl<V> Clone for Navigator<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Eq for Navigator<V> {}

impl<V> PartialEq for Navigator<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> fmt::Debug for Navigator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator").field("id", &self.id).finish()
    }
}

impl<V: 'static> Navigator<V> {
    /// Create a navigator with an empty path.
    ///
    /// The resolver is fixed for the navigator's lifetime and must be total
    /// over every destination the application will ever push through this
    /// navigator; see [`Resolver`].
    pub fn new(resolver: Resolver<V>) -> Self {
        Self::with_shared(Rc::new(resolver))
    }

    /// Create a navigator sharing an already mounted resolver, as nested
    /// roots do.
    pub fn with_shared(resolver: Rc<Resolver<V>>) -> Self {
        let state: Rc<dyn Any> = Rc::new(NavigatorState {
            path: RefCell::new(NavigationPath::new()),
            resolver,
            subscribers: RefCell::new(HashMap::new()),
            next_subscriber: Cell::new(0),
        });
        let id = NAVIGATORS.with(|navigators| navigators.borrow_mut().insert(state));
        Navigator {
            id,
            ty: PhantomData,
        }
    }

    /// Limit the path's depth; see [`NavigationPath::with_max_depth`].
    pub fn with_max_depth(self, limit: usize) -> Self {
        self.state().path.borrow_mut().set_max_depth(Some(limit));
        self
    }

    fn state(&self) -> Rc<NavigatorState<V>> {
        NAVIGATORS
            .with(|navigators| navigators.borrow().get(self.id).cloned())
            .expect("to use a navigator before its root is torn down")
            .downcast::<NavigatorState<V>>()
            .unwrap_or_else(|_| panic!("navigator state holds a different renderable unit type"))
    }

    /// Push a destination, triggering a transition to the screen it
    /// resolves to.
    ///
    /// Resolution is lazy: the destination is stored opaquely and resolved
    /// by the hosting container at render time, on every render pass. On a
    /// depth-limited path that is already full this is a soft-fail no-op;
    /// use [`try_navigate`](Self::try_navigate) to observe that case.
    pub fn navigate(&self, destination: impl Destination) {
        self.navigate_any(AnyDestination::new(destination));
    }

    /// [`navigate`](Self::navigate) for an already erased destination.
    pub fn navigate_any(&self, destination: AnyDestination) {
        let _ = self.try_navigate_any(destination);
    }

    pub fn try_navigate(&self, destination: impl Destination) -> Result<(), PathError> {
        self.try_navigate_any(AnyDestination::new(destination))
    }

    pub fn try_navigate_any(&self, destination: AnyDestination) -> Result<(), PathError> {
        let state = self.state();
        state.path.borrow_mut().push(destination)?;
        self.notify(&state);
        Ok(())
    }

    /// Navigate back one screen.
    pub fn back(&self) {
        self.back_by(1);
    }

    /// Navigate back `count` screens.
    ///
    /// A count larger than the current depth is a silent no-op: nothing is
    /// removed and subscribers are not notified. [`try_back_by`](Self::try_back_by)
    /// reports that case instead.
    pub fn back_by(&self, count: usize) {
        let _ = self.try_back_by(count);
    }

    pub fn try_back_by(&self, count: usize) -> Result<(), PathError> {
        let state = self.state();
        state.path.borrow_mut().pop_last(count)?;
        self.notify(&state);
        Ok(())
    }

    /// Return to the root of the navigation stack. The root is both the
    /// initial state and freely re-enterable.
    pub fn back_to_root(&self) {
        let state = self.state();
        state.path.borrow_mut().clear();
        self.notify(&state);
    }

    /// Resolve the renderable unit for a destination without pushing it.
    ///
    /// This is the same dispatch the hosting container uses for stack
    /// entries; screens use it directly to render a destination inline, in
    /// a sheet or modal, rather than on the stack.
    ///
    /// # Panics
    /// Propagates the resolver's fail-loud behavior for unregistered
    /// destination types; see [`Resolver::resolve`].
    pub fn view_for(&self, destination: impl Destination) -> V {
        self.view_for_any(&AnyDestination::new(destination))
    }

    pub fn view_for_any(&self, destination: &AnyDestination) -> V {
        self.state().resolver.resolve(destination)
    }

    pub fn try_view_for(&self, destination: impl Destination) -> Result<V, ResolveError> {
        self.try_view_for_any(&AnyDestination::new(destination))
    }

    pub fn try_view_for_any(&self, destination: &AnyDestination) -> Result<V, ResolveError> {
        self.state().resolver.try_resolve(destination)
    }

    /// The shared resolver, for mounting nested roots.
    pub fn resolver(&self) -> Rc<Resolver<V>> {
        self.state().resolver.clone()
    }

    /// The current depth of the back-stack.
    pub fn depth(&self) -> usize {
        self.with_path(NavigationPath::len)
    }

    /// A snapshot of the current path.
    pub fn path(&self) -> NavigationPath {
        self.with_path(NavigationPath::clone)
    }

    /// Observe the path without cloning it.
    pub fn with_path<O>(&self, f: impl FnOnce(&NavigationPath) -> O) -> O {
        let state = self.state();
        let path = state.path.borrow();
        f(&path)
    }

    /// Subscribe to path changes.
    ///
    /// The subscriber runs synchronously after every successful mutation,
    /// observing the fully updated path; failed mutations (an oversized
    /// pop, a push past the depth limit) do not notify.
    pub fn subscribe(&self, subscriber: impl Fn() + 'static) -> SubscriberId {
        let state = self.state();
        let id = SubscriberId(state.next_subscriber.get());
        state.next_subscriber.set(id.0 + 1);
        state
            .subscribers
            .borrow_mut()
            .insert(id, Rc::new(subscriber));
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.state().subscribers.borrow_mut().remove(&id);
    }

    fn notify(&self, state: &NavigatorState<V>) {
        // Snapshot first; a subscriber may subscribe or unsubscribe while
        // observing the change.
        let subscribers: Vec<Rc<dyn Fn()>> =
            state.subscribers.borrow().values().cloned().collect();
        for subscriber in subscribers {
            subscriber();
        }
    }

    pub fn id(&self) -> NavigatorId {
        self.id
    }

    /// Drop the navigator's state. Called when the owning root is torn
    /// down; any handle used afterwards panics.
    pub fn dispose(&self) {
        NAVIGATORS.with(|navigators| {
            navigators.borrow_mut().remove(self.id);
        });
    }
}

/// Whether `id` is live and fronts state for renderable unit type `V`.
pub(crate) fn state_matches<V: 'static>(id: NavigatorId) -> bool {
    NAVIGATORS.with(|navigators| {
        navigators
            .borrow()
            .get(id)
            .is_some_and(|state| state.is::<NavigatorState<V>>())
    })
}
