use std::{any::TypeId, fmt};

use rustc_hash::FxHashMap;

use crate::{
    destination::{AnyDestination, Destination, EncodedDestination},
    path::{EncodedPath, NavigationPath},
};

type RouteFn<V> = Box<dyn Fn(&AnyDestination) -> V>;
type FallbackFn<V> = Box<dyn Fn(&AnyDestination) -> Option<V>>;
type DecodeFn = Box<dyn Fn(&serde_json::Value) -> Result<AnyDestination, serde_json::Error>>;

/// The application-wide dispatch table from opaque destinations to
/// renderable units.
///
/// `V` is whatever the hosting renderer calls a screen; the resolver never
/// constrains it. Each feature module contributes one
/// [`route`](Self::route) per destination type it defines, and the
/// application [`merge`](Self::merge)s the partial resolvers into the one
/// it mounts its [`NavigationRoot`](crate::root::NavigationRoot) with:
///
/// ```
/// use navstack::{Destination, Resolver};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// enum FeedDestination {
///     Post { id: u64 },
/// }
/// impl Destination for FeedDestination {}
///
/// fn feed_routes() -> Resolver<String> {
///     Resolver::new().route::<FeedDestination>(|destination| match destination {
///         FeedDestination::Post { id } => format!("post {id}"),
///     })
/// }
///
/// let resolver = Resolver::new().merge(feed_routes());
/// ```
///
/// The resolver must be total over every destination the application ever
/// pushes. That obligation stays with the caller: resolving an unregistered
/// destination type is a wiring bug (a module was mounted without its
/// routes) and [`resolve`](Self::resolve) panics on it, so the bug surfaces
/// at the first unresolved navigation instead of rendering a fallback.
pub struct Resolver<V> {
    routes: FxHashMap<TypeId, RouteFn<V>>,
    decoders: FxHashMap<&'static str, DecodeFn>,
    fallback: Option<FallbackFn<V>>,
}

impl<V> Default for Resolver<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Resolver<V> {
    /// An empty resolver. Valid, and resolves nothing.
    pub fn new() -> Self {
        Self {
            routes: FxHashMap::default(),
            decoders: FxHashMap::default(),
            fallback: None,
        }
    }

    /// A resolver built from a single total function, for applications that
    /// prefer one hand-written switch over per-type routes.
    pub fn from_fn(provider: impl Fn(&AnyDestination) -> V + 'static) -> Self {
        Self::new().fallback(move |destination| Some(provider(destination)))
    }

    /// Register the handler for one destination type.
    ///
    /// The handler receives the concrete destination and typically switches
    /// over its cases, threading payload data into the screen it builds.
    /// Registering a type twice keeps the later handler. Registration also
    /// records the type's decoder, see [`decode`](Self::decode).
    pub fn route<D: Destination>(mut self, handler: impl Fn(&D) -> V + 'static) -> Self {
        self.routes.insert(
            TypeId::of::<D>(),
            Box::new(move |destination| {
                let destination = destination
                    .downcast_ref::<D>()
                    .expect("to downcast destination for its route");
                handler(destination)
            }),
        );
        self.decoders.insert(
            D::tag(),
            Box::new(|value| serde_json::from_value::<D>(value.clone()).map(AnyDestination::new)),
        );
        self
    }

    /// Chain another partial resolver into this one. Later registrations
    /// win on conflicting types, and `other`'s fallback, if any, replaces
    /// this one's.
    pub fn merge(mut self, other: Resolver<V>) -> Self {
        self.routes.extend(other.routes);
        self.decoders.extend(other.decoders);
        if other.fallback.is_some() {
            self.fallback = other.fallback;
        }
        self
    }

    /// A catch-all partial handler, consulted after the typed routes.
    pub fn fallback(mut self, f: impl Fn(&AnyDestination) -> Option<V> + 'static) -> Self {
        self.fallback = Some(Box::new(f));
        self
    }

    /// Resolve a destination, reporting the miss instead of panicking.
    pub fn try_resolve(&self, destination: &AnyDestination) -> Result<V, ResolveError> {
        if let Some(route) = self.routes.get(&destination.type_id_of()) {
            return Ok(route(destination));
        }
        if let Some(fallback) = &self.fallback {
            if let Some(unit) = fallback(destination) {
                return Ok(unit);
            }
        }
        Err(ResolveError::Unresolved {
            type_tag: destination.type_tag(),
        })
    }

    /// Resolve a destination.
    ///
    /// # Panics
    /// Panics when no route or fallback handles the destination's type,
    /// meaning a module was wired up without registering its routes.
    pub fn resolve(&self, destination: &AnyDestination) -> V {
        match self.try_resolve(destination) {
            Ok(unit) => unit,
            Err(err) => panic!("{err}"),
        }
    }

    /// Decode one encoded entry back into a destination value.
    ///
    /// Only types that went through [`route`](Self::route) can be decoded;
    /// decode totality tracks resolve totality. Unknown tags are data, not
    /// wiring, so they come back as an error rather than a panic.
    pub fn decode(&self, encoded: &EncodedDestination) -> Result<AnyDestination, DecodeError> {
        let decoder = self
            .decoders
            .get(encoded.tag.as_str())
            .ok_or_else(|| DecodeError::UnknownTag(encoded.tag.clone()))?;
        decoder(&encoded.value).map_err(DecodeError::Malformed)
    }

    /// Decode a whole encoded path, oldest entry first.
    pub fn decode_path(&self, encoded: &EncodedPath) -> Result<NavigationPath, DecodeError> {
        encoded.0.iter().map(|entry| self.decode(entry)).collect()
    }
}

/// A destination reached the resolver and nothing handled its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveError {
    Unresolved { type_tag: &'static str },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Unresolved { type_tag } => write!(
                f,
                "no route resolves destination type `{type_tag}`; was its module's resolver merged in?"
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// An encoded path entry could not be turned back into a destination.
#[derive(Debug)]
pub enum DecodeError {
    /// The tag has no registered decoder; the type was never `route`d.
    UnknownTag(String),
    /// The payload failed to deserialize as the registered type.
    Malformed(serde_json::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownTag(tag) => {
                write!(f, "no destination type is registered for tag `{tag}`")
            }
            DecodeError::Malformed(err) => write!(f, "malformed destination payload: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::UnknownTag(_) => None,
            DecodeError::Malformed(err) => Some(err),
        }
    }
}
