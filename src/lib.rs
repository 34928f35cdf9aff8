//! # navstack
//!
//! A type-erased, stack-based navigation controller for tree-structured UI
//! flows.
//!
//! Independent feature modules declare their own destination types without
//! knowing about each other, while a single shared [`Navigator`] resolves
//! "navigate to X" requests into concrete screens at runtime and maintains
//! the back-stack.
//!
//! ## Example
//! ```
//! use navstack::{Destination, NavigationRoot, Resolver};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
//! enum Home {
//!     Settings,
//!     Profile { user: String },
//! }
//! impl Destination for Home {}
//!
//! let resolver = Resolver::new().route::<Home>(|destination| match destination {
//!     Home::Settings => "settings".to_string(),
//!     Home::Profile { user } => format!("profile of {user}"),
//! });
//!
//! let root = NavigationRoot::new(resolver, || "home".to_string());
//! let navigator = root.navigator();
//!
//! navigator.navigate(Home::Profile { user: "ada".to_string() });
//! assert_eq!(navigator.depth(), 1);
//! assert_eq!(root.screens().len(), 2);
//!
//! navigator.back();
//! assert_eq!(navigator.depth(), 0);
//! assert_eq!(root.screens().len(), 1);
//! ```
//!
//! ## Destinations
//!
//! A destination is a small, application-defined value describing "where to
//! go next", usually an enum with one case per reachable screen, carrying
//! whatever payload the target screen needs. Implementing [`Destination`]
//! makes a type storable in the path: destinations are compared, hashed and
//! encoded structurally, and many unrelated destination types can coexist in
//! the same stack, distinguished only by their runtime type.
//!
//! ## Resolution
//!
//! The controller never knows what a destination renders to. That knowledge
//! lives in the application-wide [`Resolver`], composed out of one
//! [`route`](Resolver::route) per destination type, typically one partial
//! resolver per feature module, [`merge`](Resolver::merge)d at the
//! application root. Resolving a destination no module registered is a
//! wiring bug and fails loud at the first unresolved navigation.
//!
//! ## Roots
//!
//! A [`NavigationRoot`] mounts one [`Navigator`] and hosts the rendered
//! stack: the always-present root content plus one screen per path entry,
//! re-rendered synchronously after every successful mutation. Screens below
//! a root reach its navigator either through the `Copy` handle itself or
//! ambiently through [`use_navigator`] while the root's subtree is built
//! inside [`scoped`](NavigationRoot::scoped). Each root owns its navigator;
//! nested roots (sheets, modals) get their own stack while sharing the outer
//! resolver.

pub mod destination;
pub mod navigator;
pub mod path;
pub mod resolver;
pub mod root;

pub use destination::{AnyDestination, Destination, EncodeError, EncodedDestination};
pub use navigator::{Navigator, NavigatorId, SubscriberId};
pub use path::{EncodedPath, NavigationPath, PathError};
pub use resolver::{DecodeError, ResolveError, Resolver};
pub use root::{NavigationRoot, use_navigator};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::destination::{AnyDestination, Destination};
    pub use crate::navigator::Navigator;
    pub use crate::path::NavigationPath;
    pub use crate::resolver::Resolver;
    pub use crate::root::{NavigationRoot, use_navigator};
}
