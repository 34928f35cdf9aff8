//! Rendering-container protocol tests.
//!
//! These tests verify that:
//! - A root always renders `depth + 1` screens, root content first
//! - Re-rendering happens synchronously after each successful mutation,
//!   re-invoking the resolver once per path entry and the root closure once
//! - Payload data carried by destinations is threaded into the screens
//!   the resolver builds, across unrelated destination types in one stack
//! - Ambient lookup resolves the nearest enclosing root, and nested roots
//!   own independent stacks while sharing the outer resolver

use std::cell::Cell;
use std::rc::Rc;

use navstack::{Destination, NavigationRoot, Resolver, use_navigator};
use serde::{Deserialize, Serialize};

// Two feature modules' worth of destinations, wired up the way an
// application composes its resolver: one partial resolver per module,
// merged at the root.

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum HomeDestination {
    Feed,
    Compose,
}
impl Destination for HomeDestination {}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum ProfileDestination {
    Profile { user: String },
}
impl Destination for ProfileDestination {}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Screen(String);

fn home_routes() -> Resolver<Screen> {
    Resolver::new().route::<HomeDestination>(|destination| match destination {
        HomeDestination::Feed => Screen("feed".to_string()),
        HomeDestination::Compose => Screen("compose".to_string()),
    })
}

fn profile_routes() -> Resolver<Screen> {
    Resolver::new().route::<ProfileDestination>(|destination| match destination {
        ProfileDestination::Profile { user } => Screen(format!("profile:{user}")),
    })
}

fn app_resolver() -> Resolver<Screen> {
    home_routes().merge(profile_routes())
}

fn app_root() -> NavigationRoot<Screen> {
    NavigationRoot::new(app_resolver(), || Screen("home".to_string()))
}

#[test]
fn the_root_screen_is_always_present() {
    let root = app_root();
    assert_eq!(root.navigator().depth(), 0);
    assert_eq!(*root.screens(), vec![Screen("home".to_string())]);
}

#[test]
fn screens_track_depth_plus_one() {
    let root = app_root();
    let navigator = root.navigator();

    navigator.navigate(HomeDestination::Feed);
    assert_eq!(root.screen_count(), navigator.depth() + 1);
    navigator.navigate(HomeDestination::Compose);
    assert_eq!(root.screen_count(), navigator.depth() + 1);
    navigator.back();
    assert_eq!(root.screen_count(), navigator.depth() + 1);
    navigator.back_to_root();
    assert_eq!(root.screen_count(), 1);
}

#[test]
fn unrelated_destination_types_share_one_stack() {
    let root = app_root();
    let navigator = root.navigator();

    navigator.navigate(HomeDestination::Feed);
    navigator.navigate(ProfileDestination::Profile {
        user: "ada".to_string(),
    });

    assert_eq!(
        *root.screens(),
        vec![
            Screen("home".to_string()),
            Screen("feed".to_string()),
            Screen("profile:ada".to_string()),
        ],
        "root first, then path order, payload threaded through"
    );
}

#[test]
fn the_resolver_runs_once_per_entry_per_render() {
    let resolved = Rc::new(Cell::new(0));
    let rooted = Rc::new(Cell::new(0));
    let resolver = Resolver::new().route::<HomeDestination>({
        let resolved = resolved.clone();
        move |_| {
            resolved.set(resolved.get() + 1);
            Screen("screen".to_string())
        }
    });
    let root = NavigationRoot::new(resolver, {
        let rooted = rooted.clone();
        move || {
            rooted.set(rooted.get() + 1);
            Screen("home".to_string())
        }
    });
    let navigator = root.navigator();
    assert_eq!((rooted.get(), resolved.get()), (1, 0), "initial render");

    navigator.navigate(HomeDestination::Feed);
    assert_eq!((rooted.get(), resolved.get()), (2, 1), "depth 1 render");

    navigator.navigate(HomeDestination::Feed);
    assert_eq!((rooted.get(), resolved.get()), (3, 3), "depth 2 render");

    navigator.back();
    assert_eq!((rooted.get(), resolved.get()), (4, 4), "depth 1 render again");

    navigator.back_by(5); // soft-fail: no mutation, no render
    assert_eq!((rooted.get(), resolved.get()), (4, 4));
}

#[test]
fn inline_resolution_does_not_touch_the_stack() {
    let root = app_root();
    let navigator = root.navigator();
    // a screen rendering a destination in a sheet rather than pushing it
    let sheet = navigator.view_for(ProfileDestination::Profile {
        user: "ada".to_string(),
    });
    assert_eq!(sheet, Screen("profile:ada".to_string()));
    assert_eq!(navigator.depth(), 0);
    assert_eq!(root.screen_count(), 1);
}

#[test]
fn use_navigator_sees_the_enclosing_root_only() {
    assert!(use_navigator::<Screen>().is_none(), "no root in scope");

    let root = app_root();
    let found = root.scoped(|| use_navigator::<Screen>());
    assert_eq!(found, Some(root.navigator()));

    assert!(
        use_navigator::<Screen>().is_none(),
        "scope ended with the closure"
    );
}

#[test]
fn nested_scopes_resolve_innermost_first() {
    let outer = app_root();
    let inner = app_root();

    outer.scoped(|| {
        assert_eq!(use_navigator::<Screen>(), Some(outer.navigator()));
        inner.scoped(|| {
            assert_eq!(use_navigator::<Screen>(), Some(inner.navigator()));
        });
        assert_eq!(use_navigator::<Screen>(), Some(outer.navigator()));
    });
}

#[test]
fn nested_roots_share_the_resolver_but_not_the_stack() {
    let root = app_root();
    let navigator = root.navigator();
    navigator.navigate(HomeDestination::Feed);

    let sheet = root.nested(ProfileDestination::Profile {
        user: "ada".to_string(),
    });
    assert_eq!(
        *sheet.screens(),
        vec![Screen("profile:ada".to_string())],
        "the nested root's first screen is the resolved destination"
    );

    sheet.navigator().navigate(HomeDestination::Compose);
    assert_eq!(sheet.navigator().depth(), 1);
    assert_eq!(navigator.depth(), 1, "the outer stack is untouched");
    assert_ne!(sheet.navigator(), navigator);
}

#[test]
#[should_panic(expected = "before its root is torn down")]
fn a_navigator_does_not_outlive_its_root() {
    let navigator = {
        let root = app_root();
        root.navigator()
    };
    navigator.depth();
}
