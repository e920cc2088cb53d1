#![deny(missing_docs)]
//! History integration for the waypoint router.
//!
//! The router never talks to a host directly. Every location read and every history write goes
//! through a [`History`] provider. This crate defines the trait, the [`Location`] mirror the router
//! exposes to views, and an in-memory provider that behaves like a browser tab.

mod memory;
pub use memory::*;

/// A read-only snapshot of the host location.
///
/// Mirrors the handful of `window.location` fields views typically read. The router never writes
/// these fields, it only reads them back from the provider after a navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// The full serialized URL.
    pub href: String,
    /// The origin of the URL, e.g. `https://example.com`.
    pub origin: String,
    /// The path of the URL, without the provider prefix. Always starts with `/`.
    pub path: String,
    /// The query string without the leading `?`.
    pub query: Option<String>,
    /// The fragment without the leading `#`.
    pub hash: Option<String>,
}

impl Location {
    /// The route-relative part of the location: path, query and fragment.
    ///
    /// ```rust
    /// # use waypoint_history::Location;
    /// let location = Location {
    ///     path: "/blog".into(),
    ///     query: Some("page=2".into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(location.route(), "/blog?page=2");
    /// ```
    pub fn route(&self) -> String {
        let mut route = self.path.clone();
        if let Some(query) = &self.query {
            route.push('?');
            route.push_str(query);
        }
        if let Some(hash) = &self.hash {
            route.push('#');
            route.push_str(hash);
        }
        route
    }
}

/// An integration with some kind of navigation history.
///
/// Depending on your use case, your implementation may deviate from the described procedure. This
/// is fine, as long as [`History::location`] reports paths in the described format.
///
/// However, you should document all deviations. The described behaviors mimic a web browser, which
/// most users already know.
pub trait History {
    /// Get the current location.
    ///
    /// The `path` **must start** with `/` and **must not contain** the prefix.
    #[must_use]
    fn location(&self) -> Location;

    /// Get the current route: path, query and fragment, without the prefix.
    ///
    /// ```rust
    /// # use waypoint_history::{History, MemoryHistory};
    /// let history = MemoryHistory::default();
    /// assert_eq!(history.current_route(), "/");
    ///
    /// history.push(String::from("/path?a=1"));
    /// assert_eq!(history.current_route(), "/path?a=1");
    /// ```
    #[must_use]
    fn current_route(&self) -> String {
        self.location().route()
    }

    /// Get the current path prefix of the URL.
    ///
    /// Not all providers need a prefix. It is meant for applications that are not served from `/`.
    /// The provider removes the prefix from [`History::location`] and adds it back during
    /// navigation.
    fn current_prefix(&self) -> Option<String> {
        None
    }

    /// Check whether there is a previous page to navigate back to.
    ///
    /// If a provider cannot know this, it should return [`true`].
    #[must_use]
    fn can_go_back(&self) -> bool {
        true
    }

    /// Go back to a previous page.
    ///
    /// If there is no previous page this does nothing.
    fn go_back(&self);

    /// Check whether there is a future page to navigate forward to.
    ///
    /// If a provider cannot know this, it should return [`true`].
    #[must_use]
    fn can_go_forward(&self) -> bool {
        true
    }

    /// Go forward to a future page.
    ///
    /// If there is no future page this does nothing.
    fn go_forward(&self);

    /// Go to another page.
    ///
    /// This should:
    /// 1. Merge the current URL with `route` (which may be a path, a query, or a `#` fragment).
    /// 2. Move the previous URL into the navigation history.
    /// 3. Clear the navigation future.
    fn push(&self, route: String);

    /// Replace the current page with another one.
    ///
    /// Like [`History::push`], but the navigation history and future stay untouched.
    fn replace(&self, route: String);

    /// Set the document title.
    #[allow(unused_variables)]
    fn set_title(&self, title: &str) {}

    /// The document title last set through [`History::set_title`], if the provider tracks it.
    fn title(&self) -> Option<String> {
        None
    }
}
