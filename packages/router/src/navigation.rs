//! Types relating to navigation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ActiveRoute;

/// Named path parameters, keyed by identifier (without the `:`).
pub type Params = BTreeMap<String, String>;

/// A flat query bag.
pub type Query = BTreeMap<String, String>;

/// Where to navigate to.
///
/// ```rust
/// # use waypoint_router::prelude::*;
/// assert_eq!(NavigationIntent::from("/blog/1"), NavigationIntent::Path("/blog/1".into()));
/// assert_eq!(NavigationIntent::from("Blog"), NavigationIntent::Name("Blog".into()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationIntent {
    /// Navigate to the route with this name.
    Name(String),
    /// Navigate to the route matching this path. May carry a `?query`.
    Path(String),
    /// Navigate with parameters, query and props.
    Descriptor(Descriptor),
}

impl NavigationIntent {
    /// Turn any intent into a [`Descriptor`].
    pub fn into_descriptor(self) -> Descriptor {
        match self {
            Self::Name(name) => Descriptor::name(name),
            Self::Path(path) => Descriptor::path(path),
            Self::Descriptor(descriptor) => descriptor,
        }
    }
}

impl From<&str> for NavigationIntent {
    fn from(target: &str) -> Self {
        target.to_string().into()
    }
}

impl From<String> for NavigationIntent {
    fn from(target: String) -> Self {
        match target.starts_with('/') {
            true => Self::Path(target),
            false => Self::Name(target),
        }
    }
}

impl From<Descriptor> for NavigationIntent {
    fn from(descriptor: Descriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

/// A structured navigation intent.
///
/// Exactly one of `name` and `path` should be set. If both are, the name wins.
///
/// ```rust
/// # use waypoint_router::prelude::*;
/// let intent = Descriptor::path("/blog")
///     .param("id", "1")
///     .param("name", "dan")
///     .query("tab", "comments")
///     .props(serde_json::json!({ "from": "home" }));
/// assert_eq!(intent.params.len(), 2);
/// ```
///
/// Descriptors can also be read from JSON, which is handy when intents arrive from a host event:
///
/// ```rust
/// # use waypoint_router::prelude::*;
/// let intent: Descriptor = serde_json::from_str(r#"{ "name": "Blog", "params": { "id": "1" } }"#).unwrap();
/// assert_eq!(intent, Descriptor::name("Blog").param("id", 1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    /// The name of the target route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The path of the target route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Values for the named segments of the target route.
    pub params: Params,
    /// The query of the target.
    pub query: Query,
    /// An opaque payload handed to the guards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
}

impl Descriptor {
    /// Target the route called `name`.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Target the route matching `path`.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Add a parameter value.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Add several parameter values.
    pub fn params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    /// Add a query entry.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Replace the whole query.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Attach props.
    pub fn props(mut self, props: impl Into<Value>) -> Self {
        self.props = Some(props.into());
        self
    }
}

/// How a committed navigation is written to history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// Add a new history entry.
    Push,
    /// Overwrite the current history entry.
    Replace,
}

/// What a navigation did.
#[derive(Debug, Clone)]
pub enum NavigationOutcome<T> {
    /// The route was committed.
    Committed(ActiveRoute<T>),
    /// The target is the current location. Nothing ran.
    Unchanged,
    /// The before-guard rejected the navigation. Nothing changed.
    Vetoed,
}

impl<T> NavigationOutcome<T> {
    /// The committed route, if there is one.
    pub fn route(&self) -> Option<&ActiveRoute<T>> {
        match self {
            Self::Committed(route) => Some(route),
            _ => None,
        }
    }

    /// Whether the navigation committed a route.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}
