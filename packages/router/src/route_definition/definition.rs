use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::TreeError;

/// The render target of a route.
///
/// The router never looks inside a render target. It only needs an identifier to fall back on when
/// a route has no explicit name.
pub trait RenderTarget: Clone + 'static {
    /// An identifier for this target, used as the default route name.
    fn identifier(&self) -> String;
}

impl RenderTarget for &'static str {
    fn identifier(&self) -> String {
        self.to_string()
    }
}

impl RenderTarget for String {
    fn identifier(&self) -> String {
        self.clone()
    }
}

/// A user supplied route, possibly with nested children.
///
/// This follows the builder pattern:
/// ```rust
/// # use waypoint_router::prelude::*;
/// let blog = RouteDefinition::new("/blog/:id/:name", "Blog")
///     .title("Blog")
///     .meta("auth", true)
///     .child(RouteDefinition::new("", "BlogIndex"));
///
/// assert_eq!(blog.get_path(), Some("/blog/:id/:name"));
/// assert_eq!(blog.get_children().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDefinition<T> {
    pub(crate) name: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) component: Option<T>,
    pub(crate) meta: BTreeMap<String, Value>,
    pub(crate) children: Vec<RouteDefinition<T>>,
}

impl<T> Default for RouteDefinition<T> {
    fn default() -> Self {
        Self {
            name: None,
            title: None,
            path: None,
            component: None,
            meta: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

impl<T> RouteDefinition<T> {
    /// Create a route rendering `component` at `path`.
    ///
    /// `path` may be relative to the parent route, absolute, empty (the default child of its
    /// parent) or the wildcard `(*)`.
    pub fn new(path: impl Into<String>, component: T) -> Self {
        Self {
            path: Some(path.into()),
            component: Some(component),
            ..Default::default()
        }
    }

    /// Create a definition without path or component.
    ///
    /// Such a definition is incomplete. It is reported when the tree is validated unless both are
    /// set through [`RouteDefinition::path`] and [`RouteDefinition::component`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the render target.
    pub fn component(mut self, component: T) -> Self {
        self.component = Some(component);
        self
    }

    /// Set the name. Names must be unique across the whole tree.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the title written to the document when the route becomes active.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add an entry to the opaque meta bag.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Append a nested route.
    pub fn child(mut self, child: RouteDefinition<T>) -> Self {
        self.children.push(child);
        self
    }

    /// Append several nested routes.
    pub fn children(mut self, children: impl IntoIterator<Item = RouteDefinition<T>>) -> Self {
        self.children.extend(children);
        self
    }

    /// The path, if set.
    pub fn get_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The nested routes.
    pub fn get_children(&self) -> &[RouteDefinition<T>] {
        &self.children
    }
}

impl<T: DeserializeOwned> RouteDefinition<T> {
    /// Read a route definition from json.
    ///
    /// Keys outside of `name`, `title`, `path`, `component`, `meta` and `children` are dropped
    /// with a warning. `null` values count as absent.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// let route = RouteDefinition::<String>::from_json(serde_json::json!({
    ///     "path": "/about",
    ///     "component": "About",
    ///     "exact": true,
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(route.get_path(), Some("/about"));
    /// ```
    pub fn from_json(value: Value) -> Result<Self, TreeError> {
        let Value::Object(fields) = value else {
            return Err(invalid(format!("expected an object, found `{value}`")));
        };

        let mut route = Self::default();
        for (key, value) in fields {
            if value.is_null() {
                continue;
            }

            match key.as_str() {
                "name" => route.name = Some(string_field(&key, value)?),
                "title" => route.title = Some(string_field(&key, value)?),
                "path" => route.path = Some(string_field(&key, value)?),
                "component" => {
                    let component = serde_json::from_value(value)
                        .map_err(|err| invalid(format!("`component`: {err}")))?;
                    route.component = Some(component);
                }
                "meta" => match value {
                    Value::Object(meta) => route.meta = meta.into_iter().collect(),
                    other => return Err(invalid(format!("`meta` must be an object, found `{other}`"))),
                },
                "children" => route.children = Self::list_from_json(value)?,
                _ => warn!("dropping unknown route field `{key}`"),
            }
        }

        Ok(route)
    }

    /// Read a list of route definitions from a json array.
    pub fn list_from_json(value: Value) -> Result<Vec<Self>, TreeError> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_json).collect(),
            other => Err(invalid(format!("expected an array of routes, found `{other}`"))),
        }
    }
}

fn string_field(key: &str, value: Value) -> Result<String, TreeError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(invalid(format!("`{key}` must be a string, found `{other}`"))),
    }
}

fn invalid(reason: String) -> TreeError {
    TreeError::InvalidDefinition { reason }
}
