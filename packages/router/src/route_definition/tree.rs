use std::collections::BTreeMap;

use serde_json::Value;

use super::{
    path::{compile, CompiledPath, PathPattern, WILDCARD},
    validate::validate,
    RenderTarget, RouteDefinition,
};
use crate::error::TreeError;

/// Identifies a route within the [`RouteTree`] it was compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(pub(crate) usize);

/// A route definition after compilation.
///
/// Compiled routes are immutable. Ancestors and children are referenced by [`RouteId`], the tree
/// owns every node.
#[derive(Debug, Clone)]
pub struct CompiledRoute<T> {
    pub(crate) id: RouteId,
    pub(crate) name: String,
    pub(crate) title: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) component: Option<T>,
    pub(crate) meta: BTreeMap<String, Value>,
    pub(crate) full_path: String,
    pub(crate) root_path: Option<String>,
    pub(crate) regex: PathPattern,
    pub(crate) full_regex: PathPattern,
    pub(crate) params: Vec<String>,
    pub(crate) depth: usize,
    pub(crate) crumbs: Vec<String>,
    pub(crate) parent: Option<RouteId>,
    pub(crate) root_parent: Option<RouteId>,
    pub(crate) children: Vec<RouteId>,
    pub(crate) excluded: bool,
}

impl<T> CompiledRoute<T> {
    /// The id of this route within its tree.
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// The unique name of this route.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The title, if the definition declared one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The path as written in the definition. Empty for default children and missing paths.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }

    /// The render target.
    pub fn component(&self) -> Option<&T> {
        self.component.as_ref()
    }

    /// The opaque meta bag.
    pub fn meta(&self) -> &BTreeMap<String, Value> {
        &self.meta
    }

    /// The literal path of this route joined with every ancestor path, root first.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// The full path of the top-most ancestor, [`None`] for root routes.
    pub fn root_path(&self) -> Option<&str> {
        self.root_path.as_deref()
    }

    /// The pattern of this route's own path.
    pub fn regex(&self) -> &PathPattern {
        &self.regex
    }

    /// The pattern of the full path.
    pub fn full_regex(&self) -> &PathPattern {
        &self.full_regex
    }

    /// The parameter identifiers of the full path, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// 1 for root routes, the parent's depth plus one otherwise.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The names of all ancestors, root first, ending with this route's name.
    pub fn crumbs(&self) -> &[String] {
        &self.crumbs
    }

    /// The parent route.
    pub fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    /// The top-most ancestor, [`None`] for root routes.
    pub fn root_parent(&self) -> Option<RouteId> {
        self.root_parent
    }

    /// The nested routes, in declaration order.
    pub fn children(&self) -> &[RouteId] {
        &self.children
    }

    /// Whether this is the catch-all `(*)` route.
    pub fn is_wildcard(&self) -> bool {
        self.path.as_deref() == Some(WILDCARD)
    }

    /// Whether this is a default child: a nested route with an empty path.
    pub fn is_default_child(&self) -> bool {
        self.parent.is_some() && self.path.as_deref() == Some("")
    }

    /// Whether the tree was validated strictly and this route failed validation.
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }
}

/// The compiled forest of routes.
#[derive(Debug, Clone)]
pub struct RouteTree<T> {
    routes: Vec<CompiledRoute<T>>,
    roots: Vec<RouteId>,
}

impl<T> Default for RouteTree<T> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            roots: Vec::new(),
        }
    }
}

impl<T: RenderTarget> RouteTree<T> {
    /// Compile and validate `definitions`.
    ///
    /// Validation never fails the build. All problems are returned, and when `strict` is set the
    /// offending routes (and everything nested below them) are excluded from matching.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// let (tree, errors) = RouteTree::build(
    ///     vec![
    ///         RouteDefinition::new("/", "Home"),
    ///         RouteDefinition::new("/blog/:id", "Blog").child(RouteDefinition::new(":name", "Post")),
    ///     ],
    ///     false,
    /// );
    ///
    /// assert!(errors.is_empty());
    /// assert_eq!(tree.get_by_name("Post").unwrap().full_path(), "/blog/:id/:name");
    /// ```
    pub fn build(definitions: Vec<RouteDefinition<T>>, strict: bool) -> (Self, Vec<TreeError>) {
        let mut tree = Self::default();
        for definition in definitions {
            let id = tree.compile(definition, None);
            tree.roots.push(id);
        }

        let violations = validate(&tree);
        if strict {
            for violation in &violations {
                tree.exclude(violation.route);
            }
        }

        let errors = violations.into_iter().map(|v| v.error).collect();
        (tree, errors)
    }

    fn compile(&mut self, definition: RouteDefinition<T>, parent: Option<RouteId>) -> RouteId {
        let RouteDefinition {
            name,
            title,
            path,
            component,
            meta,
            children,
        } = definition;

        let id = RouteId(self.routes.len());
        let parent_route = parent.map(|p| &self.routes[p.0]);

        let root_parent = parent_route.map(|p| p.root_parent.unwrap_or(p.id));
        let root_path = root_parent.map(|r| self.routes[r.0].full_path.clone());
        let CompiledPath {
            full_path,
            root_path,
            regex,
            full_regex,
            params,
        } = compile(
            path.as_deref().unwrap_or_default(),
            parent_route.map(|p| p.full_path.as_str()),
            root_path.as_deref(),
        );

        let name = name
            .or_else(|| component.as_ref().map(RenderTarget::identifier))
            .unwrap_or_else(|| full_path.clone());
        let mut crumbs = parent_route.map(|p| p.crumbs.clone()).unwrap_or_default();
        crumbs.push(name.clone());
        let depth = parent_route.map_or(1, |p| p.depth + 1);

        self.routes.push(CompiledRoute {
            id,
            name,
            title,
            path,
            component,
            meta,
            full_path,
            root_path,
            regex,
            full_regex,
            params,
            depth,
            crumbs,
            parent,
            root_parent,
            children: Vec::new(),
            excluded: false,
        });

        for child in children {
            let child = self.compile(child, Some(id));
            self.routes[id.0].children.push(child);
        }

        id
    }
}

impl<T> RouteTree<T> {
    /// Get a route by id.
    pub fn get(&self, id: RouteId) -> Option<&CompiledRoute<T>> {
        self.routes.get(id.0)
    }

    /// Get a route by an id handed out by this tree.
    pub(crate) fn route(&self, id: RouteId) -> &CompiledRoute<T> {
        &self.routes[id.0]
    }

    /// Get a route by its unique name.
    pub fn get_by_name(&self, name: &str) -> Option<&CompiledRoute<T>> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// The top-level routes, in declaration order.
    pub fn roots(&self) -> &[RouteId] {
        &self.roots
    }

    /// Iterate over all routes, parents before their children.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute<T>> {
        self.routes.iter()
    }

    /// The number of routes in the tree.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the tree has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The first default child of `id`, if any.
    pub fn default_child(&self, id: RouteId) -> Option<RouteId> {
        self.get(id)?
            .children
            .iter()
            .copied()
            .find(|child| self.routes[child.0].is_default_child() && !self.routes[child.0].excluded)
    }

    /// Generate a site map: the full path of every route, in tree order.
    ///
    /// Default children are skipped because they share their parent's path.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// let (tree, _) = RouteTree::build(
    ///     vec![RouteDefinition::new("/blog", "Blog")
    ///         .child(RouteDefinition::new("", "Index"))
    ///         .child(RouteDefinition::new(":id", "Post"))],
    ///     false,
    /// );
    /// assert_eq!(tree.sitemap(), vec!["/blog", "/blog/:id"]);
    /// ```
    pub fn sitemap(&self) -> Vec<String> {
        self.routes
            .iter()
            .filter(|route| !route.is_default_child() && !route.excluded)
            .map(|route| route.full_path.clone())
            .collect()
    }

    fn exclude(&mut self, id: RouteId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let route = &mut self.routes[id.0];
            route.excluded = true;
            pending.extend(route.children.iter().copied());
        }
    }
}
