//! The state the router exposes to views.

use std::rc::Rc;

use serde_json::Value;

use crate::{
    chart::RouteChart,
    helpers::format_query,
    navigation::{Params, Query},
    resolve::Resolution,
    route_definition::{CompiledRoute, RouteId, RouteTree},
};

/// A route together with the parameters, query and props it was navigated to with.
#[derive(Debug)]
pub struct ActiveRoute<T> {
    tree: Rc<RouteTree<T>>,
    id: RouteId,
    params: Params,
    query: Query,
    props: Option<Value>,
    path: String,
    unknown: bool,
}

// manual impl required because derive macro requires clone for T unnecessarily
impl<T> Clone for ActiveRoute<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            id: self.id,
            params: self.params.clone(),
            query: self.query.clone(),
            props: self.props.clone(),
            path: self.path.clone(),
            unknown: self.unknown,
        }
    }
}

impl<T> ActiveRoute<T> {
    pub(crate) fn new(tree: Rc<RouteTree<T>>, resolution: Resolution) -> Self {
        let Resolution {
            route,
            params,
            query,
            props,
            path,
            unknown,
        } = resolution;

        Self {
            tree,
            id: route,
            params,
            query,
            props,
            path,
            unknown,
        }
    }

    pub(crate) fn with_props(self, props: Option<Value>) -> Self {
        Self { props, ..self }
    }

    /// The compiled route.
    pub fn route(&self) -> &CompiledRoute<T> {
        self.tree.route(self.id)
    }

    /// The tree the route belongs to.
    pub fn tree(&self) -> &Rc<RouteTree<T>> {
        &self.tree
    }

    /// The id of the route.
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// The name of the route.
    pub fn name(&self) -> &str {
        self.route().name()
    }

    /// The parameters of the route's full path.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Get a single parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The props of the transition that made this route active.
    pub fn props(&self) -> Option<&Value> {
        self.props.as_ref()
    }

    /// The concrete path, with every parameter filled in.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether no route matched the requested path and the wildcard route stands in for it.
    ///
    /// Navigating to the wildcard route by name is not unknown.
    pub fn is_unknown(&self) -> bool {
        self.unknown
    }

    /// The concrete path followed by the serialized query.
    pub fn href(&self) -> String {
        let query = format_query(&self.query);
        match query.is_empty() {
            true => self.path.clone(),
            false => format!("{}?{query}", self.path),
        }
    }
}

/// Where the router currently is within a navigation.
///
/// The router does not serialize navigations, so with overlapping navigations this reports the
/// phase of whichever one moved last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationPhase {
    /// No navigation is running.
    #[default]
    Idle,
    /// An intent is being resolved.
    Resolving,
    /// Waiting for the before-guard.
    AwaitingBeforeGuard,
    /// The new route is being committed and written to history.
    Committing,
    /// Waiting for the after-guard.
    AwaitingAfterGuard,
}

/// The current state of the router.
///
/// A state is never modified. Every committed navigation replaces it as a whole, so the route and
/// the chart always belong together.
#[derive(Debug)]
pub struct RouterState<T> {
    pub(crate) route: Option<ActiveRoute<T>>,
    pub(crate) chart: RouteChart<T>,
}

// manual impl required because derive macro requires default for T unnecessarily
impl<T> Default for RouterState<T> {
    fn default() -> Self {
        Self {
            route: None,
            chart: RouteChart::default(),
        }
    }
}

impl<T> RouterState<T> {
    /// The active route, [`None`] until the first navigation commits.
    pub fn route(&self) -> Option<&ActiveRoute<T>> {
        self.route.as_ref()
    }

    /// The active route and all its ancestors, by depth.
    pub fn chart(&self) -> &RouteChart<T> {
        &self.chart
    }

    /// The props of the last committed transition.
    pub fn props(&self) -> Option<&Value> {
        self.route.as_ref().and_then(ActiveRoute::props)
    }

    /// Check whether the route called `name` is active.
    ///
    /// In exact mode only the active route itself counts, otherwise any of its ancestors does too.
    pub fn is_at(&self, name: &str, exact: bool) -> bool {
        match exact {
            true => self.route.as_ref().is_some_and(|route| route.name() == name),
            false => self.chart.iter().any(|(_, route)| route.name() == name),
        }
    }
}
