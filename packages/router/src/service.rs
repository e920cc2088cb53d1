use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use serde_json::Value;
use tracing::{debug, error, trace};
use waypoint_history::{History, Location};

use crate::{
    chart::{build_chart, RouteChart},
    error::{NavigationError, ResolveError, TreeError},
    guard::{AfterGuard, BeforeGuard, GuardChain, GuardCompletion, GuardVerdict, PropsSlot},
    helpers::{normalize_query, parse_query, serialize_href, split_target},
    navigation::{Descriptor, HistoryAction, NavigationIntent, NavigationOutcome, Params, Query},
    resolve::{resolve, Resolution},
    route_definition::{trim_trailing_slash, RenderTarget, RouteDefinition, RouteTree},
    router_cfg::RouterConfig,
    state::{ActiveRoute, NavigationPhase, RouterState},
};

type Subscriber<T> = Rc<dyn Fn(&RouterState<T>)>;

struct RouterInner<T> {
    history: Rc<dyn History>,
    hash_mode: Cell<bool>,
    strict: bool,
    tree: RefCell<Option<Rc<RouteTree<T>>>>,
    guards: RefCell<GuardChain<T>>,
    state: RefCell<Rc<RouterState<T>>>,
    phase: Cell<NavigationPhase>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
}

/// The core of the router.
///
/// This combines a [`RouteTree`] and a [`History`] provider. It resolves navigation intents, runs
/// the guards, commits the new [`RouterState`] and writes the history.
///
/// A [`Router`] is a cheap handle. Clones share the same routes, guards and state, which is how
/// guards navigate from within a navigation.
///
/// The router does not queue navigations. When two overlap, both run and the one that commits last
/// determines the final state.
pub struct Router<T> {
    inner: Rc<RouterInner<T>>,
}

// manual impl required because derive macro requires clone for T unnecessarily
impl<T> Clone for Router<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: RenderTarget> Default for Router<T> {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<T: RenderTarget> Router<T> {
    /// Create a router without routes.
    ///
    /// Nothing can be navigated to until [`Router::set_routes`] was called.
    pub fn new(mut config: RouterConfig) -> Self {
        let history = config.take_history();
        Self {
            inner: Rc::new(RouterInner {
                history,
                hash_mode: Cell::new(config.hash_mode),
                strict: config.strict,
                tree: RefCell::new(None),
                guards: RefCell::new(GuardChain::default()),
                state: RefCell::new(Rc::new(RouterState::default())),
                phase: Cell::new(NavigationPhase::Idle),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Replace the route tree and load the route matching the current location.
    ///
    /// Returns every problem found while validating the definitions. Problems never stop the
    /// routes from being set.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// # use futures::executor::block_on;
    /// let router = Router::default();
    /// let errors = block_on(router.set_routes(
    ///     vec![RouteDefinition::new("/", "Home"), RouteDefinition::new("/about", "About")],
    ///     false,
    /// ));
    ///
    /// assert!(errors.is_empty());
    /// assert_eq!(router.current().unwrap().name(), "Home");
    /// ```
    pub async fn set_routes(&self, definitions: Vec<RouteDefinition<T>>, hash_mode: bool) -> Vec<TreeError> {
        let (tree, errors) = RouteTree::build(definitions, self.inner.strict);
        debug!("compiled {} routes with {} problems", tree.len(), errors.len());

        *self.inner.tree.borrow_mut() = Some(Rc::new(tree));
        *self.inner.state.borrow_mut() = Rc::new(RouterState::default());
        self.inner.hash_mode.set(hash_mode);

        // failures are logged by `load`
        let _ = self.load().await;
        errors
    }

    /// Navigate to `intent`, adding a history entry.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// # use futures::executor::block_on;
    /// let router = Router::default();
    /// block_on(router.set_routes(vec![RouteDefinition::new("/blog/:id", "Blog")], false));
    ///
    /// let outcome = block_on(router.push(Descriptor::name("Blog").param("id", 3))).unwrap();
    /// assert_eq!(outcome.route().unwrap().path(), "/blog/3");
    /// assert_eq!(router.location().path, "/blog/3");
    /// ```
    pub async fn push(&self, intent: impl Into<NavigationIntent>) -> Result<NavigationOutcome<T>, NavigationError> {
        self.navigate(intent.into(), HistoryAction::Push).await
    }

    /// Navigate to `intent`, overwriting the current history entry.
    pub async fn replace(&self, intent: impl Into<NavigationIntent>) -> Result<NavigationOutcome<T>, NavigationError> {
        self.navigate(intent.into(), HistoryAction::Replace).await
    }

    /// Navigate to `intent`.
    ///
    /// Navigating to the current location does nothing and returns
    /// [`NavigationOutcome::Unchanged`]. Resolution failures are logged and returned.
    pub async fn navigate(
        &self,
        intent: NavigationIntent,
        action: HistoryAction,
    ) -> Result<NavigationOutcome<T>, NavigationError> {
        let tree = self.tree()?;

        self.set_phase(NavigationPhase::Resolving);
        let resolution = match resolve(&tree, &intent) {
            Ok(resolution) => resolution,
            Err(err) => {
                error!("cannot navigate to {intent:?}: {err}");
                self.set_phase(NavigationPhase::Idle);
                return Err(err.into());
            }
        };

        if self.is_current(&tree, &resolution) {
            debug!("already at `{}`, not navigating", resolution.path);
            self.set_phase(NavigationPhase::Idle);
            return Ok(NavigationOutcome::Unchanged);
        }

        let from = self.current();
        self.transition(tree, resolution, from, Some(action)).await
    }

    /// Resolve the current history location and commit it without writing history.
    ///
    /// Call this whenever the host navigated on its own, e.g. after the user pressed the back
    /// button. The guards run with no route to come from.
    pub async fn load(&self) -> Result<NavigationOutcome<T>, NavigationError> {
        let tree = self.tree()?;
        let (path, query) = self.current_target();

        self.set_phase(NavigationPhase::Resolving);
        trace!("loading `{path}`");
        let intent: NavigationIntent = Descriptor::path(path).with_query(query).into();
        let resolution = match resolve(&tree, &intent) {
            Ok(resolution) => resolution,
            Err(err) => {
                error!("cannot load the current location: {err}");
                self.set_phase(NavigationPhase::Idle);
                return Err(err.into());
            }
        };

        self.transition(tree, resolution, None, None).await
    }

    /// Go back a step in the history and load the location found there.
    pub async fn go_back(&self) -> Result<NavigationOutcome<T>, NavigationError> {
        if !self.inner.history.can_go_back() {
            return Ok(NavigationOutcome::Unchanged);
        }
        self.inner.history.go_back();
        self.load().await
    }

    /// Go a step forward in the history and load the location found there.
    pub async fn go_forward(&self) -> Result<NavigationOutcome<T>, NavigationError> {
        if !self.inner.history.can_go_forward() {
            return Ok(NavigationOutcome::Unchanged);
        }
        self.inner.history.go_forward();
        self.load().await
    }

    /// Navigate to the current route with a different query.
    ///
    /// With `merge` the new entries are added to the current query, otherwise they replace it.
    pub async fn set_query(
        &self,
        query: Query,
        merge: bool,
        replace_history: bool,
    ) -> Result<NavigationOutcome<T>, NavigationError> {
        let current = self.current().ok_or(ResolveError::NoActiveRoute)?;

        let query = match merge {
            true => {
                let mut merged = normalize_query(current.query());
                merged.extend(normalize_query(&query));
                merged
            }
            false => query,
        };

        let intent = Self::same_route(&current).with_query(query);
        self.navigate(intent.into(), Self::action(replace_history)).await
    }

    /// Navigate to the current route with different parameters.
    ///
    /// `params` are merged onto the current parameters. The query is kept.
    pub async fn set_params(
        &self,
        params: Params,
        replace_history: bool,
    ) -> Result<NavigationOutcome<T>, NavigationError> {
        let current = self.current().ok_or(ResolveError::NoActiveRoute)?;
        if current.route().params().is_empty() {
            return Err(ResolveError::NoParameters {
                route: current.name().to_string(),
            }
            .into());
        }

        let intent = Descriptor::name(current.name())
            .params(current.params().clone())
            .params(params)
            .with_query(current.query().clone());
        self.navigate(intent.into(), Self::action(replace_history)).await
    }

    /// The href [`Router::push`] would write for `intent`, without navigating.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// # use futures::executor::block_on;
    /// let router = Router::<&'static str>::default();
    /// block_on(router.set_routes(vec![RouteDefinition::new("/blog/:id", "Blog")], true));
    ///
    /// let href = router.href(Descriptor::name("Blog").param("id", 1).query("pageSize", 10));
    /// assert_eq!(href.unwrap(), "#/blog/1?page-size=10");
    /// ```
    pub fn href(&self, intent: impl Into<NavigationIntent>) -> Result<String, NavigationError> {
        let tree = self.tree()?;
        let resolution = resolve(&tree, &intent.into())?;
        Ok(serialize_href(
            &resolution.path,
            &resolution.query,
            self.inner.hash_mode.get(),
        ))
    }

    /// Register the before-guard, replacing the previous one.
    ///
    /// The guard sees the route about to be committed, the current route and the props of the
    /// transition. It returns a [`GuardVerdict`], a `bool`, `()` or an `Option<bool>`.
    ///
    /// ```rust
    /// # use waypoint_router::prelude::*;
    /// # use futures::executor::block_on;
    /// let router = Router::<&'static str>::default();
    /// router.before_each(|to, _, _| to.name() != "Admin");
    /// block_on(router.set_routes(
    ///     vec![RouteDefinition::new("/", "Home"), RouteDefinition::new("/admin", "Admin")],
    ///     false,
    /// ));
    ///
    /// let outcome = block_on(router.push("/admin")).unwrap();
    /// assert!(matches!(outcome, NavigationOutcome::Vetoed));
    /// assert_eq!(router.current().unwrap().name(), "Home");
    /// ```
    pub fn before_each<F, R>(&self, guard: F)
    where
        F: Fn(&ActiveRoute<T>, Option<&ActiveRoute<T>>, &PropsSlot) -> R + 'static,
        R: Into<GuardVerdict>,
    {
        let guard: Rc<dyn BeforeGuard<T>> = Rc::new(guard);
        self.inner.guards.borrow_mut().set_before(guard);
    }

    /// Register the after-guard, replacing the previous one.
    ///
    /// The guard runs once the route was committed and written to history, with the props the
    /// transition committed.
    pub fn after_each<F, R>(&self, guard: F)
    where
        F: Fn(&ActiveRoute<T>, Option<&ActiveRoute<T>>, Option<&Value>) -> R + 'static,
        R: Into<GuardCompletion>,
    {
        let guard: Rc<dyn AfterGuard<T>> = Rc::new(guard);
        self.inner.guards.borrow_mut().set_after(guard);
    }

    /// Call `listener` with the new state after every commit.
    pub fn subscribe(&self, listener: impl Fn(&RouterState<T>) + 'static) {
        self.inner.subscribers.borrow_mut().push(Rc::new(listener));
    }
}

impl<T> Router<T> {
    /// The active route.
    pub fn current(&self) -> Option<ActiveRoute<T>> {
        self.inner.state.borrow().route.clone()
    }

    /// The active route and its ancestors, by depth.
    pub fn chart(&self) -> RouteChart<T> {
        self.inner.state.borrow().chart.clone()
    }

    /// The props of the last committed transition.
    pub fn props(&self) -> Option<Value> {
        self.inner.state.borrow().props().cloned()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> Rc<RouterState<T>> {
        self.inner.state.borrow().clone()
    }

    /// The current host location.
    pub fn location(&self) -> Location {
        self.inner.history.location()
    }

    /// Where the router is within a navigation.
    pub fn phase(&self) -> NavigationPhase {
        self.inner.phase.get()
    }

    /// Whether the route lives in the URL fragment.
    pub fn hash_mode(&self) -> bool {
        self.inner.hash_mode.get()
    }

    /// The compiled routes, [`None`] until [`Router::set_routes`] was called.
    pub fn routes(&self) -> Option<Rc<RouteTree<T>>> {
        self.inner.tree.borrow().clone()
    }

    /// The history provider.
    pub fn history(&self) -> Rc<dyn History> {
        self.inner.history.clone()
    }

    fn tree(&self) -> Result<Rc<RouteTree<T>>, NavigationError> {
        self.inner.tree.borrow().clone().ok_or(NavigationError::NoRoutes)
    }

    fn set_phase(&self, phase: NavigationPhase) {
        trace!("navigation phase: {phase:?}");
        self.inner.phase.set(phase);
    }

    fn action(replace_history: bool) -> HistoryAction {
        match replace_history {
            true => HistoryAction::Replace,
            false => HistoryAction::Push,
        }
    }

    /// An intent for `current`'s route, keeping its parameters.
    fn same_route(current: &ActiveRoute<T>) -> Descriptor {
        match current.route().is_wildcard() {
            true => Descriptor::path(current.path()),
            false => Descriptor::name(current.name()).params(current.params().clone()),
        }
    }

    /// The path and query of the current location. In hash mode both live in the fragment.
    fn current_target(&self) -> (String, Query) {
        let location = self.inner.history.location();
        if !self.inner.hash_mode.get() {
            let query = location.query.as_deref().map(parse_query).unwrap_or_default();
            return (location.path, query);
        }

        let fragment = location.hash.unwrap_or_default();
        let (path, query) = split_target(&fragment);
        let path = match path.is_empty() {
            true => "/".to_string(),
            false => path.to_string(),
        };
        (path, query.map(parse_query).unwrap_or_default())
    }

    /// Whether the host location already shows `resolution`.
    fn is_current(&self, tree: &Rc<RouteTree<T>>, resolution: &Resolution) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        if current.id() != resolution.route || !Rc::ptr_eq(current.tree(), tree) {
            return false;
        }

        let route = tree.route(resolution.route);
        let (path, query) = self.current_target();
        let path_matches = match route.is_wildcard() {
            true => trim_trailing_slash(&path).eq_ignore_ascii_case(&resolution.path),
            false => route
                .full_regex()
                .extract(&path, route.params())
                .is_some_and(|params| params == resolution.params),
        };

        path_matches && normalize_query(&query) == normalize_query(&resolution.query)
    }

    async fn transition(
        &self,
        tree: Rc<RouteTree<T>>,
        resolution: Resolution,
        from: Option<ActiveRoute<T>>,
        action: Option<HistoryAction>,
    ) -> Result<NavigationOutcome<T>, NavigationError> {
        let to = ActiveRoute::new(tree.clone(), resolution);
        let props = PropsSlot::new(to.props().cloned());

        self.set_phase(NavigationPhase::AwaitingBeforeGuard);
        let before = self.inner.guards.borrow().before();
        if let Some(guard) = before {
            let verdict = guard.before(&to, from.as_ref(), &props);
            if !verdict.resolve().await {
                debug!("navigation to `{}` was vetoed", to.path());
                self.set_phase(NavigationPhase::Idle);
                return Ok(NavigationOutcome::Vetoed);
            }
        }

        self.set_phase(NavigationPhase::Committing);
        let to = to.with_props(props.get());
        let state = Rc::new(RouterState {
            route: Some(to.clone()),
            chart: build_chart(&tree, to.id()),
        });
        *self.inner.state.borrow_mut() = state.clone();

        if let Some(title) = to.route().title() {
            self.inner.history.set_title(title);
        }

        if let Some(action) = action {
            let href = serialize_href(to.path(), to.query(), self.inner.hash_mode.get());
            trace!("{action:?} `{href}`");
            match action {
                HistoryAction::Push => self.inner.history.push(href),
                HistoryAction::Replace => self.inner.history.replace(href),
            }
        }

        let subscribers = self.inner.subscribers.borrow().clone();
        for subscriber in subscribers {
            subscriber(&state);
        }

        self.set_phase(NavigationPhase::AwaitingAfterGuard);
        let after = self.inner.guards.borrow().after();
        if let Some(guard) = after {
            guard.after(&to, from.as_ref(), to.props()).resolve().await;
        }

        self.set_phase(NavigationPhase::Idle);
        Ok(NavigationOutcome::Committed(to))
    }
}
