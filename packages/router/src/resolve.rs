//! Resolution of navigation intents to compiled routes.

use serde_json::Value;
use tracing::{trace, warn};

use crate::{
    error::ResolveError,
    helpers::{parse_query, split_target},
    navigation::{NavigationIntent, Params, Query},
    route_definition::{fill_path, fixed_prefix, trim_trailing_slash, CompiledRoute, RouteId, RouteTree},
};

/// The result of resolving a [`NavigationIntent`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The resolved route, after default-child re-targeting.
    pub route: RouteId,
    /// The parameters of the route's full path.
    pub params: Params,
    /// The query.
    pub query: Query,
    /// The props of the intent.
    pub props: Option<Value>,
    /// The concrete path: the full path with every parameter filled in.
    pub path: String,
    /// Whether nothing matched and the wildcard route was used instead.
    pub unknown: bool,
}

/// Resolve `intent` against `tree`.
///
/// Routes are looked up by name first, then by path. A path is matched literally against every
/// route's full path; if that fails and parameters were supplied, against the fixed part of every
/// full path whose parameters are all supplied. If still nothing matches, the wildcard route
/// matching the path (the deepest one, if there are several) is used and
/// [`Resolution::unknown`] is set.
///
/// A route with a default child resolves to that child.
///
/// ```rust
/// # use waypoint_router::prelude::*;
/// let (tree, _) = RouteTree::build(vec![RouteDefinition::new("/blog/:id/:name", "Blog")], false);
///
/// let resolution = resolve(&tree, &"/blog/1/dan".into()).unwrap();
/// assert_eq!(resolution.params["id"], "1");
/// assert_eq!(resolution.params["name"], "dan");
///
/// let resolution = resolve(&tree, &Descriptor::path("/blog").param("id", 1).param("name", "dan").into()).unwrap();
/// assert_eq!(resolution.path, "/blog/1/dan");
/// ```
pub fn resolve<T>(tree: &RouteTree<T>, intent: &NavigationIntent) -> Result<Resolution, ResolveError> {
    let descriptor = intent.clone().into_descriptor();
    let mut params = descriptor.params;
    let mut query = Query::new();
    let mut literal_path = None;

    let (matched, unknown) = if let Some(name) = &descriptor.name {
        let route = tree
            .iter()
            .find(|route| !route.excluded && route.name == *name)
            .ok_or_else(|| ResolveError::UnknownRoute { target: name.clone() })?;
        (route.id, false)
    } else if let Some(target) = &descriptor.path {
        let (path, embedded_query) = split_target(target);
        if let Some(embedded) = embedded_query {
            query = parse_query(embedded);
        }

        match match_path(tree, path, &params) {
            Some((route, extracted)) => {
                params.extend(extracted);
                (route, false)
            }
            None => {
                let fallback = wildcard_for(tree, path).ok_or_else(|| ResolveError::UnknownRoute {
                    target: target.clone(),
                })?;
                warn!("no route matches `{target}`, falling back to the wildcard route");
                literal_path = Some(trim_trailing_slash(path).to_string());
                (fallback, true)
            }
        }
    } else {
        return Err(ResolveError::EmptyIntent);
    };
    query.extend(descriptor.query);

    let mut target = matched;
    while let Some(child) = tree.default_child(target) {
        target = child;
    }
    let route = tree.route(target);
    trace!("resolved {intent:?} to `{}`", route.name);

    params.retain(|key, _| {
        let known = route.params.contains(key);
        if !known {
            warn!("dropping parameter `{key}`, route `{}` does not declare it", route.name);
        }
        known
    });

    let path = match literal_path {
        Some(path) => path,
        None => fill_path(&route.name, &route.full_path, &params)?,
    };

    Ok(Resolution {
        route: target,
        params,
        query,
        props: descriptor.props,
        path,
        unknown,
    })
}

/// Routes a path may be matched against directly.
///
/// Default children share their parent's path and are reached through it.
fn matchable<T>(route: &CompiledRoute<T>) -> bool {
    !route.excluded && route.path.is_some() && !route.is_wildcard() && !route.is_default_child()
}

fn match_path<T>(tree: &RouteTree<T>, path: &str, params: &Params) -> Option<(RouteId, Params)> {
    let literal = tree
        .iter()
        .filter(|route| matchable(route) && route.full_regex.is_match(path))
        .min_by_key(|route| route.params.len());
    if let Some(route) = literal {
        let extracted = route.full_regex.extract(path, &route.params)?;
        return Some((route.id, extracted));
    }

    if params.is_empty() {
        return None;
    }

    // the route that takes the most of the supplied parameters, the first declared on a tie
    let path = trim_trailing_slash(path);
    tree.iter()
        .filter(|route| matchable(route) && !route.params.is_empty())
        .filter(|route| {
            route.params.iter().all(|param| params.contains_key(param))
                && fixed_prefix(&route.full_path).eq_ignore_ascii_case(path)
        })
        .fold(None, |best: Option<&CompiledRoute<T>>, route| match best {
            Some(best) if best.params.len() >= route.params.len() => Some(best),
            _ => Some(route),
        })
        .map(|route| (route.id, Params::new()))
}

fn wildcard_for<T>(tree: &RouteTree<T>, path: &str) -> Option<RouteId> {
    tree.iter()
        .filter(|route| !route.excluded && route.is_wildcard() && route.full_regex.is_match(path))
        .max_by_key(|route| route.depth)
        .map(|route| route.id)
}
