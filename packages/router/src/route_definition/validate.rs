use std::collections::{hash_map::Entry, HashMap, HashSet};

use tracing::warn;

use super::tree::{CompiledRoute, RouteId, RouteTree};
use crate::error::TreeError;

/// A structural problem, attributed to the route that caused it.
pub(crate) struct Violation {
    pub(crate) route: RouteId,
    pub(crate) error: TreeError,
}

/// Check the flattened tree for structural problems.
///
/// Every problem is logged. Nothing here aborts: the caller decides what to do with the routes.
pub(crate) fn validate<T>(tree: &RouteTree<T>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut report = |route: RouteId, error: TreeError| {
        warn!("invalid route tree: {error}");
        violations.push(Violation { route, error });
    };

    let mut names: HashSet<&str> = HashSet::new();
    let mut paths: HashMap<String, &CompiledRoute<T>> = HashMap::new();

    for route in tree.iter() {
        if route.path.is_none() {
            report(route.id, TreeError::MissingPath { route: trail(route) });
        }
        if route.component.is_none() {
            report(route.id, TreeError::MissingComponent { route: trail(route) });
        }

        if !names.insert(&route.name) {
            report(route.id, TreeError::DuplicateName { name: route.name.clone() });
        }

        if route.path.is_some() {
            match paths.entry(route.full_path.to_lowercase()) {
                Entry::Vacant(entry) => {
                    entry.insert(route);
                }
                // a default child shares the path of its parent, and so on down a chain of them
                Entry::Occupied(mut entry) if route.is_default_child() && route.parent == Some(entry.get().id) => {
                    entry.insert(route);
                }
                Entry::Occupied(entry) => report(
                    route.id,
                    TreeError::DuplicatePath {
                        path: route.full_path.clone(),
                        first: entry.get().name.clone(),
                        second: route.name.clone(),
                    },
                ),
            }
        }

        let mut params = HashSet::new();
        for param in &route.params {
            if !params.insert(param) {
                report(
                    route.id,
                    TreeError::DuplicateParameter {
                        path: route.full_path.clone(),
                        param: param.clone(),
                    },
                );
            }
        }

        if route.is_wildcard() && !route.children.is_empty() {
            report(route.id, TreeError::WildcardWithChildren { route: route.name.clone() });
        }
    }

    violations
}

fn trail<T>(route: &CompiledRoute<T>) -> String {
    route.crumbs.join(" > ")
}
