//! The chart: the active route and all its ancestors, keyed by depth.

use std::{collections::BTreeMap, rc::Rc};

use tracing::warn;

use crate::route_definition::{CompiledRoute, RouteId, RouteTree};

/// A depth-indexed map of the active route and its ancestors.
///
/// Nested views use the chart to find what to render at their own depth.
#[derive(Debug)]
pub struct RouteChart<T> {
    tree: Option<Rc<RouteTree<T>>>,
    levels: BTreeMap<usize, RouteId>,
}

// manual impls required because derive macros require default and clone for T unnecessarily
impl<T> Default for RouteChart<T> {
    fn default() -> Self {
        Self {
            tree: None,
            levels: BTreeMap::new(),
        }
    }
}

impl<T> Clone for RouteChart<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            levels: self.levels.clone(),
        }
    }
}

impl<T> RouteChart<T> {
    /// The route active at `depth`.
    pub fn get(&self, depth: usize) -> Option<&CompiledRoute<T>> {
        let id = self.levels.get(&depth)?;
        self.tree.as_ref()?.get(*id)
    }

    /// All charted routes, root first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CompiledRoute<T>)> {
        self.levels.iter().filter_map(|(depth, id)| {
            let route = self.tree.as_ref()?.get(*id)?;
            Some((*depth, route))
        })
    }

    /// The deepest charted route: the active route itself.
    pub fn deepest(&self) -> Option<&CompiledRoute<T>> {
        let (_, id) = self.levels.last_key_value()?;
        self.tree.as_ref()?.get(*id)
    }

    /// The number of charted routes.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether nothing is charted.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Chart `route` and its ancestors.
///
/// The ancestors are found by walking down from the root ancestor, following the route's crumbs one
/// name at a time.
pub fn build_chart<T>(tree: &Rc<RouteTree<T>>, route: RouteId) -> RouteChart<T> {
    let mut levels = BTreeMap::new();
    let target = tree.route(route);

    let Some(root) = target.root_parent else {
        levels.insert(1, route);
        return RouteChart {
            tree: Some(tree.clone()),
            levels,
        };
    };

    let mut current = tree.route(root);
    levels.insert(current.depth, current.id);
    for name in target.crumbs.iter().skip(1) {
        let next = current
            .children
            .iter()
            .map(|child| tree.route(*child))
            .find(|child| child.name == *name);

        match next {
            Some(next) => {
                levels.insert(next.depth, next.id);
                current = next;
            }
            None => {
                warn!("cannot chart `{name}` below `{}`", current.name);
                break;
            }
        }
    }

    RouteChart {
        tree: Some(tree.clone()),
        levels,
    }
}
