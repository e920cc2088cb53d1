//! Errors reported while building route trees and while navigating.

/// A structural problem in a route tree.
///
/// These never abort [`Router::set_routes`](crate::Router::set_routes). They are logged and
/// returned so the application can surface them, and the tree stays usable on a best-effort basis.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A route definition without a path.
    #[error("route `{route}` has no path")]
    MissingPath {
        /// The name (or crumb trail) of the offending route.
        route: String,
    },

    /// A route definition without a component.
    #[error("route `{route}` has no component")]
    MissingComponent {
        /// The name (or crumb trail) of the offending route.
        route: String,
    },

    /// Two routes share a name.
    #[error("route name `{name}` is used more than once")]
    DuplicateName {
        /// The shared name.
        name: String,
    },

    /// Two routes share a full path.
    #[error("routes `{first}` and `{second}` share the path `{path}`")]
    DuplicatePath {
        /// The shared full path.
        path: String,
        /// The route declared first.
        first: String,
        /// The route declared later.
        second: String,
    },

    /// A full path declares the same parameter twice.
    #[error("parameter `:{param}` appears more than once in `{path}`")]
    DuplicateParameter {
        /// The full path of the route.
        path: String,
        /// The repeated parameter identifier.
        param: String,
    },

    /// A wildcard route declares children.
    #[error("wildcard route `{route}` cannot have children")]
    WildcardWithChildren {
        /// The name of the wildcard route.
        route: String,
    },

    /// A route definition read from json is not an object, or a field has the wrong type.
    #[error("invalid route definition: {reason}")]
    InvalidDefinition {
        /// What was wrong with the definition.
        reason: String,
    },
}

/// Why an intent could not be resolved to a route.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No route matches the intent, and there is no wildcard route to fall back on.
    #[error("no route matches `{target}`")]
    UnknownRoute {
        /// The name or path that was requested.
        target: String,
    },

    /// The target route needs a parameter the intent did not supply.
    #[error("route `{route}` requires the parameter `:{param}`")]
    MissingParameter {
        /// The name of the target route.
        route: String,
        /// The missing parameter identifier.
        param: String,
    },

    /// A supplied parameter value cannot be placed into a path.
    #[error("invalid value for parameter `:{param}`: {reason}")]
    InvalidParameter {
        /// The parameter identifier.
        param: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// The intent names neither a route nor a path.
    #[error("navigation intent has neither a name nor a path")]
    EmptyIntent,

    /// There is no committed route to update yet.
    #[error("there is no active route")]
    NoActiveRoute,

    /// Parameters were set on a route that has none.
    #[error("route `{route}` has no parameters")]
    NoParameters {
        /// The name of the active route.
        route: String,
    },
}

/// Why a navigation failed.
///
/// A before-guard veto is not an error, see
/// [`NavigationOutcome::Vetoed`](crate::navigation::NavigationOutcome::Vetoed).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// The intent could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The router has no route tree yet.
    #[error("no routes have been set")]
    NoRoutes,
}
