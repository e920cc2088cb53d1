use std::rc::Rc;

use waypoint_history::{History, MemoryHistory};

/// Global configuration options for the router.
///
/// This implements [`Default`] and follows the builder pattern, so you can use it like this:
/// ```rust
/// # use waypoint_router::prelude::*;
/// # use std::rc::Rc;
/// let cfg = RouterConfig::default()
///     .hash_mode(true)
///     .strict(true)
///     .history(Rc::new(MemoryHistory::with_initial_path("/blog")));
/// let router = Router::<&'static str>::new(cfg);
/// assert!(router.hash_mode());
/// ```
#[derive(Clone, Default)]
pub struct RouterConfig {
    pub(crate) hash_mode: bool,
    pub(crate) strict: bool,
    pub(crate) history: Option<Rc<dyn History>>,
}

impl RouterConfig {
    /// Keep the route in the URL fragment (`#/blog/1`) instead of the path.
    ///
    /// [`Router::set_routes`](crate::Router::set_routes) overrides this.
    ///
    /// Defaults to `false`.
    pub fn hash_mode(self, hash_mode: bool) -> Self {
        Self { hash_mode, ..self }
    }

    /// Exclude routes that fail validation, and everything nested below them, from matching.
    ///
    /// Validation problems are reported either way.
    ///
    /// Defaults to `false`.
    pub fn strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    /// The history provider the router reads locations from and writes navigations to.
    ///
    /// Defaults to a [`MemoryHistory`].
    pub fn history(self, history: Rc<dyn History>) -> Self {
        Self {
            history: Some(history),
            ..self
        }
    }

    pub(crate) fn take_history(&mut self) -> Rc<dyn History> {
        self.history
            .take()
            .unwrap_or_else(|| Rc::new(MemoryHistory::default()))
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("hash_mode", &self.hash_mode)
            .field("strict", &self.strict)
            .field("history", &self.history.is_some())
            .finish()
    }
}
