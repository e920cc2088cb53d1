use std::cell::RefCell;

use tracing::error;
use url::Url;

use crate::{History, Location};

const BASE_URL: &str = "waypoint://index.html/";

struct MemoryHistoryState {
    current: Url,
    past: Vec<Url>,
    future: Vec<Url>,
    title: Option<String>,
}

/// A [`History`] provider that stores all navigation information in memory.
///
/// Routes are joined onto the current URL the way a browser resolves an `href`, so pushing
/// `#/settings` only swaps the fragment while `/settings` swaps the path.
pub struct MemoryHistory {
    state: RefCell<MemoryHistoryState>,
    base_path: Option<String>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        let current = Url::parse(BASE_URL).expect("the in-memory base url is a valid url");
        Self {
            state: RefCell::new(MemoryHistoryState {
                current,
                past: Vec::new(),
                future: Vec::new(),
                title: None,
            }),
            base_path: None,
        }
    }
}

impl MemoryHistory {
    /// Create a [`MemoryHistory`] starting at `route`.
    ///
    /// ```rust
    /// # use waypoint_history::{History, MemoryHistory};
    /// let history = MemoryHistory::with_initial_path("/blog/1?tab=comments");
    /// assert_eq!(history.location().path, "/blog/1");
    /// assert_eq!(history.location().query.as_deref(), Some("tab=comments"));
    /// assert!(!history.can_go_back());
    /// ```
    pub fn with_initial_path(route: impl AsRef<str>) -> Self {
        let history = Self::default();
        history.replace(route.as_ref().to_string());
        history
    }

    /// Set the base path for the history. All routes are prefixed with it when written.
    ///
    /// ```rust
    /// # use waypoint_history::*;
    /// let history = MemoryHistory::default().with_prefix("/my-app");
    /// history.push("/about".to_string());
    ///
    /// assert_eq!(history.current_prefix(), Some("/my-app".to_string()));
    /// assert_eq!(history.location().path, "/about");
    /// assert!(history.location().href.ends_with("/my-app/about"));
    /// ```
    pub fn with_prefix(mut self, prefix: impl ToString) -> Self {
        self.base_path = Some(prefix.to_string());
        self
    }

    fn join(&self, route: &str) -> Option<Url> {
        if route.starts_with("//") {
            error!(r#"cannot navigate to paths starting with "//", path: {route}"#);
            return None;
        }

        let route = match &self.base_path {
            Some(prefix) if route.starts_with('/') => format!("{prefix}{route}"),
            _ => route.to_string(),
        };

        match self.state.borrow().current.join(&route) {
            Ok(url) => Some(url),
            Err(err) => {
                error!("cannot navigate to `{route}`: {err}");
                None
            }
        }
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        let state = self.state.borrow();
        let url = &state.current;

        let path = match &self.base_path {
            Some(prefix) => url
                .path()
                .strip_prefix(prefix.as_str())
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                .map(|rest| if rest.is_empty() { "/" } else { rest })
                .unwrap_or("/"),
            None => url.path(),
        };

        Location {
            href: url.to_string(),
            origin: url.origin().ascii_serialization(),
            path: path.to_string(),
            query: url.query().map(str::to_string),
            hash: url.fragment().map(str::to_string),
        }
    }

    fn current_prefix(&self) -> Option<String> {
        self.base_path.clone()
    }

    fn can_go_back(&self) -> bool {
        !self.state.borrow().past.is_empty()
    }

    fn go_back(&self) {
        let mut write = self.state.borrow_mut();
        if let Some(last) = write.past.pop() {
            let old = std::mem::replace(&mut write.current, last);
            write.future.push(old);
        }
    }

    fn can_go_forward(&self) -> bool {
        !self.state.borrow().future.is_empty()
    }

    fn go_forward(&self) {
        let mut write = self.state.borrow_mut();
        if let Some(next) = write.future.pop() {
            let old = std::mem::replace(&mut write.current, next);
            write.past.push(old);
        }
    }

    fn push(&self, route: String) {
        let Some(url) = self.join(&route) else {
            return;
        };

        let mut write = self.state.borrow_mut();
        // don't push the same url twice
        if write.current == url {
            return;
        }
        let old = std::mem::replace(&mut write.current, url);
        write.past.push(old);
        write.future.clear();
    }

    fn replace(&self, route: String) {
        if let Some(url) = self.join(&route) {
            self.state.borrow_mut().current = url;
        }
    }

    fn set_title(&self, title: &str) {
        self.state.borrow_mut().title = Some(title.to_string());
    }

    fn title(&self) -> Option<String> {
        self.state.borrow().title.clone()
    }
}
