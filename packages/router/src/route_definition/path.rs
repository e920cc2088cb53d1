//! Path compilation: literal paths into anchored, case-insensitive patterns.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::warn;
use urlencoding::{decode, encode};

use crate::error::ResolveError;

/// The path of a catch-all route.
pub const WILDCARD: &str = "(*)";

/// One `/`-separated piece of a route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathSegment<'a> {
    Fixed(&'a str),
    Parameter(&'a str),
    Wildcard,
}

impl<'a> PathSegment<'a> {
    fn parse(segment: &'a str) -> Self {
        if segment == WILDCARD {
            Self::Wildcard
        } else if let Some(name) = segment.strip_prefix(':').filter(|name| !name.is_empty()) {
            Self::Parameter(name)
        } else {
            Self::Fixed(segment)
        }
    }
}

pub(crate) fn segments(path: &str) -> impl Iterator<Item = PathSegment<'_>> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(PathSegment::parse)
}

/// A compiled path pattern.
///
/// Matches case-insensitively, ignores a trailing slash, and matches each `/:name` segment against
/// any run of characters other than `/`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Option<Regex>,
}

impl PathPattern {
    /// Compile `path` into a pattern.
    ///
    /// ```rust
    /// # use waypoint_router::route_definition::PathPattern;
    /// let pattern = PathPattern::new("/blog/:id/:name");
    /// assert!(pattern.is_match("/blog/1/dan"));
    /// assert!(pattern.is_match("/BLOG/1/dan/"));
    /// assert!(!pattern.is_match("/blog/1"));
    /// ```
    pub fn new(path: &str) -> Self {
        let mut source = String::from("(?i)^");
        for segment in segments(path) {
            match segment {
                PathSegment::Fixed(fixed) => {
                    source.push('/');
                    source.push_str(&regex::escape(fixed));
                }
                PathSegment::Parameter(_) => source.push_str("/([^/]+)"),
                PathSegment::Wildcard => source.push_str("(?:/.*)?"),
            }
        }
        source.push_str("/?$");

        let regex = match Regex::new(&source) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!("cannot compile pattern for `{path}`, it will never match: {err}");
                None
            }
        };

        Self { source, regex }
    }

    /// Whether `path` matches this pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|regex| regex.is_match(path))
    }

    /// The regular expression source of this pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match `path` and decode the captured parameter values, pairing them with `names` in order.
    pub(crate) fn extract(&self, path: &str, names: &[String]) -> Option<BTreeMap<String, String>> {
        let captures = self.regex.as_ref()?.captures(path)?;

        let mut params = BTreeMap::new();
        for (name, capture) in names.iter().zip(captures.iter().skip(1)) {
            let Some(capture) = capture else { continue };
            let value = match decode(capture.as_str()) {
                Ok(value) => value.into_owned(),
                Err(_) => {
                    warn!(r#"failed to decode parameter value: "{}""#, capture.as_str());
                    capture.as_str().to_string()
                }
            };
            params.insert(name.clone(), value);
        }

        Some(params)
    }
}

/// The compiled form of one route's path.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPath {
    pub(crate) full_path: String,
    pub(crate) root_path: Option<String>,
    pub(crate) regex: PathPattern,
    pub(crate) full_regex: PathPattern,
    pub(crate) params: Vec<String>,
}

/// Compile `path` below a parent with the given full path.
///
/// `root_path` is the full path of the top-most ancestor. Both are [`None`] for root routes.
pub(crate) fn compile(
    path: &str,
    parent_full_path: Option<&str>,
    root_path: Option<&str>,
) -> CompiledPath {
    let full_path = match parent_full_path {
        Some(parent) => join_paths(parent, path),
        None => join_paths("/", path),
    };

    let params = segments(&full_path)
        .filter_map(|segment| match segment {
            PathSegment::Parameter(name) => Some(name.to_string()),
            _ => None,
        })
        .collect();

    CompiledPath {
        regex: PathPattern::new(path),
        full_regex: PathPattern::new(&full_path),
        root_path: root_path.map(str::to_string),
        full_path,
        params,
    }
}

/// Join a child path onto its parent's full path.
///
/// An empty child inherits the parent path, a leading `/` on the child is optional and trailing
/// slashes are dropped.
///
/// ```rust
/// # use waypoint_router::route_definition::join_paths;
/// assert_eq!(join_paths("/blog", ":id"), "/blog/:id");
/// assert_eq!(join_paths("/blog/", "/:id/"), "/blog/:id");
/// assert_eq!(join_paths("/blog", ""), "/blog");
/// assert_eq!(join_paths("/", "about"), "/about");
/// ```
pub fn join_paths(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    let child = child.trim_matches('/');

    match (parent.is_empty(), child.is_empty()) {
        (true, true) => String::from("/"),
        (true, false) => format!("/{child}"),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}/{child}"),
    }
}

/// Place `params` into the parameter segments of `full_path`.
///
/// Values are percent-encoded. A wildcard segment is dropped.
pub(crate) fn fill_path(
    route: &str,
    full_path: &str,
    params: &BTreeMap<String, String>,
) -> Result<String, ResolveError> {
    let mut path = String::new();
    for segment in segments(full_path) {
        match segment {
            PathSegment::Fixed(fixed) => {
                path.push('/');
                path.push_str(fixed);
            }
            PathSegment::Parameter(name) => {
                let value = params.get(name).ok_or_else(|| ResolveError::MissingParameter {
                    route: route.to_string(),
                    param: name.to_string(),
                })?;
                if value.is_empty() {
                    return Err(ResolveError::InvalidParameter {
                        param: name.to_string(),
                        reason: String::from("the value is empty"),
                    });
                }
                path.push('/');
                path.push_str(&encode(value));
            }
            PathSegment::Wildcard => {}
        }
    }

    if path.is_empty() {
        path.push('/');
    }
    Ok(path)
}

/// `full_path` with all parameter and wildcard segments removed.
pub(crate) fn fixed_prefix(full_path: &str) -> String {
    let mut path = String::new();
    for segment in segments(full_path) {
        if let PathSegment::Fixed(fixed) = segment {
            path.push('/');
            path.push_str(fixed);
        }
    }

    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Strip a trailing slash from everything but the root path.
pub(crate) fn trim_trailing_slash(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
