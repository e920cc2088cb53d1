//! Query string and history href formatting.

use convert_case::{Boundary, Case, Converter};
use tracing::warn;
use urlencoding::{decode, encode};

use crate::navigation::Query;

/// Word boundaries of a query key. Digits never start a new word.
const KEY_BOUNDARIES: [Boundary; 5] = [
    Boundary::LOWER_UPPER,
    Boundary::DIGIT_UPPER,
    Boundary::UNDERSCORE,
    Boundary::HYPHEN,
    Boundary::SPACE,
];

/// Render a query key in hyphen-case, whatever its input casing.
///
/// ```rust
/// # use waypoint_router::helpers::hyphenate;
/// assert_eq!(hyphenate("pageSize"), "page-size");
/// assert_eq!(hyphenate("sort_order"), "sort-order");
/// assert_eq!(hyphenate("already-fine"), "already-fine");
/// assert_eq!(hyphenate("v2"), "v2");
/// ```
pub fn hyphenate(key: &str) -> String {
    Converter::new()
        .set_boundaries(&KEY_BOUNDARIES)
        .to_case(Case::Kebab)
        .convert(key)
}

/// Serialize `query` without the leading `?`.
///
/// Keys are hyphen-cased, keys and values are percent-encoded. An empty query serializes to an
/// empty string.
///
/// ```rust
/// # use waypoint_router::{helpers::format_query, navigation::Query};
/// let mut query = Query::new();
/// query.insert("pageSize".into(), "10".into());
/// query.insert("q".into(), "rust lang".into());
/// assert_eq!(format_query(&query), "page-size=10&q=rust%20lang");
/// ```
pub fn format_query(query: &Query) -> String {
    normalize_query(query)
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a query string, with or without the leading `?`.
///
/// A key without `=` gets an empty value. Keys are kept as written.
///
/// ```rust
/// # use waypoint_router::helpers::parse_query;
/// let query = parse_query("?a=1&b=two%20words&flag");
/// assert_eq!(query["a"], "1");
/// assert_eq!(query["b"], "two words");
/// assert_eq!(query["flag"], "");
/// ```
pub fn parse_query(query: &str) -> Query {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// `query` with every key hyphen-cased, the form in which a query is written to history.
pub(crate) fn normalize_query(query: &Query) -> Query {
    query
        .iter()
        .map(|(key, value)| (hyphenate(key), value.clone()))
        .collect()
}

/// Split a route target into its path and query parts, dropping any fragment.
pub(crate) fn split_target(target: &str) -> (&str, Option<&str>) {
    let target = target.split_once('#').map_or(target, |(before, _)| before);
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// The href written to history for `path` and `query`.
///
/// In hash mode the whole route lives in the fragment.
pub(crate) fn serialize_href(path: &str, query: &Query, hash_mode: bool) -> String {
    let mut href = String::new();
    if hash_mode {
        href.push('#');
    }
    href.push_str(path);

    let query = format_query(query);
    if !query.is_empty() {
        href.push('?');
        href.push_str(&query);
    }

    href
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            warn!(r#"failed to decode query component: "{raw}""#);
            raw
        }
    }
}
