#![forbid(unsafe_code)]

//! Route table: path patterns to component/title entries.
//!
//! Patterns are either exact paths or carry a single trailing `*` wildcard
//! capturing the rest of the path as a parameter. Matching tries exact
//! entries first, then wildcard patterns in insertion order; unmatched paths
//! fall back to the designated not-found route.

/// Pattern of the designated not-found route.
pub const NOT_FOUND_PATH: &str = "/404";

/// Target of one route pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    /// Registered component name to mount.
    pub component: String,
    /// Title template; `{}` is substituted with the captured parameter.
    /// Routes without a title keep the document's fallback title.
    pub title: Option<String>,
}

/// A matched route plus the captured trailing parameter, if any.
#[derive(Debug, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub param: Option<String>,
}

/// Insertion-ordered pattern table.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    entries: Vec<(String, RouteEntry)>,
}

impl RouteTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration. Later entries with the same pattern
    /// shadow earlier ones for exact lookups.
    #[must_use]
    pub fn route(mut self, pattern: &str, component: &str, title: Option<&str>) -> Self {
        self.insert(pattern, component, title);
        self
    }

    /// Register a pattern.
    pub fn insert(&mut self, pattern: &str, component: &str, title: Option<&str>) {
        self.entries.push((
            pattern.to_owned(),
            RouteEntry {
                component: component.to_owned(),
                title: title.map(str::to_owned),
            },
        ));
    }

    /// Exact entry for a pattern.
    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .rev()
            .find(|(p, _)| p == pattern)
            .map(|(_, entry)| entry)
    }

    /// Resolve a normalized path. Exact match first, then wildcard patterns
    /// in insertion order (capturing the trailing segment), then the
    /// not-found route. `None` only when nothing matches and no not-found
    /// route is registered.
    #[must_use]
    pub fn match_route(&self, path: &str) -> Option<RouteMatch<'_>> {
        if let Some(entry) = self.get(path) {
            return Some(RouteMatch { entry, param: None });
        }
        for (pattern, entry) in &self.entries {
            if let Some(base) = pattern.split('*').next()
                && pattern.contains('*')
                && path.starts_with(base)
            {
                let rest = &path[base.len()..];
                return Some(RouteMatch {
                    entry,
                    param: (!rest.is_empty()).then(|| rest.to_owned()),
                });
            }
        }
        self.get(NOT_FOUND_PATH)
            .map(|entry| RouteMatch { entry, param: None })
    }
}

/// Normalize a request path: strip trailing slashes; an empty result (or
/// empty input) becomes `/`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}
