//! Location -> breadcrumb trail.

use crate::navigation::menu::{normalize_path, NavigationTree, RouteTitle};

/// One breadcrumb item for a location prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    /// Concrete location prefix, e.g. `/datasets/42`.
    pub path: String,
    pub title: String,
}

#[derive(Debug, Clone)]
struct RoutePattern {
    segments: Vec<String>,
    param_count: usize,
    title: String,
}

impl RoutePattern {
    fn new(route: &RouteTitle) -> Self {
        let segments: Vec<String> = route
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let param_count = segments.iter().filter(|s| s.starts_with(':')).count();
        Self {
            segments,
            param_count,
            title: route.title.clone(),
        }
    }

    fn matches(&self, location: &[&str]) -> bool {
        self.segments.len() == location.len()
            && self
                .segments
                .iter()
                .zip(location)
                .all(|(pattern, actual)| pattern.starts_with(':') || pattern.as_str() == *actual)
    }
}

/// Resolves locations into breadcrumb titles using the route table.
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbResolver {
    routes: Vec<RoutePattern>,
}

impl BreadcrumbResolver {
    pub fn new(routes: &[RouteTitle]) -> Self {
        Self {
            routes: routes.iter().map(RoutePattern::new).collect(),
        }
    }

    pub fn from_navigation(tree: &NavigationTree) -> Self {
        Self::new(&tree.routes)
    }

    /// Returns one crumb per location prefix that names a known route.
    ///
    /// # Contract
    /// - Query strings and fragments are ignored.
    /// - The root route, when declared, is always the first crumb.
    /// - Literal segments win over `:param` segments; among equal matches the
    ///   first declared route wins.
    /// - Prefixes without a route are skipped.
    pub fn resolve(&self, location: &str) -> Vec<Breadcrumb> {
        let path_only = location.split(['?', '#']).next().unwrap_or_default();
        let normalized = normalize_path(path_only);
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

        let mut crumbs = Vec::new();
        for depth in 0..=segments.len() {
            let prefix = &segments[..depth];
            if let Some(route) = self.best_match(prefix) {
                crumbs.push(Breadcrumb {
                    path: format!("/{}", prefix.join("/")),
                    title: route.title.clone(),
                });
            }
        }
        crumbs
    }

    /// Title of the deepest resolved crumb.
    pub fn page_title(&self, location: &str) -> Option<String> {
        self.resolve(location).pop().map(|crumb| crumb.title)
    }

    fn best_match(&self, prefix: &[&str]) -> Option<&RoutePattern> {
        self.routes
            .iter()
            .filter(|route| route.matches(prefix))
            .min_by_key(|route| route.param_count)
    }
}
