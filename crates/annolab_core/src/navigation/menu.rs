//! Menu configuration -> navigation tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declarative menu entry as written in the dashboard route config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Absolute (`/datasets`) or parent-relative (`detail`) route path.
    pub path: String,
    pub title: String,
    /// Icon key, see [`MenuIcon::from_key`].
    #[serde(default)]
    pub icon: Option<String>,
    /// Hidden entries are routable but not listed in the sidebar.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            icon: None,
            hidden: false,
            children: Vec::new(),
        }
    }
}

/// Sidebar icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuIcon {
    Dashboard,
    Dataset,
    Annotation,
    Review,
    Analytics,
    Team,
    Tender,
    Settings,
    Debug,
}

impl MenuIcon {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "dashboard" => Some(Self::Dashboard),
            "dataset" => Some(Self::Dataset),
            "annotation" => Some(Self::Annotation),
            "review" => Some(Self::Review),
            "analytics" => Some(Self::Analytics),
            "team" => Some(Self::Team),
            "tender" => Some(Self::Tender),
            "settings" => Some(Self::Settings),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Dataset => "dataset",
            Self::Annotation => "annotation",
            Self::Review => "review",
            Self::Analytics => "analytics",
            Self::Team => "team",
            Self::Tender => "tender",
            Self::Settings => "settings",
            Self::Debug => "debug",
        }
    }
}

/// Visible sidebar node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    pub path: String,
    pub title: String,
    pub icon: Option<MenuIcon>,
    pub children: Vec<NavNode>,
}

/// Any routable entry, visible or hidden, with its resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTitle {
    pub path: String,
    pub title: String,
}

/// Output of [`build_navigation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTree {
    /// Sidebar tree with hidden entries removed.
    pub menu: Vec<NavNode>,
    /// Every route in declaration order (depth-first).
    pub routes: Vec<RouteTitle>,
}

/// Menu configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    EmptyPath { title: String },
    EmptyTitle { path: String },
    UnknownIcon { path: String, icon: String },
    DuplicatePath(String),
}

impl Display for MenuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath { title } => write!(f, "menu entry `{title}` has an empty path"),
            Self::EmptyTitle { path } => write!(f, "menu entry `{path}` has an empty title"),
            Self::UnknownIcon { path, icon } => {
                write!(f, "menu entry `{path}` uses unknown icon `{icon}`")
            }
            Self::DuplicatePath(path) => write!(f, "menu path is declared twice: {path}"),
        }
    }
}

impl Error for MenuError {}

/// Validates menu configuration and builds the sidebar tree and route table.
///
/// # Contract
/// - Child paths without a leading `/` are joined onto the parent path.
/// - Hidden entries and their subtrees are left out of `menu` but kept in
///   `routes`.
pub fn build_navigation(entries: &[MenuEntry]) -> Result<NavigationTree, MenuError> {
    let mut tree = NavigationTree::default();
    let mut seen = BTreeSet::new();
    tree.menu = build_level(entries, "/", true, &mut tree.routes, &mut seen)?;
    Ok(tree)
}

fn build_level(
    entries: &[MenuEntry],
    parent_path: &str,
    visible: bool,
    routes: &mut Vec<RouteTitle>,
    seen: &mut BTreeSet<String>,
) -> Result<Vec<NavNode>, MenuError> {
    let mut nodes = Vec::new();
    for entry in entries {
        let title = entry.title.trim();
        if entry.path.trim().is_empty() {
            return Err(MenuError::EmptyPath {
                title: title.to_string(),
            });
        }
        let path = resolve_path(parent_path, &entry.path);
        if title.is_empty() {
            return Err(MenuError::EmptyTitle { path });
        }
        let icon = match entry.icon.as_deref() {
            Some(key) => Some(MenuIcon::from_key(key).ok_or_else(|| MenuError::UnknownIcon {
                path: path.clone(),
                icon: key.to_string(),
            })?),
            None => None,
        };
        if !seen.insert(path.clone()) {
            return Err(MenuError::DuplicatePath(path));
        }

        routes.push(RouteTitle {
            path: path.clone(),
            title: title.to_string(),
        });

        let shown = visible && !entry.hidden;
        let children = build_level(&entry.children, &path, shown, routes, seen)?;
        if shown {
            nodes.push(NavNode {
                path,
                title: title.to_string(),
                icon,
                children,
            });
        }
    }
    Ok(nodes)
}

fn resolve_path(parent_path: &str, raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with('/') {
        normalize_path(raw)
    } else {
        normalize_path(&format!("{parent_path}/{raw}"))
    }
}

/// Normalizes a route or location path to `/a/b` form. Empty input is `/`.
pub fn normalize_path(raw: &str) -> String {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.trim().is_empty()).collect();
    format!("/{}", segments.join("/"))
}
