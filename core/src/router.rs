//! Navigation seam between the session and whatever renders views.
//!
//! The session only needs two things from a router: the name of the route
//! being shown, and a way to move to another path. Route names are derived
//! from the first path segment, so `/login` is the `login` route.

/// Name of the login route, used to avoid redirect loops.
pub const LOGIN_ROUTE: &str = "login";

/// Path the unauthorized handler navigates to.
pub const LOGIN_PATH: &str = "/login";

pub trait Navigator {
    /// Name of the active route, if any view is shown yet.
    fn current_route(&self) -> Option<&str>;

    fn push(&mut self, path: &str);
}

/// Route name for a path: its first non-empty segment, query and fragment
/// stripped. The root path has no name.
pub fn route_name(path: &str) -> Option<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').find(|segment| !segment.is_empty())
}

/// Headless router that only records where it has been.
#[derive(Debug, Clone, Default)]
pub struct MemoryRouter {
    history: Vec<String>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router already showing `path`.
    pub fn at(path: &str) -> Self {
        Self {
            history: vec![path.to_string()],
        }
    }

    pub fn current_path(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Navigator for MemoryRouter {
    fn current_route(&self) -> Option<&str> {
        self.current_path().and_then(route_name)
    }

    fn push(&mut self, path: &str) {
        self.history.push(path.to_string());
    }
}
