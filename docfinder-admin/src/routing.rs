//! Page access rules

/// A page of the admin UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
    Doctors,
    AddDoctor,
    EditDoctor(String),
    Reports,
}

impl Page {
    /// Match a request path; trailing slashes are ignored
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let page = match trimmed {
            "" => Page::Dashboard,
            "/login" => Page::Login,
            "/doctors" => Page::Doctors,
            "/doctors/add" => Page::AddDoctor,
            "/reports" => Page::Reports,
            other => {
                let id = other.strip_prefix("/doctors/edit/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Page::EditDoctor(id.to_string())
            }
        };
        Some(page)
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Page::Login)
    }
}

/// Outcome of a page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow(Page),
    RedirectTo(&'static str),
}

/// Decide whether a page may be shown
///
/// Signed-in users are sent away from the login page; everyone else is sent
/// to it from protected pages. Unknown paths go to the dashboard.
pub fn route_access(path: &str, authenticated: bool) -> RouteDecision {
    match Page::from_path(path) {
        Some(Page::Login) if authenticated => RouteDecision::RedirectTo("/"),
        Some(page) if page.requires_session() && !authenticated => RouteDecision::RedirectTo("/login"),
        Some(page) => RouteDecision::Allow(page),
        None => RouteDecision::RedirectTo("/"),
    }
}
