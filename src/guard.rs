use tracing::debug;

use crate::error::{DashboardError, StorageError};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Root),
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// Decide what a request for `route` ends up showing.
///
/// The root only redirects. The dashboard requires a session.
pub fn resolve(route: Route, session: &SessionStore) -> Navigation {
    let authenticated = session.is_authenticated();
    let nav = match route {
        Route::Root if authenticated => Navigation::Redirect(Route::Dashboard),
        Route::Root => Navigation::Redirect(Route::Login),
        Route::Dashboard if !authenticated => Navigation::Redirect(Route::Login),
        other => Navigation::Render(other),
    };
    debug!("{} -> {:?}", route.path(), nav);
    nav
}

/// Gate for anything that needs the dashboard.
pub fn require_session(session: &SessionStore) -> Result<(), DashboardError> {
    match resolve(Route::Dashboard, session) {
        Navigation::Render(_) => Ok(()),
        Navigation::Redirect(_) => Err(DashboardError::NotAuthenticated),
    }
}

/// Clear the session and send the user back to the login page.
pub fn logout(session: &SessionStore) -> Result<Navigation, StorageError> {
    session.remove_auth_token()?;
    Ok(Navigation::Redirect(Route::Login))
}
