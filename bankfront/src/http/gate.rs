use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::state::AppState;

pub const HOME_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";
pub const LANDING_ROUTE: &str = "/me";

/// Where the site root sends a visitor: their own page when signed in, the login
/// form otherwise. Always a 303.
pub fn landing_redirect(state: &AppState, jar: &CookieJar) -> Redirect {
    if state.session.is_authenticated(jar) {
        debug!("session present; redirecting to landing page");
        Redirect::to(LANDING_ROUTE)
    } else {
        debug!("no session; redirecting to login");
        Redirect::to(LOGIN_ROUTE)
    }
}

/// Session token for a gated page, or the redirect to send instead.
pub fn require_session<'a>(state: &AppState, jar: &'a CookieJar) -> Result<&'a str, Redirect> {
    match state.session.token(jar) {
        Some(token) => Ok(token),
        None => {
            debug!("gated page requested without session");
            Err(Redirect::to(LOGIN_ROUTE))
        }
    }
}
