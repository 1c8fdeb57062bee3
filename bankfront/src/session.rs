//! Cookie-backed visitor identity.
//!
//! The `user-id` cookie value is the whole session. Nothing is stored server-side
//! and the value is not signed: trust in it is delegated to the accounts service,
//! which checks every account request on its own.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const SESSION_COOKIE: &str = "user-id";
pub const SESSION_COOKIE_PATH: &str = "/";

/// Attributes applied to the session cookie when it is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCookie {
    secure: bool,
    http_only: bool,
}

impl SessionCookie {
    pub fn new(secure: bool, http_only: bool) -> Self {
        Self { secure, http_only }
    }

    /// Current session token. A present but empty cookie counts as signed out.
    pub fn token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(SESSION_COOKIE)
            .map(Cookie::value)
            .filter(|value| !value.is_empty())
    }

    pub fn is_authenticated(&self, jar: &CookieJar) -> bool {
        self.token(jar).is_some()
    }

    pub fn issue(&self, jar: CookieJar, user_id: &str) -> CookieJar {
        let cookie = Cookie::build((SESSION_COOKIE, user_id.to_owned()))
            .path(SESSION_COOKIE_PATH)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .http_only(self.http_only);
        jar.add(cookie)
    }

    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path(SESSION_COOKIE_PATH))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};
    use axum_extra::extract::cookie::CookieJar;

    use super::{SessionCookie, SESSION_COOKIE};

    fn jar_with(raw: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(raw));
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn token_reads_session_cookie() {
        let session = SessionCookie::default();
        let jar = jar_with("theme=dark; user-id=42");
        assert_eq!(session.token(&jar), Some("42"));
        assert!(session.is_authenticated(&jar));
    }

    #[test]
    fn missing_or_empty_cookie_is_unauthenticated() {
        let session = SessionCookie::default();
        assert_eq!(session.token(&CookieJar::new()), None);
        assert_eq!(session.token(&jar_with("user-id=")), None);
        assert!(!session.is_authenticated(&jar_with("theme=dark")));
    }

    #[test]
    fn issued_cookie_is_site_wide_without_flags_by_default() {
        let jar = SessionCookie::default().issue(CookieJar::new(), "42");
        let cookie = jar.get(SESSION_COOKIE).unwrap();

        assert_eq!(cookie.value(), "42");
        assert_eq!(cookie.path(), Some("/"));
        assert_ne!(cookie.http_only(), Some(true));
        assert_ne!(cookie.secure(), Some(true));
        assert!(cookie.max_age().is_none());
    }

    #[test]
    fn issued_cookie_carries_configured_flags() {
        let jar = SessionCookie::new(true, true).issue(CookieJar::new(), "42");
        let cookie = jar.get(SESSION_COOKIE).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn clear_drops_the_session() {
        let session = SessionCookie::default();
        let jar = session.clear(jar_with("user-id=42"));
        assert_eq!(session.token(&jar), None);
    }
}
