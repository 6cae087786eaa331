use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use tower_cookies::Cookies;

use crate::authentication::TOKEN_VALIDITY_DAYS;

pub const AUTH_COOKIE: &str = "auth-token";

/// Builds the session cookie. The secure attribute is the only thing that
/// varies between environments, so it is a parameter here and decided from
/// the environment in `setup_auth_cookie`.
pub fn auth_cookie(token: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token.to_string());

    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::days(TOKEN_VALIDITY_DAYS));

    cookie
}

pub fn setup_auth_cookie(token: &str, cookies: &Cookies) {
    let is_development = std::env::var("ENVIRONMENT")
        .unwrap_or_else(|_| "production".to_string())
        .to_lowercase()
        == "development";

    cookies.add(auth_cookie(token, !is_development));
}

pub fn remove_auth_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::new(AUTH_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookie_carries_the_session_attributes() {
        let cookie = auth_cookie("some-token", true);

        assert_eq!(cookie.name(), "auth-token");
        assert_eq!(cookie.value(), "some-token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn secure_attribute_is_relaxed_for_local_development() {
        let cookie = auth_cookie("some-token", false);
        assert_eq!(cookie.secure(), Some(false));
    }
}
