use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::config::CookieOptions;

/// Writes the encrypted token into the outgoing cookie jar.
#[cfg_attr(test, mockall::automock)]
pub trait CookieSetter: Send + Sync {
    fn set(&self, jar: CookieJar, name: &str, value: &str) -> CookieJar;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultCookieSetter {
    options: CookieOptions,
}

impl DefaultCookieSetter {
    pub fn new(options: CookieOptions) -> Self {
        Self { options }
    }
}

impl CookieSetter for DefaultCookieSetter {
    fn set(&self, jar: CookieJar, name: &str, value: &str) -> CookieJar {
        let cookie = Cookie::build((name.to_string(), value.to_string()))
            .path(self.options.path.clone())
            .http_only(self.options.http_only)
            .secure(self.options.secure)
            .same_site(self.options.same_site);

        jar.add(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::SameSite;

    #[test]
    fn test_default_setter_applies_options() {
        let setter = DefaultCookieSetter::new(CookieOptions {
            secure: true,
            same_site: SameSite::Strict,
            ..CookieOptions::default()
        });

        let jar = setter.set(CookieJar::new(), "csrf_requestid_cookie", "abc=");
        let cookie = jar.get("csrf_requestid_cookie").unwrap();

        assert_eq!(cookie.value(), "abc=");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }
}
