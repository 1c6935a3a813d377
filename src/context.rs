//! Request-scoped state for antiforgery checks.
//!
//! A [`RequestContext`] is built once per inbound request. It carries the parts
//! of the request the validator reads, and it owns the lazily minted
//! [`TokenSet`] so that every caller within one request sees the same tokens.

use std::convert::Infallible;

use axum::{
    http::{header, HeaderMap, Method},
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::CookieJar;
use once_cell::sync::OnceCell;

use crate::models::TokenSet;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Read-only view of a request, as seen by the validator.
pub trait AntiforgeryRequest {
    fn method(&self) -> &str;
    fn cookie(&self, name: &str) -> Option<&str>;
    fn header(&self, name: &str) -> Option<&str>;
    fn has_form_content_type(&self) -> bool;
    fn form_value(&self, name: &str) -> Option<&str>;
}

#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    headers: HeaderMap,
    cookies: CookieJar,
    form: Option<Vec<(String, String)>>,
    tokens: OnceCell<TokenSet>,
}

impl RequestContext {
    pub fn new(method: Method, headers: HeaderMap) -> Self {
        let cookies = CookieJar::from_headers(&headers);
        Self {
            method,
            headers,
            cookies,
            form: None,
            tokens: OnceCell::new(),
        }
    }

    /// Build a context from a buffered request, parsing urlencoded form bodies.
    ///
    /// Multipart bodies are recognised as form posts but their fields are not
    /// parsed, so such requests must carry the token in the header.
    pub fn from_parts(method: Method, headers: HeaderMap, body: &[u8]) -> Self {
        let context = Self::new(method, headers);
        if content_type_is(&context.headers, FORM_URLENCODED) {
            let pairs = form_urlencoded::parse(body).into_owned();
            context.with_form(pairs)
        } else {
            context
        }
    }

    pub fn with_form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn request_method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn form(&self) -> Option<&[(String, String)]> {
        self.form.as_deref()
    }

    /// The token set issued for this request, if one has been minted yet.
    pub fn cached_tokens(&self) -> Option<&TokenSet> {
        self.tokens.get()
    }

    pub(crate) fn token_cache(&self) -> &OnceCell<TokenSet> {
        &self.tokens
    }
}

impl AntiforgeryRequest for RequestContext {
    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|cookie| cookie.value())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn has_form_content_type(&self) -> bool {
        content_type_is(&self.headers, FORM_URLENCODED)
            || content_type_is(&self.headers, MULTIPART_FORM_DATA)
    }

    fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn content_type_is(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

/// Response side effects produced while issuing tokens.
///
/// Return it alongside the body from a handler, e.g. `(response, Html(page))`.
#[derive(Debug, Default)]
pub struct AntiforgeryResponse {
    pub headers: HeaderMap,
    pub cookies: CookieJar,
}

impl IntoResponseParts for AntiforgeryResponse {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.headers_mut().extend(self.headers);
        self.cookies.into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_reads_cookies_from_headers() {
        let ctx = RequestContext::new(
            Method::POST,
            headers(&[(header::COOKIE, "a=1; csrf_requestid_cookie=abc+/==")]),
        );

        assert_eq!(ctx.cookie("csrf_requestid_cookie"), Some("abc+/=="));
        assert_eq!(ctx.cookie("missing"), None);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut map = HeaderMap::new();
        map.insert("x-csrf-requestid", HeaderValue::from_static("value"));
        let ctx = RequestContext::new(Method::POST, map);

        assert_eq!(ctx.header("X-Csrf-RequestId"), Some("value"));
    }

    #[test]
    fn test_form_content_types() {
        let urlencoded = RequestContext::new(
            Method::POST,
            headers(&[(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=utf-8",
            )]),
        );
        assert!(urlencoded.has_form_content_type());

        let multipart = RequestContext::new(
            Method::POST,
            headers(&[(header::CONTENT_TYPE, "multipart/form-data; boundary=x")]),
        );
        assert!(multipart.has_form_content_type());

        let json = RequestContext::new(
            Method::POST,
            headers(&[(header::CONTENT_TYPE, "application/json")]),
        );
        assert!(!json.has_form_content_type());

        let none = RequestContext::new(Method::POST, HeaderMap::new());
        assert!(!none.has_form_content_type());
    }

    #[test]
    fn test_from_parts_parses_urlencoded_body() {
        let ctx = RequestContext::from_parts(
            Method::POST,
            headers(&[(header::CONTENT_TYPE, "application/x-www-form-urlencoded")]),
            b"say=hello+world&csrf_requestid=abc_123",
        );

        assert_eq!(ctx.form_value("say"), Some("hello world"));
        assert_eq!(ctx.form_value("csrf_requestid"), Some("abc_123"));
        assert_eq!(ctx.form_value("other"), None);
    }

    #[test]
    fn test_from_parts_ignores_json_body() {
        let ctx = RequestContext::from_parts(
            Method::POST,
            headers(&[(header::CONTENT_TYPE, "application/json")]),
            br#"{"csrf_requestid":"abc"}"#,
        );

        assert!(ctx.form().is_none());
        assert_eq!(ctx.form_value("csrf_requestid"), None);
    }

    #[test]
    fn test_token_cache_starts_empty() {
        let ctx = RequestContext::new(Method::GET, HeaderMap::new());
        assert!(ctx.cached_tokens().is_none());
    }
}
