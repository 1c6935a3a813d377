pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use axum::http::{header, HeaderMap, HeaderValue, Method};
    use axum_extra::extract::cookie::{Cookie, CookieJar};
    use chrono::Duration;

    use crate::{
        config::KeyMaterial,
        context::RequestContext,
        error::CipherError,
        models::{TokenSet, COOKIE_NAME, FORM_FIELD_NAME, HEADER_NAME},
        services::{cipher::SymmetricCipher, cookie_setter::CookieSetter, AntiforgeryService},
    };

    /// Sample key and IV, base64. For tests and local demos only.
    pub const SAMPLE_KEY: &str = "PoQ2zO0w8A/n8eXl3eoN2AQXYhSIyMXJW2QVTzJOVA4=";
    pub const SAMPLE_IV: &str = "L3RrIxqIug+XVp9/fiV4AQ==";

    pub fn sample_keys() -> KeyMaterial {
        match KeyMaterial::from_base64(SAMPLE_KEY, SAMPLE_IV) {
            Ok(keys) => keys,
            Err(e) => panic!("sample key material is invalid: {}", e),
        }
    }

    /// A cipher that leaves values untouched, so tests can read cookies directly.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PlaintextCipher;

    impl SymmetricCipher for PlaintextCipher {
        fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
            Ok(plaintext.to_string())
        }

        fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
            Ok(ciphertext.to_string())
        }
    }

    /// Records every cookie it is asked to set, then sets it.
    #[derive(Debug, Default)]
    pub struct RecordingCookieSetter {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingCookieSetter {
        pub fn calls(&self) -> Vec<(String, String)> {
            self.calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default()
        }
    }

    impl CookieSetter for RecordingCookieSetter {
        fn set(&self, jar: CookieJar, name: &str, value: &str) -> CookieJar {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((name.to_string(), value.to_string()));
            }
            jar.add(Cookie::new(name.to_string(), value.to_string()))
        }
    }

    /// Service with a no-op cipher and a recording cookie setter.
    pub fn plaintext_service(validity: Duration) -> AntiforgeryService {
        AntiforgeryService::with_components(
            validity,
            Arc::new(PlaintextCipher),
            Arc::new(RecordingCookieSetter::default()),
        )
    }

    /// `Cookie` header value carrying an encrypted token.
    pub fn cookie_header(cookie_token: &str) -> HeaderValue {
        let pair = Cookie::new(COOKIE_NAME, cookie_token.to_string())
            .encoded()
            .to_string();
        match HeaderValue::from_str(&pair) {
            Ok(value) => value,
            Err(e) => panic!("cookie value is not a valid header: {}", e),
        }
    }

    fn header_value(value: &str) -> HeaderValue {
        match HeaderValue::from_str(value) {
            Ok(value) => value,
            Err(e) => panic!("invalid header value {:?}: {}", value, e),
        }
    }

    /// JSON POST carrying the cookie and the plaintext token in the header.
    pub fn header_post(tokens: &TokenSet) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, cookie_header(&tokens.cookie_token));
        headers.insert(HEADER_NAME, header_value(&tokens.request_token));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        RequestContext::new(Method::POST, headers)
    }

    /// Form POST carrying the cookie and the plaintext token in the form field.
    pub fn form_post(tokens: &TokenSet) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, cookie_header(&tokens.cookie_token));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        RequestContext::new(Method::POST, headers)
            .with_form([(FORM_FIELD_NAME, tokens.request_token.as_str())])
    }
}
