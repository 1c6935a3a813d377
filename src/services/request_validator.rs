use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::{
    context::AntiforgeryRequest,
    models::{RequestToken, COOKIE_NAME, FORM_FIELD_NAME, HEADER_NAME},
    services::cipher::SymmetricCipher,
};

/// Methods exempt from validation because they must not change state.
pub const SAFE_METHODS: [&str; 4] = ["GET", "HEAD", "OPTIONS", "TRACE"];

/// Why a request was turned away. Logged, never shown to the client.
#[derive(Debug, Error)]
enum Rejection {
    #[error("the cookie value was not set")]
    MissingCookie,
    #[error("the cookie value could not be decrypted")]
    UndecryptableCookie,
    #[error("the cookie value was not a valid token")]
    MalformedCookie,
    #[error("no header was sent and the request does not have a form content type")]
    NotAFormPost,
    #[error("neither the header nor the form field was set")]
    MissingSecondaryToken,
    #[error("the secondary token was not a valid token")]
    MalformedSecondaryToken,
    #[error("the cookie token id did not match the secondary token id")]
    Mismatch,
    #[error("the token has expired")]
    Expired,
}

/// Decides whether a request carries a matching, unexpired token pair.
pub struct RequestValidator<'a> {
    cipher: &'a dyn SymmetricCipher,
    now: DateTime<Utc>,
}

impl<'a> RequestValidator<'a> {
    pub fn new(cipher: &'a dyn SymmetricCipher, now: DateTime<Utc>) -> Self {
        Self { cipher, now }
    }

    pub fn is_valid<R>(&self, request: &R) -> bool
    where
        R: AntiforgeryRequest + ?Sized,
    {
        match self.check(request) {
            Ok(()) => {
                debug!(method = request.method(), "antiforgery validation passed");
                true
            }
            Err(reason) => {
                debug!(method = request.method(), %reason, "antiforgery validation failed");
                false
            }
        }
    }

    fn check<R>(&self, request: &R) -> Result<(), Rejection>
    where
        R: AntiforgeryRequest + ?Sized,
    {
        if is_safe_method(request.method()) {
            return Ok(());
        }

        let cookie_token = self.cookie_token(request)?;
        let secondary = secondary_token(request)?;

        if cookie_token.id != secondary.id {
            return Err(Rejection::Mismatch);
        }

        // The cookie half is encrypted, so its expiry is the one to trust.
        if cookie_token.has_expired(self.now) {
            return Err(Rejection::Expired);
        }

        Ok(())
    }

    fn cookie_token<R>(&self, request: &R) -> Result<RequestToken, Rejection>
    where
        R: AntiforgeryRequest + ?Sized,
    {
        let encrypted = request.cookie(COOKIE_NAME).ok_or(Rejection::MissingCookie)?;
        let plaintext = self
            .cipher
            .decrypt(encrypted)
            .map_err(|_| Rejection::UndecryptableCookie)?;

        if plaintext.trim().is_empty() {
            return Err(Rejection::MissingCookie);
        }

        RequestToken::parse(&plaintext).map_err(|_| Rejection::MalformedCookie)
    }
}

fn secondary_token<R>(request: &R) -> Result<RequestToken, Rejection>
where
    R: AntiforgeryRequest + ?Sized,
{
    let value = match non_blank(request.header(HEADER_NAME)) {
        Some(value) => value,
        None => {
            if !request.has_form_content_type() {
                return Err(Rejection::NotAFormPost);
            }
            non_blank(request.form_value(FORM_FIELD_NAME)).ok_or(Rejection::MissingSecondaryToken)?
        }
    };

    RequestToken::parse(value).map_err(|_| Rejection::MalformedSecondaryToken)
}

pub fn is_safe_method(method: &str) -> bool {
    SAFE_METHODS
        .iter()
        .any(|safe| safe.eq_ignore_ascii_case(method))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
