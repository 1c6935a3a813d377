use std::{mem, sync::Arc};

use axum::http::{header, HeaderValue};
use chrono::Duration;
use tracing::debug;

use crate::{
    config::{AntiforgeryConfig, KeyMaterial, KeyMaterialProvider},
    context::{AntiforgeryResponse, RequestContext},
    error::{AntiforgeryError, Result},
    models::{RequestToken, TokenSet, COOKIE_NAME},
    services::{
        cipher::{AesCipher, SymmetricCipher},
        clock::{Clock, SystemClock},
        cookie_setter::{CookieSetter, DefaultCookieSetter},
        request_validator::RequestValidator,
    },
};

/// Issues and validates double-submit antiforgery tokens.
///
/// The service itself holds no per-request state and can be shared across
/// requests; the per-request token cache lives on [`RequestContext`].
#[derive(Clone)]
pub struct AntiforgeryService {
    validity: Duration,
    cipher: Arc<dyn SymmetricCipher>,
    cookie_setter: Arc<dyn CookieSetter>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AntiforgeryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AntiforgeryService")
            .field("validity", &self.validity)
            .field("cipher", &"[REDACTED]")
            .finish()
    }
}

impl AntiforgeryService {
    /// AES-backed service writing cookies with the configured attributes.
    pub fn new(keys: KeyMaterial, config: AntiforgeryConfig) -> Self {
        Self::with_components(
            config.validity,
            Arc::new(AesCipher::new(keys)),
            Arc::new(DefaultCookieSetter::new(config.cookie)),
        )
    }

    /// Fails when the provider cannot supply valid key material, so a
    /// misconfigured service never reaches a request.
    pub fn from_provider(
        provider: &dyn KeyMaterialProvider,
        config: AntiforgeryConfig,
    ) -> Result<Self> {
        let keys = provider.key_material()?;
        Ok(Self::new(keys, config))
    }

    pub fn with_components(
        validity: Duration,
        cipher: Arc<dyn SymmetricCipher>,
        cookie_setter: Arc<dyn CookieSetter>,
    ) -> Self {
        Self {
            validity,
            cipher,
            cookie_setter,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Always mints a brand new token set, bypassing the request cache.
    pub fn mint_token_set(&self) -> Result<TokenSet> {
        let token = RequestToken::create(self.clock.now(), self.validity);
        let plaintext = token.serialize();
        let encrypted = self.cipher.encrypt(&plaintext)?;

        // The form field / header carries the plaintext, the cookie the ciphertext.
        Ok(TokenSet::new(plaintext, encrypted))
    }

    /// The token set for this request, minted on first use.
    ///
    /// Concurrent callers on one context race to initialise the cache; exactly
    /// one mint wins and everyone observes it.
    pub fn issue_tokens(&self, context: &RequestContext) -> Result<TokenSet> {
        let cache = context.token_cache();
        if cache.get().is_some() {
            debug!("issue_tokens - reusing existing tokens");
        }

        let tokens = cache.get_or_try_init(|| {
            debug!("issue_tokens - creating new tokens");
            self.mint_token_set()
        })?;

        Ok(tokens.clone())
    }

    /// Issue tokens, mark the response uncacheable and write the cookie.
    pub fn issue_and_persist(
        &self,
        context: &RequestContext,
        response: &mut AntiforgeryResponse,
    ) -> Result<TokenSet> {
        debug!(method = %context.request_method(), "issue_and_persist");

        response
            .headers
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        response
            .headers
            .insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        response
            .headers
            .insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));

        let tokens = self.issue_tokens(context)?;

        debug!("Setting request cookie");
        let jar = mem::take(&mut response.cookies);
        response.cookies = self
            .cookie_setter
            .set(jar, COOKIE_NAME, &tokens.cookie_token);

        Ok(tokens)
    }

    pub fn is_valid(&self, context: &RequestContext) -> bool {
        RequestValidator::new(self.cipher.as_ref(), self.clock.now()).is_valid(context)
    }

    pub fn assert_valid(&self, context: &RequestContext) -> Result<()> {
        if self.is_valid(context) {
            Ok(())
        } else {
            Err(AntiforgeryError::ValidationFailed)
        }
    }
}
