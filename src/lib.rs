//! Double-submit-cookie antiforgery protection for axum applications.
//!
//! Each token is issued twice: encrypted with AES in a cookie, and in
//! plaintext for the page to echo back in a form field or request header.
//! A state-changing request is accepted only when both halves are present,
//! carry the same identity, and the cookie half has not expired.

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

pub use config::{AntiforgeryConfig, KeyMaterial};
pub use context::{AntiforgeryRequest, AntiforgeryResponse, RequestContext};
pub use error::{AntiforgeryError, Result};
pub use models::{RequestToken, TokenSet, COOKIE_NAME, FORM_FIELD_NAME, HEADER_NAME};
pub use services::AntiforgeryService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub antiforgery: AntiforgeryService,
}
