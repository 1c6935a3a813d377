use std::sync::Arc;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    context::RequestContext,
    error::AntiforgeryError,
    services::{is_safe_method, AntiforgeryService},
};

/// Largest request body buffered for form-field lookup.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Validate every request and attach its [`RequestContext`] for handlers.
///
/// Safe methods pass straight through with their body untouched. For the rest
/// the body is buffered so urlencoded forms can be searched for the token,
/// then handed on unchanged. Handlers pick the context up with
/// `Extension<Arc<RequestContext>>` to issue tokens for the response.
pub async fn antiforgery_middleware(
    State(service): State<AntiforgeryService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AntiforgeryError> {
    if is_safe_method(request.method().as_str()) {
        let context = Arc::new(RequestContext::new(
            request.method().clone(),
            request.headers().clone(),
        ));
        request.extensions_mut().insert(context);
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, MAX_BODY_BYTES).await?;

    let context = Arc::new(RequestContext::from_parts(
        parts.method.clone(),
        parts.headers.clone(),
        &bytes,
    ));

    debug!("Validating antiforgery token for {} {}", parts.method, parts.uri.path());
    service.assert_valid(&context)?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
