pub mod home_handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{middleware::antiforgery_middleware, AppState};

pub use home_handlers::{api_say, index2_post, index_page, index_post, token_handler};

/// Demo application routes, all behind the antiforgery middleware.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page).post(index_post))
        .route("/index2", post(index2_post))
        .route("/api/say", post(api_say))
        .route("/antiforgery/token", get(token_handler))
        .layer(middleware::from_fn_with_state(
            state.antiforgery.clone(),
            antiforgery_middleware,
        ))
        .with_state(state)
}
