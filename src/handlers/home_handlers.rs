use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    context::{AntiforgeryRequest, AntiforgeryResponse, RequestContext},
    error::AntiforgeryError,
    models::TokenSet,
    AppState,
};

#[derive(Template)]
#[template(path = "home/index.html")]
struct IndexTemplate {
    form_field_name: String,
    header_name: String,
    request_token: String,
    say: String,
}

#[derive(Debug, Deserialize)]
pub struct SayRequest {
    pub say: String,
}

#[derive(Debug, Serialize)]
pub struct SayResponse {
    pub say: String,
}

fn render_index(tokens: &TokenSet, say: String) -> Html<String> {
    let template = IndexTemplate {
        form_field_name: tokens.form_field_name.clone(),
        header_name: tokens.header_name.clone(),
        request_token: tokens.request_token.clone(),
        say,
    };
    Html(template.render().unwrap_or_else(|_| {
        "<html><body><h1>Error rendering page</h1></body></html>".to_string()
    }))
}

/// Render the page with fresh tokens; the cookie and no-cache headers ride along.
fn page_with_tokens(
    state: &AppState,
    context: &RequestContext,
    say: String,
) -> Result<Response, AntiforgeryError> {
    let mut response = AntiforgeryResponse::default();
    let tokens = state.antiforgery.issue_and_persist(context, &mut response)?;
    Ok((response, render_index(&tokens, say)).into_response())
}

fn submitted_say(context: &RequestContext) -> String {
    context.form_value("say").unwrap_or_default().to_string()
}

pub async fn index_page(
    State(state): State<AppState>,
    Extension(context): Extension<Arc<RequestContext>>,
) -> Result<Response, AntiforgeryError> {
    page_with_tokens(&state, &context, String::new())
}

pub async fn index_post(
    State(state): State<AppState>,
    Extension(context): Extension<Arc<RequestContext>>,
) -> Result<Response, AntiforgeryError> {
    let say = submitted_say(&context);
    page_with_tokens(&state, &context, say)
}

pub async fn index2_post(
    State(state): State<AppState>,
    Extension(context): Extension<Arc<RequestContext>>,
) -> Result<Response, AntiforgeryError> {
    let say = format!("{}_2", submitted_say(&context));
    page_with_tokens(&state, &context, say)
}

/// Token set for script clients that send the header instead of a form field.
pub async fn token_handler(
    State(state): State<AppState>,
    Extension(context): Extension<Arc<RequestContext>>,
) -> Result<Response, AntiforgeryError> {
    let mut response = AntiforgeryResponse::default();
    let tokens = state.antiforgery.issue_and_persist(&context, &mut response)?;
    Ok((response, Json(tokens)).into_response())
}

pub async fn api_say(Json(request): Json<SayRequest>) -> Json<SayResponse> {
    Json(SayResponse { say: request.say })
}
