//! HTTP routes for the user demo
//!
//! Every route runs behind the CSRF middleware. Handlers take the current
//! token from [`CsrfContext`] to render it into forms. HTMX changes answer
//! with an out-of-band token refresh, since every accepted change rotates
//! the cookie.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router, middleware};
use csrf::{CsrfContext, CsrfProtector, csrf_middleware};
use kernel::error::app_error::AppError;
use serde::Deserialize;

use crate::users::UserStore;
use crate::views;

const HX_REQUEST: &str = "HX-Request";

#[derive(Debug, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
}

pub fn router(store: UserStore, protector: Arc<CsrfProtector>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/users", post(create_user))
        .route("/users/new", get(new_user_form))
        .route("/users/{id}", delete(delete_user))
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(protector, csrf_middleware))
        .with_state(store)
}

async fn index(State(store): State<UserStore>, ctx: CsrfContext) -> Html<String> {
    let users = store.list().await;
    Html(views::index_page(&ctx, &users))
}

async fn new_user_form(ctx: CsrfContext) -> Html<String> {
    Html(views::user_form(&ctx, false))
}

async fn create_user(
    State(store): State<UserStore>,
    ctx: CsrfContext,
    headers: HeaderMap,
    Form(input): Form<NewUser>,
) -> Response {
    let htmx = headers.contains_key(HX_REQUEST);

    match store.create(&input.name).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "User created");
            // Plain form posts go back to the page
            if !htmx {
                return Redirect::to("/").into_response();
            }
            let fragment = views::user_item(&user) + &views::token_refresh(&ctx, None);
            Html(fragment).into_response()
        }
        Err(err) if htmx => htmx_error(&ctx, err),
        Err(err) => err.into_response(),
    }
}

async fn delete_user(
    State(store): State<UserStore>,
    ctx: CsrfContext,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    let htmx = headers.contains_key(HX_REQUEST);

    match store.delete(id).await {
        Ok(()) => {
            tracing::info!(user_id = id, "User deleted");
            if !htmx {
                return Html("").into_response();
            }
            // Main content is empty, so the list item is removed
            Html(views::token_refresh(&ctx, None)).into_response()
        }
        Err(err) if htmx => htmx_error(&ctx, err),
        Err(err) => err.into_response(),
    }
}

/// Client errors for HTMX requests
///
/// htmx drops non-2xx responses, out-of-band swaps included, so the message
/// and the fresh token go out as a 200 with the main swap disabled.
fn htmx_error(ctx: &CsrfContext, err: AppError) -> Response {
    if err.is_server_error() {
        return err.into_response();
    }
    tracing::debug!(error = %err, "HTMX change refused");
    (
        [("HX-Reswap", "none")],
        Html(views::token_refresh(ctx, Some(err.message()))),
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
