//! HTML rendering
//!
//! Every user-supplied string goes through `html_escape` before it is
//! written into markup.
//!
//! The page keeps the current token in a hidden state element. A small
//! script copies it into the headers of every HTMX request, and each HTMX
//! response swaps the element (and the form) out of band, so the page
//! always holds the token from the latest cookie.

use csrf::CsrfContext;

use crate::users::User;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

const OOB: &str = r#" hx-swap-oob="true""#;

pub fn index_page(ctx: &CsrfContext, users: &[User]) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Users</title>
<script src="{HTMX_SRC}"></script>
</head>
<body>
{state}
<h1>Users</h1>
<ul id="users">
{items}</ul>
{errors}
{form}
{script}
</body>
</html>
"#,
        state = token_state(ctx, false),
        items = users.iter().map(user_item).collect::<String>(),
        errors = form_errors(None, false),
        form = user_form(ctx, false),
        script = header_script(ctx),
    )
}

/// Form posting to `/users`; works with and without HTMX
pub fn user_form(ctx: &CsrfContext, oob: bool) -> String {
    format!(
        r##"<form id="user-form"{oob} method="post" action="/users" hx-post="/users" hx-target="#users" hx-swap="beforeend">
{hidden}
<input type="text" name="name" required>
<button type="submit">Add</button>
</form>
"##,
        oob = if oob { OOB } else { "" },
        hidden = ctx.hidden_input(),
    )
}

pub fn user_item(user: &User) -> String {
    format!(
        r##"<li id="user-{id}">{name} <button hx-delete="/users/{id}" hx-target="#user-{id}" hx-swap="outerHTML">Delete</button></li>
"##,
        id = user.id,
        name = html_escape::encode_text(&user.name),
    )
}

/// Out-of-band swaps carrying the token minted for this response
pub fn token_refresh(ctx: &CsrfContext, error: Option<&str>) -> String {
    format!(
        "{}{}{}",
        token_state(ctx, true),
        form_errors(error, true),
        user_form(ctx, true),
    )
}

fn state_id(ctx: &CsrfContext) -> String {
    format!("{}-state", ctx.key())
}

fn token_state(ctx: &CsrfContext, oob: bool) -> String {
    format!(
        "<div id=\"{id}\"{oob} hidden data-headers='{headers}'></div>\n",
        id = html_escape::encode_double_quoted_attribute(&state_id(ctx)),
        oob = if oob { OOB } else { "" },
        headers = html_escape::encode_single_quoted_attribute(&ctx.hx_headers()),
    )
}

fn form_errors(error: Option<&str>, oob: bool) -> String {
    format!(
        "<p id=\"form-errors\"{oob} role=\"alert\">{message}</p>\n",
        oob = if oob { OOB } else { "" },
        message = html_escape::encode_text(error.unwrap_or_default()),
    )
}

fn header_script(ctx: &CsrfContext) -> String {
    format!(
        r#"<script>
document.addEventListener("htmx:configRequest", (event) => {{
  const state = document.getElementById({id});
  if (state) Object.assign(event.detail.headers, JSON.parse(state.dataset.headers));
}});
</script>"#,
        id = serde_json::Value::String(state_id(ctx)),
    )
}
