//! CSRF Middleware
//!
//! Install with `axum::middleware::from_fn_with_state(protector, csrf_middleware)`.
//!
//! Safe methods mint a token. Every other method must echo the cookie token
//! through the lookup chain, then gets a fresh token.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::extract::{
    FormFields, SubmittedSources, content_type, extract_submitted, is_form_content_type,
};
use crate::application::protector::CsrfProtector;
use crate::domain::lookup::TokenSource;
use crate::error::{CsrfError, CsrfResult};

/// Double-submit CSRF middleware
pub async fn csrf_middleware(
    State(protector): State<Arc<CsrfProtector>>,
    req: Request,
    next: Next,
) -> Response {
    if protector.is_exempt(req.uri().path()) {
        return next.run(req).await;
    }

    let mut req = if CsrfProtector::is_safe(req.method()) {
        req
    } else {
        match validate(&protector, req).await {
            Ok(req) => req,
            Err(err) => return protector.reject(err),
        }
    };

    let issued = match protector.issue() {
        Ok(issued) => issued,
        Err(err) => return protector.reject(err),
    };

    req.extensions_mut()
        .insert(protector.context_for(issued.token));

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .append(header::SET_COOKIE, issued.set_cookie);
    response
}

/// CheckCookie, ExtractSubmitted and Compare for a state-changing request
///
/// Returns the request with its body restored when it had to be buffered.
async fn validate(protector: &CsrfProtector, req: Request) -> CsrfResult<Request> {
    let cookie = protector.cookie_token(req.headers());

    let (req, form) = if cookie.is_some() && protector.config().lookup.has_source(TokenSource::Form)
    {
        buffer_form(req, protector.config().form_body_limit)
            .await
            .map_err(|e| protector.record_failure(e))?
    } else {
        (req, None)
    };

    let submitted = extract_submitted(
        &protector.config().lookup,
        &SubmittedSources {
            headers: req.headers(),
            query: req.uri().query(),
            form: form.as_ref(),
        },
    );

    protector.verify(cookie.as_deref(), submitted.as_deref())?;

    tracing::debug!(method = %req.method(), path = %req.uri().path(), "CSRF token accepted");

    Ok(req)
}

/// Read an urlencoded body for the form lookup and put it back
async fn buffer_form(req: Request, limit: usize) -> CsrfResult<(Request, Option<FormFields>)> {
    if !content_type(req.headers()).is_some_and(is_form_content_type) {
        return Ok((req, None));
    }

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| CsrfError::BodyUnreadable(e.to_string()))?;
    let form = FormFields::parse(&bytes);

    Ok((Request::from_parts(parts, Body::from(bytes)), Some(form)))
}
