//! Request-scoped token context
//!
//! The middleware stores a [`CsrfContext`] in request extensions after
//! minting. Handlers extract it to embed the token into rendered forms or
//! HTMX attributes.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::lookup::{DEFAULT_FORM_FIELD, DEFAULT_HEADER_NAME, TokenSource};
use crate::domain::token::CsrfToken;
use crate::error::CsrfError;

/// Current token plus the names clients must echo it under
#[derive(Debug, Clone)]
pub struct CsrfContext {
    key: Arc<str>,
    token: CsrfToken,
    header_name: Arc<str>,
    field_name: Arc<str>,
}

impl CsrfContext {
    pub(crate) fn new(
        key: Arc<str>,
        token: CsrfToken,
        header_name: Arc<str>,
        field_name: Arc<str>,
    ) -> Self {
        Self {
            key,
            token,
            header_name,
            field_name,
        }
    }

    /// Key templates use for the token
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &CsrfToken {
        &self.token
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// `<input type="hidden">` carrying the token under the form field name
    pub fn hidden_input(&self) -> String {
        format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            html_escape::encode_double_quoted_attribute(&*self.field_name),
            html_escape::encode_double_quoted_attribute(self.token.as_str()),
        )
    }

    /// JSON object for an `hx-headers` attribute
    pub fn hx_headers(&self) -> String {
        let mut headers = serde_json::Map::new();
        headers.insert(
            self.header_name.to_string(),
            serde_json::Value::String(self.token.to_string()),
        );
        serde_json::Value::Object(headers).to_string()
    }
}

/// Names clients submit the token under, taken from the lookup chain
pub(crate) fn submission_names(
    lookup: &crate::domain::lookup::TokenLookup,
) -> (Arc<str>, Arc<str>) {
    let header = lookup
        .first_name(TokenSource::Header)
        .unwrap_or(DEFAULT_HEADER_NAME);
    let field = lookup
        .first_name(TokenSource::Form)
        .unwrap_or(DEFAULT_FORM_FIELD);
    (Arc::from(header), Arc::from(field))
}

impl<S> FromRequestParts<S> for CsrfContext
where
    S: Send + Sync,
{
    type Rejection = CsrfError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfContext>()
            .cloned()
            .ok_or(CsrfError::ContextMissing)
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = CsrfError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfContext>()
            .map(|ctx| ctx.token.clone())
            .ok_or(CsrfError::ContextMissing)
    }
}
