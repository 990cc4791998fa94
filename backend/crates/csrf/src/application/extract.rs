//! Submitted Token Extraction
//!
//! Walks the lookup chain over headers, query string and urlencoded form
//! fields and returns the first non-empty value. Pure reads only.

use axum::http::{HeaderMap, header};

use crate::domain::lookup::{TokenLookup, TokenSource};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded `name=value` pairs from a query string or urlencoded body
#[derive(Debug, Clone, Default)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn parse(input: &[u8]) -> Self {
        Self(
            form_urlencoded::parse(input)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// Parse a request body, only when it is urlencoded
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Self {
        if content_type.is_some_and(is_form_content_type) {
            Self::parse(body)
        } else {
            Self::default()
        }
    }

    /// First non-empty value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }
}

/// Whether a `Content-Type` value denotes an urlencoded form
pub fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// The request's `Content-Type`, if readable
pub fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::CONTENT_TYPE)?.to_str().ok()
}

/// Inputs visible to the extractor for one request
pub struct SubmittedSources<'a> {
    pub headers: &'a HeaderMap,
    pub query: Option<&'a str>,
    pub form: Option<&'a FormFields>,
}

/// Try each rule in order; first non-empty value wins
pub fn extract_submitted(lookup: &TokenLookup, sources: &SubmittedSources<'_>) -> Option<String> {
    let query = sources.query.map(|q| FormFields::parse(q.as_bytes()));

    lookup.rules().iter().find_map(|rule| match rule.source {
        TokenSource::Header => sources
            .headers
            .get_all(rule.name.as_str())
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string),
        TokenSource::Form => sources
            .form
            .and_then(|f| f.get(&rule.name))
            .map(str::to_string),
        TokenSource::Query => query
            .as_ref()
            .and_then(|q| q.get(&rule.name))
            .map(str::to_string),
    })
}
