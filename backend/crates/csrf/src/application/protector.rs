//! CSRF Protector - token validation and rotation
//!
//! One `CsrfProtector` is built at startup and shared by reference. It holds
//! no token state; the cookie is the only store. The single shared mutable
//! value is the failure counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::Response;

use crate::application::config::CsrfConfig;
use crate::domain::token::CsrfToken;
use crate::error::{CsrfError, CsrfResult};
use crate::presentation::context::{CsrfContext, submission_names};

/// A freshly minted token and the cookie carrying it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: CsrfToken,
    pub set_cookie: HeaderValue,
}

/// Validator / rotator for double-submit tokens
#[derive(Debug)]
pub struct CsrfProtector {
    config: CsrfConfig,
    key: Arc<str>,
    header_name: Arc<str>,
    field_name: Arc<str>,
    failures: AtomicU64,
}

impl CsrfProtector {
    /// Validate the config and build the protector
    pub fn new(config: CsrfConfig) -> CsrfResult<Self> {
        config.validate()?;
        let key = Arc::from(config.context_key.as_str());
        let (header_name, field_name) = submission_names(&config.lookup);
        Ok(Self {
            config,
            key,
            header_name,
            field_name,
            failures: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Request-scoped context for a freshly minted token
    pub(crate) fn context_for(&self, token: CsrfToken) -> CsrfContext {
        CsrfContext::new(
            self.key.clone(),
            token,
            self.header_name.clone(),
            self.field_name.clone(),
        )
    }

    /// GET, HEAD and OPTIONS never validate, only mint
    pub fn is_safe(method: &Method) -> bool {
        matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
    }

    /// Whether `path` falls under one of the exempt prefixes
    ///
    /// Prefixes match on segment boundaries: `/hooks` covers `/hooks/github`
    /// but not `/hooksmith`.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.config.exempt_paths.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str()).is_some_and(|rest| {
                rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/')
            })
        })
    }

    /// Token cookie value, `None` when absent or empty
    pub fn cookie_token(&self, headers: &HeaderMap) -> Option<String> {
        platform::cookie::extract_cookie(headers, &self.config.cookie.name)
            .filter(|v| !v.is_empty())
    }

    /// Check the cookie token against the submitted one
    ///
    /// Missing cookie is checked before missing submission. Every failure
    /// bumps the failure counter.
    pub fn verify(&self, cookie: Option<&str>, submitted: Option<&str>) -> CsrfResult<()> {
        let Some(cookie) = cookie.filter(|c| !c.is_empty()) else {
            return Err(self.record_failure(CsrfError::CookieNotFound));
        };
        let Some(submitted) = submitted.filter(|s| !s.is_empty()) else {
            return Err(self.record_failure(CsrfError::TokenNotFound));
        };

        if !CsrfToken::from_issued(cookie).matches(submitted) {
            return Err(self.record_failure(CsrfError::TokenMismatch));
        }

        Ok(())
    }

    /// Mint a token and build its `Set-Cookie` header
    ///
    /// Fails closed when the secure random source is unavailable.
    pub fn issue(&self) -> CsrfResult<IssuedToken> {
        let token = CsrfToken::generate(self.config.token_length)?;
        let set_cookie = platform::cookie::set_cookie_header(&self.config.cookie, token.as_str())
            .map_err(|e| CsrfError::Internal(format!("invalid Set-Cookie value: {e}")))?;

        tracing::debug!(cookie = %self.config.cookie.name, "Issued CSRF token");

        Ok(IssuedToken { token, set_cookie })
    }

    /// Log the reason and hand the error to the configured handler
    pub fn reject(&self, err: CsrfError) -> Response {
        err.log();
        (self.config.error_handler)(err)
    }

    /// Rejections since startup
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub(crate) fn record_failure(&self, err: CsrfError) -> CsrfError {
        let total = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(failures = total, reason = %err, "CSRF failure recorded");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    fn protector() -> CsrfProtector {
        CsrfProtector::new(CsrfConfig::development()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(CsrfProtector::new(CsrfConfig::default().token_length(0)).is_err());
    }

    #[test]
    fn test_safe_methods() {
        assert!(CsrfProtector::is_safe(&Method::GET));
        assert!(CsrfProtector::is_safe(&Method::HEAD));
        assert!(CsrfProtector::is_safe(&Method::OPTIONS));
        assert!(!CsrfProtector::is_safe(&Method::POST));
        assert!(!CsrfProtector::is_safe(&Method::PUT));
        assert!(!CsrfProtector::is_safe(&Method::PATCH));
        assert!(!CsrfProtector::is_safe(&Method::DELETE));
        assert!(!CsrfProtector::is_safe(&Method::TRACE));
        assert!(!CsrfProtector::is_safe(&Method::from_bytes(b"PURGE").unwrap()));
    }

    #[test]
    fn test_exempt_paths() {
        let protector = CsrfProtector::new(
            CsrfConfig::development()
                .exempt_path("/hooks")
                .exempt_path("/api/public/"),
        )
        .unwrap();

        assert!(protector.is_exempt("/hooks"));
        assert!(protector.is_exempt("/hooks/github"));
        assert!(!protector.is_exempt("/hooksmith"));
        assert!(protector.is_exempt("/api/public/ping"));
        assert!(!protector.is_exempt("/users"));
    }

    #[test]
    fn test_issue_builds_cookie() {
        let issued = protector().issue().unwrap();
        assert_eq!(issued.token.as_str().len(), 64);

        let cookie = issued.set_cookie.to_str().unwrap();
        assert!(cookie.starts_with(&format!("_csrf={}; ", issued.token.as_str())));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_issue_rotates() {
        let protector = protector();
        let a = protector.issue().unwrap();
        let b = protector.issue().unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_verify_outcomes() {
        let protector = protector();
        let token = "ab".repeat(32);

        assert!(protector.verify(Some(&token), Some(&token)).is_ok());
        assert_eq!(protector.failure_count(), 0);

        assert!(matches!(
            protector.verify(None, Some(&token)),
            Err(CsrfError::CookieNotFound)
        ));
        assert!(matches!(
            protector.verify(Some(""), Some(&token)),
            Err(CsrfError::CookieNotFound)
        ));
        assert!(matches!(
            protector.verify(Some(&token), None),
            Err(CsrfError::TokenNotFound)
        ));
        assert!(matches!(
            protector.verify(Some(&token), Some("")),
            Err(CsrfError::TokenNotFound)
        ));

        let mut wrong = token.clone();
        wrong.replace_range(63.., "c");
        assert!(matches!(
            protector.verify(Some(&token), Some(&wrong)),
            Err(CsrfError::TokenMismatch)
        ));

        assert_eq!(protector.failure_count(), 5);
    }

    #[test]
    fn test_missing_cookie_wins_over_missing_submission() {
        assert!(matches!(
            protector().verify(None, None),
            Err(CsrfError::CookieNotFound)
        ));
    }

    #[test]
    fn test_cookie_token() {
        let protector = protector();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("a=1; _csrf=tok"));
        assert_eq!(protector.cookie_token(&headers), Some("tok".to_string()));

        headers.insert(header::COOKIE, HeaderValue::from_static("_csrf="));
        assert_eq!(protector.cookie_token(&headers), None);
    }

    #[test]
    fn test_reject_uses_handler() {
        let protector = CsrfProtector::new(
            CsrfConfig::development()
                .error_handler(|_| (StatusCode::IM_A_TEAPOT, "nope").into_response()),
        )
        .unwrap();
        let response = protector.reject(CsrfError::TokenMismatch);
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
