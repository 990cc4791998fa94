//! Application Configuration
//!
//! Configuration for the CSRF middleware.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
use platform::cookie::CookieConfig;

use crate::domain::lookup::{TokenLookup, default_lookup};
use crate::domain::token::CsrfToken;
use crate::error::{CsrfError, CsrfResult};

/// Callback turning a rejection into the client response
pub type ErrorHandler = Arc<dyn Fn(CsrfError) -> Response + Send + Sync>;

/// Default rejection: generic 403 with the `csrf` category, reason kept server-side
pub fn default_error_handler(err: CsrfError) -> Response {
    AppError::from(err).into_response()
}

/// CSRF middleware configuration
#[derive(Clone)]
pub struct CsrfConfig {
    /// Random bytes per token
    pub token_length: usize,
    /// Token cookie attributes
    pub cookie: CookieConfig,
    /// Key under which templates see the current token
    pub context_key: String,
    /// Where the submitted token is looked up, in order
    pub lookup: TokenLookup,
    /// Largest urlencoded body buffered for a form lookup
    pub form_body_limit: usize,
    /// Path prefixes that bypass the middleware entirely
    pub exempt_paths: Vec<String>,
    /// Invoked on every rejection
    pub error_handler: ErrorHandler,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            token_length: CsrfToken::DEFAULT_LENGTH,
            cookie: CookieConfig {
                name: "_csrf".to_string(),
                path: "/".to_string(),
                domain: None,
                secure: true,
                http_only: true,
                same_site: SameSite::Strict,
                max_age_secs: Some(86_400),
            },
            context_key: "csrf".to_string(),
            lookup: default_lookup(),
            form_body_limit: 64 * 1024,
            exempt_paths: Vec::new(),
            error_handler: Arc::new(default_error_handler),
        }
    }
}

impl fmt::Debug for CsrfConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfConfig")
            .field("token_length", &self.token_length)
            .field("cookie", &self.cookie)
            .field("context_key", &self.context_key)
            .field("lookup", &self.lookup)
            .field("form_body_limit", &self.form_body_limit)
            .field("exempt_paths", &self.exempt_paths)
            .finish_non_exhaustive()
    }
}

impl CsrfConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        let mut config = Self::default();
        config.cookie.secure = false;
        config
    }

    pub fn token_length(mut self, len: usize) -> Self {
        self.token_length = len;
        self
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie.name = name.into();
        self
    }

    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie.path = path.into();
        self
    }

    pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.cookie.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.cookie.same_site = same_site;
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.cookie.max_age_secs = Some(max_age.as_secs() as i64);
        self
    }

    pub fn context_key(mut self, key: impl Into<String>) -> Self {
        self.context_key = key.into();
        self
    }

    pub fn lookup(mut self, lookup: TokenLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn form_body_limit(mut self, limit: usize) -> Self {
        self.form_body_limit = limit;
        self
    }

    pub fn exempt_path(mut self, prefix: impl Into<String>) -> Self {
        self.exempt_paths.push(prefix.into());
        self
    }

    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(CsrfError) -> Response + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Reject settings that would fail on every request
    pub fn validate(&self) -> CsrfResult<()> {
        if self.token_length == 0 {
            return Err(CsrfError::InvalidConfig(
                "token_length must be at least 1".into(),
            ));
        }
        if !self.cookie.has_valid_name() {
            return Err(CsrfError::InvalidConfig(format!(
                "`{}` is not a valid cookie name",
                self.cookie.name
            )));
        }
        if self.cookie.same_site == SameSite::None && !self.cookie.secure {
            return Err(CsrfError::InvalidConfig(
                "SameSite=None requires the Secure flag".into(),
            ));
        }
        if self.context_key.is_empty() {
            return Err(CsrfError::InvalidConfig("context_key must not be empty".into()));
        }
        // An empty prefix would exempt every path
        if let Some(prefix) = self.exempt_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(CsrfError::InvalidConfig(format!(
                "exempt path `{prefix}` must start with `/`"
            )));
        }
        // Cookie attributes must form a valid header value
        platform::cookie::set_cookie_header(&self.cookie, "0")
            .map_err(|e| CsrfError::InvalidConfig(format!("cookie attributes: {e}")))?;
        self.lookup.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::domain::lookup::TokenSource;

    #[test]
    fn test_default_config() {
        let config = CsrfConfig::default();

        assert_eq!(config.token_length, 32);
        assert_eq!(config.cookie.name, "_csrf");
        assert_eq!(config.cookie.path, "/");
        assert!(config.cookie.domain.is_none());
        assert!(config.cookie.secure);
        assert!(config.cookie.http_only);
        assert_eq!(config.cookie.same_site, SameSite::Strict);
        assert_eq!(config.cookie.max_age_secs, Some(86_400));
        assert_eq!(config.context_key, "csrf");
        assert_eq!(config.lookup.rules()[0].source, TokenSource::Header);
        assert!(config.exempt_paths.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_config() {
        let config = CsrfConfig::development();
        assert!(!config.cookie.secure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CsrfConfig::default()
            .token_length(16)
            .cookie_name("csrf_id")
            .cookie_domain("example.com")
            .same_site(SameSite::Lax)
            .max_age(Duration::from_secs(600))
            .exempt_path("/webhooks");

        assert_eq!(config.token_length, 16);
        assert_eq!(config.cookie.name, "csrf_id");
        assert_eq!(config.cookie.domain.as_deref(), Some("example.com"));
        assert_eq!(config.cookie.max_age_secs, Some(600));
        assert_eq!(config.exempt_paths, vec!["/webhooks".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(CsrfConfig::default().token_length(0).validate().is_err());
        assert!(CsrfConfig::default().cookie_name("bad name").validate().is_err());
        assert!(
            CsrfConfig::development()
                .same_site(SameSite::None)
                .validate()
                .is_err()
        );
        assert!(CsrfConfig::default().lookup(TokenLookup::new()).validate().is_err());
        assert!(CsrfConfig::default().cookie_domain("bad\ndomain").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unrooted_exempt_paths() {
        assert!(CsrfConfig::default().exempt_path("").validate().is_err());
        assert!(CsrfConfig::default().exempt_path("hooks").validate().is_err());
        assert!(CsrfConfig::default().exempt_path("/hooks").validate().is_ok());
    }

    #[test]
    fn test_custom_error_handler() {
        let config = CsrfConfig::default()
            .error_handler(|_err| (StatusCode::IM_A_TEAPOT, "nope").into_response());
        let response = (config.error_handler)(CsrfError::TokenMismatch);
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_debug_omits_handler() {
        let debug = format!("{:?}", CsrfConfig::default());
        assert!(debug.contains("_csrf"));
        assert!(!debug.contains("error_handler"));
    }
}
