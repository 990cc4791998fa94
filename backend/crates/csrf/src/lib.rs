//! CSRF (Cross-Site Request Forgery) Protection Module
//!
//! Layered structure:
//! - `domain/` - Token value object, lookup rules
//! - `application/` - Configuration, submitted-token extraction, protector
//! - `presentation/` - axum middleware and extractors
//!
//! ## Security Model
//! - Stateless double-submit cookie: the server keeps no token store
//! - Safe methods (GET, HEAD, OPTIONS) only mint; every other method must echo
//!   the cookie token through a header, form field or query parameter
//! - Tokens rotate after every accepted request
//! - Comparison is constant-time
//! - All rejections share one client-visible error; the reason is logged only
//! - Minting fails closed if the OS random source is unavailable
//!
//! ## Known limitation
//! Each rotation overwrites the cookie. Two tabs or concurrent requests that
//! share a cookie jar race: a form rendered before another request rotated
//! the token is rejected and must be reloaded. A per-session server-side
//! store would avoid this at the cost of state.
//!
//! ## Usage
//! ```no_run
//! use std::sync::Arc;
//! use axum::{Router, middleware, routing::get};
//! use csrf::{CsrfConfig, CsrfContext, CsrfProtector, csrf_middleware};
//!
//! async fn form(ctx: CsrfContext) -> String {
//!     format!("<form method=\"post\">{}</form>", ctx.hidden_input())
//! }
//!
//! let protector = Arc::new(CsrfProtector::new(CsrfConfig::default()).unwrap());
//! let app: Router = Router::new()
//!     .route("/", get(form))
//!     .layer(middleware::from_fn_with_state(protector, csrf_middleware));
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{CsrfConfig, ErrorHandler, SameSite, default_error_handler};
pub use application::protector::{CsrfProtector, IssuedToken};
pub use domain::lookup::{LookupRule, TokenLookup, TokenSource};
pub use domain::token::CsrfToken;
pub use error::{CsrfError, CsrfResult};
pub use presentation::context::CsrfContext;
pub use presentation::middleware::csrf_middleware;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    category::ErrorCategory,
    kind::ErrorKind,
};
