//! Presentation Layer
//!
//! axum middleware and extractors.

pub mod context;
pub mod middleware;
