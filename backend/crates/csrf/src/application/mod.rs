//! Application Layer - Validation and rotation
//!
//! Orchestrates the token domain against one request: configuration,
//! submitted-token extraction and the protector state machine.

pub mod config;
pub mod extract;
pub mod protector;
