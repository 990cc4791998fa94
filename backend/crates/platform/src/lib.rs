//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (secure random bytes, hex, constant-time comparison)
//! - Cookie management

pub mod cookie;
pub mod crypto;
