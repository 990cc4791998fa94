//! Domain Layer - Token and lookup vocabulary
//!
//! This layer contains:
//! - The token value object (minting, constant-time matching)
//! - Lookup rules describing where a submitted token may be found

pub mod lookup;
pub mod token;
