//! Server configuration from environment variables

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use csrf::{CsrfConfig, SameSite, TokenLookup};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

#[derive(Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub csrf: CsrfConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let mut csrf = if cfg!(debug_assertions) {
            CsrfConfig::development()
        } else {
            CsrfConfig::default()
        };

        if let Some(name) = var("CSRF_COOKIE_NAME") {
            csrf = csrf.cookie_name(name);
        }
        if let Some(domain) = var("CSRF_COOKIE_DOMAIN").filter(|d| !d.is_empty()) {
            csrf = csrf.cookie_domain(domain);
        }
        if let Some(secure) = var("CSRF_COOKIE_SECURE") {
            let secure = secure
                .parse::<bool>()
                .context("CSRF_COOKIE_SECURE must be true or false")?;
            csrf = csrf.secure(secure);
        }
        if let Some(same_site) = var("CSRF_COOKIE_SAMESITE") {
            let same_site = SameSite::parse(&same_site)
                .ok_or_else(|| anyhow!("CSRF_COOKIE_SAMESITE must be Strict, Lax or None"))?;
            csrf = csrf.same_site(same_site);
        }
        if let Some(lookup) = var("CSRF_TOKEN_LOOKUP") {
            let lookup: TokenLookup = lookup.parse().context("CSRF_TOKEN_LOOKUP")?;
            csrf = csrf.lookup(lookup);
        }
        if let Some(secs) = var("CSRF_MAX_AGE_SECS") {
            let secs = secs
                .parse::<u64>()
                .context("CSRF_MAX_AGE_SECS must be a number of seconds")?;
            csrf = csrf.max_age(Duration::from_secs(secs));
        }
        if let Some(paths) = var("CSRF_EXEMPT_PATHS") {
            for path in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                csrf = csrf.exempt_path(path);
            }
        }

        csrf.validate().context("invalid CSRF configuration")?;

        Ok(Self { bind_addr, csrf })
    }
}
