//! Token Lookup Rules
//!
//! Where to find the client-submitted token, in priority order.

use std::fmt;
use std::str::FromStr;

use axum::http::HeaderName;

use crate::error::{CsrfError, CsrfResult};

pub const DEFAULT_HEADER_NAME: &str = "X-CSRF-Token";
pub const DEFAULT_FORM_FIELD: &str = "csrf_token";

/// Request channel a token may be submitted through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Header,
    Form,
    Query,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::Header => "header",
            TokenSource::Form => "form",
            TokenSource::Query => "query",
        }
    }
}

impl FromStr for TokenSource {
    type Err = CsrfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" => Ok(TokenSource::Header),
            "form" => Ok(TokenSource::Form),
            "query" => Ok(TokenSource::Query),
            other => Err(CsrfError::InvalidLookup(format!(
                "unknown token source `{other}`"
            ))),
        }
    }
}

/// A single (source, field-name) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRule {
    pub source: TokenSource,
    pub name: String,
}

impl fmt::Display for LookupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.as_str(), self.name)
    }
}

/// Ordered list of lookup rules
///
/// Built once and never mutated after the protector takes ownership.
///
/// ```
/// use csrf::domain::lookup::{TokenLookup, TokenSource};
///
/// let lookup: TokenLookup = "header:X-CSRF-Token,form:csrf_token".parse().unwrap();
/// assert_eq!(lookup.rules()[0].source, TokenSource::Header);
/// assert_eq!(lookup.to_string(), "header:X-CSRF-Token,form:csrf_token");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenLookup {
    rules: Vec<LookupRule>,
}

impl TokenLookup {
    /// Empty lookup, fill with the builder methods
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn header(self, name: impl Into<String>) -> Self {
        self.rule(TokenSource::Header, name)
    }

    pub fn form(self, name: impl Into<String>) -> Self {
        self.rule(TokenSource::Form, name)
    }

    pub fn query(self, name: impl Into<String>) -> Self {
        self.rule(TokenSource::Query, name)
    }

    pub fn rule(mut self, source: TokenSource, name: impl Into<String>) -> Self {
        self.rules.push(LookupRule {
            source,
            name: name.into(),
        });
        self
    }

    pub fn rules(&self) -> &[LookupRule] {
        &self.rules
    }

    pub fn has_source(&self, source: TokenSource) -> bool {
        self.rules.iter().any(|r| r.source == source)
    }

    /// First field name configured for `source`
    pub fn first_name(&self, source: TokenSource) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.source == source)
            .map(|r| r.name.as_str())
    }

    /// Reject empty lookups and names unusable for their channel
    pub fn validate(&self) -> CsrfResult<()> {
        if self.rules.is_empty() {
            return Err(CsrfError::InvalidLookup("no lookup rules".into()));
        }
        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                return Err(CsrfError::InvalidLookup(format!(
                    "empty name for {} source",
                    rule.source.as_str()
                )));
            }
            if rule.source == TokenSource::Header && HeaderName::from_str(&rule.name).is_err() {
                return Err(CsrfError::InvalidLookup(format!(
                    "`{}` is not a valid header name",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for TokenLookup {
    type Err = CsrfError;

    /// Parse `source:name` pairs separated by commas
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lookup = TokenLookup::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (source, name) = part.split_once(':').ok_or_else(|| {
                CsrfError::InvalidLookup(format!("`{part}` is not in source:name form"))
            })?;
            lookup = lookup.rule(source.parse()?, name.trim());
        }
        lookup.validate()?;
        Ok(lookup)
    }
}

impl fmt::Display for TokenLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

/// The default chain: header first, then form field
pub fn default_lookup() -> TokenLookup {
    TokenLookup::new()
        .header(DEFAULT_HEADER_NAME)
        .form(DEFAULT_FORM_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup_order() {
        let lookup = default_lookup();
        assert_eq!(lookup.rules().len(), 2);
        assert_eq!(lookup.rules()[0].source, TokenSource::Header);
        assert_eq!(lookup.rules()[0].name, "X-CSRF-Token");
        assert_eq!(lookup.rules()[1].source, TokenSource::Form);
        assert_eq!(lookup.rules()[1].name, "csrf_token");
        assert!(lookup.validate().is_ok());
    }

    #[test]
    fn test_parse_preserves_order() {
        let lookup: TokenLookup = "query:csrf, form:csrf_token ,header:X-CSRF-Token"
            .parse()
            .unwrap();
        let sources: Vec<_> = lookup.rules().iter().map(|r| r.source).collect();
        assert_eq!(
            sources,
            vec![TokenSource::Query, TokenSource::Form, TokenSource::Header]
        );
        assert_eq!(lookup.first_name(TokenSource::Form), Some("csrf_token"));
        assert!(lookup.has_source(TokenSource::Query));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "cookie:_csrf".parse::<TokenLookup>(),
            Err(CsrfError::InvalidLookup(_))
        ));
        assert!(matches!(
            "header".parse::<TokenLookup>(),
            Err(CsrfError::InvalidLookup(_))
        ));
        assert!(matches!(
            "form:".parse::<TokenLookup>(),
            Err(CsrfError::InvalidLookup(_))
        ));
        assert!(matches!(
            "".parse::<TokenLookup>(),
            Err(CsrfError::InvalidLookup(_))
        ));
        assert!(matches!(
            "header:bad header".parse::<TokenLookup>(),
            Err(CsrfError::InvalidLookup(_))
        ));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        let lookup = TokenLookup::new().header("X-Token").query("t");
        let parsed: TokenLookup = lookup.to_string().parse().unwrap();
        assert_eq!(parsed, lookup);
    }
}
