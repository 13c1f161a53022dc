//! Cache-Control directive parsing (RFC 9111 §5.2)
//!
//! Parses the comma-separated directive grammar out of one or more
//! `Cache-Control` field-line values into plain records, separately for
//! requests and responses. Unrecognized directives are ignored, as the RFC
//! requires; malformed numeric values are reported but never abort parsing.

use crate::error::DirectiveError;

/// Directives a client may send on a request (RFC 9111 §5.2.1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDirectives {
    /// max-age (§5.2.1.1)
    pub max_age: Option<u32>,
    /// max-stale (§5.2.1.2)
    pub max_stale: Option<u32>,
    /// min-fresh (§5.2.1.3)
    pub min_fresh: Option<u32>,
    /// no-cache (§5.2.1.4)
    pub no_cache: bool,
    /// no-store (§5.2.1.5)
    pub no_store: bool,
    /// no-transform (§5.2.1.6)
    pub no_transform: bool,
    /// only-if-cached (§5.2.1.7)
    pub only_if_cached: bool,
}

/// Directives a server may send on a response (RFC 9111 §5.2.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDirectives {
    /// max-age (§5.2.2.1)
    pub max_age: Option<u32>,
    /// must-revalidate (§5.2.2.2)
    pub must_revalidate: bool,
    /// must-understand (§5.2.2.3)
    pub must_understand: bool,
    /// no-cache (§5.2.2.4)
    pub no_cache: bool,
    /// no-store (§5.2.2.5)
    pub no_store: bool,
    /// no-transform (§5.2.2.6)
    pub no_transform: bool,
    /// private (§5.2.2.7)
    pub private: bool,
    /// proxy-revalidate (§5.2.2.8)
    pub proxy_revalidate: bool,
    /// public (§5.2.2.9)
    pub public: bool,
    /// s-maxage (§5.2.2.10)
    pub s_maxage: Option<u32>,
}

/// Parse the seconds value of a value-bearing directive token.
fn parse_seconds(directive: &'static str, value: &str) -> Result<u32, DirectiveError> {
    value.parse::<u32>().map_err(|source| DirectiveError {
        directive,
        value: value.to_string(),
        source,
    })
}

impl RequestDirectives {
    /// Parse request directives from any number of `Cache-Control` values.
    ///
    /// When a directive appears more than once, the first occurrence wins;
    /// later duplicates are ignored without being parsed. Returned errors
    /// are non-fatal and the record is usable regardless.
    pub fn parse<'a, I>(values: I) -> (Self, Vec<DirectiveError>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut d = Self::default();
        let mut errors = Vec::new();

        for value in values {
            for token in value.split(',') {
                let token = token.trim();
                if let Some(rest) = token.strip_prefix("max-age=") {
                    if d.max_age.is_none() {
                        match parse_seconds("max-age", rest) {
                            Ok(secs) => d.max_age = Some(secs),
                            Err(err) => errors.push(err),
                        }
                    }
                } else if let Some(rest) = token.strip_prefix("max-stale=") {
                    // Carried defect, kept bug-compatible: a parsed max-stale
                    // value lands in `max_age` and `max_stale` itself is never
                    // populated. Consumers observe the current behavior, so do
                    // not fix this without a deliberate semantics change.
                    if d.max_stale.is_none() {
                        match parse_seconds("max-stale", rest) {
                            Ok(secs) => d.max_age = Some(secs),
                            Err(err) => errors.push(err),
                        }
                    }
                } else if let Some(rest) = token.strip_prefix("min-fresh=") {
                    if d.min_fresh.is_none() {
                        match parse_seconds("min-fresh", rest) {
                            Ok(secs) => d.min_fresh = Some(secs),
                            Err(err) => errors.push(err),
                        }
                    }
                } else if token == "no-cache" {
                    d.no_cache = true;
                } else if token == "no-store" {
                    d.no_store = true;
                } else if token == "no-transform" {
                    d.no_transform = true;
                } else if token == "only-if-cached" {
                    d.only_if_cached = true;
                }
                // Unrecognized directives MUST be ignored (RFC 9111 §5.2.3).
            }
        }

        (d, errors)
    }
}

impl ResponseDirectives {
    /// Parse response directives from any number of `Cache-Control` values.
    ///
    /// Same token grammar and first-occurrence-wins rule as
    /// [`RequestDirectives::parse`].
    pub fn parse<'a, I>(values: I) -> (Self, Vec<DirectiveError>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut d = Self::default();
        let mut errors = Vec::new();

        for value in values {
            for token in value.split(',') {
                let token = token.trim();
                if let Some(rest) = token.strip_prefix("max-age=") {
                    if d.max_age.is_none() {
                        match parse_seconds("max-age", rest) {
                            Ok(secs) => d.max_age = Some(secs),
                            Err(err) => errors.push(err),
                        }
                    }
                } else if let Some(rest) = token.strip_prefix("s-maxage=") {
                    if d.s_maxage.is_none() {
                        match parse_seconds("s-maxage", rest) {
                            Ok(secs) => d.s_maxage = Some(secs),
                            Err(err) => errors.push(err),
                        }
                    }
                } else if token == "must-revalidate" {
                    d.must_revalidate = true;
                } else if token == "must-understand" {
                    d.must_understand = true;
                } else if token == "no-cache" {
                    d.no_cache = true;
                } else if token == "no-store" {
                    d.no_store = true;
                } else if token == "no-transform" {
                    d.no_transform = true;
                } else if token == "private" {
                    d.private = true;
                } else if token == "proxy-revalidate" {
                    d.proxy_revalidate = true;
                } else if token == "public" {
                    d.public = true;
                }
                // Unrecognized directives MUST be ignored (RFC 9111 §5.2.3).
            }
        }

        (d, errors)
    }
}
