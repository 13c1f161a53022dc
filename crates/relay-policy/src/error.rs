//! Policy error types

use std::num::ParseIntError;
use thiserror::Error;

/// A malformed value in a value-bearing cache directive.
///
/// Always non-fatal: the offending token is skipped and parsing of the
/// remaining tokens continues. Callers may log these or ignore them; an
/// unparsable directive is evaluated as if it were absent.
#[derive(Error, Debug)]
#[error("invalid {directive} value {value:?}: {source}")]
pub struct DirectiveError {
    /// Directive name as matched on the wire
    pub directive: &'static str,
    /// The value portion of the offending token
    pub value: String,
    #[source]
    pub source: ParseIntError,
}
