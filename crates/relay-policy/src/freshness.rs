//! Freshness lifetime calculation (RFC 9111 §4.2)
//!
//! Turns a response's directives and date-related headers into the absolute
//! instant at which a stored copy stops being fresh, relative to a supplied
//! reference time.

use chrono::{DateTime, TimeDelta, Utc};
use http::HeaderMap;
use http::header::{DATE, EXPIRES, HeaderName, LAST_MODIFIED};

use crate::directive::ResponseDirectives;

/// Read a header as an HTTP-date, accepting IMF-fixdate plus the obsolete
/// RFC 850 and asctime forms. Absent, non-UTF-8, or malformed values all
/// yield `None` so callers can fall through to the next freshness rule.
fn http_date(headers: &HeaderMap, name: HeaderName) -> Option<DateTime<Utc>> {
    let raw = headers.get(name)?.to_str().ok()?;
    let parsed = httpdate::parse_http_date(raw).ok()?;
    Some(DateTime::<Utc>::from(parsed))
}

/// Compute the expiration instant of a response.
///
/// Evaluates the RFC 9111 §4.2.1 rules in order and uses the first match:
/// `s-maxage`, then `max-age`, then `Expires` (minus `Date` when present),
/// then the `Last-Modified` heuristic at one tenth of the response's age.
/// With no matching rule the response has zero freshness lifetime and `now`
/// itself is returned; deciding whether that means "do not store" is the
/// storability engine's job, never this function's.
pub fn calculate_expires(
    directives: &ResponseDirectives,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    // Shared cache: s-maxage takes precedence over max-age (§5.2.2.10).
    if let Some(secs) = directives.s_maxage {
        return now + TimeDelta::seconds(i64::from(secs));
    }
    if let Some(secs) = directives.max_age {
        return now + TimeDelta::seconds(i64::from(secs));
    }
    if let Some(expires) = http_date(headers, EXPIRES) {
        return match http_date(headers, DATE) {
            Some(date) => now + (expires - date),
            // §6.6.1 of RFC 9110: use the reception time when Date is
            // absent, which collapses to the Expires instant itself.
            None => expires,
        };
    }
    if let Some(last_modified) = http_date(headers, LAST_MODIFIED) {
        return match http_date(headers, DATE) {
            Some(date) => now + (date - last_modified) / 10,
            None => now + (now - last_modified) / 10,
        };
    }
    now
}
