//! Shared-cache storability decisions (RFC 9111 §3)
//!
//! [`SharedPolicy`] applies the storing-responses checklist of a shared
//! (multi-client) cache: it never implements private-cache semantics, so a
//! `private` directive always disqualifies a response here.

use chrono::{DateTime, Utc};
use http::header::{AUTHORIZATION, CACHE_CONTROL, EXPIRES};
use http::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::directive::ResponseDirectives;
use crate::freshness::calculate_expires;

/// Policy tables for a shared cache.
///
/// Immutable after construction; a [`SharedPolicy`] built from it can be
/// shared across any number of concurrent evaluations without locking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Request methods this cache understands
    #[serde(with = "method_set")]
    pub understood_methods: HashSet<Method>,
    /// Status codes this cache understands, checked when `must-understand`
    /// is present
    #[serde(with = "status_set")]
    pub understood_status_codes: HashSet<StatusCode>,
    /// Status codes that may be stored on heuristic freshness alone
    /// (RFC 9110 §15.1)
    #[serde(with = "status_set")]
    pub heuristically_cacheable_status_codes: HashSet<StatusCode>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            understood_methods: [Method::GET, Method::HEAD].into_iter().collect(),
            // Every non-informational code a response can carry.
            understood_status_codes: (200u16..=599)
                .filter_map(|code| StatusCode::from_u16(code).ok())
                .collect(),
            heuristically_cacheable_status_codes: [
                StatusCode::OK,
                StatusCode::NON_AUTHORITATIVE_INFORMATION,
                StatusCode::NO_CONTENT,
                StatusCode::PARTIAL_CONTENT,
                StatusCode::MULTIPLE_CHOICES,
                StatusCode::MOVED_PERMANENTLY,
                StatusCode::PERMANENT_REDIRECT,
                StatusCode::NOT_FOUND,
                StatusCode::METHOD_NOT_ALLOWED,
                StatusCode::GONE,
                StatusCode::URI_TOO_LONG,
                StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS,
                StatusCode::NOT_IMPLEMENTED,
            ]
            .into_iter()
            .collect(),
        }
    }
}

/// The RFC 9111 storability engine for a shared cache.
///
/// A pure function of its inputs and configuration: no I/O, no interior
/// mutability, no observable side effects beyond debug logging.
#[derive(Debug, Clone, Default)]
pub struct SharedPolicy {
    config: PolicyConfig,
}

impl SharedPolicy {
    /// Create a policy with the given tables.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// The tables this policy evaluates against.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decide whether the exchange may be stored for reuse.
    ///
    /// Returns the absolute instant until which the stored response stays
    /// fresh, or `None` when the exchange must not be stored. Malformed
    /// inputs never fail: an unparsable directive token is evaluated as if
    /// it were absent.
    pub fn storable<B1, B2>(
        &self,
        req: &Request<B1>,
        res: &Response<B2>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        // The request method must be understood by the cache (§3).
        if !self.config.understood_methods.contains(req.method()) {
            debug!(method = %req.method(), "not storable: method not understood");
            return None;
        }

        // The response status code must be final; interim 1xx responses are
        // never stored.
        if matches!(
            res.status(),
            StatusCode::CONTINUE
                | StatusCode::SWITCHING_PROTOCOLS
                | StatusCode::PROCESSING
                | StatusCode::EARLY_HINTS
        ) {
            debug!(status = %res.status(), "not storable: interim status");
            return None;
        }

        let values = res
            .headers()
            .get_all(CACHE_CONTROL)
            .iter()
            .filter_map(|v| v.to_str().ok());
        let (directives, errors) = ResponseDirectives::parse(values);
        for error in &errors {
            debug!(%error, "ignoring malformed response cache directive");
        }

        // 206 and 304 need cache-update machinery this engine does not have,
        // and must-understand restricts storage to understood status codes
        // (§5.2.2.3).
        if matches!(
            res.status(),
            StatusCode::PARTIAL_CONTENT | StatusCode::NOT_MODIFIED
        ) || (directives.must_understand
            && !self.config.understood_status_codes.contains(&res.status()))
        {
            debug!(status = %res.status(), "not storable: status not understood");
            return None;
        }

        if directives.no_store {
            debug!("not storable: no-store directive");
            return None;
        }

        // Shared cache: private always disqualifies (§5.2.2.7).
        if directives.private {
            debug!("not storable: private directive");
            return None;
        }

        // A credentialed request may only be stored when a response directive
        // explicitly allows shared caching (§3.5).
        let has_authorization = req
            .headers()
            .get(AUTHORIZATION)
            .is_some_and(|v| !v.is_empty());
        if has_authorization
            && !directives.must_revalidate
            && !directives.public
            && directives.s_maxage.is_none()
        {
            debug!("not storable: credentialed request without shared-cache override");
            return None;
        }

        let expires = calculate_expires(&directives, res.headers(), now);
        if expires <= now {
            debug!("not storable: zero freshness lifetime");
            return None;
        }

        // At least one of the qualifying conditions of §3 must hold.
        if directives.public
            || res.headers().contains_key(EXPIRES)
            || directives.max_age.is_some()
            || directives.s_maxage.is_some()
            || self
                .config
                .heuristically_cacheable_status_codes
                .contains(&res.status())
        {
            return Some(expires);
        }

        debug!(status = %res.status(), "not storable: no qualifying directive or status");
        None
    }
}

mod method_set {
    use http::Method;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::HashSet;

    pub fn serialize<S: Serializer>(
        set: &HashSet<Method>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(set.len()))?;
        for method in set {
            seq.serialize_element(method.as_str())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashSet<Method>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| name.parse::<Method>().map_err(serde::de::Error::custom))
            .collect()
    }
}

mod status_set {
    use http::StatusCode;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::HashSet;

    pub fn serialize<S: Serializer>(
        set: &HashSet<StatusCode>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(set.len()))?;
        for status in set {
            seq.serialize_element(&status.as_u16())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashSet<StatusCode>, D::Error> {
        let codes = Vec::<u16>::deserialize(deserializer)?;
        codes
            .iter()
            .map(|code| StatusCode::from_u16(*code).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 13, 14, 15, 16).unwrap()
    }

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 13, hour, min, sec).unwrap()
    }

    fn make_request(method: Method, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().method(method);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn make_response(status: u16, headers: &[(&str, &str)]) -> Response<()> {
        let mut builder = Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn get() -> Request<()> {
        make_request(Method::GET, &[])
    }

    #[test]
    fn test_s_maxage_storable() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("cache-control", "s-maxage=10")]);
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 26)));
    }

    #[test]
    fn test_max_age_storable() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("cache-control", "max-age=15")]);
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 31)));
    }

    #[test]
    fn test_expires_header_storable() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("expires", "Fri, 13 Dec 2024 14:15:20 GMT")]);
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 20)));
    }

    #[test]
    fn test_expires_and_date_storable() {
        let policy = SharedPolicy::default();
        let res = make_response(
            200,
            &[
                ("expires", "Fri, 13 Dec 2024 14:15:20 GMT"),
                ("date", "Fri, 13 Dec 2024 13:15:20 GMT"),
            ],
        );
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(15, 15, 16)));
    }

    #[test]
    fn test_heuristic_freshness_with_date() {
        let policy = SharedPolicy::default();
        let res = make_response(
            200,
            &[
                ("last-modified", "Fri, 13 Dec 2024 14:15:10 GMT"),
                ("date", "Fri, 13 Dec 2024 14:15:20 GMT"),
            ],
        );
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 17)));
    }

    #[test]
    fn test_heuristic_freshness_without_date() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("last-modified", "Fri, 13 Dec 2024 14:15:06 GMT")]);
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 17)));
    }

    #[test]
    fn test_heuristic_freshness_not_heuristically_cacheable_status() {
        // 500 is fresh per the heuristic but not in the heuristically
        // cacheable set, so the qualifying-condition check rejects it.
        let policy = SharedPolicy::default();
        let res = make_response(500, &[("last-modified", "Fri, 13 Dec 2024 14:15:06 GMT")]);
        assert_eq!(policy.storable(&get(), &res, now()), None);
    }

    #[test]
    fn test_no_cache_headers_at_all() {
        // Freshness defaults to `now`, which is not strictly after `now`.
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("date", "Fri, 13 Dec 2024 14:15:10 GMT")]);
        assert_eq!(policy.storable(&get(), &res, now()), None);
    }

    #[test]
    fn test_method_not_understood() {
        let policy = SharedPolicy::default();
        let req = make_request(Method::POST, &[]);
        let res = make_response(200, &[("cache-control", "max-age=15")]);
        assert_eq!(policy.storable(&req, &res, now()), None);
    }

    #[test]
    fn test_interim_status_codes() {
        let policy = SharedPolicy::default();
        for status in [100, 101, 102, 103] {
            let res = make_response(status, &[("cache-control", "max-age=15")]);
            assert_eq!(policy.storable(&get(), &res, now()), None, "status {status}");
        }
    }

    #[test]
    fn test_partial_and_not_modified_rejected() {
        let policy = SharedPolicy::default();
        for status in [206, 304] {
            let res = make_response(status, &[("cache-control", "max-age=15")]);
            assert_eq!(policy.storable(&get(), &res, now()), None, "status {status}");
        }
    }

    #[test]
    fn test_must_understand_with_unknown_status() {
        let config = PolicyConfig {
            understood_status_codes: [StatusCode::OK].into_iter().collect(),
            ..PolicyConfig::default()
        };
        let policy = SharedPolicy::new(config);

        let res = make_response(203, &[("cache-control", "must-understand, max-age=15")]);
        assert_eq!(policy.storable(&get(), &res, now()), None);

        // Without must-understand the same response is storable.
        let res = make_response(203, &[("cache-control", "max-age=15")]);
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 31)));
    }

    #[test]
    fn test_no_store_rejected() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("cache-control", "no-store, max-age=15, public")]);
        assert_eq!(policy.storable(&get(), &res, now()), None);
    }

    #[test]
    fn test_private_rejected() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("cache-control", "private, max-age=15")]);
        assert_eq!(policy.storable(&get(), &res, now()), None);
    }

    #[test]
    fn test_public_with_heuristic_freshness() {
        let policy = SharedPolicy::default();
        let res = make_response(
            200,
            &[
                ("last-modified", "Fri, 13 Dec 2024 14:15:06 GMT"),
                ("cache-control", "public"),
            ],
        );
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 17)));
    }

    #[test]
    fn test_public_without_freshness() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("cache-control", "public")]);
        assert_eq!(policy.storable(&get(), &res, now()), None);
    }

    #[test]
    fn test_authorization_without_override() {
        let policy = SharedPolicy::default();
        let req = make_request(Method::GET, &[("authorization", "Bearer xxx")]);
        let res = make_response(200, &[("cache-control", "max-age=15")]);
        assert_eq!(policy.storable(&req, &res, now()), None);
    }

    #[test]
    fn test_authorization_with_shared_cache_override() {
        let policy = SharedPolicy::default();
        let req = make_request(Method::GET, &[("authorization", "Bearer xxx")]);

        let res = make_response(200, &[("cache-control", "s-maxage=10")]);
        assert_eq!(policy.storable(&req, &res, now()), Some(at(14, 15, 26)));

        let res = make_response(200, &[("cache-control", "public, max-age=15")]);
        assert_eq!(policy.storable(&req, &res, now()), Some(at(14, 15, 31)));
    }

    #[test]
    fn test_zero_max_age_rejected() {
        // Expires equals now, which is not strictly in the future.
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("cache-control", "max-age=0")]);
        assert_eq!(policy.storable(&get(), &res, now()), None);
    }

    #[test]
    fn test_malformed_directive_evaluated_as_absent() {
        let policy = SharedPolicy::default();
        let res = make_response(200, &[("cache-control", "max-age=bogus, s-maxage=10")]);
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 26)));
    }

    #[test]
    fn test_custom_understood_methods() {
        let config = PolicyConfig {
            understood_methods: [Method::GET, Method::POST].into_iter().collect(),
            ..PolicyConfig::default()
        };
        let policy = SharedPolicy::new(config);
        let req = make_request(Method::POST, &[]);
        let res = make_response(200, &[("cache-control", "max-age=15")]);
        assert_eq!(policy.storable(&req, &res, now()), Some(at(14, 15, 31)));
    }

    #[test]
    fn test_repeated_cache_control_lines_first_wins() {
        let policy = SharedPolicy::default();
        let res = make_response(
            200,
            &[("cache-control", "s-maxage=10"), ("cache-control", "s-maxage=600")],
        );
        assert_eq!(policy.storable(&get(), &res, now()), Some(at(14, 15, 26)));
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let config = PolicyConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PolicyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
