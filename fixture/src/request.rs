//! Mutable request spec and the snapshot it builds.
//!
//! # Design
//! `RequestBuilder` accumulates the desired attributes of one HTTP request
//! and stays freely re-mutable between builds. `build` produces a
//! `RequestSnapshot` — plain owned data, so the recorder can render it and
//! the fixture can convert it to an `http::Request` without either side
//! consuming a body stream. Building twice without mutation in between
//! yields attribute-identical, distinct snapshots.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use serde::Serialize;

use crate::context::RequestContext;
use crate::error::FixtureError;

/// Content type set on requests built from a JSON payload.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Accumulates request attributes and synthesizes immutable snapshots.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    body: String,
    json: Option<String>,
    context: RequestContext,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// A spec for `GET /` with no headers, no body, and the root context.
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query: BTreeMap::new(),
            headers: HeaderMap::new(),
            body: String::new(),
            json: None,
            context: RequestContext::background(),
        }
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Upserts one query parameter; a second call with the same key
    /// replaces the previous value. A query embedded in the path is folded
    /// into the parameter map first, so it merges instead of duplicating.
    pub fn set_query_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.absorb_inline_query();
        self.query.insert(key.into(), value.into());
    }

    /// The pending value for `key`, if one was set.
    pub fn query_parameter(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Sets `name` to `value`, replacing any previous values for the name.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), FixtureError> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Appends `value` under `name`, keeping previous values for the name.
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<(), FixtureError> {
        let (name, value) = parse_header(name, value)?;
        self.headers.append(name, value);
        Ok(())
    }

    /// Sets the raw request body. A non-empty raw body takes precedence
    /// over any JSON payload at build time.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Serializes `body` to JSON text and stores it as the pending payload.
    pub fn set_json_body<T: Serialize>(&mut self, body: &T) -> Result<(), FixtureError> {
        let raw = serde_json::to_string(body).map_err(FixtureError::SerializeBody)?;
        self.json = Some(raw);
        Ok(())
    }

    /// Layers `key` → `value` onto the request context.
    pub fn set_context_value<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: std::any::Any + Send + Sync,
    {
        self.context = self.context.with_value(key, value);
    }

    /// The context the next build will attach to the request.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Synthesizes one immutable request snapshot from the current spec.
    ///
    /// Body resolution, in priority order: a non-empty raw body wins; else
    /// a pending JSON payload is used and `Content-Type` is set on the spec
    /// if absent; else the request carries no body.
    pub fn build(&mut self) -> Result<RequestSnapshot, FixtureError> {
        self.absorb_inline_query();
        let body = self.resolve_body();
        let uri = self.uri()?;
        Ok(RequestSnapshot {
            method: self.method.clone(),
            uri,
            headers: self.headers.clone(),
            body,
            context: self.context.clone(),
        })
    }

    fn resolve_body(&mut self) -> String {
        if !self.body.is_empty() {
            return self.body.clone();
        }
        let Some(json) = &self.json else {
            return String::new();
        };
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        json.clone()
    }

    /// Moves a query embedded in the path into the parameter map, keeping
    /// values already set explicitly. Afterwards the path is bare and the
    /// map is the single source of truth for the query string.
    fn absorb_inline_query(&mut self) {
        let Some((path, inline)) = self.path.split_once('?') else {
            return;
        };
        let path = path.to_string();
        let decoded: Vec<(String, String)> =
            serde_urlencoded::from_str(inline).unwrap_or_default();
        for (key, value) in decoded {
            self.query.entry(key).or_insert(value);
        }
        self.path = path;
    }

    fn uri(&self) -> Result<Uri, FixtureError> {
        let mut target = self.path.clone();
        if !self.query.is_empty() {
            let encoded =
                serde_urlencoded::to_string(&self.query).map_err(FixtureError::EncodeQuery)?;
            target.push('?');
            target.push_str(&encoded);
        }
        Uri::try_from(target)
            .map_err(axum::http::Error::from)
            .map_err(FixtureError::from)
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), FixtureError> {
    let name = HeaderName::try_from(name).map_err(axum::http::Error::from)?;
    let value = HeaderValue::try_from(value).map_err(axum::http::Error::from)?;
    Ok((name, value))
}

/// An immutable request described as plain data.
///
/// Produced by `RequestBuilder::build`. The recorder renders it and
/// `to_http` converts it to a real `http::Request` for the service under
/// test; both read the same owned body text, so neither consumes anything
/// the other needs.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: String,
    pub context: RequestContext,
}

impl RequestSnapshot {
    /// Converts the snapshot into an `http::Request` with a fresh in-memory
    /// body. The context rides along in the request extensions.
    pub fn to_http(&self) -> Result<Request<Body>, FixtureError> {
        let mut request = Request::builder()
            .method(self.method.clone())
            .uri(self.uri.clone())
            .body(Body::from(self.body.clone()))?;
        *request.headers_mut() = self.headers.clone();
        request.extensions_mut().insert(self.context.clone());
        Ok(request)
    }

    /// Reads one decoded query parameter back out of the built URI.
    pub fn query_parameter(&self, key: &str) -> Option<String> {
        let query = self.uri.query()?;
        let params: BTreeMap<String, String> = serde_urlencoded::from_str(query).ok()?;
        params.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_get_root() {
        let snapshot = RequestBuilder::new().build().unwrap();
        assert_eq!(snapshot.method, Method::GET);
        assert_eq!(snapshot.uri.path(), "/");
        assert!(snapshot.body.is_empty());
        assert!(snapshot.headers.is_empty());
    }

    #[test]
    fn build_is_idempotent_without_mutation() {
        let mut builder = RequestBuilder::new();
        builder.set_method(Method::POST);
        builder.set_path("/todos");
        builder.set_header("x-request-id", "42").unwrap();
        builder.append_header("accept", "application/json").unwrap();
        builder.append_header("accept", "text/plain").unwrap();
        builder.set_body("payload");

        let first = builder.build().unwrap();
        let second = builder.build().unwrap();

        assert_eq!(first.method, second.method);
        assert_eq!(first.uri, second.uri);
        assert_eq!(first.headers, second.headers);
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn raw_body_takes_precedence_over_json() {
        let mut builder = RequestBuilder::new();
        builder
            .set_json_body(&serde_json::json!({"ignored": true}))
            .unwrap();
        builder.set_body("raw wins");

        let snapshot = builder.build().unwrap();
        assert_eq!(snapshot.body, "raw wins");
        // The JSON path never ran, so no content type was forced.
        assert!(snapshot.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn json_body_round_trips_and_sets_content_type() {
        let payload = serde_json::json!({"hello": "world", "n": 3});
        let mut builder = RequestBuilder::new();
        builder.set_json_body(&payload).unwrap();

        let snapshot = builder.build().unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&snapshot.body).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(
            snapshot.headers.get(CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
    }

    #[test]
    fn json_body_keeps_explicit_content_type() {
        let mut builder = RequestBuilder::new();
        builder.set_header("content-type", "application/vnd.custom+json").unwrap();
        builder.set_json_body(&serde_json::json!({})).unwrap();

        let snapshot = builder.build().unwrap();
        assert_eq!(
            snapshot.headers.get(CONTENT_TYPE).unwrap(),
            "application/vnd.custom+json"
        );
    }

    #[test]
    fn query_parameter_last_write_wins() {
        let mut builder = RequestBuilder::new();
        builder.set_query_parameter("hello", "there");
        builder.set_query_parameter("hello", "world");

        assert_eq!(builder.query_parameter("hello"), Some("world"));

        let snapshot = builder.build().unwrap();
        assert_eq!(snapshot.uri.query(), Some("hello=world"));
        assert_eq!(snapshot.query_parameter("hello").as_deref(), Some("world"));
    }

    #[test]
    fn inline_path_query_merges_with_set_parameters() {
        let mut builder = RequestBuilder::new();
        builder.set_path("/search?q=1");
        builder.set_query_parameter("page", "2");

        assert_eq!(builder.query_parameter("q"), Some("1"));

        let snapshot = builder.build().unwrap();
        assert_eq!(snapshot.uri.path(), "/search");
        assert_eq!(snapshot.uri.query(), Some("page=2&q=1"));
        assert_eq!(snapshot.query_parameter("q").as_deref(), Some("1"));
        assert_eq!(snapshot.query_parameter("page").as_deref(), Some("2"));
    }

    #[test]
    fn set_parameter_overrides_inline_path_value() {
        let mut builder = RequestBuilder::new();
        builder.set_path("/search?q=1");
        builder.set_query_parameter("q", "2");

        let snapshot = builder.build().unwrap();
        assert_eq!(snapshot.uri.query(), Some("q=2"));
    }

    #[test]
    fn inline_only_query_survives_build() {
        let mut builder = RequestBuilder::new();
        builder.set_path("/search?q=1");

        let snapshot = builder.build().unwrap();
        assert_eq!(snapshot.uri.path(), "/search");
        assert_eq!(snapshot.uri.query(), Some("q=1"));
        assert_eq!(snapshot.query_parameter("q").as_deref(), Some("1"));
    }

    #[test]
    fn unserializable_json_body_is_rejected() {
        let mut builder = RequestBuilder::new();
        // Non-string map keys cannot serialize to a JSON object.
        let bad: std::collections::HashMap<Vec<u8>, u8> =
            std::collections::HashMap::from([(vec![1], 1)]);

        let result = builder.set_json_body(&bad);
        assert!(matches!(result, Err(FixtureError::SerializeBody(_))));

        // The spec is untouched: a later build still has no body.
        let snapshot = builder.build().unwrap();
        assert!(snapshot.body.is_empty());
    }

    #[test]
    fn query_parameters_are_percent_encoded() {
        let mut builder = RequestBuilder::new();
        builder.set_path("/search");
        builder.set_query_parameter("q", "a b&c");

        let snapshot = builder.build().unwrap();
        assert_eq!(snapshot.uri.query(), Some("q=a+b%26c"));
        assert_eq!(snapshot.query_parameter("q").as_deref(), Some("a b&c"));
    }

    #[test]
    fn context_value_is_readable_before_build() {
        let mut builder = RequestBuilder::new();
        builder.set_context_value("K", "V".to_string());
        assert_eq!(builder.context().value::<String>("K"), Some(&"V".to_string()));
    }

    #[test]
    fn built_request_carries_the_context() {
        let mut builder = RequestBuilder::new();
        builder.set_context_value("tenant", "acme".to_string());

        let request = builder.build().unwrap().to_http().unwrap();
        let ctx = request.extensions().get::<RequestContext>().unwrap();
        assert_eq!(ctx.value::<String>("tenant"), Some(&"acme".to_string()));
    }

    #[test]
    fn multi_value_headers_survive_build() {
        let mut builder = RequestBuilder::new();
        builder.append_header("accept", "application/json").unwrap();
        builder.append_header("accept", "text/plain").unwrap();

        let snapshot = builder.build().unwrap();
        let values: Vec<_> = snapshot.headers.get_all("accept").iter().collect();
        assert_eq!(values, ["application/json", "text/plain"]);
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let mut builder = RequestBuilder::new();
        assert!(builder.set_header("bad header", "x").is_err());
    }
}
