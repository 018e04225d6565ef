//! Error types for the fixture harness.
//!
//! # Design
//! All variants are fatal to the operation that produced them: a request
//! that cannot be built or a response body that cannot be drained is a
//! broken test setup, and the harness must not silently proceed with a
//! garbled exchange. Assertion mismatches are not errors — they go through
//! the `Reporter` and never abort. Dump-rendering problems are swallowed
//! inside the recorder and never surface here.

use thiserror::Error;

/// Errors returned by request building and `HttpFixture::serve`.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The JSON request payload could not be serialized.
    #[error("serialize JSON request body: {0}")]
    SerializeBody(#[source] serde_json::Error),

    /// The pending query parameters could not be encoded.
    #[error("encode query string: {0}")]
    EncodeQuery(#[source] serde_urlencoded::ser::Error),

    /// The request parts (method, URI, headers) were rejected by `http`.
    #[error("build HTTP request: {0}")]
    BuildRequest(#[from] axum::http::Error),

    /// The response body could not be drained into memory.
    #[error("read response body: {0}")]
    ReadBody(#[source] axum::Error),
}
