//! In-process HTTP fixture harness.
//!
//! # Overview
//! Builds synthetic HTTP requests, drives them through a handler under
//! test without opening a network socket, captures the response, and keeps
//! a human-readable transcript of the exchange that is surfaced only when
//! a test case fails or verbose diagnostics are requested.
//!
//! # Design
//! - `RequestBuilder` accumulates request attributes and synthesizes
//!   immutable `RequestSnapshot` values on demand.
//! - `HttpFixture` drives any
//!   `tower::Service<Request<Body>, Response = Response>` — such as an
//!   `axum::Router` — to completion with `oneshot`, so the whole exchange
//!   stays in memory.
//! - `TrafficRecorder` renders both sides of each exchange into a
//!   prefixed, labelled transcript for failure diagnostics.
//! - The test framework is reached only through the injected `Reporter`
//!   capability set; `TestReporter` is the bundled libtest binding.
//!
//! One fixture per test case: nothing here is locked, and the transcript,
//! request spec, and capture are all mutated in place.

pub mod context;
pub mod dump;
pub mod error;
pub mod fixture;
pub mod reporter;
pub mod request;
pub mod response;

pub use context::RequestContext;
pub use dump::TrafficRecorder;
pub use error::FixtureError;
pub use fixture::HttpFixture;
pub use reporter::{AssertionFailure, Reporter, TestReporter};
pub use request::{RequestBuilder, RequestSnapshot, JSON_CONTENT_TYPE};
pub use response::CapturedResponse;
