//! Per-test-case orchestration: build, serve, capture, assert, teardown.
//!
//! # Design
//! One `HttpFixture` per test case. It owns the request spec, drives the
//! service under test in-process with `tower::ServiceExt::oneshot` (no
//! socket, no timeout enforcement), and keeps a transcript of every
//! exchange. Assertion mismatches go through the injected `Reporter` and
//! never abort, so every assertion in a case gets to run and report.
//!
//! Teardown is `Drop`: when the case has failed, the thread is unwinding
//! from a panic, or verbose mode is on, the full transcript is emitted
//! through the reporter's log channel. On a quiet green case it stays
//! silent. `Drop` runs on every exit path, including early panics.

use std::convert::Infallible;
use std::panic::Location;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde::de::DeserializeOwned;
use tower::{Service, ServiceExt};

use crate::dump::TrafficRecorder;
use crate::error::FixtureError;
use crate::reporter::{AssertionFailure, Reporter};
use crate::request::{RequestBuilder, JSON_CONTENT_TYPE};
use crate::response::CapturedResponse;

/// Orchestrates one test case against a handler under test.
pub struct HttpFixture<R: Reporter> {
    reporter: R,
    /// The mutable request spec; configure it freely before `serve`.
    pub request: RequestBuilder,
    recorder: TrafficRecorder,
    response: Option<CapturedResponse>,
}

impl<R: Reporter> HttpFixture<R> {
    pub fn new(reporter: R) -> Self {
        Self {
            reporter,
            request: RequestBuilder::new(),
            recorder: TrafficRecorder::new(),
            response: None,
        }
    }

    /// Synthesizes the request, drives `service` to completion in-process,
    /// and captures its response, overwriting any previous capture. Both
    /// sides of the exchange are recorded in the transcript.
    ///
    /// A panicking handler propagates to the caller; the harness applies
    /// no panic recovery.
    pub async fn serve<S>(&mut self, service: S) -> Result<(), FixtureError>
    where
        S: Service<Request<Body>, Response = Response, Error = Infallible>,
    {
        let snapshot = self.request.build()?;
        self.recorder.record_request(&snapshot);
        let request = snapshot.to_http()?;
        let response = match service.oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let captured = CapturedResponse::capture(response).await?;
        self.recorder.record_response(&captured);
        self.response = Some(captured);
        Ok(())
    }

    /// The response captured by the most recent `serve`, if any.
    pub fn response(&self) -> Option<&CapturedResponse> {
        self.response.as_ref()
    }

    /// The transcript accumulated so far.
    pub fn transcript(&self) -> &str {
        self.recorder.transcript()
    }

    /// Decodes the captured response body as JSON.
    ///
    /// # Panics
    /// Panics when the body is not valid JSON for `T`, or when nothing has
    /// been served yet. A body that cannot decode is a broken test setup,
    /// not an assertion mismatch, and aborts the case immediately.
    #[track_caller]
    pub fn json_response_body<T: DeserializeOwned>(&self) -> T {
        match serde_json::from_slice(&self.captured().body) {
            Ok(value) => value,
            Err(err) => panic!("deserialize JSON response body: {err}"),
        }
    }

    /// Verifies the captured status code, reporting expected and actual on
    /// mismatch.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) {
        let actual = self.captured().status;
        if actual != expected {
            self.reporter.fail(AssertionFailure {
                expected: expected.to_string(),
                actual: actual.to_string(),
                message: "unexpected response status".to_string(),
                location: Location::caller(),
            });
        }
    }

    /// Composite JSON assertion: status, exact `Content-Type`, and deep
    /// structural equality of the decoded body. The three checks are
    /// independent; none short-circuits the others.
    #[track_caller]
    pub fn assert_json_response(&self, expected_status: StatusCode, expected_body: &serde_json::Value) {
        self.assert_status(expected_status);
        self.assert_content_type(JSON_CONTENT_TYPE);
        let actual: serde_json::Value = self.json_response_body();
        if actual != *expected_body {
            self.reporter.fail(AssertionFailure {
                expected: expected_body.to_string(),
                actual: actual.to_string(),
                message: "response body mismatch".to_string(),
                location: Location::caller(),
            });
        }
    }

    /// Verifies the canonical plain-text 500 response: status, exact
    /// `Content-Type`, and a trimmed body of `Internal Server Error`.
    #[track_caller]
    pub fn assert_internal_server_error(&self) {
        self.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        self.assert_content_type("text/plain; charset=utf-8");
        let body = self.captured().body_text();
        let trimmed = body.trim();
        if trimmed != "Internal Server Error" {
            self.reporter.fail(AssertionFailure {
                expected: "Internal Server Error".to_string(),
                actual: trimmed.to_string(),
                message: "response body mismatch".to_string(),
                location: Location::caller(),
            });
        }
    }

    #[track_caller]
    fn assert_content_type(&self, expected: &str) {
        let actual = self.captured().content_type();
        if actual != expected {
            self.reporter.fail(AssertionFailure {
                expected: expected.to_string(),
                actual: actual.to_string(),
                message: "unexpected Content-Type".to_string(),
                location: Location::caller(),
            });
        }
    }

    #[track_caller]
    fn captured(&self) -> &CapturedResponse {
        match &self.response {
            Some(response) => response,
            None => panic!("no response captured; call serve first"),
        }
    }
}

impl<R: Reporter> Drop for HttpFixture<R> {
    fn drop(&mut self) {
        if self.reporter.failed() || self.reporter.verbose() || std::thread::panicking() {
            self.reporter.log(self.recorder.transcript());
        }
    }
}
