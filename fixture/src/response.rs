//! The finalized snapshot of everything the handler under test wrote.

use std::borrow::Cow;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use http_body_util::BodyExt;

use crate::error::FixtureError;

/// Status, headers, and fully drained body of one captured response.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedResponse {
    /// Drains `response` completely into an owned snapshot. No partial
    /// reads: the whole body is collected before the capture exists.
    pub async fn capture(response: Response) -> Result<Self, FixtureError> {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(FixtureError::ReadBody)?
            .to_bytes();
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The `Content-Type` header, or `""` when absent or unprintable.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    #[tokio::test]
    async fn capture_drains_the_full_body() {
        let response = http::Response::builder()
            .status(StatusCode::CREATED)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from("hello"))
            .unwrap();

        let captured = CapturedResponse::capture(response).await.unwrap();
        assert_eq!(captured.status, StatusCode::CREATED);
        assert_eq!(captured.content_type(), "text/plain; charset=utf-8");
        assert_eq!(captured.body_text(), "hello");
    }

    #[tokio::test]
    async fn missing_content_type_reads_as_empty() {
        let response = http::Response::new(Body::empty());
        let captured = CapturedResponse::capture(response).await.unwrap();
        assert_eq!(captured.content_type(), "");
        assert!(captured.body.is_empty());
    }
}
