//! Small axum application exercised by the fixture harness's tests.
//!
//! # Design
//! Each route exists to exercise one harness capability: `/echo` mirrors
//! the request body as JSON, `/greet` reads a query parameter, `/boom`
//! produces the canonical plain-text 500, and `/context` reads a value out
//! of the request-scoped context the harness attaches. The app never binds
//! a socket; the harness drives it in-process.

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use http_fixture::{RequestContext, JSON_CONTENT_TYPE};
use serde::Deserialize;

#[derive(Deserialize)]
struct GreetQuery {
    name: String,
}

#[derive(Deserialize)]
struct ContextQuery {
    key: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", post(echo))
        .route("/greet", get(greet))
        .route("/boom", get(boom))
        .route("/context", get(context_value))
}

/// Mirrors the request body back, declared as JSON.
async fn echo(body: Bytes) -> impl IntoResponse {
    ([(CONTENT_TYPE, JSON_CONTENT_TYPE)], body)
}

async fn greet(Query(query): Query<GreetQuery>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, JSON_CONTENT_TYPE)],
        Json(serde_json::json!({ "hello": query.name })),
    )
}

async fn boom() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n")
}

/// Looks up a `String` value in the request context by the `key` query
/// parameter and returns it as plain text.
async fn context_value(
    Query(query): Query<ContextQuery>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<String, StatusCode> {
    ctx.value::<String>(&query.key)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}
