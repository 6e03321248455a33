//! HTTP response building module
//!
//! Builders for JSON responses, decoupled from specific endpoints.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ApiError;
use crate::logger;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Serialize `body` and build a JSON response
///
/// A serialization failure turns into a 500 response.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    server_name: &str,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_json(status, Bytes::from(json), server_name),
        Err(e) => {
            let err = ApiError::Internal(format!("serialize response: {e}"));
            error_response(&err, server_name)
        }
    }
}

/// Build the JSON response for a request error
pub fn error_response(err: &ApiError, server_name: &str) -> Response<Full<Bytes>> {
    if let ApiError::Internal(detail) = err {
        logger::log_error(&format!("Internal error: {detail}"));
    }

    let mut response = build_json(err.status(), Bytes::from(err.body().to_string()), server_name);
    if let Some(allow) = err.allow_header() {
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(ALLOW, value);
        }
    }
    response
}

/// Drop the body of a response, keeping status and headers (HEAD requests)
pub fn strip_body(response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Full::new(Bytes::new()))
}

fn build_json(status: StatusCode, body: Bytes, server_name: &str) -> Response<Full<Bytes>> {
    let content_length = body.len();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .header(SERVER, server_name)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut fallback = Response::new(Full::new(Bytes::from(
                r#"{"error":"Internal Server Error"}"#,
            )));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::Method;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_response_headers() {
        let response = json_response(
            StatusCode::CREATED,
            &serde_json::json!({ "message": "hi" }),
            "test-server",
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(response.headers()[SERVER], "test-server");
        assert_eq!(response.headers()[CONTENT_LENGTH], "16");
        assert_eq!(body_json(response).await["message"], "hi");
    }

    #[tokio::test]
    async fn test_error_response_sets_allow() {
        let err = ApiError::MethodNotAllowed {
            method: Method::POST,
            allowed: vec![Method::GET, Method::HEAD],
        };
        let response = error_response(&err, "test-server");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
        assert_eq!(body_json(response).await["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_strip_body_keeps_headers() {
        let response = json_response(StatusCode::OK, &serde_json::json!({ "a": 1 }), "s");
        let stripped = strip_body(response);
        assert_eq!(stripped.status(), StatusCode::OK);
        assert_eq!(stripped.headers()[CONTENT_LENGTH], "7");
        let bytes = stripped.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
