//! Error types for danaverse-api

use hyper::{Method, StatusCode};
use std::net::SocketAddr;
use thiserror::Error;

/// Errors that stop the process before or while the listener comes up
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be loaded or deserialized
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// Host/port pair does not form a socket address
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Log files could not be opened
    #[error("Failed to initialize logger: {0}")]
    Logger(#[source] std::io::Error),

    /// Tokio runtime could not be built
    #[error("Failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Request-level errors, rendered as JSON error responses
#[derive(Debug, Error)]
pub enum ApiError {
    /// No route matches the path
    #[error("Not Found")]
    NotFound { path: String },

    /// Path is routed but not for this method
    #[error("Method Not Allowed")]
    MethodNotAllowed { method: Method, allowed: Vec<Method> },

    /// Declared body exceeds `http.max_body_size`
    #[error("Payload Too Large")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Response could not be produced
    #[error("Internal Server Error")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for the error response
    pub fn body(&self) -> serde_json::Value {
        let error = self.to_string();
        match self {
            Self::NotFound { path } => serde_json::json!({ "error": error, "path": path }),
            Self::MethodNotAllowed { method, allowed } => serde_json::json!({
                "error": error,
                "method": method.as_str(),
                "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>(),
            }),
            Self::PayloadTooLarge { size, limit } => {
                serde_json::json!({ "error": error, "size": size, "limit": limit })
            }
            // Details stay in the error log
            Self::Internal(_) => serde_json::json!({ "error": error }),
        }
    }

    /// Value for the `Allow` header, if this error carries one
    pub fn allow_header(&self) -> Option<String> {
        match self {
            Self::MethodNotAllowed { allowed, .. } => Some(
                allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::NotFound { path: "/x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::PayloadTooLarge { size: 2, limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_method_not_allowed_body_and_allow() {
        let err = ApiError::MethodNotAllowed {
            method: Method::PATCH,
            allowed: vec![Method::GET, Method::PUT, Method::DELETE],
        };
        assert_eq!(err.allow_header().as_deref(), Some("GET, PUT, DELETE"));
        let body = err.body();
        assert_eq!(body["error"], "Method Not Allowed");
        assert_eq!(body["method"], "PATCH");
        assert_eq!(body["allowed"][1], "PUT");
    }

    #[test]
    fn test_internal_hides_detail() {
        let body = ApiError::Internal("serializer exploded".into()).body();
        assert_eq!(body, serde_json::json!({ "error": "Internal Server Error" }));
    }
}
