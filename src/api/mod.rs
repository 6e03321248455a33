// API module entry
// Request dispatch for the liveness check and the projects resource

mod handlers;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::error::ApiError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::Endpoint;

/// Service entry point for one request
#[allow(clippy::unused_async)]
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = route(&req, &state);

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve and run the handler for `req`
///
/// Never fails: routing errors become JSON error responses.
pub fn route<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let server_name = state.config.http.server_name.as_str();
    let path = req.uri().path();

    logger::log_debug(&format!("[Request] {} {}", req.method(), req.uri()));

    let resolved = match state.routes.resolve(req.method(), path) {
        Ok(resolved) => resolved,
        Err(err) => return http::error_response(&err, server_name),
    };

    if let Some(limit) = state.config.http.max_body_size {
        if let Some(err) = check_body_size(req, limit) {
            return http::error_response(&err, server_name);
        }
    }

    let id = resolved.params.get("id").unwrap_or_default();
    let response = match resolved.endpoint {
        Endpoint::Health => {
            let (status, body) = handlers::health();
            http::json_response(status, &body, server_name)
        }
        Endpoint::ListProjects => {
            let (status, body) = handlers::list_projects();
            http::json_response(status, &body, server_name)
        }
        Endpoint::CreateProject => {
            let (status, body) = handlers::create_project();
            http::json_response(status, &body, server_name)
        }
        Endpoint::GetProject => {
            let (status, body) = handlers::get_project(id);
            http::json_response(status, &body, server_name)
        }
        Endpoint::UpdateProject => {
            let (status, body) = handlers::update_project(id);
            http::json_response(status, &body, server_name)
        }
        Endpoint::DeleteProject => {
            let (status, body) = handlers::delete_project(id);
            http::json_response(status, &body, server_name)
        }
    };

    if req.method() == Method::HEAD {
        http::strip_body(response)
    } else {
        response
    }
}

/// Reject a declared body larger than `max_body_size`
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<ApiError> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    match content_length.to_str().ok()?.trim().parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(ApiError::PayloadTooLarge {
                size,
                limit: max_body_size,
            })
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: {content_length:?}, skipping size check"
            ));
            None
        }
    }
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = logger::http_version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    if req.method() == Method::HEAD || response.status() == StatusCode::NO_CONTENT {
        entry.body_bytes = 0;
    }
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
