// Endpoint handlers
// Placeholder handlers: fixed payloads, no store behind them

use hyper::StatusCode;

use super::types::{
    HealthResponse, MessageResponse, ProjectListResponse, ProjectResponse, SERVICE_NAME,
};

pub const LIST_MESSAGE: &str = "Projects endpoint - coming soon";
pub const CREATE_MESSAGE: &str = "Create project endpoint - coming soon";
pub const GET_MESSAGE: &str = "Get project endpoint - coming soon";
pub const UPDATE_MESSAGE: &str = "Update project endpoint - coming soon";
pub const DELETE_MESSAGE: &str = "Delete project endpoint - coming soon";

pub const fn health() -> (StatusCode, HealthResponse) {
    (
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            service: SERVICE_NAME,
        },
    )
}

pub const fn list_projects() -> (StatusCode, ProjectListResponse) {
    (
        StatusCode::OK,
        ProjectListResponse {
            projects: Vec::new(),
            message: LIST_MESSAGE,
        },
    )
}

/// The request body is never read
pub const fn create_project() -> (StatusCode, MessageResponse) {
    (
        StatusCode::CREATED,
        MessageResponse {
            message: CREATE_MESSAGE,
        },
    )
}

pub fn get_project(id: &str) -> (StatusCode, ProjectResponse) {
    echo(id, GET_MESSAGE)
}

pub fn update_project(id: &str) -> (StatusCode, ProjectResponse) {
    echo(id, UPDATE_MESSAGE)
}

pub fn delete_project(id: &str) -> (StatusCode, ProjectResponse) {
    echo(id, DELETE_MESSAGE)
}

fn echo(id: &str, message: &'static str) -> (StatusCode, ProjectResponse) {
    (
        StatusCode::OK,
        ProjectResponse {
            id: id.to_string(),
            message,
        },
    )
}
