// API payload types
// Wire shapes of the liveness check and the projects endpoints

use serde::{Deserialize, Serialize};

/// Service name reported by the liveness check
pub const SERVICE_NAME: &str = "danaverse-api";

/// A project, identified only by its caller-supplied id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
}

/// `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// `GET /api/v1/projects`
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
    pub message: &'static str,
}

/// `POST /api/v1/projects`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `GET|PUT|DELETE /api/v1/projects/:id`
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub message: &'static str,
}
