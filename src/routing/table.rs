//! Route table module
//!
//! Fixed set of (method, pattern, endpoint) routes, registered at startup.

use hyper::Method;
use std::fmt;

use super::matcher::{Params, PathPattern};
use crate::error::ApiError;

/// Liveness check path
pub const HEALTH_PATH: &str = "/health";
/// Projects collection path
pub const PROJECTS_PATH: &str = "/api/v1/projects";
/// Single project path
pub const PROJECT_PATH: &str = "/api/v1/projects/:id";

/// Handler a route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    ListProjects,
    CreateProject,
    GetProject,
    UpdateProject,
    DeleteProject,
}

impl Endpoint {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::ListProjects => "list_projects",
            Self::CreateProject => "create_project",
            Self::GetProject => "get_project",
            Self::UpdateProject => "update_project",
            Self::DeleteProject => "delete_project",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub endpoint: Endpoint,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<7} {:<25} --> {}",
            self.method.as_str(),
            self.pattern.as_str(),
            self.endpoint.name()
        )
    }
}

/// Result of a successful lookup
#[derive(Debug)]
pub struct Resolved {
    pub endpoint: Endpoint,
    pub params: Params,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Liveness check plus the projects resource
    pub fn projects_api() -> Self {
        let mut table = Self::new();
        table.add(Method::GET, HEALTH_PATH, Endpoint::Health);
        table.add(Method::GET, PROJECTS_PATH, Endpoint::ListProjects);
        table.add(Method::POST, PROJECTS_PATH, Endpoint::CreateProject);
        table.add(Method::GET, PROJECT_PATH, Endpoint::GetProject);
        table.add(Method::PUT, PROJECT_PATH, Endpoint::UpdateProject);
        table.add(Method::DELETE, PROJECT_PATH, Endpoint::DeleteProject);
        table
    }

    pub fn add(&mut self, method: Method, pattern: &str, endpoint: Endpoint) {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            endpoint,
        });
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the route for `method` and `path` (query string excluded)
    ///
    /// HEAD is served by GET routes. A path that matches under other methods
    /// only yields `MethodNotAllowed`; a path that matches nothing yields
    /// `NotFound`.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<Resolved, ApiError> {
        let lookup = if method == Method::HEAD {
            &Method::GET
        } else {
            method
        };

        let mut allowed: Vec<Method> = Vec::new();
        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            if route.method == *lookup {
                return Ok(Resolved {
                    endpoint: route.endpoint,
                    params,
                });
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            return Err(ApiError::NotFound {
                path: path.to_string(),
            });
        }

        if allowed.contains(&Method::GET) {
            allowed.push(Method::HEAD);
        }
        Err(ApiError::MethodNotAllowed {
            method: method.clone(),
            allowed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projects_api_routes() {
        let table = RouteTable::projects_api();
        let cases = [
            (Method::GET, "/health", Endpoint::Health),
            (Method::GET, "/api/v1/projects", Endpoint::ListProjects),
            (Method::POST, "/api/v1/projects", Endpoint::CreateProject),
            (Method::GET, "/api/v1/projects/7", Endpoint::GetProject),
            (Method::PUT, "/api/v1/projects/7", Endpoint::UpdateProject),
            (Method::DELETE, "/api/v1/projects/7", Endpoint::DeleteProject),
        ];
        for (method, path, expected) in cases {
            let resolved = table.resolve(&method, path).unwrap();
            assert_eq!(resolved.endpoint, expected, "{method} {path}");
        }
    }

    #[test]
    fn test_head_uses_get_route() {
        let table = RouteTable::projects_api();
        let resolved = table.resolve(&Method::HEAD, "/health").unwrap();
        assert_eq!(resolved.endpoint, Endpoint::Health);
    }

    #[test]
    fn test_unknown_path_not_found() {
        let table = RouteTable::projects_api();
        let err = table.resolve(&Method::GET, "/api/v2/projects").unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref path } if path == "/api/v2/projects"));
    }

    #[test]
    fn test_wrong_method_lists_allowed() {
        let table = RouteTable::projects_api();
        let err = table.resolve(&Method::PATCH, "/api/v1/projects/1").unwrap_err();
        match err {
            ApiError::MethodNotAllowed { method, allowed } => {
                assert_eq!(method, Method::PATCH);
                assert_eq!(
                    allowed,
                    vec![Method::GET, Method::PUT, Method::DELETE, Method::HEAD]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = table.resolve(&Method::POST, "/health").unwrap_err();
        assert_eq!(err.allow_header().as_deref(), Some("GET, HEAD"));
    }

    #[test]
    fn test_route_display() {
        let table = RouteTable::projects_api();
        let line = table.routes()[0].to_string();
        assert!(line.starts_with("GET"));
        assert!(line.contains("/health"));
        assert!(line.ends_with("--> health"));
    }
}
