//! Routing module
//!
//! Maps HTTP method + path to an endpoint:
//! - Path patterns with named single-segment params (`:id`)
//! - A fixed route table for the liveness check and the projects resource

mod matcher;
mod table;

pub use table::{Endpoint, RouteTable};
