//! HTTP protocol layer module
//!
//! Response builders shared by every endpoint.

pub mod response;

// Re-export commonly used builders
pub use response::{error_response, json_response, strip_body};
